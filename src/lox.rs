//! One interpreter session: source text in, [`Outcome`] out.
//!
//! A session keeps its global environment and its expression-id counter
//! across runs, so the REPL can feed it one line at a time.

use std::io::Write;

use log::{debug, info};

use crate::ast::{ExprIds, Stmt};
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

/// Result of running one piece of source.
#[derive(Debug)]
pub enum Outcome {
    Success,
    /// Scan, parse or resolve errors; nothing was executed.
    StaticErrors(Vec<LoxError>),
    /// Execution stopped at the first runtime error.
    RuntimeError(LoxError),
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::StaticErrors(_) => 65,
            Outcome::RuntimeError(_) => 70,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Every error in report order.
    pub fn errors(&self) -> &[LoxError] {
        match self {
            Outcome::Success => &[],
            Outcome::StaticErrors(errors) => errors,
            Outcome::RuntimeError(error) => std::slice::from_ref(error),
        }
    }
}

pub struct Lox {
    interpreter: Interpreter,
    ids: ExprIds,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
            ids: ExprIds::new(),
        }
    }

    /// A session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
            ids: ExprIds::new(),
        }
    }

    /// Scan, parse, resolve, then interpret `source`.  Execution only starts
    /// when every static pass came back clean.
    pub fn run(&mut self, source: &str) -> Outcome {
        info!("Running {} bytes of source", source.len());

        let (tokens, mut errors): (Vec<Token>, Vec<LoxError>) = Scanner::new(source).scan_tokens();
        debug!("Scanned {} tokens", tokens.len());

        let (statements, parse_errors): (Vec<Stmt>, Vec<LoxError>) =
            Parser::new(&tokens, &mut self.ids).parse();
        errors.extend(parse_errors);

        if !errors.is_empty() {
            info!("Static errors: {}", errors.len());
            return Outcome::StaticErrors(errors);
        }

        let errors: Vec<LoxError> = Resolver::new(&mut self.interpreter).resolve(&statements);

        if !errors.is_empty() {
            info!("Resolution errors: {}", errors.len());
            return Outcome::StaticErrors(errors);
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => Outcome::Success,
            Err(error) => {
                debug!("Runtime error: {}", error);
                Outcome::RuntimeError(error)
            }
        }
    }
}
