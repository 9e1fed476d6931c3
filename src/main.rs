use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use lox_interpreter as lox;

use lox::ast::ExprIds;
use lox::ast_printer::AstPrinter;
use lox::error::LoxError;
use lox::lox::{Lox, Outcome};
use lox::parser::Parser;
use lox::scanner::Scanner;

/// Exit status when the input file cannot be read.
const EXIT_IO: i32 = 74;
const EXIT_STATIC: i32 = 65;

#[derive(ClapParser, Debug)]
#[command(name = "lox", version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print one JSON object per token
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file and prints the AST of every statement
    Parse { filename: PathBuf },

    /// Runs a Lox program, or starts a REPL when no file is given
    Run { filename: Option<PathBuf> },
}

/// Reads a source file, which must be valid UTF-8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

/// Like [`read_file`], but exits with status 74 if the file is unusable.
fn read_source(filename: &Path) -> String {
    match read_file(filename) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(EXIT_IO);
        }
    }
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("lox_interpreter::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report(errors: &[LoxError]) {
    for e in errors {
        eprintln!("{}", e);
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<i32> {
    let source = read_source(filename);
    let mut stdout = io::stdout().lock();
    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);

                if json {
                    writeln!(stdout, "{}", serde_json::to_string(&token)?)?;
                } else {
                    writeln!(stdout, "{}", token)?;
                }
            }

            Err(e) => {
                tokenized = false;
                stdout.flush()?;
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");
        return Ok(EXIT_STATIC);
    }

    info!("Tokenization completed successfully");
    Ok(0)
}

fn parse(filename: &Path) -> Result<i32> {
    let source = read_source(filename);

    let (tokens, mut errors) = Scanner::new(&source).scan_tokens();
    let mut ids = ExprIds::new();
    let (statements, parse_errors) = Parser::new(&tokens, &mut ids).parse();
    errors.extend(parse_errors);

    if !errors.is_empty() {
        report(&errors);
        return Ok(EXIT_STATIC);
    }

    for stmt in &statements {
        let ast_str = AstPrinter::print_stmt(stmt);
        debug!("AST: {}", ast_str);
        println!("{}", ast_str);
    }

    info!("Parse subcommand completed");
    Ok(0)
}

fn run_file(filename: &Path) -> Result<i32> {
    let source = read_source(filename);
    let mut session = Lox::new();

    let outcome: Outcome = session.run(&source);
    report(outcome.errors());

    info!("Program finished with exit code {}", outcome.exit_code());
    Ok(outcome.exit_code())
}

/// Each line runs against the same session; errors never end it.
fn run_prompt() -> Result<i32> {
    info!("Starting REPL");

    let mut session = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };

        let outcome: Outcome = session.run(&line?);
        report(outcome.errors());
    }

    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code: i32 = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json)?,
        Commands::Parse { filename } => parse(filename)?,
        Commands::Run {
            filename: Some(filename),
        } => run_file(filename)?,
        Commands::Run { filename: None } => run_prompt()?,
    };

    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
