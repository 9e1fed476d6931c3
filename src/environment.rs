use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to an environment.  Closures, call frames and child scopes
/// all hold one; the scope lives until the last of them is dropped.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap a fresh child of `enclosing` in a shared handle.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Binds (or rebinds) `name` in this scope.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup along the chain; used for globals, which the resolver
    /// leaves unrecorded.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// The environment `distance` links up the chain from `env`, or `None` if
    /// the chain is shorter than that.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next: EnvRef = current.borrow().enclosing()?;
            current = next;
        }

        Some(current)
    }

    /// Read `name` exactly `distance` scopes up.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        Self::lookup_at(env, distance, &name.lexeme).ok_or_else(|| unresolved(name, distance))
    }

    /// Like [`get_at`](Self::get_at) for implicit names (`this`, `super`).
    pub fn lookup_at(env: &EnvRef, distance: usize, name: &str) -> Option<Value> {
        let scope: EnvRef = Self::ancestor(env, distance)?;
        let value = scope.borrow().values.get(name).cloned();
        value
    }

    /// Write `name` exactly `distance` scopes up.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        let scope: EnvRef =
            Self::ancestor(env, distance).ok_or_else(|| unresolved(name, distance))?;
        let mut scope = scope.borrow_mut();

        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(unresolved(name, distance)),
        }
    }
}

/// The resolver promised a binding at `distance` that is not there.
fn unresolved(name: &Token, distance: usize) -> LoxError {
    debug!(
        "No binding for '{}' at distance {} (line {})",
        name.lexeme, distance, name.line
    );
    debug_assert!(
        false,
        "resolver recorded '{}' at distance {distance} but the scope chain disagrees",
        name.lexeme
    );

    LoxError::runtime(name, format!("Unresolved variable '{}'.", name.lexeme))
}
