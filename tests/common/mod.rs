#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use lox_interpreter::lox::{Lox, Outcome};

/// A `Write` sink the test keeps a handle to after giving it away.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session whose printed output can be inspected.
pub fn session() -> (Lox, SharedBuffer) {
    let buffer = SharedBuffer::default();
    (Lox::with_output(Box::new(buffer.clone())), buffer)
}

/// Runs `source` in a fresh session and returns what it printed.
pub fn run(source: &str) -> (String, Outcome) {
    let (mut lox, buffer) = session();
    let outcome = lox.run(source);
    (buffer.contents(), outcome)
}

/// Rendered error messages of an outcome.
pub fn messages(outcome: &Outcome) -> Vec<String> {
    outcome.errors().iter().map(|e| e.to_string()).collect()
}
