//! I/O ports: the injection points the executor uses for `READ`/`WRITE`/`DPRINT`/`BREAK`.
//!
//! Tokenizing a typed read from raw bytes, and writing raw bytes to a stream, are
//! both external collaborators per the spec (§6); this module only defines the
//! seam. `taci-runner` supplies the real stdin/stdout/stderr-backed implementations.

use crate::error::Error;

/// Typed input queries, one per `READ` type argument.
///
/// Each method returns `None` on parse failure or end of input; the `READ`
/// opcode turns a `None` into the `nil` value rather than failing the program.
pub trait InputPort {
    fn read_int(&mut self) -> Option<i64>;
    fn read_string(&mut self) -> Option<String>;
    fn read_bool(&mut self) -> Option<bool>;
}

/// A sink for textual output (`WRITE` writes to one port, `DPRINT`/`BREAK` to
/// another).
///
/// Fallible: a real stream can fail to write (a closed pipe, a full disk),
/// and that host fault surfaces as [`Error::Internal`] rather than a panic.
pub trait OutputPort {
    fn write(&mut self, text: &str) -> Result<(), Error>;
}

impl OutputPort for String {
    fn write(&mut self, text: &str) -> Result<(), Error> {
        self.push_str(text);
        Ok(())
    }
}

/// An in-memory [`InputPort`] that serves pre-supplied values in order, useful
/// for tests that want to drive `READ` deterministically.
#[derive(Default)]
pub struct QueueInput {
    ints: std::collections::VecDeque<Option<i64>>,
    strings: std::collections::VecDeque<Option<String>>,
    bools: std::collections::VecDeque<Option<bool>>,
}

impl QueueInput {
    pub fn new() -> QueueInput {
        QueueInput::default()
    }

    pub fn push_int(&mut self, value: Option<i64>) -> &mut Self {
        self.ints.push_back(value);
        self
    }

    pub fn push_string(&mut self, value: Option<&str>) -> &mut Self {
        self.strings.push_back(value.map(str::to_string));
        self
    }

    pub fn push_bool(&mut self, value: Option<bool>) -> &mut Self {
        self.bools.push_back(value);
        self
    }
}

impl InputPort for QueueInput {
    fn read_int(&mut self) -> Option<i64> {
        self.ints.pop_front().flatten()
    }

    fn read_string(&mut self) -> Option<String> {
        self.strings.pop_front().flatten()
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.bools.pop_front().flatten()
    }
}

/// An [`InputPort`] that always reports end of input, useful when a program
/// under test never calls `READ`.
#[derive(Default)]
pub struct EmptyInput;

impl InputPort for EmptyInput {
    fn read_int(&mut self) -> Option<i64> {
        None
    }

    fn read_string(&mut self) -> Option<String> {
        None
    }

    fn read_bool(&mut self) -> Option<bool> {
        None
    }
}
