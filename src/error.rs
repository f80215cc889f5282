//! The closed error taxonomy produced by the loader and the executor.
//!
//! Every variant maps to exactly one process exit code (see [`Error::exit_code`]),
//! mirroring the way the source language's own error codes are specified: a fixed,
//! small set of categories rather than an open-ended message format.

use thiserror::Error;

/// Something went wrong while loading or executing a program.
///
/// Each variant corresponds to one of the categories from the interpreter's error
/// taxonomy. The payload is a human-readable description used for `BREAK`/`DPRINT`
/// style diagnostics; it never affects the exit code, which is fixed per variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed XML shape, bad `order`/`opcode` attributes, bad arity, unknown opcode.
    #[error("source structure error: {0}")]
    SourceStructure(String),

    /// Redefined variable, duplicate label, jump to an undefined label.
    #[error("semantic error: {0}")]
    Semantic(String),

    /// An operand has the wrong value kind for the opcode that consumes it.
    #[error("operand type error: {0}")]
    OperandType(String),

    /// Use of a variable with no matching `DEFVAR` in scope, or an empty call stack on `RETURN`.
    #[error("variable access error: {0}")]
    Variable(String),

    /// A frame precondition was violated (`LF`/`TF` absent, `PUSHFRAME`/`POPFRAME` misuse).
    #[error("frame access error: {0}")]
    Frame(String),

    /// A value is missing where one was required (`Undef` read, empty data-stack pop).
    #[error("value error: {0}")]
    Value(String),

    /// An arithmetic, logical, or index precondition was violated with a value that
    /// does carry the right type (division by zero, an out-of-range `EXIT` code).
    #[error("operand value error: {0}")]
    OperandValue(String),

    /// A string operation's index or codepoint argument was out of range.
    #[error("string operation error: {0}")]
    StringOperation(String),

    /// A host I/O collaborator (input/output port) failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The process exit code this error maps to, per the interpreter's fixed table.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::SourceStructure(_) => 32,
            Error::Semantic(_) => 52,
            Error::OperandType(_) => 53,
            Error::Variable(_) => 54,
            Error::Frame(_) => 55,
            Error::Value(_) => 56,
            Error::OperandValue(_) => 57,
            Error::StringOperation(_) => 58,
            Error::Internal(_) => 99,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
