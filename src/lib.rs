//! Interpreter for a three-address, XML-encoded assembly-like instruction language.
//!
//! The two halves described by the spec live in [`loader`] (DOM tree ->
//! validated, order-indexed instruction table) and [`executor`] (instruction
//! pointer + frames + stacks -> I/O and an exit code). Everything else
//! ([`value`], [`frame`], [`stack`], [`label`], [`instruction`]) is the data
//! model those two halves share.
//!
//! XML parsing itself is out of scope here (see `taci-xml`); this crate only
//! consumes the generic [`dom::Element`] tree.

pub mod dom;
pub mod error;
pub mod executor;
pub mod frame;
pub mod instruction;
pub mod io;
pub mod label;
pub mod loader;
pub mod stack;
pub mod value;

pub use error::Error;
pub use executor::Executor;
pub use loader::{load, Program};
pub use value::Value;
