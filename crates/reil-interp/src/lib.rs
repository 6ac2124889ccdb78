//! Reference evaluator for REIL code.
//!
//! Executes the REIL sequence of one native instruction against a register
//! file and a sparse big-endian memory. Used to check lifted semantics.

mod error;
mod interpreter;
mod memory;

pub use error::*;
pub use interpreter::*;
pub use memory::*;
