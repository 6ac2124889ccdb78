//! REIL intermediate representation.
//!
//! This crate provides pure IR types with no knowledge of any source
//! architecture. PowerPC lifting is implemented in `reil-ppc`.

mod address;
mod builder;
mod instr;
mod opcode;
mod operand;
mod size;

pub use address::*;
pub use builder::*;
pub use instr::*;
pub use opcode::*;
pub use operand::*;
pub use size::*;
