//! PowerPC 32-bit instruction lifter.
//!
//! Translates one decoded PowerPC instruction at a time into REIL code that
//! makes every side effect explicit: register writes, memory accesses and the
//! individual condition-register and XER flag bits.
//!
//! The entry point is [`translate`], which looks the mnemonic up in the
//! process-wide [`TranslatorRegistry`].

mod env;
mod error;
pub mod generators;
mod helpers;
mod instr;
mod registry;
mod text;
mod translators;
mod types;

pub use env::*;
pub use error::*;
pub use helpers::*;
pub use instr::*;
pub use registry::*;
pub use text::*;
pub use translators::*;
pub use types::*;
