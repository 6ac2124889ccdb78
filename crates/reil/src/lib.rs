//! REIL - PowerPC to REIL lifter
//!
//! Lifts PowerPC disassembly listings into REIL and evaluates the result.
//!
//! # Example
//!
//! ```ignore
//! use reil::{LiftConfig, Pipeline, parse_listing};
//!
//! let listing = parse_listing("0x1000: addi r3, r3, 1\n0x1004: blr\n")?;
//! let lifted = Pipeline::new(LiftConfig::default()).lift(&listing)?;
//! ```

// Re-export from sub-crates
pub use reil_interp::{InterpreterError, Memory, Outcome, ReilInterpreter};
pub use reil_ir::{ReilAddress, ReilInstruction, ReilOpcode, ReilOperand};
pub use reil_ppc::{
    NativeInstruction, ParseError, TranslationEnvironment, TranslationError, TranslationExtension,
    TranslatorRegistry,
};

mod eval;
mod listing;
pub mod metrics;
mod pipeline;

pub use eval::*;
pub use listing::*;
pub use pipeline::*;

use thiserror::Error;

/// Lifter errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Listing { line: usize, message: String },

    #[error("{address:#x}: {source}")]
    Translation {
        address: u64,
        source: TranslationError,
    },

    #[error("{address:#x}: {source}")]
    Interpreter {
        address: u64,
        source: InterpreterError,
    },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, Error>;
