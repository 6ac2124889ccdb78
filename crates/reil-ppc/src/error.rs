use thiserror::Error;

/// Translation failures.
///
/// Unknown mnemonics are not errors; they produce an `UNKNOWN` placeholder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("{mnemonic}: missing operand {index}")]
    MissingOperand { mnemonic: String, index: usize },
    #[error("{mnemonic}: operand {index} must be {expected}")]
    OperandShape {
        mnemonic: String,
        index: usize,
        expected: &'static str,
    },
    #[error("invalid register `{0}`")]
    InvalidRegister(String),
    #[error("{mnemonic}: {reason}")]
    InvalidForm { mnemonic: String, reason: String },
    #[error("instruction at {address:#x} needs {count} REIL instructions, limit is {limit}")]
    AddressSpaceExhausted {
        address: u64,
        count: usize,
        limit: u64,
    },
    #[error("extension `{name}` failed: {message}")]
    Extension { name: String, message: String },
}

/// Errors from parsing instruction text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty instruction text")]
    Empty,
    #[error("invalid operand `{0}`")]
    InvalidOperand(String),
    #[error("immediate `{0}` out of range")]
    ImmediateOutOfRange(String),
}

pub type Result<T> = std::result::Result<T, TranslationError>;
