use reil_ir::ReilAddress;
use thiserror::Error;

/// Evaluation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    #[error("read of undefined register `{register}` at {address}")]
    UndefinedRegister { register: String, address: ReilAddress },
    #[error("division by zero at {0}")]
    DivisionByZero(ReilAddress),
    #[error("operand {index} of instruction at {address} is not usable here")]
    InvalidOperand { index: usize, address: ReilAddress },
    #[error("jump target {target} at {address} is outside the instruction")]
    InvalidJumpTarget { target: ReilAddress, address: ReilAddress },
    #[error("unknown instruction at {0}")]
    UnknownInstruction(ReilAddress),
    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, InterpreterError>;
