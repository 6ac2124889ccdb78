//! REIL operands.

use std::fmt;

use crate::address::ReilAddress;
use crate::size::OperandSize;

/// What an operand refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// Unused operand slot.
    Empty,
    /// Architectural register or temporary.
    Register(String),
    /// Integer literal, stored truncated to the operand size.
    Literal(u64),
    /// Jump target inside the REIL code of a native instruction.
    SubAddress(ReilAddress),
}

/// Sized REIL operand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReilOperand {
    pub size: OperandSize,
    pub kind: OperandKind,
}

impl ReilOperand {
    /// Unused operand slot.
    pub const fn empty() -> Self {
        Self {
            size: OperandSize::Byte,
            kind: OperandKind::Empty,
        }
    }

    /// Register operand.
    pub fn register(size: OperandSize, name: impl Into<String>) -> Self {
        Self {
            size,
            kind: OperandKind::Register(name.into()),
        }
    }

    /// Literal operand; the value is truncated to `size`.
    pub const fn literal(size: OperandSize, value: u64) -> Self {
        Self {
            size,
            kind: OperandKind::Literal(size.truncate(value)),
        }
    }

    /// Signed literal, stored as two's complement of `size`.
    pub const fn signed(size: OperandSize, value: i64) -> Self {
        Self::literal(size, value as u64)
    }

    /// Sub-address jump target.
    pub const fn sub_address(address: ReilAddress) -> Self {
        Self {
            size: OperandSize::Dword,
            kind: OperandKind::SubAddress(address),
        }
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self.kind, OperandKind::Empty)
    }

    /// Register name, if this is a register operand.
    pub fn register_name(&self) -> Option<&str> {
        match &self.kind {
            OperandKind::Register(name) => Some(name),
            _ => None,
        }
    }

    /// Literal value, if this is a literal operand.
    pub const fn literal_value(&self) -> Option<u64> {
        match self.kind {
            OperandKind::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ReilOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OperandKind::Empty => f.write_str("EMPTY"),
            OperandKind::Register(name) => write!(f, "{} {}", self.size, name),
            OperandKind::Literal(value) => {
                let signed = self.size.sign_extend(*value);
                if (-64..=-2).contains(&signed) {
                    write!(f, "{} {}", self.size, signed)
                } else {
                    write!(f, "{} {:#x}", self.size, value)
                }
            }
            OperandKind::SubAddress(address) => write!(f, "{} {}", self.size, address),
        }
    }
}
