//! REIL opcodes.

use std::fmt;

/// REIL opcode.
///
/// Every opcode takes up to three operands. Arithmetic and bitwise opcodes
/// read the first two and write the third; `BISZ` and `STR` read the first
/// and write the third; `LDM` reads memory at the first and writes the third;
/// `STM` writes the first to memory at the third; `JCC` jumps to the third
/// when the first is non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReilOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// Logical shift; positive amounts shift left, negative amounts right.
    Bsh,
    And,
    Or,
    Xor,
    /// Boolean is-zero: 1 when the input is zero, 0 otherwise.
    Bisz,
    /// Copy into a register.
    Str,
    Ldm,
    Stm,
    Jcc,
    Nop,
    Unknown,
}

impl ReilOpcode {
    /// Lower-case mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Bsh => "bsh",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Bisz => "bisz",
            Self::Str => "str",
            Self::Ldm => "ldm",
            Self::Stm => "stm",
            Self::Jcc => "jcc",
            Self::Nop => "nop",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the third operand is a register written by this opcode.
    pub const fn writes_register(self) -> bool {
        !matches!(self, Self::Stm | Self::Jcc | Self::Nop | Self::Unknown)
    }
}

impl fmt::Display for ReilOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
