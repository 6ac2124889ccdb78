//! REIL code generators.
//!
//! Each generator appends the micro-operations for one semantic family to a
//! [`ReilBuilder`](reil_ir::ReilBuilder). Translators resolve operands and
//! pick the flag switches; generators only emit code.

mod add;
mod branch;
mod clz;
mod compare;
mod cr;
mod div;
mod flags;
mod load;
mod logic;
mod mul;
mod rotate;
mod shift;
mod spr;
mod store;

pub use add::*;
pub use branch::*;
pub use clz::*;
pub use compare::*;
pub use cr::*;
pub use div::*;
pub use flags::*;
pub use load::*;
pub use logic::*;
pub use mul::*;
pub use rotate::*;
pub use shift::*;
pub use spr::*;
pub use store::*;

use reil_ir::{OperandSize, ReilOperand};

/// All ones in 32 bits.
pub const MASK_32: u64 = 0xFFFF_FFFF;

/// Which flags an arithmetic instruction updates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ArithFlags {
    /// Record form (`.`): update CR0.
    pub set_cr: bool,
    /// Overflow form (`o`): update XEROV and XERSO.
    pub set_overflow: bool,
    /// Carrying form: update XERCA.
    pub set_carry: bool,
}

impl ArithFlags {
    pub const NONE: Self = Self {
        set_cr: false,
        set_overflow: false,
        set_carry: false,
    };

    #[must_use]
    pub const fn with_cr(mut self, set_cr: bool) -> Self {
        self.set_cr = set_cr;
        self
    }

    #[must_use]
    pub const fn with_overflow(mut self, set_overflow: bool) -> Self {
        self.set_overflow = set_overflow;
        self
    }

    #[must_use]
    pub const fn with_carry(mut self, set_carry: bool) -> Self {
        self.set_carry = set_carry;
        self
    }
}

/// 32-bit register operand.
pub fn dw(name: &str) -> ReilOperand {
    ReilOperand::register(OperandSize::Dword, name)
}

/// 64-bit register operand.
pub fn qw(name: &str) -> ReilOperand {
    ReilOperand::register(OperandSize::Qword, name)
}

/// 16-bit register operand.
pub fn word(name: &str) -> ReilOperand {
    ReilOperand::register(OperandSize::Word, name)
}

/// 8-bit register operand, used for single-bit flags.
pub fn byte(name: &str) -> ReilOperand {
    ReilOperand::register(OperandSize::Byte, name)
}

pub const fn dw_lit(value: u32) -> ReilOperand {
    ReilOperand::literal(OperandSize::Dword, value as u64)
}

pub const fn qw_lit(value: u64) -> ReilOperand {
    ReilOperand::literal(OperandSize::Qword, value)
}

pub const fn byte_lit(value: u8) -> ReilOperand {
    ReilOperand::literal(OperandSize::Byte, value as u64)
}

/// Shift amount for `BSH`; negative shifts right.
pub const fn shift_by(size: OperandSize, amount: i64) -> ReilOperand {
    ReilOperand::signed(size, amount)
}

/// Register operand of any size.
pub fn reg(size: OperandSize, name: &str) -> ReilOperand {
    ReilOperand::register(size, name)
}
