//! Decoded native instructions.

use std::fmt;

use crate::error::{Result, TranslationError};
use crate::types::{normalize_register, parse_cr_bit, parse_cr_field, parse_gpr};

/// One operand of a decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Register, in any accepted spelling (`r3`, `%r3`, `sp`, `cr2`, `lr`).
    Register(String),
    /// Immediate value, already sign-applied.
    Immediate(i64),
    /// Displacement addressing: `displacement(base)`.
    Memory { base: String, displacement: i64 },
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(name) => f.write_str(name),
            Self::Immediate(value) if *value < 0 => write!(f, "-{:#x}", value.unsigned_abs()),
            Self::Immediate(value) => write!(f, "{value:#x}"),
            Self::Memory { base, displacement } => write!(f, "{displacement}({base})"),
        }
    }
}

/// A decoded PowerPC instruction.
///
/// `mnemonic` is `None` for placeholders the decoder could not decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeInstruction {
    pub address: u64,
    pub mnemonic: Option<String>,
    pub operands: Vec<Operand>,
}

impl NativeInstruction {
    pub fn new(address: u64, mnemonic: &str, operands: Vec<Operand>) -> Self {
        Self {
            address,
            mnemonic: Some(mnemonic.to_string()),
            operands,
        }
    }

    /// Placeholder for an undecodable instruction.
    pub const fn undecodable(address: u64) -> Self {
        Self {
            address,
            mnemonic: None,
            operands: Vec::new(),
        }
    }

    pub fn mnemonic(&self) -> &str {
        self.mnemonic.as_deref().unwrap_or("")
    }

    fn operand(&self, index: usize) -> Result<&Operand> {
        self.operands
            .get(index)
            .ok_or_else(|| TranslationError::MissingOperand {
                mnemonic: self.mnemonic().to_string(),
                index,
            })
    }

    fn shape_error(&self, index: usize, expected: &'static str) -> TranslationError {
        TranslationError::OperandShape {
            mnemonic: self.mnemonic().to_string(),
            index,
            expected,
        }
    }

    /// General-purpose register number of operand `index`.
    ///
    /// Bare immediates 0..32 are accepted as register numbers.
    pub fn gpr(&self, index: usize) -> Result<u8> {
        match self.operand(index)? {
            Operand::Register(name) => {
                parse_gpr(name).ok_or_else(|| TranslationError::InvalidRegister(name.clone()))
            }
            Operand::Immediate(value) => u8::try_from(*value)
                .ok()
                .filter(|&r| r < 32)
                .ok_or_else(|| self.shape_error(index, "a general-purpose register")),
            Operand::Memory { .. } => Err(self.shape_error(index, "a general-purpose register")),
        }
    }

    /// Immediate value of operand `index`.
    pub fn imm(&self, index: usize) -> Result<i64> {
        match self.operand(index)? {
            Operand::Immediate(value) => Ok(*value),
            _ => Err(self.shape_error(index, "an immediate")),
        }
    }

    /// Immediate operand checked to lie in `0..limit`.
    pub fn imm_below(&self, index: usize, limit: i64) -> Result<u8> {
        let value = self.imm(index)?;
        if (0..limit).contains(&value) {
            u8::try_from(value).map_err(|_| self.shape_error(index, "a small immediate"))
        } else {
            Err(TranslationError::InvalidForm {
                mnemonic: self.mnemonic().to_string(),
                reason: format!("operand {index} value {value} not in 0..{limit}"),
            })
        }
    }

    /// Immediate operand as a 32-bit pattern.
    ///
    /// Negative values down to `i32::MIN` wrap; anything outside the 32-bit
    /// range is rejected.
    pub fn imm_u32(&self, index: usize) -> Result<u32> {
        let value = self.imm(index)?;
        u32::try_from(value)
            .ok()
            .or_else(|| i32::try_from(value).ok().map(|v| u32::from_ne_bytes(v.to_ne_bytes())))
            .ok_or_else(|| TranslationError::InvalidForm {
                mnemonic: self.mnemonic().to_string(),
                reason: format!("operand {index} value {value:#x} does not fit in 32 bits"),
            })
    }

    /// Base register and displacement of a `d(rA)` operand.
    pub fn memory(&self, index: usize) -> Result<(u8, i64)> {
        match self.operand(index)? {
            Operand::Memory { base, displacement } => {
                let base =
                    parse_gpr(base).ok_or_else(|| TranslationError::InvalidRegister(base.clone()))?;
                Ok((base, *displacement))
            }
            _ => Err(self.shape_error(index, "a displacement memory reference")),
        }
    }

    /// Condition-register field of operand `index` (`crN` or a bare number).
    pub fn cr_field(&self, index: usize) -> Result<u8> {
        match self.operand(index)? {
            Operand::Register(name) => {
                parse_cr_field(name).ok_or_else(|| TranslationError::InvalidRegister(name.clone()))
            }
            Operand::Immediate(_) => self.imm_below(index, 8),
            Operand::Memory { .. } => Err(self.shape_error(index, "a condition-register field")),
        }
    }

    /// Condition-register bit number of operand `index` (0..32).
    pub fn cr_bit(&self, index: usize) -> Result<u8> {
        match self.operand(index)? {
            Operand::Register(name) => {
                parse_cr_bit(name).ok_or_else(|| TranslationError::InvalidRegister(name.clone()))
            }
            Operand::Immediate(_) => self.imm_below(index, 32),
            Operand::Memory { .. } => Err(self.shape_error(index, "a condition-register bit")),
        }
    }

    /// Whether operand `index` names a condition-register field.
    pub fn is_cr_field(&self, index: usize) -> bool {
        matches!(self.operands.get(index), Some(Operand::Register(name)) if parse_cr_field(name).is_some())
    }

    /// Canonical register name of operand `index`.
    pub fn register_name(&self, index: usize) -> Result<String> {
        match self.operand(index)? {
            Operand::Register(name) => Ok(normalize_register(name)),
            _ => Err(self.shape_error(index, "a register")),
        }
    }

    /// Reject the instruction with a form error.
    pub fn invalid_form(&self, reason: impl Into<String>) -> TranslationError {
        TranslationError::InvalidForm {
            mnemonic: self.mnemonic().to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for NativeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}: ", self.address)?;
        match &self.mnemonic {
            Some(mnemonic) => f.write_str(mnemonic)?,
            None => f.write_str("(bad)")?,
        }
        for (i, operand) in self.operands.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{operand}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(operands: Vec<Operand>) -> NativeInstruction {
        NativeInstruction::new(0x100, "test", operands)
    }

    #[test]
    fn test_gpr_accessor() {
        let i = instr(vec![
            Operand::Register("r3".into()),
            Operand::Immediate(4),
            Operand::Register("lr".into()),
        ]);
        assert_eq!(i.gpr(0), Ok(3));
        assert_eq!(i.gpr(1), Ok(4));
        assert_eq!(i.gpr(2), Err(TranslationError::InvalidRegister("lr".into())));
        assert!(matches!(
            i.gpr(3),
            Err(TranslationError::MissingOperand { index: 3, .. })
        ));
    }

    #[test]
    fn test_memory_accessor() {
        let i = instr(vec![Operand::Memory {
            base: "sp".into(),
            displacement: -8,
        }]);
        assert_eq!(i.memory(0), Ok((1, -8)));
        assert!(matches!(i.imm(0), Err(TranslationError::OperandShape { .. })));
    }

    #[test]
    fn test_imm_u32_accessor() {
        let i = instr(vec![
            Operand::Immediate(0xFFFF_FFFF),
            Operand::Immediate(-4),
            Operand::Immediate(0x1_0000_0000),
            Operand::Immediate(-0x8000_0001),
        ]);
        assert_eq!(i.imm_u32(0), Ok(0xFFFF_FFFF));
        assert_eq!(i.imm_u32(1), Ok(0xFFFF_FFFC));
        assert!(matches!(i.imm_u32(2), Err(TranslationError::InvalidForm { .. })));
        assert!(matches!(i.imm_u32(3), Err(TranslationError::InvalidForm { .. })));
    }

    #[test]
    fn test_cr_accessors() {
        let i = instr(vec![
            Operand::Register("cr6".into()),
            Operand::Register("4*cr1+eq".into()),
            Operand::Immediate(9),
        ]);
        assert_eq!(i.cr_field(0), Ok(6));
        assert!(i.is_cr_field(0));
        assert!(!i.is_cr_field(2));
        assert_eq!(i.cr_bit(1), Ok(6));
        assert_eq!(i.cr_bit(2), Ok(9));
        assert!(i.cr_field(2).is_err());
    }

    #[test]
    fn test_display() {
        let i = NativeInstruction::new(
            0x1000,
            "lwz",
            vec![
                Operand::Register("r3".into()),
                Operand::Memory {
                    base: "r1".into(),
                    displacement: 8,
                },
            ],
        );
        assert_eq!(i.to_string(), "00001000: lwz r3, 8(r1)");
        assert_eq!(NativeInstruction::undecodable(4).to_string(), "00000004: (bad)");
    }
}
