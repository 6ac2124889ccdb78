//! Logical, rotate and shift translators.

use reil_ir::ReilBuilder;

use super::{gpr_name, gpr_operand};
use crate::env::TranslationEnvironment;
use crate::error::Result;
use crate::generators::{
    LogicOp, RotateAmount, ShiftKind, dw_lit, generate_cntlzw, generate_logic, generate_move,
    generate_rotate, generate_shift, generate_sign_extend,
};
use crate::helpers::{rotate_mask, shifted_16, sign_extend_16, zero_extend_16};
use crate::instr::NativeInstruction;

/// Second operand of a logical instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicRhs {
    Register,
    /// Zero-extended 16-bit immediate.
    Immediate,
    /// 16-bit immediate in the upper halfword.
    ShiftedImmediate,
}

/// Rotate instructions and their simplified mnemonics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotateForm {
    Rlwinm,
    Rlwnm,
    Rlwimi,
    Rotlw,
    Extlwi,
    Extrwi,
    Rotlwi,
    Rotrwi,
    Slwi,
    Srwi,
    Clrlwi,
    Clrrwi,
    Clrlslwi,
    Inslwi,
    Insrwi,
}

impl RotateForm {
    const fn is_insert(self) -> bool {
        matches!(self, Self::Rlwimi | Self::Inslwi | Self::Insrwi)
    }

    /// `(SH, MB, ME)` of a simplified mnemonic with immediates `n` and `b`.
    ///
    /// For `clrlslwi` the operands are `b, n`; callers pass them in order.
    const fn simplified_fields(self, n: i64, b: i64) -> Option<(i64, i64, i64)> {
        match self {
            Self::Extlwi => Some((b, 0, n - 1)),
            Self::Extrwi => Some((b + n, 32 - n, 31)),
            Self::Rotlwi => Some((n, 0, 31)),
            Self::Rotrwi => Some((32 - n, 0, 31)),
            Self::Slwi => Some((n, 0, 31 - n)),
            Self::Srwi => Some((32 - n, n, 31)),
            Self::Clrlwi => Some((0, n, 31)),
            Self::Clrrwi => Some((0, 0, 31 - n)),
            Self::Clrlslwi => Some((b, n - b, 31 - b)),
            Self::Inslwi => Some((32 - b, b, b + n - 1)),
            Self::Insrwi => Some((32 - (b + n), b, b + n - 1)),
            Self::Rlwinm | Self::Rlwnm | Self::Rlwimi | Self::Rotlw => None,
        }
    }

    /// Number of immediates a simplified mnemonic takes.
    const fn immediate_count(self) -> usize {
        match self {
            Self::Extlwi | Self::Extrwi | Self::Clrlslwi | Self::Inslwi | Self::Insrwi => 2,
            _ => 1,
        }
    }
}

pub fn logic(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    op: LogicOp,
    rhs: LogicRhs,
    set_cr: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let a = gpr_operand(instr, 1)?;
    let rhs = match rhs {
        LogicRhs::Register => gpr_operand(instr, 2)?,
        LogicRhs::Immediate => dw_lit(zero_extend_16(instr.imm(2)?)),
        LogicRhs::ShiftedImmediate => dw_lit(shifted_16(instr.imm(2)?)),
    };
    generate_logic(b, env, op, set_cr, &a, &rhs, &dst);
    Ok(())
}

/// `not rA,rS` is `nor rA,rS,rS`.
pub fn not(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    set_cr: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let src = gpr_operand(instr, 1)?;
    generate_logic(b, env, LogicOp::Nor, set_cr, &src, &src, &dst);
    Ok(())
}

/// `mr rA,rS`.
pub fn move_register(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    set_cr: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let src = gpr_operand(instr, 1)?;
    generate_move(b, env, set_cr, &src, &dst);
    Ok(())
}

/// `li rD,SI` and `lis rD,SI`.
pub fn load_immediate(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    shifted: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let value = instr.imm(1)?;
    let value = if shifted {
        shifted_16(value)
    } else {
        sign_extend_16(value)
    };
    generate_move(b, env, false, &dw_lit(value), &dst);
    Ok(())
}

pub fn sign_extend(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    bits: u8,
    set_cr: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let src = gpr_operand(instr, 1)?;
    generate_sign_extend(b, env, u32::from(bits), set_cr, &src, &dst);
    Ok(())
}

pub fn count_leading_zeros(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    set_cr: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let src = gpr_operand(instr, 1)?;
    generate_cntlzw(b, env, set_cr, &src, &dst);
    Ok(())
}

/// Check a rotate field and reduce it to `0..32`.
fn bit_field(instr: &NativeInstruction, name: &str, value: i64, max: i64) -> Result<u8> {
    if (0..=max).contains(&value) {
        Ok((value % 32) as u8)
    } else {
        Err(instr.invalid_form(format!("{name} {value} out of range")))
    }
}

/// Mask from `MB, ME` operands at `index`, or a literal mask in the
/// four-operand form.
fn mask_operands(instr: &NativeInstruction, index: usize) -> Result<u32> {
    if instr.operands.len() == index + 1 {
        return instr.imm_u32(index);
    }
    let mb = bit_field(instr, "MB", instr.imm(index)?, 31)?;
    let me = bit_field(instr, "ME", instr.imm(index + 1)?, 31)?;
    Ok(rotate_mask(mb, me))
}

pub fn rotate(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    form: RotateForm,
    set_cr: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let src = gpr_operand(instr, 1)?;

    let (amount, mask) = match form {
        RotateForm::Rlwinm | RotateForm::Rlwimi => {
            let sh = bit_field(instr, "SH", instr.imm(2)?, 31)?;
            (RotateAmount::Immediate(sh), mask_operands(instr, 3)?)
        }
        RotateForm::Rlwnm => (
            RotateAmount::Register(gpr_operand(instr, 2)?),
            mask_operands(instr, 3)?,
        ),
        RotateForm::Rotlw => (RotateAmount::Register(gpr_operand(instr, 2)?), u32::MAX),
        _ => {
            let n = instr.imm(2)?;
            let second = if form.immediate_count() == 2 {
                instr.imm(3)?
            } else {
                0
            };
            let (sh, mb, me) = form
                .simplified_fields(n, second)
                .ok_or_else(|| instr.invalid_form("not a simplified rotate"))?;
            let sh = bit_field(instr, "SH", sh, 32)?;
            let mb = bit_field(instr, "MB", mb, 31)?;
            let me = bit_field(instr, "ME", me, 31)?;
            (RotateAmount::Immediate(sh), rotate_mask(mb, me))
        }
    };

    generate_rotate(
        b,
        env,
        set_cr,
        &src,
        &amount,
        mask,
        form.is_insert(),
        &dst,
    );
    Ok(())
}

pub fn shift(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    kind: ShiftKind,
    immediate: bool,
    set_cr: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let src = gpr_operand(instr, 1)?;
    let amount = if immediate {
        dw_lit(u32::from(instr.imm_below(2, 32)?))
    } else {
        gpr_operand(instr, 2)?
    };
    generate_shift(b, env, kind, set_cr, &src, &amount, &dst);
    Ok(())
}
