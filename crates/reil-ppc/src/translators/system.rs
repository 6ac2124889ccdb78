//! Condition-register, special-purpose and segment register translators.

use reil_ir::ReilBuilder;

use super::{gpr_name, gpr_operand};
use crate::env::TranslationEnvironment;
use crate::error::Result;
use crate::generators::{
    CrLogicOp, SpecialRegister, generate_cr_logic, generate_cr_move, generate_cr_set,
    generate_mcrf, generate_mcrxr, generate_mfcr, generate_mfocrf, generate_mfsr,
    generate_mfsrin, generate_move_from_spr, generate_move_to_spr, generate_mtcrf, generate_mtsr,
    generate_mtsrin, generate_rfi,
};
use crate::instr::NativeInstruction;
use crate::types::SEGMENT_REGISTERS;

/// Which special register an `mf`/`mt` mnemonic addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SprSource {
    /// Implied by the mnemonic (`mflr`, `mtctr`, `mftb`, ...).
    Fixed(SpecialRegister),
    /// SPR number operand (`mfspr`, `mtspr`).
    Numbered,
}

fn spr_number(instr: &NativeInstruction, index: usize) -> Result<SpecialRegister> {
    let number = instr.imm(index)?;
    u32::try_from(number)
        .ok()
        .filter(|&n| n < 1024)
        .map(SpecialRegister::from_number)
        .ok_or_else(|| instr.invalid_form(format!("SPR {number} out of range")))
}

pub fn cr_logic(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    op: CrLogicOp,
) -> Result<()> {
    let d = instr.cr_bit(0)?;
    let a = instr.cr_bit(1)?;
    let rhs = instr.cr_bit(2)?;
    generate_cr_logic(b, env, op, d, a, rhs);
    Ok(())
}

pub fn cr_set(b: &mut ReilBuilder, instr: &NativeInstruction, value: bool) -> Result<()> {
    generate_cr_set(b, instr.cr_bit(0)?, value);
    Ok(())
}

pub fn cr_move(b: &mut ReilBuilder, instr: &NativeInstruction, invert: bool) -> Result<()> {
    generate_cr_move(b, instr.cr_bit(0)?, instr.cr_bit(1)?, invert);
    Ok(())
}

/// `mcrf crD,crS`.
pub fn move_cr_field(b: &mut ReilBuilder, instr: &NativeInstruction) -> Result<()> {
    generate_mcrf(b, instr.cr_field(0)?, instr.cr_field(1)?);
    Ok(())
}

/// `mcrxr crD`.
pub fn move_xer_to_cr(b: &mut ReilBuilder, instr: &NativeInstruction) -> Result<()> {
    generate_mcrxr(b, instr.cr_field(0)?);
    Ok(())
}

/// `mtcr rS`, or `mtcrf FXM,rS` / `mtocrf FXM,rS`.
pub fn move_to_cr(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    all_fields: bool,
) -> Result<()> {
    let (fxm, src) = if all_fields {
        (0xFF, gpr_operand(instr, 0)?)
    } else {
        (instr.imm_below(0, 256)?, gpr_operand(instr, 1)?)
    };
    generate_mtcrf(b, env, fxm, &src);
    Ok(())
}

/// `mfcr rD`, or `mfocrf rD,FXM` when `partial`.
pub fn move_from_cr(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    partial: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    if partial {
        let fxm = instr.imm_below(1, 256)?;
        generate_mfocrf(b, env, fxm, &dst);
    } else {
        generate_mfcr(b, env, &dst);
    }
    Ok(())
}

/// `mfspr rD,SPR` and the fixed-register forms `mfXX rD`.
pub fn move_from_spr(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    source: SprSource,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let spr = match source {
        SprSource::Fixed(spr) => spr,
        SprSource::Numbered => spr_number(instr, 1)?,
    };
    generate_move_from_spr(b, env, spr, &dst);
    Ok(())
}

/// `mtspr SPR,rS` and the fixed-register forms `mtXX rS`.
pub fn move_to_spr(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    source: SprSource,
) -> Result<()> {
    let (spr, src) = match source {
        SprSource::Fixed(spr) => (spr, gpr_operand(instr, 0)?),
        SprSource::Numbered => (spr_number(instr, 0)?, gpr_operand(instr, 1)?),
    };
    generate_move_to_spr(b, env, spr, &src);
    Ok(())
}

/// `mfsr rD,SR`, or `mfsrin rD,rB` when `indirect`.
pub fn move_from_segment(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    indirect: bool,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    if indirect {
        generate_mfsrin(b, env, &gpr_operand(instr, 1)?, &dst);
    } else {
        generate_mfsr(b, instr.imm_below(1, i64::from(SEGMENT_REGISTERS))?, &dst);
    }
    Ok(())
}

/// `mtsr SR,rS`, or `mtsrin rS,rB` when `indirect`.
pub fn move_to_segment(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    indirect: bool,
) -> Result<()> {
    if indirect {
        let src = gpr_operand(instr, 0)?;
        generate_mtsrin(b, env, &gpr_operand(instr, 1)?, &src);
    } else {
        let sr = instr.imm_below(0, i64::from(SEGMENT_REGISTERS))?;
        generate_mtsr(b, sr, &gpr_operand(instr, 1)?);
    }
    Ok(())
}

/// `rfi`.
pub fn return_from_interrupt(b: &mut ReilBuilder, env: &mut TranslationEnvironment) -> Result<()> {
    generate_rfi(b, env);
    Ok(())
}
