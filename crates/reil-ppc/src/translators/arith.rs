//! Arithmetic translators: add/subtract, negate, compare, multiply, divide.

use reil_ir::ReilBuilder;

use super::{gpr_name, gpr_operand};
use crate::env::TranslationEnvironment;
use crate::error::Result;
use crate::generators::{
    ArithFlags, CarryIn, MulHalf, dw, dw_lit, generate_add, generate_compare, generate_div,
    generate_mul, generate_neg, generate_subtract_from,
};
use crate::helpers::{shifted_16, sign_extend_16, zero_extend_16};
use crate::instr::NativeInstruction;
use crate::types::gpr;

/// First addend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddBase {
    /// `rA`
    Register,
    /// `rA`, or literal zero when `rA` is `r0` (`addi`, `addis`).
    RegisterOrZero,
}

/// Second addend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddRhs {
    Register,
    /// Sign-extended 16-bit immediate.
    Immediate,
    /// 16-bit immediate shifted left by 16.
    ShiftedImmediate,
    /// Negated immediate (`subi`, `subic`).
    NegatedImmediate,
    /// Negated shifted immediate (`subis`).
    NegatedShiftedImmediate,
    /// `0xFFFFFFFF` (`addme`, `subfme`).
    MinusOne,
    /// Zero (`addze`, `subfze`).
    Zero,
}

/// Shape of an add-family instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AddForm {
    pub base: AddBase,
    pub rhs: AddRhs,
    pub carry_in: CarryIn,
    /// Subtract-from: the base is complemented, `~rA + rhs + carry`.
    pub complement_base: bool,
    /// `sub rD,rA,rB` is `subf rD,rB,rA`.
    pub swap_sources: bool,
}

impl AddForm {
    pub const fn new(base: AddBase, rhs: AddRhs, carry_in: CarryIn) -> Self {
        Self {
            base,
            rhs,
            carry_in,
            complement_base: false,
            swap_sources: false,
        }
    }

    #[must_use]
    pub const fn subtract(mut self) -> Self {
        self.complement_base = true;
        self
    }

    #[must_use]
    pub const fn swapped(mut self) -> Self {
        self.swap_sources = true;
        self
    }
}

pub fn add(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    form: AddForm,
    flags: ArithFlags,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let (base_index, rhs_index) = if form.swap_sources { (2, 1) } else { (1, 2) };

    let base = match form.base {
        AddBase::Register => gpr_operand(instr, base_index)?,
        AddBase::RegisterOrZero => match instr.gpr(base_index)? {
            0 => dw_lit(0),
            r => dw(&gpr(r)),
        },
    };

    let rhs = match form.rhs {
        AddRhs::Register => gpr_operand(instr, rhs_index)?,
        AddRhs::Immediate => dw_lit(sign_extend_16(instr.imm(rhs_index)?)),
        AddRhs::ShiftedImmediate => dw_lit(shifted_16(instr.imm(rhs_index)?)),
        AddRhs::NegatedImmediate => {
            dw_lit(sign_extend_16(instr.imm(rhs_index)?).wrapping_neg())
        }
        AddRhs::NegatedShiftedImmediate => {
            dw_lit(shifted_16(instr.imm(rhs_index)?).wrapping_neg())
        }
        AddRhs::MinusOne => dw_lit(u32::MAX),
        AddRhs::Zero => dw_lit(0),
    };

    if form.complement_base {
        generate_subtract_from(b, env, flags, form.carry_in, &base, &rhs, &dst);
    } else {
        generate_add(b, env, flags, form.carry_in, &base, &rhs, &dst);
    }
    Ok(())
}

pub fn negate(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    flags: ArithFlags,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let src = gpr_operand(instr, 1)?;
    generate_neg(b, env, flags, &src, &dst);
    Ok(())
}

/// `cmpw rA,rB`, `cmpw crD,rA,rB` and `cmp crD,L,rA,rB`.
pub fn compare(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    signed: bool,
    immediate: bool,
) -> Result<()> {
    let (field, first) = match instr.operands.len() {
        0..=2 => (0, 0),
        3 => (instr.cr_field(0)?, 1),
        _ => {
            if instr.imm(1)? != 0 {
                return Err(instr.invalid_form("doubleword comparison is not supported"));
            }
            (instr.cr_field(0)?, 2)
        }
    };

    let a = gpr_operand(instr, first)?;
    let rhs = if immediate {
        let value = instr.imm(first + 1)?;
        if signed {
            dw_lit(sign_extend_16(value))
        } else {
            dw_lit(zero_extend_16(value))
        }
    } else {
        gpr_operand(instr, first + 1)?
    };

    generate_compare(b, env, field, &a, &rhs, signed);
    Ok(())
}

pub fn multiply(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    signed: bool,
    half: MulHalf,
    immediate: bool,
    flags: ArithFlags,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let a = gpr_operand(instr, 1)?;
    let rhs = if immediate {
        dw_lit(sign_extend_16(instr.imm(2)?))
    } else {
        gpr_operand(instr, 2)?
    };
    generate_mul(b, env, flags, signed, half, &a, &rhs, &dst);
    Ok(())
}

pub fn divide(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    signed: bool,
    flags: ArithFlags,
) -> Result<()> {
    let dst = gpr_name(instr, 0)?;
    let dividend = gpr_operand(instr, 1)?;
    let divisor = gpr_operand(instr, 2)?;
    generate_div(b, env, flags, signed, &dividend, &divisor, &dst);
    Ok(())
}
