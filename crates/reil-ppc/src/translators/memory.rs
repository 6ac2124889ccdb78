//! Load and store translators.

use reil_ir::{OperandSize, ReilBuilder};

use super::gpr_operand;
use crate::env::TranslationEnvironment;
use crate::error::Result;
use crate::generators::{
    dw, dw_lit, effective_address, generate_load, generate_load_multiple, generate_load_string,
    generate_store, generate_store_conditional_status, generate_store_multiple,
    generate_store_string, generate_zero_block,
};
use crate::instr::NativeInstruction;
use crate::types::gpr;

/// Addressing and width of a single load or store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemoryForm {
    pub size: OperandSize,
    /// Sign-extend the loaded halfword (`lha`).
    pub algebraic: bool,
    /// Byte-reversed access (`lwbrx`, `sthbrx`, ...).
    pub reversed: bool,
    /// Write the effective address back to `rA`.
    pub update: bool,
    /// `rA, rB` operands instead of `d(rA)`.
    pub indexed: bool,
}

impl MemoryForm {
    pub const fn new(size: OperandSize) -> Self {
        Self {
            size,
            algebraic: false,
            reversed: false,
            update: false,
            indexed: false,
        }
    }

    #[must_use]
    pub const fn algebraic(mut self) -> Self {
        self.algebraic = true;
        self
    }

    #[must_use]
    pub const fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    #[must_use]
    pub const fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    #[must_use]
    pub const fn with_indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }
}

/// Effective address from operand 1 (`d(rA)`) or operands 1 and 2 (`rA, rB`).
///
/// Returns the temporary holding the address and the base register number.
fn address_operands(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    indexed: bool,
) -> Result<(String, u8)> {
    if indexed {
        let base = instr.gpr(1)?;
        let index = gpr_operand(instr, 2)?;
        Ok((effective_address(b, env, base, &index), base))
    } else {
        let (base, displacement) = instr.memory(1)?;
        let index = dw_lit(displacement as u32);
        Ok((effective_address(b, env, base, &index), base))
    }
}

fn write_back(b: &mut ReilBuilder, ea: &str, base: u8) {
    b.str(dw(ea), dw(&gpr(base)));
}

pub fn load(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    form: MemoryForm,
) -> Result<()> {
    let target = instr.gpr(0)?;
    if form.update {
        let base = if form.indexed {
            instr.gpr(1)?
        } else {
            instr.memory(1)?.0
        };
        if base == 0 || base == target {
            return Err(instr.invalid_form("update form requires rA != 0 and rA != rD"));
        }
    }
    let (ea, base) = address_operands(b, env, instr, form.indexed)?;
    generate_load(
        b,
        env,
        &ea,
        &gpr(target),
        form.size,
        form.algebraic,
        form.reversed,
    );
    if form.update {
        write_back(b, &ea, base);
    }
    Ok(())
}

pub fn store(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    form: MemoryForm,
) -> Result<()> {
    let src = gpr_operand(instr, 0)?;
    let (ea, base) = address_operands(b, env, instr, form.indexed)?;
    if form.update && base == 0 {
        return Err(instr.invalid_form("update form requires rA != 0"));
    }
    generate_store(b, env, &ea, &src, form.size, form.reversed);
    if form.update {
        write_back(b, &ea, base);
    }
    Ok(())
}

/// `stwcx.`: the reservation always holds.
pub fn store_conditional(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
) -> Result<()> {
    store(
        b,
        env,
        instr,
        MemoryForm::new(OperandSize::Dword).with_indexed(true),
    )?;
    generate_store_conditional_status(b);
    Ok(())
}

pub fn load_multiple(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
) -> Result<()> {
    let first = instr.gpr(0)?;
    let (ea, _) = address_operands(b, env, instr, false)?;
    generate_load_multiple(b, env, &ea, first);
    Ok(())
}

pub fn store_multiple(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
) -> Result<()> {
    let first = instr.gpr(0)?;
    let (ea, _) = address_operands(b, env, instr, false)?;
    generate_store_multiple(b, env, &ea, first);
    Ok(())
}

/// `NB` operand of the string forms; zero means 32 bytes.
fn string_length(instr: &NativeInstruction) -> Result<u32> {
    match instr.imm_below(2, 32)? {
        0 => Ok(32),
        n => Ok(u32::from(n)),
    }
}

/// Effective address of the string forms: `rA`, or zero for `r0`.
fn string_address(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
) -> Result<String> {
    let base = instr.gpr(1)?;
    Ok(effective_address(b, env, base, &dw_lit(0)))
}

pub fn load_string(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
) -> Result<()> {
    let first = instr.gpr(0)?;
    let count = string_length(instr)?;
    let ea = string_address(b, env, instr)?;
    generate_load_string(b, env, &ea, first, count);
    Ok(())
}

pub fn store_string(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
) -> Result<()> {
    let first = instr.gpr(0)?;
    let count = string_length(instr)?;
    let ea = string_address(b, env, instr)?;
    generate_store_string(b, env, &ea, first, count);
    Ok(())
}

/// `dcbz rA,rB`.
pub fn zero_block(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
) -> Result<()> {
    let base = instr.gpr(0)?;
    let index = gpr_operand(instr, 1)?;
    let ea = effective_address(b, env, base, &index);
    generate_zero_block(b, env, &ea);
    Ok(())
}
