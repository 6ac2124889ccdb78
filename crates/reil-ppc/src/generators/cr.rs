//! Condition-register transfers and CR logical operations.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{byte, byte_lit, dw, dw_lit, pack_bits, shift_by};
use crate::env::TranslationEnvironment;
use crate::helpers::{cr_bit_name, cr_field_bit_names, crm_expand};
use crate::types::{XER_CA, XER_OV, XER_SO};

/// Boolean operation on two condition-register bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrLogicOp {
    And,
    AndComplement,
    Equivalent,
    Nand,
    Nor,
    Or,
    OrComplement,
    Xor,
}

/// `CR[d] = CR[a] <op> CR[b]`.
pub fn generate_cr_logic(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    op: CrLogicOp,
    d: u8,
    a: u8,
    rhs: u8,
) {
    let (a, rhs, d) = (byte(cr_bit_name(a)), byte(cr_bit_name(rhs)), byte(cr_bit_name(d)));
    match op {
        CrLogicOp::And => b.and(a, rhs, d),
        CrLogicOp::Or => b.or(a, rhs, d),
        CrLogicOp::Xor => b.xor(a, rhs, d),
        CrLogicOp::AndComplement | CrLogicOp::OrComplement => {
            let inverted = env.next_temp();
            b.bisz(rhs, byte(&inverted));
            if op == CrLogicOp::AndComplement {
                b.and(a, byte(&inverted), d);
            } else {
                b.or(a, byte(&inverted), d);
            }
        }
        CrLogicOp::Equivalent | CrLogicOp::Nand | CrLogicOp::Nor => {
            let inner = env.next_temp();
            match op {
                CrLogicOp::Equivalent => b.xor(a, rhs, byte(&inner)),
                CrLogicOp::Nand => b.and(a, rhs, byte(&inner)),
                _ => b.or(a, rhs, byte(&inner)),
            }
            b.bisz(byte(&inner), d);
        }
    }
}

/// `crset`/`crclr`.
pub fn generate_cr_set(b: &mut ReilBuilder, d: u8, value: bool) {
    b.str(byte_lit(u8::from(value)), byte(cr_bit_name(d)));
}

/// `crmove`, or `crnot` when `invert` is set.
pub fn generate_cr_move(b: &mut ReilBuilder, d: u8, s: u8, invert: bool) {
    let (s, d) = (byte(cr_bit_name(s)), byte(cr_bit_name(d)));
    if invert {
        b.bisz(s, d);
    } else {
        b.str(s, d);
    }
}

/// `mcrf`: copy field `src` into field `dst`.
pub fn generate_mcrf(b: &mut ReilBuilder, dst: u8, src: u8) {
    for (to, from) in cr_field_bit_names(dst)
        .into_iter()
        .zip(cr_field_bit_names(src))
    {
        b.str(byte(from), byte(to));
    }
}

/// Assemble the 32-bit CR word from its bits; CR bit 0 is the MSB.
pub fn compose_cr(b: &mut ReilBuilder, env: &mut TranslationEnvironment) -> String {
    pack_bits(
        b,
        env,
        (cr_bit_name(0), 31),
        (1..32u8).map(|bit| (cr_bit_name(bit), i64::from(31 - bit))),
    )
}

/// Write every CR bit from a 32-bit word.
pub fn split_cr(b: &mut ReilBuilder, env: &mut TranslationEnvironment, word: &ReilOperand) {
    for bit in 0..32u8 {
        let shifted = env.next_temp();
        b.bsh(
            word.clone(),
            shift_by(OperandSize::Dword, -i64::from(31 - bit)),
            dw(&shifted),
        );
        b.and(dw(&shifted), dw_lit(1), byte(cr_bit_name(bit)));
    }
}

/// `(old & !mask) | (new & mask)` into a fresh temporary.
fn blend(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    old: ReilOperand,
    new: ReilOperand,
    mask: u32,
) -> String {
    let kept = env.next_temp();
    let taken = env.next_temp();
    let blended = env.next_temp();
    b.and(old, dw_lit(!mask), dw(&kept));
    b.and(new, dw_lit(mask), dw(&taken));
    b.or(dw(&kept), dw(&taken), dw(&blended));
    blended
}

/// `mtcrf`/`mtocrf`: fields selected by `fxm` take the matching bits of `src`.
pub fn generate_mtcrf(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    fxm: u8,
    src: &ReilOperand,
) {
    let old = compose_cr(b, env);
    let blended = blend(b, env, dw(&old), src.clone(), crm_expand(fxm));
    split_cr(b, env, &dw(&blended));
}

/// `mfcr`: copy the whole CR into `dst`.
pub fn generate_mfcr(b: &mut ReilBuilder, env: &mut TranslationEnvironment, dst: &str) {
    let cr = compose_cr(b, env);
    b.str(dw(&cr), dw(dst));
}

/// `mfocrf`: copy the fields selected by `fxm` into `dst`, keeping its other bits.
pub fn generate_mfocrf(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    fxm: u8,
    dst: &str,
) {
    let cr = compose_cr(b, env);
    let blended = blend(b, env, dw(dst), dw(&cr), crm_expand(fxm));
    b.str(dw(&blended), dw(dst));
}

/// `mcrxr`: move SO, OV and CA into CR field `field`, then clear them in XER.
pub fn generate_mcrxr(b: &mut ReilBuilder, field: u8) {
    let [lt, gt, eq, so] = cr_field_bit_names(field);
    b.str(byte(XER_SO), byte(lt));
    b.str(byte(XER_OV), byte(gt));
    b.str(byte(XER_CA), byte(eq));
    b.str(byte_lit(0), byte(so));
    for flag in [XER_SO, XER_OV, XER_CA] {
        b.str(byte_lit(0), byte(flag));
    }
}
