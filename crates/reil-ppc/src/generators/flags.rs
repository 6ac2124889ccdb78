//! Condition-register and XER flag updates shared by the arithmetic families.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{byte, dw, shift_by};
use crate::env::TranslationEnvironment;
use crate::helpers::cr_field_bit_names;
use crate::types::{XER_OV, XER_SO};

/// Set LT, GT, EQ and SO of `field` from a signed result.
///
/// EQ is `result == 0`, LT the sign bit, GT `!(EQ | LT)`, SO a copy of XERSO.
pub fn update_cr_field(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    field: u8,
    result: &ReilOperand,
) {
    let [lt, gt, eq, so] = cr_field_bit_names(field);
    let sign_shift = -i64::from(result.size.bits() - 1);

    b.bisz(result.clone(), byte(eq));
    b.bsh(result.clone(), shift_by(result.size, sign_shift), byte(lt));
    let lt_or_eq = env.next_temp();
    b.or(byte(eq), byte(lt), byte(&lt_or_eq));
    b.bisz(byte(&lt_or_eq), byte(gt));
    b.str(byte(XER_SO), byte(so));
}

/// Extract the most significant bit of a value into a fresh byte temporary.
pub fn msb(b: &mut ReilBuilder, env: &mut TranslationEnvironment, value: &ReilOperand) -> String {
    let bit = env.next_temp();
    let amount = -i64::from(value.size.bits() - 1);
    b.bsh(value.clone(), shift_by(value.size, amount), byte(&bit));
    bit
}

/// OR one-bit flags into a 32-bit word, each shifted left to its position.
///
/// Starts from `first`, so the result always names an emitted temporary.
pub fn pack_bits<'a>(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    first: (&str, i64),
    rest: impl IntoIterator<Item = (&'a str, i64)>,
) -> String {
    fn place(
        b: &mut ReilBuilder,
        env: &mut TranslationEnvironment,
        (flag, position): (&str, i64),
    ) -> String {
        let placed = env.next_temp();
        b.bsh(byte(flag), shift_by(OperandSize::Dword, position), dw(&placed));
        placed
    }

    let mut word = place(b, env, first);
    for bit in rest {
        let placed = place(b, env, bit);
        let merged = env.next_temp();
        b.or(dw(&word), dw(&placed), dw(&merged));
        word = merged;
    }
    word
}

/// Fold XEROV into the sticky XERSO.
pub fn update_summary_overflow(b: &mut ReilBuilder) {
    b.or(byte(XER_SO), byte(XER_OV), byte(XER_SO));
}

/// Signed overflow of `a + addend = result`.
///
/// Sets XEROV to `(msb(a) ^ msb(r)) & (msb(addend) ^ msb(r))` and updates XERSO.
pub fn update_add_overflow(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    a: &ReilOperand,
    addend: &ReilOperand,
    result: &ReilOperand,
) {
    let msb_a = msb(b, env, a);
    let msb_b = msb(b, env, addend);
    let msb_r = msb(b, env, result);
    let a_flip = env.next_temp();
    let b_flip = env.next_temp();
    b.xor(byte(&msb_a), byte(&msb_r), byte(&a_flip));
    b.xor(byte(&msb_b), byte(&msb_r), byte(&b_flip));
    b.and(byte(&a_flip), byte(&b_flip), byte(XER_OV));
    update_summary_overflow(b);
}

/// Set XEROV from a ready-made boolean and update XERSO.
pub fn set_overflow_from(b: &mut ReilBuilder, overflow: ReilOperand) {
    b.str(overflow, byte(XER_OV));
    update_summary_overflow(b);
}
