//! Multiplication.
//!
//! The REIL `MUL` is unsigned. Signed products multiply magnitudes and then
//! re-apply the sign with a complement-and-increment selected by the sign bit.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{
    ArithFlags, MASK_32, byte, dw, dw_lit, qw, qw_lit, reg, set_overflow_from, shift_by,
    update_cr_field,
};
use crate::env::TranslationEnvironment;

/// Which half of the 64-bit product is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MulHalf {
    Low,
    High,
}

/// Sign bit (0 or 1) and magnitude of a 32-bit value.
///
/// `|x| = (x ^ m) + s` where `s` is the sign bit and `m = 0 - s`.
pub fn magnitude(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    value: &ReilOperand,
) -> (String, String) {
    let sign = env.next_temp();
    b.bsh(value.clone(), shift_by(OperandSize::Dword, -31), dw(&sign));
    let abs = apply_sign(b, env, value, &sign, OperandSize::Dword);
    (sign, abs)
}

/// Negate `value` when `sign` is 1, in `size` bits: `(v ^ (0 - s)) + s`.
pub fn apply_sign(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    value: &ReilOperand,
    sign: &str,
    size: OperandSize,
) -> String {
    let selector = env.next_temp();
    let flipped = env.next_temp();
    let result = env.next_temp();
    b.sub(ReilOperand::literal(size, 0), dw(sign), reg(size, &selector));
    b.xor(value.clone(), reg(size, &selector), reg(size, &flipped));
    b.add(reg(size, &flipped), dw(sign), reg(size, &result));
    result
}

/// `dst` = one half of `a * rhs`.
///
/// With `set_overflow`, XEROV is set when the discarded high half is not the
/// extension of the low half (sign extension for signed products, zero for
/// unsigned).
#[allow(clippy::too_many_arguments)]
pub fn generate_mul(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    flags: ArithFlags,
    signed: bool,
    half: MulHalf,
    a: &ReilOperand,
    rhs: &ReilOperand,
    dst: &str,
) {
    let product = if signed {
        let (sign_a, abs_a) = magnitude(b, env, a);
        let (sign_b, abs_b) = magnitude(b, env, rhs);
        let unsigned = env.next_temp();
        b.mul(dw(&abs_a), dw(&abs_b), qw(&unsigned));
        let sign = env.next_temp();
        b.xor(dw(&sign_a), dw(&sign_b), dw(&sign));
        apply_sign(b, env, &qw(&unsigned), &sign, OperandSize::Qword)
    } else {
        let unsigned = env.next_temp();
        b.mul(a.clone(), rhs.clone(), qw(&unsigned));
        unsigned
    };

    let low = env.next_temp();
    let high = env.next_temp();
    b.and(qw(&product), qw_lit(MASK_32), dw(&low));
    b.bsh(qw(&product), shift_by(OperandSize::Qword, -32), dw(&high));

    if flags.set_overflow && half == MulHalf::Low {
        let expected_high = if signed {
            let low_sign = env.next_temp();
            let fill = env.next_temp();
            b.bsh(dw(&low), shift_by(OperandSize::Dword, -31), dw(&low_sign));
            b.sub(dw_lit(0), dw(&low_sign), dw(&fill));
            dw(&fill)
        } else {
            dw_lit(0)
        };
        let mismatch = env.next_temp();
        let fits = env.next_temp();
        let overflow = env.next_temp();
        b.xor(dw(&high), expected_high, dw(&mismatch));
        b.bisz(dw(&mismatch), byte(&fits));
        b.bisz(byte(&fits), byte(&overflow));
        set_overflow_from(b, byte(&overflow));
    }

    let result = match half {
        MulHalf::Low => low,
        MulHalf::High => high,
    };
    b.str(dw(&result), dw(dst));

    if flags.set_cr {
        update_cr_field(b, env, 0, &dw(&result));
    }
}
