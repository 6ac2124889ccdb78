//! Division.
//!
//! The quotient is undefined for a zero divisor and, for signed division,
//! for `0x80000000 / -1`. Both cases jump over the `DIV` so it never faults;
//! the destination keeps its previous value.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{
    ArithFlags, apply_sign, byte, dw, dw_lit, magnitude, set_overflow_from, update_cr_field,
};
use crate::env::TranslationEnvironment;

/// `dst = dividend / divisor`.
pub fn generate_div(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    flags: ArithFlags,
    signed: bool,
    dividend: &ReilOperand,
    divisor: &ReilOperand,
    dst: &str,
) {
    let by_zero = env.next_temp();
    b.bisz(divisor.clone(), byte(&by_zero));

    let skip = if signed {
        let minus_one_diff = env.next_temp();
        let is_minus_one = env.next_temp();
        let min_diff = env.next_temp();
        let is_min = env.next_temp();
        let min_by_minus_one = env.next_temp();
        let skip = env.next_temp();
        b.xor(divisor.clone(), dw_lit(u32::MAX), dw(&minus_one_diff));
        b.bisz(dw(&minus_one_diff), byte(&is_minus_one));
        b.xor(dividend.clone(), dw_lit(0x8000_0000), dw(&min_diff));
        b.bisz(dw(&min_diff), byte(&is_min));
        b.and(byte(&is_minus_one), byte(&is_min), byte(&min_by_minus_one));
        b.or(byte(&by_zero), byte(&min_by_minus_one), byte(&skip));
        skip
    } else {
        by_zero
    };

    let escape = b.jcc_forward(byte(&skip));

    if signed {
        let (sign_a, abs_a) = magnitude(b, env, dividend);
        let (sign_b, abs_b) = magnitude(b, env, divisor);
        let unsigned = env.next_temp();
        let sign = env.next_temp();
        b.div(dw(&abs_a), dw(&abs_b), dw(&unsigned));
        b.xor(dw(&sign_a), dw(&sign_b), dw(&sign));
        let quotient = apply_sign(b, env, &dw(&unsigned), &sign, OperandSize::Dword);
        b.str(dw(&quotient), dw(dst));
    } else {
        let quotient = env.next_temp();
        b.div(dividend.clone(), divisor.clone(), dw(&quotient));
        b.str(dw(&quotient), dw(dst));
    }

    let after = b.next_address();
    b.patch_jump(escape, after);

    if flags.set_overflow {
        set_overflow_from(b, byte(&skip));
    }
    if flags.set_cr {
        update_cr_field(b, env, 0, &dw(dst));
    }
}
