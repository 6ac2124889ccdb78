//! Addition, subtraction and negation.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{
    ArithFlags, MASK_32, byte, dw, dw_lit, qw, qw_lit, set_overflow_from, shift_by,
    update_add_overflow, update_cr_field,
};
use crate::env::TranslationEnvironment;
use crate::types::XER_CA;

/// Extra term added to the sum before truncation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarryIn {
    None,
    /// Extended forms add XERCA.
    Flag,
    /// Subtract-from forms add 1 to complete `~a + b + 1`.
    One,
}

/// `dst = a + addend (+ carry-in)` with optional CA, OV and CR0 updates.
///
/// The sum is formed in 64 bits so the carry out of bit 31 survives. All
/// flags are derived from a temporary before `dst` is written, so `dst` may
/// alias either source.
pub fn generate_add(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    flags: ArithFlags,
    carry_in: CarryIn,
    a: &ReilOperand,
    addend: &ReilOperand,
    dst: &str,
) {
    let sum = env.next_temp();
    b.add(a.clone(), addend.clone(), qw(&sum));

    let sum = match carry_in {
        CarryIn::None => sum,
        CarryIn::Flag => {
            let extended = env.next_temp();
            b.add(qw(&sum), byte(XER_CA), qw(&extended));
            extended
        }
        CarryIn::One => {
            let extended = env.next_temp();
            b.add(qw(&sum), qw_lit(1), qw(&extended));
            extended
        }
    };

    let result = env.next_temp();
    b.and(qw(&sum), qw_lit(MASK_32), dw(&result));

    if flags.set_carry {
        b.bsh(qw(&sum), shift_by(OperandSize::Qword, -32), byte(XER_CA));
    }
    if flags.set_overflow {
        update_add_overflow(b, env, a, addend, &dw(&result));
    }

    b.str(dw(&result), dw(dst));

    if flags.set_cr {
        update_cr_field(b, env, 0, &dw(&result));
    }
}

/// One's complement into a fresh temporary.
pub fn complement(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    value: &ReilOperand,
) -> ReilOperand {
    let inverted = env.next_temp();
    b.xor(value.clone(), dw_lit(u32::MAX), dw(&inverted));
    dw(&inverted)
}

/// `dst = ~a + b + carry-in`, the subtract-from family.
pub fn generate_subtract_from(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    flags: ArithFlags,
    carry_in: CarryIn,
    a: &ReilOperand,
    minuend: &ReilOperand,
    dst: &str,
) {
    let inverted = complement(b, env, a);
    generate_add(b, env, flags, carry_in, &inverted, minuend, dst);
}

/// `dst = -src`; overflows only for `0x80000000`.
pub fn generate_neg(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    flags: ArithFlags,
    src: &ReilOperand,
    dst: &str,
) {
    let inverted = complement(b, env, src);
    let sum = env.next_temp();
    let result = env.next_temp();
    b.add(inverted, dw_lit(1), qw(&sum));
    b.and(qw(&sum), qw_lit(MASK_32), dw(&result));

    if flags.set_overflow {
        let distance = env.next_temp();
        let is_min = env.next_temp();
        b.xor(dw(&result), dw_lit(0x8000_0000), dw(&distance));
        b.bisz(dw(&distance), byte(&is_min));
        set_overflow_from(b, byte(&is_min));
    }

    b.str(dw(&result), dw(dst));

    if flags.set_cr {
        update_cr_field(b, env, 0, &dw(&result));
    }
}
