//! Word shifts (`slw`, `srw`, `sraw`, `srawi`).
//!
//! Shift amounts use six bits, so amounts from 32 to 63 shift everything out.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{MASK_32, byte, dw, dw_lit, qw, qw_lit, shift_by, update_cr_field};
use crate::env::TranslationEnvironment;
use crate::types::XER_CA;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShiftKind {
    Left,
    Right,
    /// Arithmetic right shift; also sets XERCA.
    Algebraic,
}

/// `dst = src <shift> amount`.
pub fn generate_shift(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    kind: ShiftKind,
    set_cr: bool,
    src: &ReilOperand,
    amount: &ReilOperand,
    dst: &str,
) {
    let n = env.next_temp();
    b.and(amount.clone(), dw_lit(0x3F), dw(&n));

    let result = env.next_temp();
    match kind {
        ShiftKind::Left => {
            let wide = env.next_temp();
            b.bsh(src.clone(), dw(&n), qw(&wide));
            b.and(qw(&wide), qw_lit(MASK_32), dw(&result));
        }
        ShiftKind::Right => {
            let negated = env.next_temp();
            b.sub(dw_lit(0), dw(&n), dw(&negated));
            b.bsh(src.clone(), dw(&negated), dw(&result));
        }
        ShiftKind::Algebraic => shift_algebraic(b, env, src, &n, &result),
    }

    b.str(dw(&result), dw(dst));
    if set_cr {
        update_cr_field(b, env, 0, &dw(&result));
    }
}

/// Arithmetic right shift of `src` by the six-bit count in `n`.
///
/// The count is clamped to 32 and the value shifted as its 64-bit sign
/// extension. XERCA is set when `src` is negative and any one bits were
/// shifted out.
fn shift_algebraic(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    src: &ReilOperand,
    n: &str,
    result: &str,
) {
    let sign = env.next_temp();
    let fill = env.next_temp();
    b.bsh(src.clone(), shift_by(OperandSize::Dword, -31), dw(&sign));
    b.sub(dw_lit(0), dw(&sign), dw(&fill));

    // clamped = n >= 32 ? 32 : n
    let large = env.next_temp();
    let large_mask = env.next_temp();
    let small_mask = env.next_temp();
    let small_part = env.next_temp();
    let large_part = env.next_temp();
    let clamped = env.next_temp();
    b.bsh(dw(n), shift_by(OperandSize::Dword, -5), dw(&large));
    b.sub(dw_lit(0), dw(&large), dw(&large_mask));
    b.xor(dw(&large_mask), dw_lit(u32::MAX), dw(&small_mask));
    b.and(dw(n), dw(&small_mask), dw(&small_part));
    b.and(dw_lit(32), dw(&large_mask), dw(&large_part));
    b.or(dw(&small_part), dw(&large_part), dw(&clamped));

    let high = env.next_temp();
    let extended = env.next_temp();
    let negated = env.next_temp();
    let shifted = env.next_temp();
    b.bsh(dw(&fill), shift_by(OperandSize::Dword, 32), qw(&high));
    b.or(qw(&high), src.clone(), qw(&extended));
    b.sub(qw_lit(0), dw(&clamped), qw(&negated));
    b.bsh(qw(&extended), qw(&negated), qw(&shifted));
    b.and(qw(&shifted), qw_lit(MASK_32), dw(result));

    let one_shifted = env.next_temp();
    let lost_mask = env.next_temp();
    let lost = env.next_temp();
    let nothing_lost = env.next_temp();
    let something_lost = env.next_temp();
    b.bsh(qw_lit(1), dw(&clamped), qw(&one_shifted));
    b.sub(qw(&one_shifted), qw_lit(1), qw(&lost_mask));
    b.and(src.clone(), qw(&lost_mask), dw(&lost));
    b.bisz(dw(&lost), byte(&nothing_lost));
    b.bisz(byte(&nothing_lost), byte(&something_lost));
    b.and(dw(&sign), byte(&something_lost), byte(XER_CA));
}
