//! Count leading zeros.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{dw, dw_lit, shift_by, update_cr_field};
use crate::env::TranslationEnvironment;

/// `dst = cntlzw(src)` without branches.
///
/// Smearing the highest set bit downwards and inverting leaves exactly the
/// leading zeros set; a population count of that word is the answer.
pub fn generate_cntlzw(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    set_cr: bool,
    src: &ReilOperand,
    dst: &str,
) {
    let mut smeared = src.clone();
    for amount in [1, 2, 4, 8, 16] {
        let shifted = env.next_temp();
        let folded = env.next_temp();
        b.bsh(smeared.clone(), shift_by(OperandSize::Dword, -amount), dw(&shifted));
        b.or(smeared, dw(&shifted), dw(&folded));
        smeared = dw(&folded);
    }
    let zeros = env.next_temp();
    b.xor(smeared, dw_lit(u32::MAX), dw(&zeros));

    let count = popcount(b, env, &zeros);
    b.str(dw(&count), dw(dst));
    if set_cr {
        update_cr_field(b, env, 0, &dw(&count));
    }
}

/// Population count of a 32-bit temporary.
fn popcount(b: &mut ReilBuilder, env: &mut TranslationEnvironment, value: &str) -> String {
    // v - ((v >> 1) & 0x55555555)
    let halves = env.next_temp();
    let odd = env.next_temp();
    let pairs = env.next_temp();
    b.bsh(dw(value), shift_by(OperandSize::Dword, -1), dw(&halves));
    b.and(dw(&halves), dw_lit(0x5555_5555), dw(&odd));
    b.sub(dw(value), dw(&odd), dw(&pairs));

    // (v & 0x33333333) + ((v >> 2) & 0x33333333)
    let low = env.next_temp();
    let shifted = env.next_temp();
    let high = env.next_temp();
    let nibbles = env.next_temp();
    b.and(dw(&pairs), dw_lit(0x3333_3333), dw(&low));
    b.bsh(dw(&pairs), shift_by(OperandSize::Dword, -2), dw(&shifted));
    b.and(dw(&shifted), dw_lit(0x3333_3333), dw(&high));
    b.add(dw(&low), dw(&high), dw(&nibbles));

    // (v + (v >> 4)) & 0x0F0F0F0F
    let shifted = env.next_temp();
    let summed = env.next_temp();
    let bytes = env.next_temp();
    b.bsh(dw(&nibbles), shift_by(OperandSize::Dword, -4), dw(&shifted));
    b.add(dw(&nibbles), dw(&shifted), dw(&summed));
    b.and(dw(&summed), dw_lit(0x0F0F_0F0F), dw(&bytes));

    let mut total = bytes;
    for amount in [8, 16] {
        let shifted = env.next_temp();
        let summed = env.next_temp();
        b.bsh(dw(&total), shift_by(OperandSize::Dword, -amount), dw(&shifted));
        b.add(dw(&total), dw(&shifted), dw(&summed));
        total = summed;
    }

    let count = env.next_temp();
    b.and(dw(&total), dw_lit(0x3F), dw(&count));
    count
}
