//! Bitwise logic, moves and sign extension.

use reil_ir::{ReilBuilder, ReilOperand};

use super::{dw, dw_lit, update_cr_field};
use crate::env::TranslationEnvironment;

/// Two-operand bitwise operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    /// `a & !b`
    AndComplement,
    Or,
    /// `a | !b`
    OrComplement,
    Xor,
    Nand,
    Nor,
    /// `!(a ^ b)`
    Equivalent,
}

/// `dst = a <op> rhs`, optionally recording into CR0.
pub fn generate_logic(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    op: LogicOp,
    set_cr: bool,
    a: &ReilOperand,
    rhs: &ReilOperand,
    dst: &str,
) {
    let result = env.next_temp();
    match op {
        LogicOp::And => b.and(a.clone(), rhs.clone(), dw(&result)),
        LogicOp::Or => b.or(a.clone(), rhs.clone(), dw(&result)),
        LogicOp::Xor => b.xor(a.clone(), rhs.clone(), dw(&result)),
        LogicOp::AndComplement | LogicOp::OrComplement => {
            let inverted = env.next_temp();
            b.xor(rhs.clone(), dw_lit(u32::MAX), dw(&inverted));
            if op == LogicOp::AndComplement {
                b.and(a.clone(), dw(&inverted), dw(&result));
            } else {
                b.or(a.clone(), dw(&inverted), dw(&result));
            }
        }
        LogicOp::Nand | LogicOp::Nor | LogicOp::Equivalent => {
            let inner = env.next_temp();
            match op {
                LogicOp::Nand => b.and(a.clone(), rhs.clone(), dw(&inner)),
                LogicOp::Nor => b.or(a.clone(), rhs.clone(), dw(&inner)),
                _ => b.xor(a.clone(), rhs.clone(), dw(&inner)),
            }
            b.xor(dw(&inner), dw_lit(u32::MAX), dw(&result));
        }
    }
    finish(b, env, set_cr, &result, dst);
}

/// `dst = src`, the `mr`/`li`/`lis` family.
pub fn generate_move(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    set_cr: bool,
    src: &ReilOperand,
    dst: &str,
) {
    b.str(src.clone(), dw(dst));
    if set_cr {
        update_cr_field(b, env, 0, &dw(dst));
    }
}

/// Sign-extend the low `bits` bits of `src`: `((x & m) ^ s) - s`.
pub fn generate_sign_extend(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    bits: u32,
    set_cr: bool,
    src: &ReilOperand,
    dst: &str,
) {
    let low_mask = (1u32 << bits) - 1;
    let sign = 1u32 << (bits - 1);
    let low = env.next_temp();
    let flipped = env.next_temp();
    let result = env.next_temp();
    b.and(src.clone(), dw_lit(low_mask), dw(&low));
    b.xor(dw(&low), dw_lit(sign), dw(&flipped));
    b.sub(dw(&flipped), dw_lit(sign), dw(&result));
    finish(b, env, set_cr, &result, dst);
}

fn finish(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    set_cr: bool,
    result: &str,
    dst: &str,
) {
    b.str(dw(result), dw(dst));
    if set_cr {
        update_cr_field(b, env, 0, &dw(result));
    }
}
