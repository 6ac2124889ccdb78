//! Rotate-and-mask (`rlwinm`, `rlwnm`, `rlwimi`).

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{MASK_32, dw, dw_lit, qw, qw_lit, shift_by, update_cr_field};
use crate::env::TranslationEnvironment;

/// Rotation amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RotateAmount {
    Immediate(u8),
    /// Low five bits of a register.
    Register(ReilOperand),
}

/// Rotate `src` left, AND with `mask` and write `dst`.
///
/// With `insert`, bits of `dst` outside `mask` are kept:
/// `dst = (rot & mask) | (dst & !mask)`.
#[allow(clippy::too_many_arguments)]
pub fn generate_rotate(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    set_cr: bool,
    src: &ReilOperand,
    amount: &RotateAmount,
    mask: u32,
    insert: bool,
    dst: &str,
) {
    let rotated = rotate_left(b, env, src, amount);

    let masked = env.next_temp();
    b.and(dw(&rotated), dw_lit(mask), dw(&masked));

    let result = if insert {
        let kept = env.next_temp();
        let merged = env.next_temp();
        b.and(dw(dst), dw_lit(!mask), dw(&kept));
        b.or(dw(&masked), dw(&kept), dw(&merged));
        merged
    } else {
        masked
    };

    b.str(dw(&result), dw(dst));
    if set_cr {
        update_cr_field(b, env, 0, &dw(&result));
    }
}

/// `(x << n) | (x >> (32 - n))` truncated to 32 bits.
fn rotate_left(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    src: &ReilOperand,
    amount: &RotateAmount,
) -> String {
    let (left_amount, right_amount) = match amount {
        RotateAmount::Immediate(n) => {
            let n = i64::from(n & 31);
            (
                shift_by(OperandSize::Dword, n),
                shift_by(OperandSize::Dword, n - 32),
            )
        }
        RotateAmount::Register(count) => {
            let n = env.next_temp();
            let back = env.next_temp();
            let right = env.next_temp();
            b.and(count.clone(), dw_lit(0x1F), dw(&n));
            b.sub(dw_lit(32), dw(&n), dw(&back));
            b.sub(dw_lit(0), dw(&back), dw(&right));
            (dw(&n), dw(&right))
        }
    };

    let left = env.next_temp();
    let right = env.next_temp();
    let joined = env.next_temp();
    let rotated = env.next_temp();
    b.bsh(src.clone(), left_amount, qw(&left));
    b.bsh(src.clone(), right_amount, dw(&right));
    b.or(qw(&left), dw(&right), qw(&joined));
    b.and(qw(&joined), qw_lit(MASK_32), dw(&rotated));
    rotated
}
