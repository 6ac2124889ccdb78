//! Stores.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{byte, byte_lit, byte_reverse, dw, dw_lit, offset_address, reg, shift_by};
use crate::env::TranslationEnvironment;
use crate::helpers::cr_field_bit_names;
use crate::types::{XER_SO, gpr};

/// Data cache block size used by `dcbz`.
pub const CACHE_BLOCK_SIZE: u32 = 32;

/// Low `size` bytes of a 32-bit value as an operand of that size.
fn narrow(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    value: ReilOperand,
    size: OperandSize,
) -> ReilOperand {
    if size == OperandSize::Dword {
        return value;
    }
    let narrowed = env.next_temp();
    b.and(value, dw_lit(size.mask() as u32), reg(size, &narrowed));
    reg(size, &narrowed)
}

/// Store the low `size` bytes of `src` at `ea`.
pub fn generate_store(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    ea: &str,
    src: &ReilOperand,
    size: OperandSize,
    reversed: bool,
) {
    let value = if reversed && size != OperandSize::Byte {
        dw(&byte_reverse(b, env, src, size))
    } else {
        src.clone()
    };
    let value = narrow(b, env, value, size);
    b.stm(value, dw(ea));
}

/// `stmw`: store registers `first..=31` to consecutive words at `ea`.
pub fn generate_store_multiple(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    ea: &str,
    first: u8,
) {
    for (k, r) in (first..32).enumerate() {
        let address = offset_address(b, env, ea, 4 * k as u32);
        b.stm(dw(&gpr(r)), address);
    }
}

/// `stswi`: store `count` bytes from consecutive registers starting at
/// `first`, most significant byte first, wrapping from `r31` to `r0`.
pub fn generate_store_string(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    ea: &str,
    first: u8,
    count: u32,
) {
    let mut register = first;
    let mut offset = 0;
    while offset < count {
        let chunk = (count - offset).min(4);
        let source = gpr(register);
        if chunk == 4 {
            let address = offset_address(b, env, ea, offset);
            b.stm(dw(&source), address);
        } else {
            for j in 0..chunk {
                let address = offset_address(b, env, ea, offset + j);
                let shifted = env.next_temp();
                let value = env.next_temp();
                b.bsh(
                    dw(&source),
                    shift_by(OperandSize::Dword, -i64::from(8 * (3 - j))),
                    dw(&shifted),
                );
                b.and(dw(&shifted), dw_lit(0xFF), byte(&value));
                b.stm(byte(&value), address);
            }
        }
        register = (register + 1) % 32;
        offset += chunk;
    }
}

/// `dcbz`: zero the cache block containing `ea`.
pub fn generate_zero_block(b: &mut ReilBuilder, env: &mut TranslationEnvironment, ea: &str) {
    let block = env.next_temp();
    b.and(dw(ea), dw_lit(!(CACHE_BLOCK_SIZE - 1)), dw(&block));
    for offset in (0..CACHE_BLOCK_SIZE).step_by(4) {
        let address = offset_address(b, env, &block, offset);
        b.stm(dw_lit(0), address);
    }
}

/// CR0 after a successful `stwcx.`: EQ set, LT and GT clear, SO from XER.
///
/// Reservations are not modeled, so the conditional store always succeeds.
pub fn generate_store_conditional_status(b: &mut ReilBuilder) {
    let [lt, gt, eq, so] = cr_field_bit_names(0);
    b.str(byte_lit(0), byte(lt));
    b.str(byte_lit(0), byte(gt));
    b.str(byte_lit(1), byte(eq));
    b.str(byte(XER_SO), byte(so));
}
