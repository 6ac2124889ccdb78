//! Loads.
//!
//! Memory is big-endian. Effective addresses are formed in 64 bits and
//! truncated, so they wrap exactly like the hardware's 32-bit adder.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{MASK_32, byte, dw, dw_lit, qw, qw_lit, reg, shift_by};
use crate::env::TranslationEnvironment;
use crate::types::gpr;

/// `(rA|0) + index` into a fresh 32-bit temporary.
///
/// A base of `r0` reads as literal zero.
pub fn effective_address(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    base: u8,
    index: &ReilOperand,
) -> String {
    let base = if base == 0 {
        dw_lit(0)
    } else {
        dw(&gpr(base))
    };
    let sum = env.next_temp();
    let ea = env.next_temp();
    b.add(base, index.clone(), qw(&sum));
    b.and(qw(&sum), qw_lit(MASK_32), dw(&ea));
    ea
}

/// `ea + offset` as an operand; `ea` itself when the offset is zero.
pub fn offset_address(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    ea: &str,
    offset: u32,
) -> ReilOperand {
    if offset == 0 {
        return dw(ea);
    }
    let address = env.next_temp();
    b.add(dw(ea), dw_lit(offset), dw(&address));
    dw(&address)
}

/// Reverse the low `size` bytes of `value` into a 32-bit temporary.
pub fn byte_reverse(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    value: &ReilOperand,
    size: OperandSize,
) -> String {
    let count = size.bytes() as i64;
    let mut result: Option<String> = None;
    for i in 0..count {
        let shifted = env.next_temp();
        let isolated = env.next_temp();
        let moved = env.next_temp();
        b.bsh(value.clone(), shift_by(OperandSize::Dword, -8 * i), dw(&shifted));
        b.and(dw(&shifted), dw_lit(0xFF), dw(&isolated));
        b.bsh(
            dw(&isolated),
            shift_by(OperandSize::Dword, 8 * (count - 1 - i)),
            dw(&moved),
        );
        result = Some(match result {
            None => moved,
            Some(acc) => {
                let merged = env.next_temp();
                b.or(dw(&acc), dw(&moved), dw(&merged));
                merged
            }
        });
    }
    result.unwrap_or_else(|| env.next_temp())
}

/// Load `size` bytes at `ea` into `dst`, zero- or sign-extended.
pub fn generate_load(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    ea: &str,
    dst: &str,
    size: OperandSize,
    algebraic: bool,
    reversed: bool,
) {
    let loaded = env.next_temp();
    b.ldm(dw(ea), reg(size, &loaded));
    let mut value = reg(size, &loaded);

    if reversed && size != OperandSize::Byte {
        value = dw(&byte_reverse(b, env, &value, size));
    }
    if algebraic {
        let sign = 1u32 << (size.bits() - 1);
        let flipped = env.next_temp();
        let extended = env.next_temp();
        b.xor(value, dw_lit(sign), dw(&flipped));
        b.sub(dw(&flipped), dw_lit(sign), dw(&extended));
        value = dw(&extended);
    }

    b.str(value, dw(dst));
}

/// `lmw`: load registers `first..=31` from consecutive words at `ea`.
pub fn generate_load_multiple(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    ea: &str,
    first: u8,
) {
    for (k, r) in (first..32).enumerate() {
        let address = offset_address(b, env, ea, 4 * k as u32);
        b.ldm(address, dw(&gpr(r)));
    }
}

/// `lswi`: load `count` bytes into consecutive registers starting at
/// `first`, four bytes per register, wrapping from `r31` to `r0`.
///
/// A trailing partial register is filled from the top and zero-padded.
pub fn generate_load_string(
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
        let target = gpr(register);
        if chunk == 4 {
            let address = offset_address(b, env, ea, offset);
            b.ldm(address, dw(&target));
        } else {
            let mut acc: Option<String> = None;
            for j in 0..chunk {
                let address = offset_address(b, env, ea, offset + j);
                let loaded = env.next_temp();
                let placed = env.next_temp();
                b.ldm(address, byte(&loaded));
                b.bsh(
                    byte(&loaded),
                    shift_by(OperandSize::Dword, i64::from(8 * (3 - j))),
                    dw(&placed),
                );
                acc = Some(match acc {
                    None => placed,
                    Some(prev) => {
                        let merged = env.next_temp();
                        b.or(dw(&prev), dw(&placed), dw(&merged));
                        merged
                    }
                });
            }
            if let Some(value) = acc {
                b.str(dw(&value), dw(&target));
            }
        }
        register = (register + 1) % 32;
        offset += chunk;
    }
}
