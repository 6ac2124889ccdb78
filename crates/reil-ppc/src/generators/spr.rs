//! Special-purpose and segment register transfers.

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{byte, dw, dw_lit, pack_bits, shift_by};
use crate::env::TranslationEnvironment;
use crate::types::{
    CTR, LR, MSR, SEGMENT_REGISTERS, SPR_CTR, SPR_LR, SPR_XER, TBL, TBU, XER_CA, XER_OV, XER_SO,
    spr_name, sr_name,
};

/// A special-purpose register reachable by `mfspr`/`mtspr` and friends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialRegister {
    /// Composed from XERSO, XEROV and XERCA.
    Xer,
    Lr,
    Ctr,
    Msr,
    Tbl,
    Tbu,
    /// Any other SPR, kept as an opaque `SPR<n>` register.
    Numbered(u32),
}

impl SpecialRegister {
    /// Map an SPR number.
    pub const fn from_number(number: u32) -> Self {
        match number {
            SPR_XER => Self::Xer,
            SPR_LR => Self::Lr,
            SPR_CTR => Self::Ctr,
            other => Self::Numbered(other),
        }
    }

    /// Register name, or `None` for XER which has no single register.
    pub fn register_name(self) -> Option<String> {
        match self {
            Self::Xer => None,
            Self::Lr => Some(LR.to_string()),
            Self::Ctr => Some(CTR.to_string()),
            Self::Msr => Some(MSR.to_string()),
            Self::Tbl => Some(TBL.to_string()),
            Self::Tbu => Some(TBU.to_string()),
            Self::Numbered(number) => Some(spr_name(number)),
        }
    }
}

/// XER bit positions (from the LSB) of SO, OV and CA.
const XER_FLAGS: [(&str, i64); 3] = [(XER_SO, 31), (XER_OV, 30), (XER_CA, 29)];

/// `dst = spr`.
pub fn generate_move_from_spr(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    spr: SpecialRegister,
    dst: &str,
) {
    let Some(name) = spr.register_name() else {
        let [so, ov, ca] = XER_FLAGS;
        let word = pack_bits(b, env, so, [ov, ca]);
        b.str(dw(&word), dw(dst));
        return;
    };
    b.str(dw(&name), dw(dst));
}

/// `spr = src`.
pub fn generate_move_to_spr(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    spr: SpecialRegister,
    src: &ReilOperand,
) {
    let Some(name) = spr.register_name() else {
        for (flag, position) in XER_FLAGS {
            let shifted = env.next_temp();
            b.bsh(src.clone(), shift_by(OperandSize::Dword, -position), dw(&shifted));
            b.and(dw(&shifted), dw_lit(1), byte(flag));
        }
        return;
    };
    b.str(src.clone(), dw(&name));
}

/// `dst = SR<sr>`.
pub fn generate_mfsr(b: &mut ReilBuilder, sr: u8, dst: &str) {
    b.str(dw(&sr_name(sr)), dw(dst));
}

/// `SR<sr> = src`.
pub fn generate_mtsr(b: &mut ReilBuilder, sr: u8, src: &ReilOperand) {
    b.str(src.clone(), dw(&sr_name(sr)));
}

/// `dst = SR<selector[0:3]>`.
pub fn generate_mfsrin(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    selector: &ReilOperand,
    dst: &str,
) {
    dispatch_segment(b, env, selector, |b, sr| generate_mfsr(b, sr, dst));
}

/// `SR<selector[0:3]> = src`.
pub fn generate_mtsrin(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    selector: &ReilOperand,
    src: &ReilOperand,
) {
    dispatch_segment(b, env, selector, |b, sr| generate_mtsr(b, sr, src));
}

/// Run `emit` for the segment register named by the top four bits of
/// `selector`. Every other case is jumped over, so only that register is
/// read or written.
fn dispatch_segment(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    selector: &ReilOperand,
    mut emit: impl FnMut(&mut ReilBuilder, u8),
) {
    let index = env.next_temp();
    b.bsh(selector.clone(), shift_by(OperandSize::Dword, -28), dw(&index));
    for sr in 0..SEGMENT_REGISTERS {
        let differs = env.next_temp();
        b.xor(dw(&index), dw_lit(u32::from(sr)), dw(&differs));
        let skip = b.jcc_forward(dw(&differs));
        emit(&mut *b, sr);
        let next = b.next_address();
        b.patch_jump(skip, next);
    }
}
