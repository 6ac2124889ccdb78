//! Branches.
//!
//! A conditional branch combines up to two predicates selected by its BO
//! field: the count register (decremented first, then tested for zero or
//! non-zero) and one condition-register bit (tested for one or zero).

use reil_ir::{OperandSize, ReilBuilder, ReilOperand};

use super::{byte, byte_lit, dw, dw_lit, shift_by};
use crate::env::TranslationEnvironment;
use crate::helpers::cr_bit_name;
use crate::types::{CTR, LR, MSR, SPR_SRR0, SPR_SRR1, spr_name};

/// Where a branch goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchTarget {
    /// Absolute target address.
    Address(u32),
    LinkRegister,
    CountRegister,
}

/// Count-register predicate, evaluated after the decrement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CtrCondition {
    Zero,
    NonZero,
}

/// Condition-register predicate: bit `bit` must equal `expect`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CrCondition {
    pub bit: u8,
    pub expect: bool,
}

/// Return address written by the link forms.
fn link_value(b: &ReilBuilder) -> ReilOperand {
    dw_lit(b.native_address().wrapping_add(4) as u32)
}

/// Resolve a target to an operand. Register targets are copied to a
/// temporary first so that a later write to LR or CTR cannot change it.
fn resolve_target(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    target: BranchTarget,
) -> ReilOperand {
    let register = match target {
        BranchTarget::Address(address) => return dw_lit(address),
        BranchTarget::LinkRegister => LR,
        BranchTarget::CountRegister => CTR,
    };
    let copy = env.next_temp();
    b.str(dw(register), dw(&copy));
    dw(&copy)
}

fn emit_jump(b: &mut ReilBuilder, condition: ReilOperand, target: ReilOperand, link: bool) {
    if link {
        let return_address = link_value(b);
        b.str(return_address, dw(LR));
        b.call(condition, target);
    } else {
        b.jcc(condition, target);
    }
}

/// Branch with statically known predicates.
///
/// With neither predicate the branch is unconditional.
pub fn generate_branch(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    target: BranchTarget,
    ctr: Option<CtrCondition>,
    cr: Option<CrCondition>,
    link: bool,
) {
    let target = resolve_target(b, env, target);

    let ctr_ok = ctr.map(|condition| {
        b.sub(dw(CTR), dw_lit(1), dw(CTR));
        let is_zero = env.next_temp();
        b.bisz(dw(CTR), byte(&is_zero));
        match condition {
            CtrCondition::Zero => is_zero,
            CtrCondition::NonZero => {
                let non_zero = env.next_temp();
                b.bisz(byte(&is_zero), byte(&non_zero));
                non_zero
            }
        }
    });

    let cr_ok = cr.map(|condition| {
        let bit = cr_bit_name(condition.bit);
        if condition.expect {
            bit.to_string()
        } else {
            let clear = env.next_temp();
            b.bisz(byte(bit), byte(&clear));
            clear
        }
    });

    let condition = match (ctr_ok, cr_ok) {
        (Some(ctr_ok), Some(cr_ok)) => {
            let both = env.next_temp();
            b.and(byte(&ctr_ok), byte(&cr_ok), byte(&both));
            byte(&both)
        }
        (Some(ok), None) | (None, Some(ok)) => byte(&ok),
        (None, None) => byte_lit(1),
    };

    emit_jump(b, condition, target, link);
}

/// Branch with the full BO/BI semantics computed at run time.
///
/// `BO` is treated as a value and each of its bits extracted with shifts:
///
/// ```text
/// if !BO[2] { CTR -= 1 }
/// ctr_ok  = BO[2] | ((CTR != 0) ^ BO[3])
/// cond_ok = BO[0] | !(CR[BI] ^ BO[1])
/// taken   = ctr_ok & cond_ok
/// ```
pub fn generate_dynamic_branch(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    bo: u8,
    bi: u8,
    target: BranchTarget,
    link: bool,
) {
    let target = resolve_target(b, env, target);

    let bo_value = env.next_temp();
    b.str(dw_lit(u32::from(bo & 0x1F)), dw(&bo_value));
    let mut bo_bits = Vec::with_capacity(4);
    for k in 0..4 {
        let shifted = env.next_temp();
        let bit = env.next_temp();
        b.bsh(dw(&bo_value), shift_by(OperandSize::Dword, k - 4), dw(&shifted));
        b.and(dw(&shifted), dw_lit(1), byte(&bit));
        bo_bits.push(bit);
    }
    let [bo0, bo1, bo2, bo3] = [&bo_bits[0], &bo_bits[1], &bo_bits[2], &bo_bits[3]];

    let decrement = env.next_temp();
    b.xor(byte(bo2), byte_lit(1), byte(&decrement));
    b.sub(dw(CTR), byte(&decrement), dw(CTR));

    let ctr_zero = env.next_temp();
    let ctr_non_zero = env.next_temp();
    let ctr_test = env.next_temp();
    let ctr_ok = env.next_temp();
    b.bisz(dw(CTR), byte(&ctr_zero));
    b.bisz(byte(&ctr_zero), byte(&ctr_non_zero));
    b.xor(byte(&ctr_non_zero), byte(bo3), byte(&ctr_test));
    b.or(byte(bo2), byte(&ctr_test), byte(&ctr_ok));

    let mismatch = env.next_temp();
    let matches = env.next_temp();
    let cond_ok = env.next_temp();
    b.xor(byte(cr_bit_name(bi)), byte(bo1), byte(&mismatch));
    b.bisz(byte(&mismatch), byte(&matches));
    b.or(byte(bo0), byte(&matches), byte(&cond_ok));

    let taken = env.next_temp();
    b.and(byte(&ctr_ok), byte(&cond_ok), byte(&taken));

    emit_jump(b, byte(&taken), target, link);
}

/// `rfi`: restore MSR from SRR1 and jump to the word-aligned SRR0.
pub fn generate_rfi(b: &mut ReilBuilder, env: &mut TranslationEnvironment) {
    let target = env.next_temp();
    b.and(dw(&spr_name(SPR_SRR0)), dw_lit(!3), dw(&target));
    b.str(dw(&spr_name(SPR_SRR1)), dw(MSR));
    b.jcc(byte_lit(1), dw(&target));
}
