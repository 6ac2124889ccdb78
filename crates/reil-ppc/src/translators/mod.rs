//! Per-mnemonic translators.
//!
//! A [`Translator`] is plain data: the instruction family plus the switches
//! that distinguish its variants (record form, overflow form, carrying,
//! update addressing, ...). The registry maps every mnemonic to one value;
//! [`Translator::translate`] reads the operands and calls the generators.

mod arith;
mod branch;
mod logic;
mod memory;
mod system;

pub use arith::{AddBase, AddForm, AddRhs};
pub use branch::{BranchForm, BranchKind, CondSpec, TargetKind};
pub use logic::{LogicRhs, RotateForm};
pub use memory::MemoryForm;
pub use system::SprSource;

use reil_ir::{ReilBuilder, ReilOperand};

use crate::env::TranslationEnvironment;
use crate::error::Result;
use crate::generators::{ArithFlags, CrLogicOp, LogicOp, MulHalf, ShiftKind, dw};
use crate::instr::NativeInstruction;
use crate::types::gpr;

/// How to translate one mnemonic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Translator {
    Add { form: AddForm, flags: ArithFlags },
    Negate { flags: ArithFlags },
    Compare { signed: bool, immediate: bool },
    Multiply {
        signed: bool,
        half: MulHalf,
        immediate: bool,
        flags: ArithFlags,
    },
    Divide { signed: bool, flags: ArithFlags },
    Logic {
        op: LogicOp,
        rhs: LogicRhs,
        set_cr: bool,
    },
    Not { set_cr: bool },
    Move { set_cr: bool },
    LoadImmediate { shifted: bool },
    SignExtend { bits: u8, set_cr: bool },
    CountLeadingZeros { set_cr: bool },
    Rotate { form: RotateForm, set_cr: bool },
    Shift {
        kind: ShiftKind,
        immediate: bool,
        set_cr: bool,
    },
    Branch(BranchForm),
    Load(MemoryForm),
    LoadMultiple,
    LoadString,
    Store(MemoryForm),
    StoreConditional,
    StoreMultiple,
    StoreString,
    ZeroBlock,
    CrLogic(CrLogicOp),
    CrSet(bool),
    CrMove { invert: bool },
    MoveCrField,
    MoveXerToCr,
    MoveToCr { all_fields: bool },
    MoveFromCr { partial: bool },
    MoveFromSpr(SprSource),
    MoveToSpr(SprSource),
    MoveFromSegment { indirect: bool },
    MoveToSegment { indirect: bool },
    ReturnFromInterrupt,
    Nop,
}

impl Translator {
    /// Emit the REIL code for `instr`.
    pub fn translate(
        self,
        b: &mut ReilBuilder,
        env: &mut TranslationEnvironment,
        instr: &NativeInstruction,
    ) -> Result<()> {
        match self {
            Self::Add { form, flags } => arith::add(b, env, instr, form, flags),
            Self::Negate { flags } => arith::negate(b, env, instr, flags),
            Self::Compare { signed, immediate } => arith::compare(b, env, instr, signed, immediate),
            Self::Multiply {
                signed,
                half,
                immediate,
                flags,
            } => arith::multiply(b, env, instr, signed, half, immediate, flags),
            Self::Divide { signed, flags } => arith::divide(b, env, instr, signed, flags),
            Self::Logic { op, rhs, set_cr } => logic::logic(b, env, instr, op, rhs, set_cr),
            Self::Not { set_cr } => logic::not(b, env, instr, set_cr),
            Self::Move { set_cr } => logic::move_register(b, env, instr, set_cr),
            Self::LoadImmediate { shifted } => logic::load_immediate(b, env, instr, shifted),
            Self::SignExtend { bits, set_cr } => logic::sign_extend(b, env, instr, bits, set_cr),
            Self::CountLeadingZeros { set_cr } => logic::count_leading_zeros(b, env, instr, set_cr),
            Self::Rotate { form, set_cr } => logic::rotate(b, env, instr, form, set_cr),
            Self::Shift {
                kind,
                immediate,
                set_cr,
            } => logic::shift(b, env, instr, kind, immediate, set_cr),
            Self::Branch(form) => branch::branch(b, env, instr, form),
            Self::Load(form) => memory::load(b, env, instr, form),
            Self::LoadMultiple => memory::load_multiple(b, env, instr),
            Self::LoadString => memory::load_string(b, env, instr),
            Self::Store(form) => memory::store(b, env, instr, form),
            Self::StoreConditional => memory::store_conditional(b, env, instr),
            Self::StoreMultiple => memory::store_multiple(b, env, instr),
            Self::StoreString => memory::store_string(b, env, instr),
            Self::ZeroBlock => memory::zero_block(b, env, instr),
            Self::CrLogic(op) => system::cr_logic(b, env, instr, op),
            Self::CrSet(value) => system::cr_set(b, instr, value),
            Self::CrMove { invert } => system::cr_move(b, instr, invert),
            Self::MoveCrField => system::move_cr_field(b, instr),
            Self::MoveXerToCr => system::move_xer_to_cr(b, instr),
            Self::MoveToCr { all_fields } => system::move_to_cr(b, env, instr, all_fields),
            Self::MoveFromCr { partial } => system::move_from_cr(b, env, instr, partial),
            Self::MoveFromSpr(source) => system::move_from_spr(b, env, instr, source),
            Self::MoveToSpr(source) => system::move_to_spr(b, env, instr, source),
            Self::MoveFromSegment { indirect } => system::move_from_segment(b, env, instr, indirect),
            Self::MoveToSegment { indirect } => system::move_to_segment(b, env, instr, indirect),
            Self::ReturnFromInterrupt => system::return_from_interrupt(b, env),
            Self::Nop => {
                b.nop();
                Ok(())
            }
        }
    }
}

/// Operand for general-purpose register `index` of `instr`.
fn gpr_operand(instr: &NativeInstruction, index: usize) -> Result<ReilOperand> {
    Ok(dw(&gpr(instr.gpr(index)?)))
}

/// Register name for general-purpose register operand `index`.
fn gpr_name(instr: &NativeInstruction, index: usize) -> Result<String> {
    Ok(gpr(instr.gpr(index)?))
}
