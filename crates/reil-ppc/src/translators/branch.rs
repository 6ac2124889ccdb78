//! Branch translators.

use reil_ir::ReilBuilder;

use crate::env::TranslationEnvironment;
use crate::error::Result;
use crate::generators::{
    BranchTarget, CrCondition, CtrCondition, generate_branch, generate_dynamic_branch,
};
use crate::instr::NativeInstruction;
use crate::types::CrBit;

/// Where the branch target comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Absolute address operand.
    Immediate,
    LinkRegister,
    CountRegister,
}

/// Condition-register test of a simplified conditional branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CondSpec {
    /// Named bit of an optional leading `crN` operand (CR0 when absent).
    Field { bit: CrBit, expect: bool },
    /// Bit number given as the first operand (`bt`, `bf`, `bdnzt`, ...).
    Indexed { expect: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Always,
    Conditional {
        ctr: Option<CtrCondition>,
        cr: Option<CondSpec>,
    },
    /// `bc` family: BO and BI operands.
    Dynamic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BranchForm {
    pub kind: BranchKind,
    pub target: TargetKind,
    pub link: bool,
}

impl BranchForm {
    pub const fn new(kind: BranchKind, target: TargetKind, link: bool) -> Self {
        Self { kind, target, link }
    }
}

/// BO bit 2 (value 0x04): do not decrement CTR.
const BO_NO_DECREMENT: u8 = 0x04;

fn resolve_target(
    instr: &NativeInstruction,
    kind: TargetKind,
    index: usize,
) -> Result<BranchTarget> {
    Ok(match kind {
        TargetKind::Immediate => BranchTarget::Address(instr.imm_u32(index)?),
        TargetKind::LinkRegister => BranchTarget::LinkRegister,
        TargetKind::CountRegister => BranchTarget::CountRegister,
    })
}

pub fn branch(
    b: &mut ReilBuilder,
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    form: BranchForm,
) -> Result<()> {
    match form.kind {
        BranchKind::Always => {
            let target = resolve_target(instr, form.target, 0)?;
            generate_branch(b, env, target, None, None, form.link);
        }
        BranchKind::Conditional { ctr, cr } => {
            let mut next = 0;
            let cr = match cr {
                None => None,
                Some(CondSpec::Field { bit, expect }) => {
                    let field = if instr.is_cr_field(0) {
                        next = 1;
                        instr.cr_field(0)?
                    } else {
                        0
                    };
                    Some(CrCondition {
                        bit: field * 4 + bit.index(),
                        expect,
                    })
                }
                Some(CondSpec::Indexed { expect }) => {
                    next = 1;
                    Some(CrCondition {
                        bit: instr.cr_bit(0)?,
                        expect,
                    })
                }
            };
            let target = resolve_target(instr, form.target, next)?;
            generate_branch(b, env, target, ctr, cr, form.link);
        }
        BranchKind::Dynamic => {
            let bo = instr.imm_below(0, 32)?;
            let bi = instr.cr_bit(1)?;
            if form.target == TargetKind::CountRegister && bo & BO_NO_DECREMENT == 0 {
                return Err(instr.invalid_form("bcctr cannot decrement CTR"));
            }
            let target = resolve_target(instr, form.target, 2)?;
            generate_dynamic_branch(b, env, bo, bi, target, form.link);
        }
    }
    Ok(())
}
