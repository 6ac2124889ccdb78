//! Mnemonic dispatch.
//!
//! Suffix variants are expanded when the table is built: record (`.`),
//! overflow (`o`, `o.`), absolute/link (`a`, `l`, `la`), register targets
//! (`lr`, `ctr`, ...) and static prediction hints (`+`, `-`).

use std::sync::LazyLock;

use reil_ir::{OperandSize, ReilBuilder, ReilInstruction, SUB_ADDRESS_SPACE};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::env::TranslationEnvironment;
use crate::error::{Result, TranslationError};
use crate::generators::{
    ArithFlags, CarryIn, CrLogicOp, CtrCondition, LogicOp, MulHalf, ShiftKind, SpecialRegister,
};
use crate::instr::NativeInstruction;
use crate::translators::{
    AddBase, AddForm, AddRhs, BranchForm, BranchKind, CondSpec, LogicRhs, MemoryForm, RotateForm,
    SprSource, TargetKind, Translator,
};
use crate::types::{
    CrBit, SPR_DAR, SPR_DEC, SPR_DSISR, SPR_PVR, SPR_SPRG0, SPR_SRR0, SPR_SRR1,
};

/// Post-processing hook run after a mnemonic's translator.
///
/// Extensions see the finished instruction list and may rewrite it. They
/// are shared between threads and must not keep per-call state.
pub trait TranslationExtension: Send + Sync {
    /// Name used in error reports.
    fn name(&self) -> &str;

    fn post_process(
        &self,
        env: &mut TranslationEnvironment,
        instr: &NativeInstruction,
        instructions: &mut Vec<ReilInstruction>,
    ) -> Result<()>;
}

/// Immutable mnemonic → translator table.
#[derive(Debug, Clone)]
pub struct TranslatorRegistry {
    table: FxHashMap<String, Translator>,
}

static GLOBAL: LazyLock<TranslatorRegistry> = LazyLock::new(TranslatorRegistry::standard);

/// Record-form suffixes.
const RECORD: [(&str, bool); 2] = [("", false), (".", true)];

/// Overflow and record suffixes: `(suffix, set_overflow, set_cr)`.
const OVERFLOW_RECORD: [(&str, bool, bool); 4] = [
    ("", false, false),
    (".", false, true),
    ("o", true, false),
    ("o.", true, true),
];

/// Static branch prediction hints.
const HINTS: [&str; 3] = ["", "+", "-"];

/// Branch suffixes: `(suffix, target, link)`.
const BRANCH_SUFFIXES: [(&str, TargetKind, bool); 8] = [
    ("", TargetKind::Immediate, false),
    ("a", TargetKind::Immediate, false),
    ("l", TargetKind::Immediate, true),
    ("la", TargetKind::Immediate, true),
    ("lr", TargetKind::LinkRegister, false),
    ("lrl", TargetKind::LinkRegister, true),
    ("ctr", TargetKind::CountRegister, false),
    ("ctrl", TargetKind::CountRegister, true),
];

/// Condition mnemonics of the simplified conditional branches.
const CONDITIONS: [(&str, CrBit, bool); 12] = [
    ("lt", CrBit::Lt, true),
    ("ge", CrBit::Lt, false),
    ("nl", CrBit::Lt, false),
    ("gt", CrBit::Gt, true),
    ("le", CrBit::Gt, false),
    ("ng", CrBit::Gt, false),
    ("eq", CrBit::Eq, true),
    ("ne", CrBit::Eq, false),
    ("so", CrBit::So, true),
    ("un", CrBit::So, true),
    ("ns", CrBit::So, false),
    ("nu", CrBit::So, false),
];

/// Instructions with no effect on modeled state.
const NOPS: [&str; 15] = [
    "nop", "sync", "isync", "eieio", "lwsync", "dcbf", "dcbi", "dcbst", "dcbt", "dcbtst", "dcba",
    "icbi", "tlbia", "tlbie", "tlbsync",
];

/// Named supervisor SPRs with `mf`/`mt` alias mnemonics. PVR is read-only.
const SPR_ALIASES: [(&str, u32, bool); 7] = [
    ("dsisr", SPR_DSISR, false),
    ("dar", SPR_DAR, false),
    ("dec", SPR_DEC, true),
    ("srr0", SPR_SRR0, true),
    ("srr1", SPR_SRR1, true),
    ("sprg0", SPR_SPRG0, true),
    ("pvr", SPR_PVR, false),
];

impl TranslatorRegistry {
    /// Shared registry with every supported mnemonic.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Build the full table.
    pub fn standard() -> Self {
        let mut registry = Self {
            table: FxHashMap::default(),
        };
        registry.register_arithmetic();
        registry.register_logic();
        registry.register_branches();
        registry.register_memory();
        registry.register_system();
        registry
    }

    fn insert(&mut self, mnemonic: impl Into<String>, translator: Translator) {
        self.table.insert(mnemonic.into(), translator);
    }

    /// `name`, `name.`, `nameo`, `nameo.`.
    fn insert_overflow_record(&mut self, name: &str, make: impl Fn(bool, bool) -> Translator) {
        for (suffix, overflow, record) in OVERFLOW_RECORD {
            self.insert(format!("{name}{suffix}"), make(overflow, record));
        }
    }

    /// `name`, `name.`.
    fn insert_record(&mut self, name: &str, make: impl Fn(bool) -> Translator) {
        for (suffix, record) in RECORD {
            self.insert(format!("{name}{suffix}"), make(record));
        }
    }

    fn register_arithmetic(&mut self) {
        use AddBase::{Register, RegisterOrZero};

        let carrying = ArithFlags::NONE.with_carry(true);
        let adds = [
            ("add", AddForm::new(Register, AddRhs::Register, CarryIn::None), ArithFlags::NONE),
            ("addc", AddForm::new(Register, AddRhs::Register, CarryIn::None), carrying),
            ("adde", AddForm::new(Register, AddRhs::Register, CarryIn::Flag), carrying),
            ("addme", AddForm::new(Register, AddRhs::MinusOne, CarryIn::Flag), carrying),
            ("addze", AddForm::new(Register, AddRhs::Zero, CarryIn::Flag), carrying),
            (
                "subf",
                AddForm::new(Register, AddRhs::Register, CarryIn::One).subtract(),
                ArithFlags::NONE,
            ),
            (
                "subfc",
                AddForm::new(Register, AddRhs::Register, CarryIn::One).subtract(),
                carrying,
            ),
            (
                "subfe",
                AddForm::new(Register, AddRhs::Register, CarryIn::Flag).subtract(),
                carrying,
            ),
            (
                "subfme",
                AddForm::new(Register, AddRhs::MinusOne, CarryIn::Flag).subtract(),
                carrying,
            ),
            (
                "subfze",
                AddForm::new(Register, AddRhs::Zero, CarryIn::Flag).subtract(),
                carrying,
            ),
            (
                "sub",
                AddForm::new(Register, AddRhs::Register, CarryIn::One)
                    .subtract()
                    .swapped(),
                ArithFlags::NONE,
            ),
            (
                "subc",
                AddForm::new(Register, AddRhs::Register, CarryIn::One)
                    .subtract()
                    .swapped(),
                carrying,
            ),
        ];
        for (name, form, base) in adds {
            self.insert_overflow_record(name, |overflow, record| Translator::Add {
                form,
                flags: base.with_overflow(overflow).with_cr(record),
            });
        }

        let immediates = [
            ("addi", AddForm::new(RegisterOrZero, AddRhs::Immediate, CarryIn::None), ArithFlags::NONE),
            (
                "addis",
                AddForm::new(RegisterOrZero, AddRhs::ShiftedImmediate, CarryIn::None),
                ArithFlags::NONE,
            ),
            (
                "subi",
                AddForm::new(RegisterOrZero, AddRhs::NegatedImmediate, CarryIn::None),
                ArithFlags::NONE,
            ),
            (
                "subis",
                AddForm::new(RegisterOrZero, AddRhs::NegatedShiftedImmediate, CarryIn::None),
                ArithFlags::NONE,
            ),
            ("addic", AddForm::new(Register, AddRhs::Immediate, CarryIn::None), carrying),
            ("addic.", AddForm::new(Register, AddRhs::Immediate, CarryIn::None), carrying.with_cr(true)),
            ("subic", AddForm::new(Register, AddRhs::NegatedImmediate, CarryIn::None), carrying),
            (
                "subic.",
                AddForm::new(Register, AddRhs::NegatedImmediate, CarryIn::None),
                carrying.with_cr(true),
            ),
            (
                "subfic",
                AddForm::new(Register, AddRhs::Immediate, CarryIn::One).subtract(),
                carrying,
            ),
        ];
        for (name, form, flags) in immediates {
            self.insert(name, Translator::Add { form, flags });
        }

        self.insert_overflow_record("neg", |overflow, record| Translator::Negate {
            flags: ArithFlags::NONE.with_overflow(overflow).with_cr(record),
        });

        for (name, signed, immediate) in [
            ("cmpw", true, false),
            ("cmpwi", true, true),
            ("cmplw", false, false),
            ("cmplwi", false, true),
            ("cmp", true, false),
            ("cmpi", true, true),
            ("cmpl", false, false),
            ("cmpli", false, true),
        ] {
            self.insert(name, Translator::Compare { signed, immediate });
        }

        self.insert_overflow_record("mullw", |overflow, record| Translator::Multiply {
            signed: true,
            half: MulHalf::Low,
            immediate: false,
            flags: ArithFlags::NONE.with_overflow(overflow).with_cr(record),
        });
        for (name, signed) in [("mulhw", true), ("mulhwu", false)] {
            self.insert_record(name, |record| Translator::Multiply {
                signed,
                half: MulHalf::High,
                immediate: false,
                flags: ArithFlags::NONE.with_cr(record),
            });
        }
        self.insert(
            "mulli",
            Translator::Multiply {
                signed: true,
                half: MulHalf::Low,
                immediate: true,
                flags: ArithFlags::NONE,
            },
        );

        for (name, signed) in [("divw", true), ("divwu", false)] {
            self.insert_overflow_record(name, |overflow, record| Translator::Divide {
                signed,
                flags: ArithFlags::NONE.with_overflow(overflow).with_cr(record),
            });
        }
    }

    fn register_logic(&mut self) {
        for (name, op) in [
            ("and", LogicOp::And),
            ("andc", LogicOp::AndComplement),
            ("or", LogicOp::Or),
            ("orc", LogicOp::OrComplement),
            ("xor", LogicOp::Xor),
            ("nand", LogicOp::Nand),
            ("nor", LogicOp::Nor),
            ("eqv", LogicOp::Equivalent),
        ] {
            self.insert_record(name, |set_cr| Translator::Logic {
                op,
                rhs: LogicRhs::Register,
                set_cr,
            });
        }
        for (name, op, rhs, set_cr) in [
            ("andi.", LogicOp::And, LogicRhs::Immediate, true),
            ("andis.", LogicOp::And, LogicRhs::ShiftedImmediate, true),
            ("ori", LogicOp::Or, LogicRhs::Immediate, false),
            ("oris", LogicOp::Or, LogicRhs::ShiftedImmediate, false),
            ("xori", LogicOp::Xor, LogicRhs::Immediate, false),
            ("xoris", LogicOp::Xor, LogicRhs::ShiftedImmediate, false),
        ] {
            self.insert(name, Translator::Logic { op, rhs, set_cr });
        }

        self.insert_record("not", |set_cr| Translator::Not { set_cr });
        self.insert_record("mr", |set_cr| Translator::Move { set_cr });
        self.insert("li", Translator::LoadImmediate { shifted: false });
        self.insert("lis", Translator::LoadImmediate { shifted: true });

        self.insert_record("extsb", |set_cr| Translator::SignExtend { bits: 8, set_cr });
        self.insert_record("extsh", |set_cr| Translator::SignExtend { bits: 16, set_cr });
        self.insert_record("cntlzw", |set_cr| Translator::CountLeadingZeros { set_cr });

        for (name, kind, immediate) in [
            ("slw", ShiftKind::Left, false),
            ("srw", ShiftKind::Right, false),
            ("sraw", ShiftKind::Algebraic, false),
            ("srawi", ShiftKind::Algebraic, true),
        ] {
            self.insert_record(name, |set_cr| Translator::Shift {
                kind,
                immediate,
                set_cr,
            });
        }

        for (name, form) in [
            ("rlwinm", RotateForm::Rlwinm),
            ("rlwnm", RotateForm::Rlwnm),
            ("rlwimi", RotateForm::Rlwimi),
            ("rotlw", RotateForm::Rotlw),
            ("extlwi", RotateForm::Extlwi),
            ("extrwi", RotateForm::Extrwi),
            ("rotlwi", RotateForm::Rotlwi),
            ("rotrwi", RotateForm::Rotrwi),
            ("slwi", RotateForm::Slwi),
            ("srwi", RotateForm::Srwi),
            ("clrlwi", RotateForm::Clrlwi),
            ("clrrwi", RotateForm::Clrrwi),
            ("clrlslwi", RotateForm::Clrlslwi),
            ("inslwi", RotateForm::Inslwi),
            ("insrwi", RotateForm::Insrwi),
        ] {
            self.insert_record(name, |set_cr| Translator::Rotate { form, set_cr });
        }
    }

    /// `stem` with the given branch suffixes, each with every hint.
    fn insert_branch_family(&mut self, stem: &str, kind: BranchKind, with_ctr_target: bool) {
        for (suffix, target, link) in BRANCH_SUFFIXES {
            if target == TargetKind::CountRegister && !with_ctr_target {
                continue;
            }
            for hint in HINTS {
                self.insert(
                    format!("{stem}{suffix}{hint}"),
                    Translator::Branch(BranchForm::new(kind, target, link)),
                );
            }
        }
    }

    fn register_branches(&mut self) {
        for (name, target, link) in [
            ("b", TargetKind::Immediate, false),
            ("ba", TargetKind::Immediate, false),
            ("bl", TargetKind::Immediate, true),
            ("bla", TargetKind::Immediate, true),
            ("blr", TargetKind::LinkRegister, false),
            ("blrl", TargetKind::LinkRegister, true),
            ("bctr", TargetKind::CountRegister, false),
            ("bctrl", TargetKind::CountRegister, true),
        ] {
            self.insert(
                name,
                Translator::Branch(BranchForm::new(BranchKind::Always, target, link)),
            );
        }

        for (condition, bit, expect) in CONDITIONS {
            let kind = BranchKind::Conditional {
                ctr: None,
                cr: Some(CondSpec::Field { bit, expect }),
            };
            self.insert_branch_family(&format!("b{condition}"), kind, true);
        }
        for (stem, expect) in [("bt", true), ("bf", false)] {
            let kind = BranchKind::Conditional {
                ctr: None,
                cr: Some(CondSpec::Indexed { expect }),
            };
            self.insert_branch_family(stem, kind, true);
        }

        for (stem, ctr) in [("bdnz", CtrCondition::NonZero), ("bdz", CtrCondition::Zero)] {
            let kind = BranchKind::Conditional {
                ctr: Some(ctr),
                cr: None,
            };
            self.insert_branch_family(stem, kind, false);
            for (cr_suffix, expect) in [("t", true), ("f", false)] {
                let kind = BranchKind::Conditional {
                    ctr: Some(ctr),
                    cr: Some(CondSpec::Indexed { expect }),
                };
                self.insert_branch_family(&format!("{stem}{cr_suffix}"), kind, false);
            }
        }

        self.insert_branch_family("bc", BranchKind::Dynamic, true);
    }

    fn register_memory(&mut self) {
        for (stem, form) in [
            ("lbz", MemoryForm::new(OperandSize::Byte)),
            ("lhz", MemoryForm::new(OperandSize::Word)),
            ("lha", MemoryForm::new(OperandSize::Word).algebraic()),
            ("lwz", MemoryForm::new(OperandSize::Dword)),
        ] {
            self.insert_addressing_modes(stem, form, Translator::Load);
        }
        for (stem, form) in [
            ("stb", MemoryForm::new(OperandSize::Byte)),
            ("sth", MemoryForm::new(OperandSize::Word)),
            ("stw", MemoryForm::new(OperandSize::Dword)),
        ] {
            self.insert_addressing_modes(stem, form, Translator::Store);
        }

        let indexed = |size| MemoryForm::new(size).with_indexed(true);
        self.insert("lhbrx", Translator::Load(indexed(OperandSize::Word).reversed()));
        self.insert("lwbrx", Translator::Load(indexed(OperandSize::Dword).reversed()));
        self.insert("lwarx", Translator::Load(indexed(OperandSize::Dword)));
        self.insert("sthbrx", Translator::Store(indexed(OperandSize::Word).reversed()));
        self.insert("stwbrx", Translator::Store(indexed(OperandSize::Dword).reversed()));
        self.insert("stwcx.", Translator::StoreConditional);
        self.insert("eciwx", Translator::Load(indexed(OperandSize::Dword)));
        self.insert("ecowx", Translator::Store(indexed(OperandSize::Dword)));

        self.insert("lmw", Translator::LoadMultiple);
        self.insert("stmw", Translator::StoreMultiple);
        self.insert("lswi", Translator::LoadString);
        self.insert("stswi", Translator::StoreString);
        self.insert("dcbz", Translator::ZeroBlock);
    }

    /// `stem`, `stemu`, `stemux`, `stemx`.
    fn insert_addressing_modes(
        &mut self,
        stem: &str,
        form: MemoryForm,
        make: fn(MemoryForm) -> Translator,
    ) {
        for (suffix, update, indexed) in [
            ("", false, false),
            ("u", true, false),
            ("ux", true, true),
            ("x", false, true),
        ] {
            self.insert(
                format!("{stem}{suffix}"),
                make(form.with_update(update).with_indexed(indexed)),
            );
        }
    }

    fn register_system(&mut self) {
        for name in NOPS {
            self.insert(name, Translator::Nop);
        }

        for (name, op) in [
            ("crand", CrLogicOp::And),
            ("crandc", CrLogicOp::AndComplement),
            ("creqv", CrLogicOp::Equivalent),
            ("crnand", CrLogicOp::Nand),
            ("crnor", CrLogicOp::Nor),
            ("cror", CrLogicOp::Or),
            ("crorc", CrLogicOp::OrComplement),
            ("crxor", CrLogicOp::Xor),
        ] {
            self.insert(name, Translator::CrLogic(op));
        }
        self.insert("crset", Translator::CrSet(true));
        self.insert("crclr", Translator::CrSet(false));
        self.insert("crmove", Translator::CrMove { invert: false });
        self.insert("crnot", Translator::CrMove { invert: true });
        self.insert("mcrf", Translator::MoveCrField);
        self.insert("mcrxr", Translator::MoveXerToCr);
        self.insert("mtcrf", Translator::MoveToCr { all_fields: false });
        self.insert("mtocrf", Translator::MoveToCr { all_fields: false });
        self.insert("mtcr", Translator::MoveToCr { all_fields: true });
        self.insert("mfcr", Translator::MoveFromCr { partial: false });
        self.insert("mfocrf", Translator::MoveFromCr { partial: true });

        for (suffix, spr) in [
            ("lr", SpecialRegister::Lr),
            ("ctr", SpecialRegister::Ctr),
            ("xer", SpecialRegister::Xer),
            ("msr", SpecialRegister::Msr),
        ] {
            self.insert(format!("mf{suffix}"), Translator::MoveFromSpr(SprSource::Fixed(spr)));
            self.insert(format!("mt{suffix}"), Translator::MoveToSpr(SprSource::Fixed(spr)));
        }
        self.insert("mftb", Translator::MoveFromSpr(SprSource::Fixed(SpecialRegister::Tbl)));
        self.insert("mftbu", Translator::MoveFromSpr(SprSource::Fixed(SpecialRegister::Tbu)));
        self.insert("mfspr", Translator::MoveFromSpr(SprSource::Numbered));
        self.insert("mtspr", Translator::MoveToSpr(SprSource::Numbered));
        for (suffix, number, writable) in SPR_ALIASES {
            let spr = SprSource::Fixed(SpecialRegister::Numbered(number));
            self.insert(format!("mf{suffix}"), Translator::MoveFromSpr(spr));
            if writable {
                self.insert(format!("mt{suffix}"), Translator::MoveToSpr(spr));
            }
        }

        self.insert("mfsr", Translator::MoveFromSegment { indirect: false });
        self.insert("mfsrin", Translator::MoveFromSegment { indirect: true });
        self.insert("mtsr", Translator::MoveToSegment { indirect: false });
        self.insert("mtsrin", Translator::MoveToSegment { indirect: true });
        self.insert("rfi", Translator::ReturnFromInterrupt);
    }

    pub fn get(&self, mnemonic: &str) -> Option<Translator> {
        self.table.get(mnemonic).copied()
    }

    pub fn is_supported(&self, mnemonic: &str) -> bool {
        self.table.contains_key(mnemonic)
    }

    /// Every registered mnemonic, sorted.
    pub fn mnemonics(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Lift one instruction.
    ///
    /// Undecodable instructions yield no code. Unregistered mnemonics yield a
    /// single `UNKNOWN` so the address stays covered.
    pub fn translate(
        &self,
        env: &mut TranslationEnvironment,
        instr: &NativeInstruction,
        extensions: &[&dyn TranslationExtension],
    ) -> Result<Vec<ReilInstruction>> {
        let Some(mnemonic) = instr.mnemonic.as_deref() else {
            return Ok(Vec::new());
        };

        let mut builder = ReilBuilder::new(instr.address);
        let Some(translator) = self.get(mnemonic) else {
            debug!(address = instr.address, mnemonic, "unknown mnemonic");
            builder.unknown();
            return Ok(builder.build());
        };

        translator.translate(&mut builder, env, instr)?;
        let mut instructions = builder.build();
        for extension in extensions {
            extension.post_process(env, instr, &mut instructions)?;
        }

        if instructions.len() as u64 > SUB_ADDRESS_SPACE {
            return Err(TranslationError::AddressSpaceExhausted {
                address: instr.address,
                count: instructions.len(),
                limit: SUB_ADDRESS_SPACE,
            });
        }

        trace!(
            address = instr.address,
            mnemonic,
            count = instructions.len(),
            "translated"
        );
        Ok(instructions)
    }
}

impl Default for TranslatorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lift one instruction with the shared registry.
pub fn translate(
    env: &mut TranslationEnvironment,
    instr: &NativeInstruction,
    extensions: &[&dyn TranslationExtension],
) -> Result<Vec<ReilInstruction>> {
    TranslatorRegistry::global().translate(env, instr, extensions)
}
