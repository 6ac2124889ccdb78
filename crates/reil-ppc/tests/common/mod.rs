#![allow(dead_code)]

use reil_interp::{Outcome, ReilInterpreter};
use reil_ir::ReilInstruction;
use reil_ppc::{
    CTR, LR, NativeInstruction, TranslationEnvironment, XER_CA, XER_OV, XER_SO, cr_bit_name, gpr,
    translate,
};

/// Native address every test instruction lives at.
pub const ADDRESS: u64 = 0x1000;

pub fn lift_at(address: u64, text: &str) -> Vec<ReilInstruction> {
    let instr = NativeInstruction::parse(address, text).unwrap();
    let mut env = TranslationEnvironment::new();
    translate(&mut env, &instr, &[]).unwrap_or_else(|err| panic!("{text}: {err}"))
}

pub fn lift(text: &str) -> Vec<ReilInstruction> {
    lift_at(ADDRESS, text)
}

/// Interpreter with every GPR, CR bit, XER flag, LR and CTR zeroed, then
/// `overrides` applied.
pub fn machine(overrides: &[(&str, u64)]) -> ReilInterpreter {
    let mut interp = ReilInterpreter::new();
    for r in 0..32 {
        interp.set_register(&gpr(r), 0);
    }
    for bit in 0..32 {
        interp.set_register(cr_bit_name(bit), 0);
    }
    for name in [XER_SO, XER_OV, XER_CA, LR, CTR] {
        interp.set_register(name, 0);
    }
    for &(name, value) in overrides {
        interp.set_register(name, value);
    }
    interp
}

pub fn run(interp: &mut ReilInterpreter, text: &str) -> Outcome {
    let code = lift(text);
    interp
        .run(&code)
        .unwrap_or_else(|err| panic!("{text}: {err}"))
}

pub fn execute(text: &str, overrides: &[(&str, u64)]) -> (ReilInterpreter, Outcome) {
    let mut interp = machine(overrides);
    let outcome = run(&mut interp, text);
    (interp, outcome)
}
