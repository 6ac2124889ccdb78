//! Straight-line evaluation of lifted listings.

use reil_ppc::{CTR, LR, XER_CA, XER_OV, XER_SO, cr_bit_name, gpr, normalize_register};
use rustc_hash::FxHashMap;
use tracing::{debug, info_span, trace};

use crate::{Error, LiftedInstruction, Outcome, ReilInterpreter, Result};

/// Default bound on executed native instructions.
pub const DEFAULT_NATIVE_STEP_LIMIT: usize = 1 << 20;

/// Initial machine state and limits for [`evaluate`].
#[derive(Clone, Debug)]
pub struct EvalConfig {
    registers: Vec<(String, u64)>,
    memory: Vec<(u64, u32)>,
    step_limit: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            registers: Vec::new(),
            memory: Vec::new(),
            step_limit: DEFAULT_NATIVE_STEP_LIMIT,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a register. Accepts any spelling the lifter accepts (`r3`, `sp`, `lr`).
    #[must_use]
    pub fn with_register(mut self, name: &str, value: u64) -> Self {
        self.registers.push((normalize_register(name), value));
        self
    }

    /// Preset a big-endian 32-bit word in memory.
    #[must_use]
    pub fn with_word(mut self, address: u64, value: u32) -> Self {
        self.memory.push((address, value));
        self
    }

    #[must_use]
    pub const fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }
}

/// Why evaluation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Fell through past the last instruction of the listing.
    End,
    /// Branched to an address outside the listing.
    Branch { target: u64, is_call: bool },
    /// Ran the configured number of native instructions.
    StepLimit,
}

/// Final state of an evaluation.
#[derive(Debug)]
pub struct Evaluation {
    pub machine: ReilInterpreter,
    pub steps: usize,
    pub termination: Termination,
}

/// Interpreter with every GPR, CR bit, XER flag, LR and CTR zeroed.
pub fn zeroed_machine() -> ReilInterpreter {
    let mut machine = ReilInterpreter::new();
    for r in 0..32 {
        machine.set_register(&gpr(r), 0);
    }
    for bit in 0..32 {
        machine.set_register(cr_bit_name(bit), 0);
    }
    for name in [XER_SO, XER_OV, XER_CA, LR, CTR] {
        machine.set_register(name, 0);
    }
    machine
}

/// Execute a lifted listing from its first instruction.
///
/// Native branches whose target is in the listing are followed; any other
/// target ends the run.
///
/// # Errors
///
/// Returns interpreter failures tagged with the native address, including
/// `UNKNOWN` placeholders reached during execution.
pub fn evaluate(lifted: &[LiftedInstruction], config: &EvalConfig) -> Result<Evaluation> {
    let _span = info_span!("eval", instructions = lifted.len()).entered();

    let mut machine = zeroed_machine();
    for (name, value) in &config.registers {
        machine.set_register(name, *value);
    }
    for &(address, value) in &config.memory {
        machine.memory_mut().store(address, u64::from(value), 4);
    }

    let index: FxHashMap<u64, usize> = lifted
        .iter()
        .enumerate()
        .map(|(i, l)| (l.native.address, i))
        .collect();

    let mut pc = 0;
    let mut steps = 0;
    let termination = loop {
        let Some(current) = lifted.get(pc) else {
            break Termination::End;
        };
        if steps >= config.step_limit {
            break Termination::StepLimit;
        }
        steps += 1;

        trace!(address = current.native.address, instr = %current.native, "step");
        machine.clear_temporaries();
        let outcome = machine
            .run(&current.ir)
            .map_err(|source| Error::Interpreter {
                address: current.native.address,
                source,
            })?;

        match outcome {
            Outcome::FallThrough => pc += 1,
            Outcome::Branch { target, is_call } => match index.get(&target) {
                Some(&next) => pc = next,
                None => break Termination::Branch { target, is_call },
            },
        }
    };
    machine.clear_temporaries();

    crate::metrics::record_eval(steps);
    debug!(steps, ?termination, "evaluation finished");
    Ok(Evaluation {
        machine,
        steps,
        termination,
    })
}
