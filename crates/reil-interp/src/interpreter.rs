//! REIL evaluation.

use reil_ir::{OperandKind, ReilAddress, ReilInstruction, ReilOpcode, ReilOperand};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{InterpreterError, Result};
use crate::memory::Memory;

/// Default bound on executed REIL instructions per run.
pub const DEFAULT_STEP_LIMIT: usize = 1 << 16;

/// How a REIL sequence finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Ran off the end; execution continues at the next native instruction.
    FallThrough,
    /// Jumped to a native address.
    Branch { target: u64, is_call: bool },
}

/// Register file plus memory.
#[derive(Clone, Debug)]
pub struct ReilInterpreter {
    registers: FxHashMap<String, u64>,
    memory: Memory,
    step_limit: usize,
}

impl Default for ReilInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReilInterpreter {
    pub fn new() -> Self {
        Self {
            registers: FxHashMap::default(),
            memory: Memory::new(),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Set the maximum number of REIL instructions one run may execute.
    #[must_use]
    pub const fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn set_register(&mut self, name: &str, value: u64) {
        self.registers.insert(name.to_string(), value);
    }

    pub fn register(&self, name: &str) -> Option<u64> {
        self.registers.get(name).copied()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.registers.contains_key(name)
    }

    /// Architectural registers in name order, temporaries excluded.
    ///
    /// Temporaries are the names minted by the lifter: `t` followed by digits.
    pub fn architectural_registers(&self) -> Vec<(&str, u64)> {
        let mut regs: Vec<_> = self
            .registers
            .iter()
            .filter(|(name, _)| !is_temporary(name))
            .map(|(name, &value)| (name.as_str(), value))
            .collect();
        regs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        regs
    }

    /// Drop all temporaries left behind by previous runs.
    pub fn clear_temporaries(&mut self) {
        self.registers.retain(|name, _| !is_temporary(name));
    }

    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Execute the REIL code of one native instruction.
    ///
    /// Jumps to sub-addresses of the same native instruction stay inside the
    /// sequence; a sub-address one past the last instruction ends it.
    pub fn run(&mut self, code: &[ReilInstruction]) -> Result<Outcome> {
        let mut pc = 0;
        let mut steps = 0;

        while let Some(instr) = code.get(pc) {
            steps += 1;
            if steps > self.step_limit {
                return Err(InterpreterError::StepLimitExceeded(self.step_limit));
            }
            trace!(%instr, "step");

            match self.step(instr)? {
                Flow::Next => pc += 1,
                Flow::Local(target) => pc = local_index(code, instr, target)?,
                Flow::Native { target, is_call } => {
                    return Ok(Outcome::Branch { target, is_call });
                }
            }
        }
        Ok(Outcome::FallThrough)
    }

    fn step(&mut self, instr: &ReilInstruction) -> Result<Flow> {
        let op = instr.opcode;
        match op {
            ReilOpcode::Add
            | ReilOpcode::Sub
            | ReilOpcode::Mul
            | ReilOpcode::Div
            | ReilOpcode::Mod
            | ReilOpcode::Bsh
            | ReilOpcode::And
            | ReilOpcode::Or
            | ReilOpcode::Xor => {
                let a = self.read(instr, 0)?;
                let b = self.read(instr, 1)?;
                let value = match op {
                    ReilOpcode::Add => a.wrapping_add(b),
                    ReilOpcode::Sub => a.wrapping_sub(b),
                    ReilOpcode::Mul => a.wrapping_mul(b),
                    ReilOpcode::Div => a
                        .checked_div(b)
                        .ok_or(InterpreterError::DivisionByZero(instr.address))?,
                    ReilOpcode::Mod => a
                        .checked_rem(b)
                        .ok_or(InterpreterError::DivisionByZero(instr.address))?,
                    ReilOpcode::Bsh => shift(a, instr.second.size.sign_extend(b)),
                    ReilOpcode::And => a & b,
                    ReilOpcode::Or => a | b,
                    _ => a ^ b,
                };
                self.write(instr, value)?;
                Ok(Flow::Next)
            }
            ReilOpcode::Bisz => {
                let value = self.read(instr, 0)?;
                self.write(instr, u64::from(value == 0))?;
                Ok(Flow::Next)
            }
            ReilOpcode::Str => {
                let value = self.read(instr, 0)?;
                self.write(instr, value)?;
                Ok(Flow::Next)
            }
            ReilOpcode::Ldm => {
                let addr = self.read(instr, 0)?;
                let value = self.memory.load(addr, instr.third.size.bytes());
                self.write(instr, value)?;
                Ok(Flow::Next)
            }
            ReilOpcode::Stm => {
                let value = self.read(instr, 0)?;
                let addr = self.read(instr, 2)?;
                self.memory.store(addr, value, instr.first.size.bytes());
                Ok(Flow::Next)
            }
            ReilOpcode::Jcc => {
                if self.read(instr, 0)? == 0 {
                    return Ok(Flow::Next);
                }
                match instr.third.kind {
                    OperandKind::SubAddress(target)
                        if target.native() == instr.address.native() =>
                    {
                        Ok(Flow::Local(target))
                    }
                    OperandKind::SubAddress(target) => Ok(Flow::Native {
                        target: target.native(),
                        is_call: instr.is_call(),
                    }),
                    _ => Ok(Flow::Native {
                        target: self.read(instr, 2)?,
                        is_call: instr.is_call(),
                    }),
                }
            }
            ReilOpcode::Nop => Ok(Flow::Next),
            ReilOpcode::Unknown => Err(InterpreterError::UnknownInstruction(instr.address)),
        }
    }

    fn read(&self, instr: &ReilInstruction, index: usize) -> Result<u64> {
        let operand = operand(instr, index);
        match &operand.kind {
            OperandKind::Literal(value) => Ok(operand.size.truncate(*value)),
            OperandKind::Register(name) => self
                .registers
                .get(name)
                .map(|&value| operand.size.truncate(value))
                .ok_or_else(|| InterpreterError::UndefinedRegister {
                    register: name.clone(),
                    address: instr.address,
                }),
            OperandKind::Empty | OperandKind::SubAddress(_) => {
                Err(InterpreterError::InvalidOperand {
                    index,
                    address: instr.address,
                })
            }
        }
    }

    fn write(&mut self, instr: &ReilInstruction, value: u64) -> Result<()> {
        let OperandKind::Register(name) = &instr.third.kind else {
            return Err(InterpreterError::InvalidOperand {
                index: 2,
                address: instr.address,
            });
        };
        self.registers
            .insert(name.clone(), instr.third.size.truncate(value));
        Ok(())
    }
}

enum Flow {
    Next,
    Local(ReilAddress),
    Native { target: u64, is_call: bool },
}

const fn operand(instr: &ReilInstruction, index: usize) -> &ReilOperand {
    match index {
        0 => &instr.first,
        1 => &instr.second,
        _ => &instr.third,
    }
}

fn is_temporary(name: &str) -> bool {
    name.strip_prefix('t')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

fn shift(value: u64, amount: i64) -> u64 {
    match amount {
        0 => value,
        1..=63 => value << amount,
        -63..=-1 => value >> -amount,
        _ => 0,
    }
}

/// Index of the first instruction at or after `target`.
fn local_index(
    code: &[ReilInstruction],
    from: &ReilInstruction,
    target: ReilAddress,
) -> Result<usize> {
    if target <= from.address {
        return Err(InterpreterError::InvalidJumpTarget {
            target,
            address: from.address,
        });
    }
    Ok(code
        .iter()
        .position(|instr| instr.address >= target)
        .unwrap_or(code.len()))
}
