//! REIL builder.
//!
//! Appends micro-operations for one native instruction, assigning
//! consecutive sub-addresses as it goes.

use crate::address::ReilAddress;
use crate::instr::{META_IS_CALL, ReilInstruction};
use crate::opcode::ReilOpcode;
use crate::operand::ReilOperand;

/// An unresolved `jcc` emitted by [`ReilBuilder::jcc_forward`].
///
/// Only the builder mints these and patching consumes them, so every patch
/// lands on a forward jump exactly once.
#[must_use]
#[derive(Debug)]
pub struct ForwardJump(usize);

/// Accumulates the REIL code of a single native instruction.
pub struct ReilBuilder {
    native: u64,
    instructions: Vec<ReilInstruction>,
}

impl ReilBuilder {
    /// Create a builder for the native instruction at `native`.
    pub const fn new(native: u64) -> Self {
        Self {
            native,
            instructions: Vec::new(),
        }
    }

    /// Native address the code is emitted for.
    pub const fn native_address(&self) -> u64 {
        self.native
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Address the next emitted instruction will get.
    pub fn next_address(&self) -> ReilAddress {
        ReilAddress::new(self.native, self.instructions.len() as u64)
    }

    /// Emit an instruction and return its index.
    pub fn emit(
        &mut self,
        opcode: ReilOpcode,
        first: ReilOperand,
        second: ReilOperand,
        third: ReilOperand,
    ) -> usize {
        let address = self.next_address();
        self.instructions
            .push(ReilInstruction::new(address, opcode, first, second, third));
        self.instructions.len() - 1
    }

    pub fn add(&mut self, a: ReilOperand, b: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Add, a, b, dst);
    }

    pub fn sub(&mut self, a: ReilOperand, b: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Sub, a, b, dst);
    }

    pub fn mul(&mut self, a: ReilOperand, b: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Mul, a, b, dst);
    }

    pub fn div(&mut self, a: ReilOperand, b: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Div, a, b, dst);
    }

    pub fn modulo(&mut self, a: ReilOperand, b: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Mod, a, b, dst);
    }

    /// Shift `value` left by `amount`, or right when `amount` is negative.
    pub fn bsh(&mut self, value: ReilOperand, amount: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Bsh, value, amount, dst);
    }

    pub fn and(&mut self, a: ReilOperand, b: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::And, a, b, dst);
    }

    pub fn or(&mut self, a: ReilOperand, b: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Or, a, b, dst);
    }

    pub fn xor(&mut self, a: ReilOperand, b: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Xor, a, b, dst);
    }

    pub fn bisz(&mut self, value: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Bisz, value, ReilOperand::empty(), dst);
    }

    pub fn str(&mut self, value: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Str, value, ReilOperand::empty(), dst);
    }

    /// Load `dst.size` bytes from memory at `address`.
    pub fn ldm(&mut self, address: ReilOperand, dst: ReilOperand) {
        self.emit(ReilOpcode::Ldm, address, ReilOperand::empty(), dst);
    }

    /// Store `value.size` bytes to memory at `address`.
    pub fn stm(&mut self, value: ReilOperand, address: ReilOperand) {
        self.emit(ReilOpcode::Stm, value, ReilOperand::empty(), address);
    }

    /// Conditional jump; returns the index so the target can be patched.
    pub fn jcc(&mut self, condition: ReilOperand, target: ReilOperand) -> usize {
        self.emit(ReilOpcode::Jcc, condition, ReilOperand::empty(), target)
    }

    /// Conditional jump tagged as a call.
    pub fn call(&mut self, condition: ReilOperand, target: ReilOperand) -> usize {
        let index = self.jcc(condition, target);
        self.instructions[index]
            .metadata
            .insert(META_IS_CALL.to_string(), "true".to_string());
        index
    }

    /// Jump within this instruction to an address not yet emitted.
    ///
    /// The target is a placeholder until the returned token is handed to
    /// [`Self::patch_jump`].
    pub fn jcc_forward(&mut self, condition: ReilOperand) -> ForwardJump {
        let placeholder = ReilOperand::sub_address(self.next_address());
        ForwardJump(self.jcc(condition, placeholder))
    }

    /// Resolve a jump minted by [`Self::jcc_forward`] to `target`.
    pub fn patch_jump(&mut self, jump: ForwardJump, target: ReilAddress) {
        if let Some(instr) = self.instructions.get_mut(jump.0) {
            instr.third = ReilOperand::sub_address(target);
        }
    }

    pub fn nop(&mut self) {
        self.emit(
            ReilOpcode::Nop,
            ReilOperand::empty(),
            ReilOperand::empty(),
            ReilOperand::empty(),
        );
    }

    pub fn unknown(&mut self) {
        self.emit(
            ReilOpcode::Unknown,
            ReilOperand::empty(),
            ReilOperand::empty(),
            ReilOperand::empty(),
        );
    }

    /// Finish and return the emitted instructions.
    pub fn build(self) -> Vec<ReilInstruction> {
        self.instructions
    }
}
