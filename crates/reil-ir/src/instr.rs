//! Single REIL instruction.

use std::collections::BTreeMap;
use std::fmt;

use crate::address::ReilAddress;
use crate::opcode::ReilOpcode;
use crate::operand::ReilOperand;

/// Metadata key marking a jump as a subroutine call.
pub const META_IS_CALL: &str = "isCall";

/// One REIL micro-operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReilInstruction {
    pub address: ReilAddress,
    pub opcode: ReilOpcode,
    pub first: ReilOperand,
    pub second: ReilOperand,
    pub third: ReilOperand,
    /// Free-form tags. Only `isCall` is produced by the lifter.
    pub metadata: BTreeMap<String, String>,
}

impl ReilInstruction {
    /// Create an instruction without metadata.
    pub const fn new(
        address: ReilAddress,
        opcode: ReilOpcode,
        first: ReilOperand,
        second: ReilOperand,
        third: ReilOperand,
    ) -> Self {
        Self {
            address,
            opcode,
            first,
            second,
            third,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata tag.
    #[must_use]
    pub fn with_meta(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// Check if this jump is tagged as a call.
    pub fn is_call(&self) -> bool {
        self.metadata.get(META_IS_CALL).is_some_and(|v| v == "true")
    }

    /// Register written by this instruction, if any.
    pub fn written_register(&self) -> Option<&str> {
        if self.opcode.writes_register() {
            self.third.register_name()
        } else {
            None
        }
    }
}

impl fmt::Display for ReilInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}, {}, {}]",
            self.address, self.opcode, self.first, self.second, self.third
        )?;
        for (key, value) in &self.metadata {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}
