//! REIL instruction addresses.

use std::fmt;

/// Number of REIL addresses reserved for each native instruction.
pub const SUB_ADDRESS_SPACE: u64 = 0x100;

/// Address of a REIL instruction: `native * 0x100 + offset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReilAddress(u64);

impl ReilAddress {
    /// Address of the `offset`-th REIL instruction of a native instruction.
    pub const fn new(native: u64, offset: u64) -> Self {
        Self(native.wrapping_mul(SUB_ADDRESS_SPACE).wrapping_add(offset))
    }

    /// Wrap an already-encoded address.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Encoded value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Native instruction address this REIL address belongs to.
    pub const fn native(self) -> u64 {
        self.0 / SUB_ADDRESS_SPACE
    }

    /// Position within the native instruction's sub-address space.
    pub const fn offset(self) -> u64 {
        self.0 % SUB_ADDRESS_SPACE
    }
}

impl fmt::Display for ReilAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}.{:02X}", self.native(), self.offset())
    }
}
