//! Sparse byte-addressed memory.

use rustc_hash::FxHashMap;

/// Sparse memory with big-endian multi-byte accesses.
///
/// Bytes that were never written read as zero.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    bytes: FxHashMap<u64, u8>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one byte.
    pub fn read_u8(&self, addr: u64) -> u8 {
        self.bytes.get(&addr).copied().unwrap_or(0)
    }

    /// Write one byte.
    pub fn write_u8(&mut self, addr: u64, value: u8) {
        self.bytes.insert(addr, value);
    }

    /// Read `len` bytes (at most 8) as a big-endian value.
    pub fn load(&self, addr: u64, len: usize) -> u64 {
        (0..len as u64).fold(0, |acc, i| {
            (acc << 8) | u64::from(self.read_u8(addr.wrapping_add(i)))
        })
    }

    /// Write the low `len` bytes (at most 8) of `value` big-endian.
    pub fn store(&mut self, addr: u64, value: u64, len: usize) {
        for i in 0..len {
            let shift = 8 * (len - 1 - i);
            self.write_u8(addr.wrapping_add(i as u64), (value >> shift) as u8);
        }
    }

    /// Whether the byte at `addr` has been written.
    pub fn is_written(&self, addr: u64) -> bool {
        self.bytes.contains_key(&addr)
    }

    /// Written bytes in address order.
    pub fn dump(&self) -> Vec<(u64, u8)> {
        let mut bytes: Vec<_> = self.bytes.iter().map(|(&a, &v)| (a, v)).collect();
        bytes.sort_unstable();
        bytes
    }
}
