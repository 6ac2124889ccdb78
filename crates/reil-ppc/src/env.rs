//! Per-call translation environment.

/// Mints temporary register names for one translation call.
///
/// Temporaries are `t0`, `t1`, ... and never collide with architectural
/// register names.
#[derive(Debug, Default)]
pub struct TranslationEnvironment {
    next: u32,
}

impl TranslationEnvironment {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Fresh temporary name.
    pub fn next_temp(&mut self) -> String {
        let name = format!("t{}", self.next);
        self.next += 1;
        name
    }

    /// Number of temporaries minted so far.
    pub const fn temps_issued(&self) -> u32 {
        self.next
    }
}
