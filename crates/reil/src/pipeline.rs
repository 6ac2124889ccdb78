//! Parallel lifting of whole listings.

use std::time::Instant;

use rayon::prelude::*;
use reil_ir::ReilOpcode;
use tracing::{debug, info_span};

use crate::{
    Error, NativeInstruction, ReilInstruction, Result, TranslationEnvironment,
    TranslationExtension, TranslatorRegistry,
};

/// How lifted code is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Every REIL instruction under its native instruction.
    #[default]
    Text,
    /// Totals only.
    Summary,
}

/// Lifting configuration.
#[derive(Clone, Debug, Default)]
pub struct LiftConfig {
    /// Worker threads. 0 uses every core.
    pub jobs: usize,
    pub format: OutputFormat,
}

impl LiftConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Effective worker count.
    pub fn job_count(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get().max(1)
        } else {
            self.jobs
        }
    }
}

/// A native instruction together with its REIL code.
#[derive(Clone, Debug)]
pub struct LiftedInstruction {
    pub native: NativeInstruction,
    pub ir: Vec<ReilInstruction>,
}

impl LiftedInstruction {
    /// True for the single-`UNKNOWN` placeholder of an unregistered mnemonic.
    pub fn is_unknown(&self) -> bool {
        matches!(self.ir.as_slice(), [only] if only.opcode == ReilOpcode::Unknown)
    }
}

/// Lifts listings with the shared registry and a set of extensions.
pub struct Pipeline {
    config: LiftConfig,
    registry: &'static TranslatorRegistry,
    extensions: Vec<Box<dyn TranslationExtension>>,
}

impl Pipeline {
    pub fn new(config: LiftConfig) -> Self {
        Self {
            config,
            registry: TranslatorRegistry::global(),
            extensions: Vec::new(),
        }
    }

    /// Run `extension` after every translation, in registration order.
    #[must_use]
    pub fn with_extension(mut self, extension: Box<dyn TranslationExtension>) -> Self {
        self.extensions.push(extension);
        self
    }

    pub const fn config(&self) -> &LiftConfig {
        &self.config
    }

    /// Lift every instruction. Results keep listing order.
    ///
    /// # Errors
    ///
    /// Returns the first translation failure, tagged with its native address.
    pub fn lift(&self, listing: &[NativeInstruction]) -> Result<Vec<LiftedInstruction>> {
        let jobs = self.config.job_count();
        let _span = info_span!("lift", instructions = listing.len(), jobs).entered();
        let start = Instant::now();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        let extensions: Vec<&dyn TranslationExtension> =
            self.extensions.iter().map(AsRef::as_ref).collect();
        let registry = self.registry;

        let lifted = pool.install(|| {
            listing
                .par_iter()
                .map(|native| {
                    let mut env = TranslationEnvironment::new();
                    let ir = registry
                        .translate(&mut env, native, &extensions)
                        .map_err(|source| Error::Translation {
                            address: native.address,
                            source,
                        })?;
                    Ok(LiftedInstruction {
                        native: native.clone(),
                        ir,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let elapsed = start.elapsed().as_secs_f64();
        crate::metrics::record_lift(&lifted, elapsed);
        debug!(
            native = lifted.len(),
            reil = lifted.iter().map(|l| l.ir.len()).sum::<usize>(),
            "lifted listing"
        );
        Ok(lifted)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(LiftConfig::default())
    }
}

/// Totals over a lifted listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiftSummary {
    pub native: usize,
    pub reil: usize,
    pub unknown: usize,
    pub undecodable: usize,
}

impl LiftSummary {
    pub fn of(lifted: &[LiftedInstruction]) -> Self {
        lifted.iter().fold(Self::default(), |mut acc, l| {
            acc.native += 1;
            acc.reil += l.ir.len();
            if l.is_unknown() {
                acc.unknown += 1;
            }
            if l.native.mnemonic.is_none() {
                acc.undecodable += 1;
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_listing;

    const LISTING: &str = "\
0x1000: addi r3, r3, 1
0x1004: frsp f1, f2
0x1008: .long 0x0
0x100c: add. r4, r3, r3
0x1010: blr
";

    #[test]
    fn test_lift_keeps_listing_order() {
        let listing = parse_listing(LISTING).unwrap();
        let lifted = Pipeline::new(LiftConfig::new().with_jobs(4))
            .lift(&listing)
            .unwrap();
        assert_eq!(lifted.len(), 5);
        for (l, native) in lifted.iter().zip(&listing) {
            assert_eq!(l.native.address, native.address);
            for ir in &l.ir {
                assert_eq!(ir.address.native(), native.address);
            }
        }
        assert!(lifted[1].is_unknown());
        assert!(lifted[2].ir.is_empty());
        assert!(!lifted[3].is_unknown());
    }

    #[test]
    fn test_summary() {
        let listing = parse_listing(LISTING).unwrap();
        let lifted = Pipeline::default().lift(&listing).unwrap();
        let summary = LiftSummary::of(&lifted);
        assert_eq!(summary.native, 5);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.undecodable, 1);
        assert_eq!(
            summary.reil,
            lifted.iter().map(|l| l.ir.len()).sum::<usize>()
        );
    }

    #[test]
    fn test_translation_error_tagged_with_address() {
        let listing = parse_listing("0x1000: nop\n0x2000: addi r3, r3\n").unwrap();
        let err = Pipeline::default().lift(&listing).unwrap_err();
        assert!(matches!(err, Error::Translation { address: 0x2000, .. }));
    }

    struct Marker;

    impl TranslationExtension for Marker {
        fn name(&self) -> &str {
            "marker"
        }

        fn post_process(
            &self,
            _env: &mut TranslationEnvironment,
            instr: &NativeInstruction,
            instructions: &mut Vec<ReilInstruction>,
        ) -> reil_ppc::Result<()> {
            let mut builder = reil_ir::ReilBuilder::new(instr.address);
            for _ in 0..instructions.len() {
                builder.nop();
            }
            builder.nop();
            if let Some(last) = builder.build().pop() {
                instructions.push(last);
            }
            Ok(())
        }
    }

    #[test]
    fn test_extensions_run_for_every_instruction() {
        let listing = parse_listing("0x1000: li r3, 1\n0x1004: li r4, 2\n").unwrap();
        let plain = Pipeline::default().lift(&listing).unwrap();
        let marked = Pipeline::default()
            .with_extension(Box::new(Marker))
            .lift(&listing)
            .unwrap();
        for (a, b) in plain.iter().zip(&marked) {
            assert_eq!(b.ir.len(), a.ir.len() + 1);
            assert_eq!(b.ir.last().map(|i| i.opcode), Some(ReilOpcode::Nop));
        }
    }

    #[test]
    fn test_job_count() {
        assert!(LiftConfig::new().job_count() >= 1);
        assert_eq!(LiftConfig::new().with_jobs(3).job_count(), 3);
    }
}
