//! Lift command.

use std::io::{self, Write};
use std::path::Path;

use reil::{LiftConfig, LiftSummary, LiftedInstruction, OutputFormat, Pipeline};
use tracing::{error, info};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Handle the `lift` command.
pub fn cmd_lift(input: &Path, config: &LiftConfig) -> i32 {
    info!(input = %input.display(), jobs = config.job_count(), "lifting");

    let listing = match reil::read_listing(input) {
        Ok(listing) => listing,
        Err(e) => {
            error!(error = %e, input = %input.display(), "failed to read listing");
            return EXIT_FAILURE;
        }
    };

    let lifted = match Pipeline::new(config.clone()).lift(&listing) {
        Ok(lifted) => lifted,
        Err(e) => {
            error!(error = %e, "lifting failed");
            return EXIT_FAILURE;
        }
    };

    let mut out = io::stdout().lock();
    let written = match config.format {
        OutputFormat::Text => write_text(&mut out, &lifted),
        OutputFormat::Summary => write_summary(&mut out, &LiftSummary::of(&lifted)),
    };
    if let Err(e) = written.and_then(|()| out.flush()) {
        error!(error = %e, "failed to write output");
        return EXIT_FAILURE;
    }

    let summary = LiftSummary::of(&lifted);
    if summary.unknown > 0 {
        info!(count = summary.unknown, "instructions lifted as UNKNOWN");
    }
    EXIT_SUCCESS
}

/// Each native instruction followed by its REIL code, indented.
pub fn write_text(out: &mut impl Write, lifted: &[LiftedInstruction]) -> io::Result<()> {
    for l in lifted {
        writeln!(out, "{}", l.native)?;
        for instr in &l.ir {
            writeln!(out, "    {instr}")?;
        }
    }
    Ok(())
}

pub fn write_summary(out: &mut impl Write, summary: &LiftSummary) -> io::Result<()> {
    writeln!(out, "native instructions: {}", summary.native)?;
    writeln!(out, "REIL instructions:   {}", summary.reil)?;
    writeln!(out, "unknown:             {}", summary.unknown)?;
    writeln!(out, "undecodable:         {}", summary.undecodable)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_text() {
        let listing = reil::parse_listing("0x1000: li r3, 1\n").unwrap();
        let lifted = Pipeline::default().lift(&listing).unwrap();
        let mut buf = Vec::new();
        write_text(&mut buf, &lifted).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("00001000: li r3, 0x1"));
        let ir = lines.next().unwrap();
        assert!(ir.starts_with("    00001000.00: "), "{ir}");
    }

    #[test]
    fn test_write_summary() {
        let summary = LiftSummary {
            native: 3,
            reil: 10,
            unknown: 1,
            undecodable: 0,
        };
        let mut buf = Vec::new();
        write_summary(&mut buf, &summary).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("native instructions: 3"));
        assert!(text.contains("unknown:             1"));
    }
}
