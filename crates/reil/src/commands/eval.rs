//! Eval command.

use std::io::{self, Write};
use std::path::Path;

use reil::{EvalConfig, Evaluation, Pipeline, Termination};
use tracing::{error, info, warn};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Handle the `eval` command.
pub fn cmd_eval(input: &Path, config: &EvalConfig) -> i32 {
    info!(input = %input.display(), "evaluating");

    let result = reil::read_listing(input)
        .and_then(|listing| Pipeline::default().lift(&listing))
        .and_then(|lifted| reil::evaluate(&lifted, config));
    let evaluation = match result {
        Ok(evaluation) => evaluation,
        Err(e) => {
            error!(error = %e, "evaluation failed");
            return EXIT_FAILURE;
        }
    };

    match evaluation.termination {
        Termination::End => info!(steps = evaluation.steps, "reached end of listing"),
        Termination::Branch { target, is_call } => {
            info!(
                steps = evaluation.steps,
                destination = %format!("{target:#x}"),
                is_call,
                "left listing"
            );
        }
        Termination::StepLimit => warn!(steps = evaluation.steps, "step limit reached"),
    }

    let mut out = io::stdout().lock();
    if let Err(e) = write_state(&mut out, &evaluation).and_then(|()| out.flush()) {
        error!(error = %e, "failed to write output");
        return EXIT_FAILURE;
    }
    EXIT_SUCCESS
}

/// Final registers, then every written memory byte.
pub fn write_state(out: &mut impl Write, evaluation: &Evaluation) -> io::Result<()> {
    for (name, value) in evaluation.machine.architectural_registers() {
        writeln!(out, "{name:<8} {value:#010x}")?;
    }
    for (address, byte) in evaluation.machine.memory().dump() {
        writeln!(out, "[{address:#010x}] {byte:#04x}")?;
    }
    Ok(())
}
