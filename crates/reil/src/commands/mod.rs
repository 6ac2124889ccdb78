//! Command implementations.

mod eval;
mod lift;

use reil::{EvalConfig, LiftConfig};

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Lift { .. } => handle_lift(cli),
        Commands::Eval { .. } => handle_eval(cli),
    }
}

fn handle_lift(cli: &Cli) -> i32 {
    let Commands::Lift {
        input,
        jobs,
        format,
    } = &cli.command
    else {
        unreachable!("lift command variant mismatch");
    };

    let config = LiftConfig::new()
        .with_jobs(*jobs)
        .with_format((*format).into());
    lift::cmd_lift(input, &config)
}

fn handle_eval(cli: &Cli) -> i32 {
    let Commands::Eval {
        input,
        registers,
        memory,
        max_steps,
    } = &cli.command
    else {
        unreachable!("eval command variant mismatch");
    };

    let config = registers
        .iter()
        .fold(EvalConfig::new(), |config, (name, value)| {
            config.with_register(name, *value)
        });
    let config = memory
        .iter()
        .fold(config, |config, &(address, value)| {
            config.with_word(address, value)
        })
        .with_step_limit(*max_steps);
    eval::cmd_eval(input, &config)
}
