//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use reil::OutputFormat;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "reil")]
#[command(about = "PowerPC to REIL lifter - lifts disassembly listings and evaluates them")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lift a listing and print its REIL code
    Lift {
        /// Listing file (`ADDRESS: mnemonic operands` per line)
        #[arg(value_name = "LISTING")]
        input: PathBuf,

        /// Number of parallel lift jobs (0 = auto)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },

    /// Lift a listing, execute it from the first instruction and print the final registers
    Eval {
        /// Listing file (`ADDRESS: mnemonic operands` per line)
        #[arg(value_name = "LISTING")]
        input: PathBuf,

        /// Initial register value (e.g. r3=5, lr=0x8000); repeatable
        #[arg(long = "reg", value_name = "NAME=VALUE", value_parser = parse_register)]
        registers: Vec<(String, u64)>,

        /// Initial 32-bit memory word (e.g. 0x2000=0xdeadbeef); repeatable
        #[arg(long = "mem", value_name = "ADDR=VALUE", value_parser = parse_memory_word)]
        memory: Vec<(u64, u32)>,

        /// Maximum number of native instructions to execute
        #[arg(long, default_value_t = reil::DEFAULT_NATIVE_STEP_LIMIT)]
        max_steps: usize,
    },
}

/// Output format for `lift`.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum FormatArg {
    /// Every REIL instruction
    #[default]
    Text,
    /// Totals only
    Summary,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Summary => Self::Summary,
        }
    }
}

/// Parse a decimal, `0x` hex or negative number. Negative values wrap to 32 bits.
pub fn parse_number(text: &str) -> Result<u64, String> {
    let text = text.trim();
    let (negative, digits) = text
        .strip_prefix('-')
        .map_or((false, text), |rest| (true, rest));
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => digits.parse::<u64>(),
    }
    .map_err(|e| format!("invalid number '{text}': {e}"))?;

    if negative {
        let value = u32::try_from(value).map_err(|_| format!("'{text}' out of range"))?;
        Ok(u64::from(value.wrapping_neg()))
    } else {
        Ok(value)
    }
}

/// Parse `NAME=VALUE`.
pub fn parse_register(arg: &str) -> Result<(String, u64), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid register '{arg}', expected NAME=VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid register '{arg}', empty name"));
    }
    Ok((name.to_string(), parse_number(value)?))
}

/// Parse `ADDR=VALUE` for a 32-bit word.
pub fn parse_memory_word(arg: &str) -> Result<(u64, u32), String> {
    let (address, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid memory word '{arg}', expected ADDR=VALUE"))?;
    let address = parse_number(address)?;
    let value = u32::try_from(parse_number(value)?)
        .map_err(|_| format!("memory value in '{arg}' does not fit in 32 bits"))?;
    Ok((address, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Ok(42));
        assert_eq!(parse_number("0x2000"), Ok(0x2000));
        assert_eq!(parse_number("-1"), Ok(0xffff_ffff));
        assert_eq!(parse_number("-0x10"), Ok(0xffff_fff0));
        assert!(parse_number("zz").is_err());
        assert!(parse_number("-0x100000000").is_err());
    }

    #[test]
    fn test_parse_assignments() {
        assert_eq!(parse_register("r3=5"), Ok(("r3".to_string(), 5)));
        assert_eq!(parse_register("lr = 0x8000"), Ok(("lr".to_string(), 0x8000)));
        assert!(parse_register("r3").is_err());
        assert!(parse_register("=1").is_err());

        assert_eq!(
            parse_memory_word("0x2000=0xdeadbeef"),
            Ok((0x2000, 0xdead_beef))
        );
        assert!(parse_memory_word("0x2000=0x100000000").is_err());
    }

    #[test]
    fn test_cli_parses_eval() {
        let cli = Cli::try_parse_from([
            "reil", "eval", "prog.s", "--reg", "r3=1", "--reg", "sp=0x2000", "--mem",
            "0x2000=7", "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Eval {
            registers, memory, ..
        } = cli.command
        else {
            panic!("expected eval");
        };
        assert_eq!(registers.len(), 2);
        assert_eq!(memory, vec![(0x2000, 7)]);
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        assert!(Cli::try_parse_from(["reil", "-v", "-s", "lift", "prog.s"]).is_err());
    }
}
