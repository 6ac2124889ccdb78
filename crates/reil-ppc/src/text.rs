//! Parsing assembler text into [`NativeInstruction`]s.
//!
//! Accepts the usual disassembler spelling: `lwz r3, 8(r1)`,
//! `bne- cr7, 0x1000`, `rlwinm r0,r9,2,0,29`. Register operands are kept as
//! written and interpreted by the translators; a trailing `<symbol>`
//! annotation on an operand is dropped.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ParseError;
use crate::instr::{NativeInstruction, Operand};

/// Markers disassemblers print for bytes they could not decode.
const UNDECODABLE: [&str; 3] = ["(bad)", ".long", ".word"];

impl NativeInstruction {
    /// Parse `mnemonic op, op, ...`.
    pub fn parse(address: u64, text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        let mut parts = text.splitn(2, char::is_whitespace);
        let mnemonic = parts.next().filter(|m| !m.is_empty()).ok_or(ParseError::Empty)?;
        if UNDECODABLE.contains(&mnemonic) {
            return Ok(Self::undecodable(address));
        }

        let operands = match parts.next().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(rest) => rest
                .split(',')
                .map(parse_operand)
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Self::new(address, &mnemonic.to_ascii_lowercase(), operands))
    }
}

/// Parse a single operand.
pub fn parse_operand(text: &str) -> Result<Operand, ParseError> {
    let symbol = SYMBOL_PATTERN.get_or_init(|| Regex::new(r"\s*<[^>]*>\s*$").unwrap());
    let text = symbol.replace(text.trim(), "");
    let text = text.trim();

    let immediate = IMMEDIATE_PATTERN
        .get_or_init(|| Regex::new(r"^[-+]?(?:0[xX][0-9a-fA-F]+|\d+)$").unwrap());
    if immediate.is_match(text) {
        return parse_immediate(text).map(Operand::Immediate);
    }

    let memory = MEMORY_PATTERN.get_or_init(|| {
        Regex::new(r"^([-+]?(?:0[xX][0-9a-fA-F]+|\d+))?\s*\(\s*(%?[A-Za-z0-9]+)\s*\)$").unwrap()
    });
    if let Some(caps) = memory.captures(text) {
        let displacement = match caps.get(1) {
            Some(value) => parse_immediate(value.as_str())?,
            None => 0,
        };
        let base = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ParseError::InvalidOperand(text.to_string()))?;
        return Ok(Operand::Memory { base, displacement });
    }

    let register = REGISTER_PATTERN
        .get_or_init(|| Regex::new(r"^%?[A-Za-z0-9_*+]*[A-Za-z][A-Za-z0-9_*+]*$").unwrap());
    if register.is_match(text) {
        return Ok(Operand::Register(text.to_string()));
    }

    Err(ParseError::InvalidOperand(text.to_string()))
}

/// Decimal or `0x` hex, optionally signed. Values must fit in 64 bits.
fn parse_immediate(text: &str) -> Result<i64, ParseError> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => digits.parse::<u64>(),
    }
    .map_err(|_| ParseError::ImmediateOutOfRange(text.to_string()))?;

    if negative {
        0i64.checked_sub_unsigned(magnitude)
            .ok_or_else(|| ParseError::ImmediateOutOfRange(text.to_string()))
    } else {
        i64::try_from(magnitude).map_err(|_| ParseError::ImmediateOutOfRange(text.to_string()))
    }
}

static SYMBOL_PATTERN: OnceLock<Regex> = OnceLock::new();
static IMMEDIATE_PATTERN: OnceLock<Regex> = OnceLock::new();
static MEMORY_PATTERN: OnceLock<Regex> = OnceLock::new();
static REGISTER_PATTERN: OnceLock<Regex> = OnceLock::new();

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(name: &str) -> Operand {
        Operand::Register(name.to_string())
    }

    #[test]
    fn test_parse_memory_operand() {
        let instr = NativeInstruction::parse(0x100, "lwz r3, -8(r1)").unwrap();
        assert_eq!(instr.mnemonic(), "lwz");
        assert_eq!(
            instr.operands,
            vec![
                reg("r3"),
                Operand::Memory {
                    base: "r1".into(),
                    displacement: -8
                }
            ]
        );

        let instr = NativeInstruction::parse(0, "stw %r0,0x10(sp)").unwrap();
        assert_eq!(
            instr.operands[1],
            Operand::Memory {
                base: "sp".into(),
                displacement: 16
            }
        );
        assert_eq!(
            parse_operand("(r9)").unwrap(),
            Operand::Memory {
                base: "r9".into(),
                displacement: 0
            }
        );
    }

    #[test]
    fn test_parse_immediates() {
        assert_eq!(parse_operand("42").unwrap(), Operand::Immediate(42));
        assert_eq!(parse_operand("-0x10").unwrap(), Operand::Immediate(-16));
        assert_eq!(parse_operand("0xFFFFFFFF").unwrap(), Operand::Immediate(0xFFFF_FFFF));
        assert_eq!(
            parse_operand("0x1000 <main+0x20>").unwrap(),
            Operand::Immediate(0x1000)
        );
        assert!(matches!(
            parse_operand("0x1ffffffffffffffff"),
            Err(ParseError::ImmediateOutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_registers() {
        let instr = NativeInstruction::parse(0, "BNE- cr7,0x2000").unwrap();
        assert_eq!(instr.mnemonic(), "bne-");
        assert_eq!(instr.operands, vec![reg("cr7"), Operand::Immediate(0x2000)]);
        assert_eq!(parse_operand("4*cr2+gt").unwrap(), reg("4*cr2+gt"));
        assert!(parse_operand("r3)").is_err());
    }

    #[test]
    fn test_parse_special_lines() {
        assert!(matches!(NativeInstruction::parse(0, "   "), Err(ParseError::Empty)));
        let bad = NativeInstruction::parse(0x40, ".long 0xdeadbeef").unwrap();
        assert_eq!(bad.mnemonic, None);
        let blr = NativeInstruction::parse(0x40, "blr").unwrap();
        assert!(blr.operands.is_empty());
    }
}
