//! Disassembly listings.
//!
//! One instruction per line, `ADDRESS: mnemonic operands`. The address is
//! hex with or without a `0x` prefix. Raw instruction bytes as printed by
//! objdump (`7c 63 1b 78`) may sit between the colon and the mnemonic.
//! Text after `#` or `;` is a comment. Blank lines and symbol labels
//! (`00001000 <main>:`) are skipped.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::{Error, NativeInstruction, Result};

/// Parse a whole listing.
pub fn parse_listing(text: &str) -> Result<Vec<NativeInstruction>> {
    let mut instructions = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        if let Some(instr) = parse_line(raw).map_err(|message| Error::Listing {
            line: index + 1,
            message,
        })? {
            instructions.push(instr);
        }
    }
    debug!(count = instructions.len(), "parsed listing");
    Ok(instructions)
}

/// Read and parse a listing file.
pub fn read_listing(path: &Path) -> Result<Vec<NativeInstruction>> {
    let text = std::fs::read_to_string(path)?;
    parse_listing(&text)
}

/// Parse one line. `Ok(None)` for lines without an instruction.
fn parse_line(raw: &str) -> std::result::Result<Option<NativeInstruction>, String> {
    let line = raw
        .find(['#', ';'])
        .map_or(raw, |end| &raw[..end])
        .trim();
    if line.is_empty() {
        return Ok(None);
    }

    let label = LABEL_PATTERN.get_or_init(|| Regex::new(r"^[0-9a-fA-Fx]+\s+<[^>]*>:$").unwrap());
    if label.is_match(line) {
        return Ok(None);
    }

    let pattern = LINE_PATTERN.get_or_init(|| {
        Regex::new(r"^(?:0[xX])?([0-9a-fA-F]+):\s*(?:(?:[0-9a-fA-F]{2}\s+){4})?(.*)$").unwrap()
    });
    let caps = pattern
        .captures(line)
        .ok_or_else(|| format!("expected `ADDRESS: instruction`, got `{line}`"))?;
    let address = caps
        .get(1)
        .and_then(|m| u64::from_str_radix(m.as_str(), 16).ok())
        .ok_or_else(|| format!("invalid address in `{line}`"))?;
    let text = caps.get(2).map_or("", |m| m.as_str());

    NativeInstruction::parse(address, text)
        .map(Some)
        .map_err(|err| err.to_string())
}

static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();
static LABEL_PATTERN: OnceLock<Regex> = OnceLock::new();

#[cfg(test)]
mod tests {
    use super::*;
    use reil_ppc::Operand;

    #[test]
    fn test_parse_basic_listing() {
        let text = "\
# prologue
0x1000: stwu r1, -16(r1)
0x1004: mflr r0   ; save link

1008: blr
";
        let listing = parse_listing(text).unwrap();
        assert_eq!(listing.len(), 3);
        assert_eq!(listing[0].address, 0x1000);
        assert_eq!(listing[0].mnemonic(), "stwu");
        assert_eq!(
            listing[0].operands[1],
            Operand::Memory {
                base: "r1".to_string(),
                displacement: -16
            }
        );
        assert_eq!(listing[1].operands.len(), 1);
        assert_eq!(listing[2].address, 0x1008);
        assert_eq!(listing[2].mnemonic(), "blr");
    }

    #[test]
    fn test_objdump_bytes_and_labels() {
        let text = "\
00001000 <main>:
    1000:\t7c 63 1b 78 \tmr      r3,r3
    1004:\t4e 80 00 20 \tblr
";
        let listing = parse_listing(text).unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].mnemonic(), "mr");
        assert_eq!(listing[1].address, 0x1004);
    }

    #[test]
    fn test_mnemonic_that_looks_like_bytes() {
        let listing = parse_listing("0x2000: bc 12, 2, 0x2010").unwrap();
        assert_eq!(listing[0].mnemonic(), "bc");
        assert_eq!(listing[0].operands.len(), 3);
    }

    #[test]
    fn test_undecodable_kept() {
        let listing = parse_listing("0x1000: .long 0xffffffff").unwrap();
        assert_eq!(listing.len(), 1);
        assert!(listing[0].mnemonic.is_none());
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_listing("0x1000: nop\naddi r3, r3, 1\n").unwrap_err();
        assert!(matches!(err, Error::Listing { line: 2, .. }));

        let err = parse_listing("\n\n0x1000:\n").unwrap_err();
        assert!(matches!(err, Error::Listing { line: 3, .. }));

        let err = parse_listing("0x1000: addi r3, r3, 0x1ffffffffffffffff").unwrap_err();
        assert!(matches!(err, Error::Listing { line: 1, .. }));
    }
}
