//! Architectural register names.
//!
//! General-purpose registers are `%r0`..`%r31`. Condition-register bits are
//! one-bit registers `CR<field><LT|GT|EQ|SO>`. The XER flags are `XERSO`,
//! `XEROV` and `XERCA`. Temporaries minted during translation are `t<N>`, so
//! they never collide with these.

use std::sync::OnceLock;

use regex::Regex;

/// Summary overflow flag.
pub const XER_SO: &str = "XERSO";
/// Overflow flag.
pub const XER_OV: &str = "XEROV";
/// Carry flag.
pub const XER_CA: &str = "XERCA";
/// Link register.
pub const LR: &str = "LR";
/// Count register.
pub const CTR: &str = "CTR";
/// Machine state register.
pub const MSR: &str = "MSR";
/// Time base, lower half.
pub const TBL: &str = "TBL";
/// Time base, upper half.
pub const TBU: &str = "TBU";

/// SPR numbers with dedicated register names.
pub const SPR_XER: u32 = 1;
pub const SPR_LR: u32 = 8;
pub const SPR_CTR: u32 = 9;

/// Supervisor SPRs reachable through alias mnemonics (`mfdar`, `mtsrr0`, ...).
/// They stay `SPR<n>` registers.
pub const SPR_DSISR: u32 = 18;
pub const SPR_DAR: u32 = 19;
pub const SPR_DEC: u32 = 22;
pub const SPR_SRR0: u32 = 26;
pub const SPR_SRR1: u32 = 27;
pub const SPR_SPRG0: u32 = 272;
pub const SPR_PVR: u32 = 287;

/// Number of segment registers.
pub const SEGMENT_REGISTERS: u8 = 16;

/// Name of general-purpose register `index`.
pub fn gpr(index: u8) -> String {
    format!("%r{index}")
}

/// Name of a special-purpose register without a dedicated name.
pub fn spr_name(number: u32) -> String {
    format!("SPR{number}")
}

/// Name of segment register `index`.
pub fn sr_name(index: u8) -> String {
    format!("SR{index}")
}

/// Bit within a condition-register field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrBit {
    Lt,
    Gt,
    Eq,
    So,
}

impl CrBit {
    /// Position within the field (0 = LT).
    pub const fn index(self) -> u8 {
        match self {
            Self::Lt => 0,
            Self::Gt => 1,
            Self::Eq => 2,
            Self::So => 3,
        }
    }

    pub const fn from_index(index: u8) -> Self {
        match index & 3 {
            0 => Self::Lt,
            1 => Self::Gt,
            2 => Self::Eq,
            _ => Self::So,
        }
    }

    /// Parse `lt`, `gt`, `eq`, `so` or `un`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "lt" => Some(Self::Lt),
            "gt" => Some(Self::Gt),
            "eq" => Some(Self::Eq),
            "so" | "un" => Some(Self::So),
            _ => None,
        }
    }
}

/// Canonicalize a register name.
///
/// `sp` and `rtoc` become `%r1` and `%r2`; `rN`, `%rN` and bare `N` become
/// `%rN`. Other names (`lr`, `ctr`, `cr3`) are upper-cased.
pub fn normalize_register(name: &str) -> String {
    let name = name.trim();
    let bare = name.strip_prefix('%').unwrap_or(name).to_ascii_lowercase();
    match bare.as_str() {
        "sp" => return gpr(1),
        "rtoc" => return gpr(2),
        _ => {}
    }
    let digits = bare.strip_prefix('r').unwrap_or(&bare);
    match digits.parse::<u8>() {
        Ok(index) if index < 32 && !digits.starts_with('+') => gpr(index),
        _ => bare.to_ascii_uppercase(),
    }
}

/// Index of a general-purpose register name, in any accepted spelling.
pub fn parse_gpr(name: &str) -> Option<u8> {
    normalize_register(name)
        .strip_prefix("%r")
        .and_then(|digits| digits.parse().ok())
}

/// Field number of a condition-register field name (`cr0`..`cr7`).
pub fn parse_cr_field(name: &str) -> Option<u8> {
    let lower = name.trim().trim_start_matches('%').to_ascii_lowercase();
    let field = lower.strip_prefix("cr")?.parse::<u8>().ok()?;
    (field < 8).then_some(field)
}

static CR_BIT_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Condition-register bit number of a symbolic bit name.
///
/// Accepts `eq`, `cr2eq`, `cr2+eq` and `4*cr2+eq`.
pub fn parse_cr_bit(name: &str) -> Option<u8> {
    let lower = name.trim().to_ascii_lowercase();
    let pattern = CR_BIT_PATTERN.get_or_init(|| {
        Regex::new(r"^(?:(?:4\s*\*\s*)?cr([0-7])\s*\+?\s*)?(lt|gt|eq|so|un)$").unwrap()
    });
    let caps = pattern.captures(&lower)?;
    let field = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .unwrap_or(0);
    let bit = CrBit::parse(caps.get(2)?.as_str())?;
    Some(field * 4 + bit.index())
}
