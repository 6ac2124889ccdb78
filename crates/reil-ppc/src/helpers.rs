//! Bit-layout helpers.
//!
//! PowerPC numbers bits from the most significant end: bit 0 of a 32-bit
//! register is its MSB.

use crate::types::CrBit;

const CR_BIT_NAMES: [&str; 32] = [
    "CR0LT", "CR0GT", "CR0EQ", "CR0SO", "CR1LT", "CR1GT", "CR1EQ", "CR1SO", //
    "CR2LT", "CR2GT", "CR2EQ", "CR2SO", "CR3LT", "CR3GT", "CR3EQ", "CR3SO", //
    "CR4LT", "CR4GT", "CR4EQ", "CR4SO", "CR5LT", "CR5GT", "CR5EQ", "CR5SO", //
    "CR6LT", "CR6GT", "CR6EQ", "CR6SO", "CR7LT", "CR7GT", "CR7EQ", "CR7SO", //
];

/// Register name of condition-register bit `index` (0..32).
pub const fn cr_bit_name(index: u8) -> &'static str {
    CR_BIT_NAMES[(index & 31) as usize]
}

/// Register name of one bit of condition-register field `field` (0..8).
pub const fn cr_field_bit(field: u8, bit: CrBit) -> &'static str {
    cr_bit_name((field & 7) * 4 + bit.index())
}

/// The four bit names of a field, LT first.
pub const fn cr_field_bit_names(field: u8) -> [&'static str; 4] {
    [
        cr_field_bit(field, CrBit::Lt),
        cr_field_bit(field, CrBit::Gt),
        cr_field_bit(field, CrBit::Eq),
        cr_field_bit(field, CrBit::So),
    ]
}

/// `MASK(mb, me)`: ones from bit `mb` through bit `me`, wrapping past bit 31.
pub const fn rotate_mask(mb: u8, me: u8) -> u32 {
    let mb = mb & 31;
    let me = me & 31;
    let from_mb = u32::MAX >> mb;
    let to_me = u32::MAX << (31 - me);
    if mb <= me {
        from_mb & to_me
    } else {
        from_mb | to_me
    }
}

/// Expand a field mask (FXM/CRM) to a 32-bit mask, one nibble per set bit.
///
/// Bit 7 of `fxm` selects CR0, which occupies the top nibble.
pub const fn crm_expand(fxm: u8) -> u32 {
    let mut mask = 0;
    let mut field = 0;
    while field < 8 {
        if fxm & (0x80 >> field) != 0 {
            mask |= 0xF000_0000 >> (field * 4);
        }
        field += 1;
    }
    mask
}

/// Sign-extend a 16-bit immediate.
pub const fn sign_extend_16(value: i64) -> u32 {
    value as i16 as i32 as u32
}

/// Zero-extend a 16-bit immediate.
pub const fn zero_extend_16(value: i64) -> u32 {
    value as u16 as u32
}

/// 16-bit immediate shifted into the upper halfword.
pub const fn shifted_16(value: i64) -> u32 {
    (value as u16 as u32) << 16
}
