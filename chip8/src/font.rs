//! Built-in hexadecimal font.
use crate::constants::*;

/// Glyphs for the digits `0`-`F`, 5 bytes each.
///
/// Only the upper nibble of each row is drawn.
#[rustfmt::skip]
pub const FONTSET: [u8; FONTSET_DATA_LENGTH] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Memory address of the glyph for the lowest nibble of `digit`.
#[inline]
pub fn glyph_address(digit: u8) -> Address {
    FONTSET_START + (digit & 0xF) as Address * FONTSET_HEIGHT as Address
}

/// The five rows of a single glyph.
pub fn glyph(digit: u8) -> &'static [u8] {
    let start = (digit & 0xF) as usize * FONTSET_HEIGHT;
    &FONTSET[start..start + FONTSET_HEIGHT]
}
