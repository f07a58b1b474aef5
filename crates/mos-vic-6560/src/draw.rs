//! Pixel generation for half a character.
//!
//! Each cycle draws 4 chip pixels from one nibble of the character byte;
//! the framebuffer doubles them horizontally. Colour RAM bit 3 selects
//! multicolour for the character, bits 0-2 are its foreground colour.
//!
//! Multicolour bit pairs: 00 background, 01 border, 10 character colour,
//! 11 auxiliary colour. Reverse mode only affects hi-res characters.

use crate::registers::VicRegisters;

/// Fetched data for the half character drawn in this cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellData {
    /// Colour RAM nibble.
    pub colour: u8,
    /// Character data bits for this half, in bits 0-3.
    pub nibble: u8,
}

/// Palette indices of the 8 framebuffer pixels.
#[must_use]
pub fn draw_cell(cell: CellData, regs: &VicRegisters) -> [u8; 8] {
    let foreground = cell.colour & 0x07;
    let mut out = [regs.background_colour(); 8];

    if cell.colour & 0x08 == 0 {
        for i in 0..4 {
            let set = cell.nibble & (0x08 >> i) != 0;
            if set != regs.reverse_mode() {
                out[i * 2] = foreground;
                out[i * 2 + 1] = foreground;
            }
        }
    } else {
        for pair in 0..2 {
            let colour = match (cell.nibble >> (2 - pair * 2)) & 0x03 {
                0b00 => regs.background_colour(),
                0b01 => regs.border_colour(),
                0b10 => foreground,
                _ => regs.auxiliary_colour(),
            };
            out[pair * 4..pair * 4 + 4].fill(colour);
        }
    }
    out
}
