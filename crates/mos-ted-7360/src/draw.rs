//! Graphics sequencer: turns one line of fetched data into colours.
//!
//! Colours are 7-bit TED colour values (luminance and hue). Pixels before
//! the first cell (horizontal scroll) or past the 320th show background 0.

use crate::fetch::{COLUMNS, LineData};
use crate::registers::{GraphicMode, TedRegisters};

/// Where the 8-pixel block being drawn lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawContext {
    /// Start of the display window, in visible-zone coordinates.
    pub first_display_column: u16,
    pub horizontal_scroll: u8,
    /// Visible-zone column of the block's first pixel.
    pub aligned_column: u16,
}

impl DrawContext {
    /// Graphics x of the block's first pixel; negative while the scroll
    /// offset has not been consumed.
    #[must_use]
    pub fn graphics_start(&self) -> i32 {
        i32::from(self.aligned_column)
            - i32::from(self.first_display_column)
            - i32::from(self.horizontal_scroll)
    }
}

/// Colours of the 8 pixels of the block.
#[must_use]
pub fn draw_graphics(ctx: &DrawContext, line: &LineData, regs: &TedRegisters, flash_on: bool) -> [u8; 8] {
    let mode = regs.graphic_mode();
    let background = regs.background_colour(0);
    let start = ctx.graphics_start();

    std::array::from_fn(|i| {
        let x = start + i as i32;
        if x < 0 || x >= (COLUMNS * 8) as i32 {
            return background;
        }
        if !mode.is_valid() {
            return 0;
        }
        if line.idle {
            return background;
        }
        let cell = (x / 8) as usize;
        let bit = (x % 8) as u8;
        match mode {
            GraphicMode::Char => text_pixel(line, cell, bit, regs, flash_on, background),
            GraphicMode::MulticolourChar => multicolour_text_pixel(line, cell, bit, regs, flash_on),
            GraphicMode::ExtendedBackground => {
                let code = line.codes[cell];
                let pattern = flashed(line, cell, line.graphics[cell], flash_on);
                if pattern & (0x80 >> bit) != 0 {
                    line.attributes[cell] & 0x7F
                } else {
                    regs.background_colour(usize::from(code >> 6))
                }
            }
            GraphicMode::Bitmap => bitmap_pixel(line, cell, bit),
            GraphicMode::MulticolourBitmap => multicolour_bitmap_pixel(line, cell, bit, regs),
            GraphicMode::InvalidText | GraphicMode::InvalidBitmap1 | GraphicMode::InvalidBitmap2 => 0,
        }
    })
}

/// Character pattern after reverse video, cursor and flash.
fn text_pattern(line: &LineData, cell: usize, regs: &TedRegisters, flash_on: bool) -> u8 {
    let mut pattern = line.graphics[cell];
    if regs.reverse_enabled() && line.codes[cell] & 0x80 != 0 {
        pattern = !pattern;
    }
    if flash_on && line.cursor == Some(cell) {
        pattern = !pattern;
    }
    flashed(line, cell, pattern, flash_on)
}

/// Flashing characters lose their foreground in the off phase.
fn flashed(line: &LineData, cell: usize, pattern: u8, flash_on: bool) -> u8 {
    if line.attributes[cell] & 0x80 != 0 && !flash_on {
        0
    } else {
        pattern
    }
}

fn text_pixel(line: &LineData, cell: usize, bit: u8, regs: &TedRegisters, flash_on: bool, background: u8) -> u8 {
    if text_pattern(line, cell, regs, flash_on) & (0x80 >> bit) != 0 {
        line.attributes[cell] & 0x7F
    } else {
        background
    }
}

/// Attribute bit 3 selects multicolour for the cell; other cells are
/// drawn in hires.
fn multicolour_text_pixel(line: &LineData, cell: usize, bit: u8, regs: &TedRegisters, flash_on: bool) -> u8 {
    let attribute = line.attributes[cell];
    if attribute & 0x08 == 0 {
        return text_pixel(line, cell, bit, regs, flash_on, regs.background_colour(0));
    }
    match pair(line.graphics[cell], bit) {
        0 => regs.background_colour(0),
        1 => regs.background_colour(1),
        2 => regs.background_colour(2),
        _ => attribute & 0x77,
    }
}

/// Set bits take the screen code's high nibble as hue and the attribute's
/// low bits as luminance; clear bits the low nibble and the attribute's
/// high bits.
fn bitmap_pixel(line: &LineData, cell: usize, bit: u8) -> u8 {
    let code = line.codes[cell];
    let attribute = line.attributes[cell];
    if line.graphics[cell] & (0x80 >> bit) != 0 {
        colour(code >> 4, attribute)
    } else {
        colour(code & 0x0F, attribute >> 4)
    }
}

fn multicolour_bitmap_pixel(line: &LineData, cell: usize, bit: u8, regs: &TedRegisters) -> u8 {
    let code = line.codes[cell];
    let attribute = line.attributes[cell];
    match pair(line.graphics[cell], bit) {
        0 => regs.background_colour(0),
        1 => colour(code & 0x0F, attribute >> 4),
        2 => colour(code >> 4, attribute),
        _ => regs.background_colour(1),
    }
}

/// Colour from a hue and the low three bits of `luminance`.
fn colour(hue: u8, luminance: u8) -> u8 {
    (luminance & 0x07) << 4 | (hue & 0x0F)
}

/// 2-bit value of the double-width pixel containing `bit`.
fn pair(pattern: u8, bit: u8) -> u8 {
    (pattern >> (6 - (bit & 0x06))) & 0x03
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(aligned_column: u16, horizontal_scroll: u8) -> DrawContext {
        DrawContext {
            first_display_column: 24,
            horizontal_scroll,
            aligned_column,
        }
    }

    fn line(code: u8, attribute: u8, graphics: u8) -> LineData {
        LineData {
            codes: [code; COLUMNS],
            attributes: [attribute; COLUMNS],
            graphics: [graphics; COLUMNS],
            cursor: None,
            idle: false,
        }
    }

    fn regs() -> TedRegisters {
        let mut regs = TedRegisters::new();
        for (reg, colour) in [(0x15, 0x11), (0x16, 0x22), (0x17, 0x33), (0x18, 0x44)] {
            regs.write(reg, colour);
        }
        regs
    }

    #[test]
    fn hires_text_uses_attribute_colour() {
        let regs = regs();
        let pixels = draw_graphics(&ctx(24, 0), &line(1, 0x71, 0xF0), &regs, false);
        assert_eq!(pixels, [0x71, 0x71, 0x71, 0x71, 0x11, 0x11, 0x11, 0x11]);
    }

    #[test]
    fn scroll_leaves_background_before_the_first_cell() {
        let regs = regs();
        let pixels = draw_graphics(&ctx(24, 3), &line(1, 0x71, 0xFF), &regs, false);
        assert_eq!(pixels, [0x11, 0x11, 0x11, 0x71, 0x71, 0x71, 0x71, 0x71]);
    }

    #[test]
    fn block_before_the_display_window_is_background() {
        let regs = regs();
        let pixels = draw_graphics(&ctx(8, 7), &line(1, 0x71, 0xFF), &regs, false);
        assert!(pixels.iter().all(|&p| p == 0x11));
    }

    #[test]
    fn reverse_inverts_and_can_be_switched_off() {
        let mut regs = regs();
        let data = line(0x81, 0x71, 0xF0);
        let pixels = draw_graphics(&ctx(24, 0), &data, &regs, false);
        assert_eq!(pixels[0], 0x11);
        assert_eq!(pixels[7], 0x71);

        regs.write(0x07, 0x88);
        let pixels = draw_graphics(&ctx(24, 0), &data, &regs, false);
        assert_eq!(pixels[0], 0x71);
    }

    #[test]
    fn flashing_characters_show_only_in_the_on_phase() {
        let regs = regs();
        let data = line(1, 0xF1, 0xFF);
        assert!(draw_graphics(&ctx(24, 0), &data, &regs, false).iter().all(|&p| p == 0x11));
        assert!(draw_graphics(&ctx(24, 0), &data, &regs, true).iter().all(|&p| p == 0x71));
    }

    #[test]
    fn cursor_inverts_in_the_on_phase() {
        let regs = regs();
        let mut data = line(1, 0x71, 0xFF);
        data.cursor = Some(0);
        assert_eq!(draw_graphics(&ctx(24, 0), &data, &regs, false)[0], 0x71);
        assert_eq!(draw_graphics(&ctx(24, 0), &data, &regs, true)[0], 0x11);
        assert_eq!(draw_graphics(&ctx(32, 0), &data, &regs, true)[0], 0x71);
    }

    #[test]
    fn multicolour_text_pairs() {
        let mut regs = regs();
        regs.write(0x07, 0x18);
        let pixels = draw_graphics(&ctx(24, 0), &line(1, 0x7A, 0b00_01_10_11), &regs, false);
        assert_eq!(pixels, [0x11, 0x11, 0x22, 0x22, 0x33, 0x33, 0x72, 0x72]);

        let pixels = draw_graphics(&ctx(24, 0), &line(1, 0x72, 0b1000_0000), &regs, false);
        assert_eq!(pixels[0], 0x72);
        assert_eq!(pixels[1], 0x11);
    }

    #[test]
    fn extended_background_uses_code_bits_6_and_7() {
        let mut regs = regs();
        regs.write(0x06, 0x5B);
        let pixels = draw_graphics(&ctx(24, 0), &line(0xC1, 0x71, 0x0F), &regs, false);
        assert_eq!(pixels[0], 0x44);
        assert_eq!(pixels[4], 0x71);
    }

    #[test]
    fn bitmap_colours_come_from_the_matrix() {
        let mut regs = regs();
        regs.write(0x06, 0x3B);
        let pixels = draw_graphics(&ctx(24, 0), &line(0x25, 0x36, 0xF0), &regs, false);
        assert_eq!(pixels[0], 0x62);
        assert_eq!(pixels[4], 0x35);
    }

    #[test]
    fn multicolour_bitmap_pairs() {
        let mut regs = regs();
        regs.write(0x06, 0x3B);
        regs.write(0x07, 0x18);
        let pixels = draw_graphics(&ctx(24, 0), &line(0x25, 0x36, 0b00_01_10_11), &regs, false);
        assert_eq!(pixels, [0x11, 0x11, 0x35, 0x35, 0x62, 0x62, 0x22, 0x22]);
    }

    #[test]
    fn invalid_modes_are_black() {
        let mut regs = regs();
        regs.write(0x06, 0x7B);
        let pixels = draw_graphics(&ctx(24, 0), &line(1, 0x71, 0xFF), &regs, false);
        assert_eq!(pixels, [0; 8]);
    }

    #[test]
    fn idle_lines_show_background_0() {
        let regs = regs();
        let mut data = line(1, 0x71, 0xFF);
        data.idle = true;
        assert_eq!(draw_graphics(&ctx(24, 0), &data, &regs, false), [0x11; 8]);
    }
}
