//! Screen layout and attribute decoding.
//!
//! Bitmap: `010 Y7 Y6 Y2 Y1 Y0 Y5 Y4 Y3 X4 X3 X2 X1 X0` (thirds of 64
//! lines, then pixel line, then character row). Attributes: one byte per
//! 8x8 cell, `FBPPPIII`, at `$5800 + (y / 8) * 32 + x / 8`.

pub const SCREEN_BASE: u16 = 0x4000;
pub const ATTRIBUTE_OFFSET: u16 = 0x1800;

#[must_use]
pub const fn bitmap_address(screen_y: u8, column: u8) -> u16 {
    let y = screen_y as u16;
    SCREEN_BASE
        | (y & 0xC0) << 5
        | (y & 0x07) << 8
        | (y & 0x38) << 2
        | (column & 0x1F) as u16
}

#[must_use]
pub const fn attribute_address(screen_y: u8, column: u8) -> u16 {
    SCREEN_BASE + ATTRIBUTE_OFFSET + (screen_y as u16 / 8) * 32 + (column & 0x1F) as u16
}

/// One fetched 8-pixel cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub bitmap: u8,
    pub attribute: u8,
}

impl Cell {
    /// Palette index of pixel `bit` (0 leftmost). `flash_phase` swaps ink
    /// and paper in FLASH cells.
    #[must_use]
    pub fn pixel(self, bit: u16, flash_phase: bool) -> u8 {
        let attr = self.attribute;
        let bright = if attr & 0x40 != 0 { 8 } else { 0 };
        let mut ink = attr & 0x07;
        let mut paper = (attr >> 3) & 0x07;
        if attr & 0x80 != 0 && flash_phase {
            std::mem::swap(&mut ink, &mut paper);
        }

        let set = self.bitmap & (0x80 >> (bit & 7)) != 0;
        bright + if set { ink } else { paper }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_rows_interleave() {
        assert_eq!(bitmap_address(0, 0), 0x4000);
        assert_eq!(bitmap_address(1, 0), 0x4100);
        assert_eq!(bitmap_address(8, 0), 0x4020);
        assert_eq!(bitmap_address(63, 31), 0x47FF);
        assert_eq!(bitmap_address(64, 0), 0x4800);
        assert_eq!(bitmap_address(191, 31), 0x57FF);
    }

    #[test]
    fn attributes_follow_the_bitmap() {
        assert_eq!(attribute_address(0, 0), 0x5800);
        assert_eq!(attribute_address(7, 5), 0x5805);
        assert_eq!(attribute_address(8, 0), 0x5820);
        assert_eq!(attribute_address(191, 31), 0x5AFF);
    }

    #[test]
    fn ink_paper_and_bright() {
        let cell = Cell { bitmap: 0xF0, attribute: 0x47 };
        assert_eq!(cell.pixel(0, false), 15);
        assert_eq!(cell.pixel(4, false), 8);

        let cell = Cell { bitmap: 0x01, attribute: 0x29 };
        assert_eq!(cell.pixel(7, false), 1);
        assert_eq!(cell.pixel(6, false), 5);
    }

    #[test]
    fn flash_swaps_ink_and_paper() {
        let cell = Cell { bitmap: 0xFF, attribute: 0x80 | 0x38 };
        assert_eq!(cell.pixel(0, false), 0);
        assert_eq!(cell.pixel(0, true), 7);
        let steady = Cell { bitmap: 0xFF, attribute: 0x38 };
        assert_eq!(steady.pixel(0, true), 0);
    }
}
