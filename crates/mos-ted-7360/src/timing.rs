//! PAL and NTSC raster tables of the TED.
//!
//! The horizontal counter is the one readable at $FF1E (times two): the
//! 320-pixel display window spans columns 0..=319 and a line starts at
//! column 376, 57 cycles of 8 pixels. Vertically the text rows occupy
//! lines 4..=203 on both standards; the frames differ only in the blank
//! and border lines.

use emu_core::{RasterGeometry, VideoStandard};

pub const PIXELS_PER_CYCLE: u16 = 8;

pub const CYCLES_PER_LINE: u8 = 57;

/// Lines on which a character row can be fetched.
pub const FIRST_BAD_LINE: u16 = 0;
pub const LAST_BAD_LINE: u16 = 202;

/// CPU cycles lost on a bad line (one fetch per character cell).
pub const BAD_LINE_STALL_CYCLES: u32 = 40;

/// c-access of cell `n` happens in cycle `FIRST_C_ACCESS_CYCLE + n`.
pub const FIRST_C_ACCESS_CYCLE: u8 = 8;
pub const LAST_C_ACCESS_CYCLE: u8 = FIRST_C_ACCESS_CYCLE + 39;

/// g-access of cell `n` happens in cycle `FIRST_G_ACCESS_CYCLE + n`, the
/// cycle its first pixels are drawn.
pub const FIRST_G_ACCESS_CYCLE: u8 = 10;
pub const LAST_G_ACCESS_CYCLE: u8 = FIRST_G_ACCESS_CYCLE + 39;

/// Frames between two flips of the flash phase.
pub const FLASH_FRAMES: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub standard: VideoStandard,
    pub vertical: RasterGeometry,
    pub horizontal: RasterGeometry,
}

const HORIZONTAL: RasterGeometry = RasterGeometry {
    first: 376,
    first_visible: 432,
    first_display: 0,
    last_display: 319,
    last_visible: 375,
    last: 375,
    max: 456,
    reduce_first: 8,
    reduce_last: 8,
};

pub const PAL: Timing = Timing {
    standard: VideoStandard::Pal,
    vertical: RasterGeometry {
        first: 262,
        first_visible: 274,
        first_display: 4,
        last_display: 203,
        last_visible: 251,
        last: 261,
        max: 312,
        reduce_first: 4,
        reduce_last: 4,
    },
    horizontal: HORIZONTAL,
};

pub const NTSC: Timing = Timing {
    standard: VideoStandard::Ntsc,
    vertical: RasterGeometry {
        first: 234,
        first_visible: 244,
        first_display: 4,
        last_display: 203,
        last_visible: 226,
        last: 233,
        max: 262,
        reduce_first: 4,
        reduce_last: 4,
    },
    horizontal: HORIZONTAL,
};

impl Timing {
    #[must_use]
    pub fn for_standard(standard: VideoStandard) -> &'static Timing {
        match standard {
            VideoStandard::Pal => &PAL,
            VideoStandard::Ntsc => &NTSC,
        }
    }

    #[must_use]
    pub fn cycles_per_frame(&self) -> u32 {
        u32::from(CYCLES_PER_LINE) * u32::from(self.vertical.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::{Axis, Raster};

    #[test]
    fn tables_are_consistent() {
        for timing in [&PAL, &NTSC] {
            timing.vertical.validate(Axis::Vertical).expect("vertical");
            timing.horizontal.validate(Axis::Horizontal).expect("horizontal");
        }
        assert_eq!(HORIZONTAL.max, u16::from(CYCLES_PER_LINE) * PIXELS_PER_CYCLE);
    }

    #[test]
    fn frame_lengths() {
        assert_eq!(PAL.cycles_per_frame(), 17_784);
        assert_eq!(NTSC.cycles_per_frame(), 14_934);
    }

    #[test]
    fn display_window_is_320_by_200() {
        for timing in [&PAL, &NTSC] {
            let raster = Raster::new(timing.vertical, timing.horizontal, PIXELS_PER_CYCLE);
            assert_eq!(raster.horizontal().display_positions(), 320);
            assert_eq!(raster.vertical().display_positions(), 200);
            assert_eq!(raster.horizontal().first_display_position(), 24);
        }
    }

    #[test]
    fn pal_visible_area() {
        let raster = Raster::new(PAL.vertical, PAL.horizontal, PIXELS_PER_CYCLE);
        assert_eq!(raster.visible_columns(), 400);
        assert_eq!(raster.visible_lines(), 290);
        assert_eq!(raster.vertical().first_display_position(), 42);
    }
}
