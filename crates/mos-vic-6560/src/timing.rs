//! PAL (6561) and NTSC (6560) raster tables.
//!
//! The chip draws 4 pixels per CPU cycle. The framebuffer doubles them
//! horizontally, so one cycle covers 8 columns and a character 16. The
//! text window is placed by the chip's own counters (see
//! [`TextWindow`](crate::window::TextWindow)), not by the raster tables:
//! these only say which part of the beam the CRT shows.

use emu_core::{RasterGeometry, VideoStandard};

/// Framebuffer columns per chip cycle (4 pixels, doubled).
pub const PIXELS_PER_CYCLE: u16 = 8;

/// Everything that differs between the PAL and NTSC chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub standard: VideoStandard,
    pub vertical: RasterGeometry,
    pub horizontal: RasterGeometry,
    pub cycles_per_line: u8,
    /// Values the KERNAL writes to $9000-$900F at reset.
    pub reset_registers: [u8; 16],
}

pub const PAL: Timing = Timing {
    standard: VideoStandard::Pal,
    vertical: RasterGeometry {
        first: 0,
        first_visible: 28,
        first_display: 28,
        last_display: 311,
        last_visible: 311,
        last: 311,
        max: 312,
        reduce_first: 0,
        reduce_last: 0,
    },
    horizontal: RasterGeometry {
        first: 0,
        first_visible: 40,
        first_display: 40,
        last_display: 506,
        last_visible: 506,
        last: 567,
        max: 568,
        reduce_first: 0,
        reduce_last: 0,
    },
    cycles_per_line: 71,
    reset_registers: [
        0x0C, 0x26, 0x96, 0x2E, 0x00, 0xF0, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x1B,
    ],
};

pub const NTSC: Timing = Timing {
    standard: VideoStandard::Ntsc,
    vertical: RasterGeometry {
        first: 0,
        first_visible: 28,
        first_display: 28,
        last_display: 260,
        last_visible: 260,
        last: 260,
        max: 261,
        reduce_first: 0,
        reduce_last: 0,
    },
    horizontal: RasterGeometry {
        first: 0,
        first_visible: 8,
        first_display: 8,
        last_display: 427,
        last_visible: 427,
        last: 519,
        max: 520,
        reduce_first: 0,
        reduce_last: 0,
    },
    cycles_per_line: 65,
    reset_registers: [
        0x05, 0x19, 0x96, 0x2E, 0x00, 0xF0, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x1B,
    ],
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
        u32::from(self.cycles_per_line) * u32::from(self.vertical.max)
    }
}
