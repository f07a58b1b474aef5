//! 48K frame layout, in pixel clocks (two per CPU T-state).
//!
//! Columns count from the first screen pixel: 0-255 screen, 256-287
//! right border, 288-415 horizontal retrace, 416-447 left border. Lines
//! count from the first screen line: 0-191 screen, 192-239 bottom border,
//! 240-263 vertical retrace, 264-311 top border.
//!
//! The raster counters change line at column 320, inside the retrace, so
//! that each framebuffer row (left border, screen, right border) belongs
//! to one line. The frame itself, and INT, begins at column 0 of line
//! 248: 64 lines (14,336 T-states) before the first screen byte.

use emu_core::RasterGeometry;

pub const PIXELS_PER_T_STATE: u16 = 2;
pub const T_STATES_PER_LINE: u16 = 224;
pub const LINES_PER_FRAME: u16 = 312;
pub const T_STATES_PER_FRAME: u32 = T_STATES_PER_LINE as u32 * LINES_PER_FRAME as u32;

pub const SCREEN_LINES: u16 = 192;
pub const SCREEN_COLUMNS: u16 = 256;

/// Line on which the frame starts and INT is asserted.
pub const INT_LINE: u16 = 248;
/// INT stays asserted for 32 T-states.
pub const INT_LENGTH_PIXELS: u16 = 64;

/// Frames between two flips of the FLASH phase.
pub const FLASH_FRAMES: u8 = 16;

pub const VERTICAL: RasterGeometry = RasterGeometry {
    first: 248,
    first_visible: 264,
    first_display: 0,
    last_display: 191,
    last_visible: 239,
    last: 247,
    max: 312,
    reduce_first: 0,
    reduce_last: 0,
};

pub const HORIZONTAL: RasterGeometry = RasterGeometry {
    first: 320,
    first_visible: 416,
    first_display: 0,
    last_display: 255,
    last_visible: 287,
    last: 319,
    max: 448,
    reduce_first: 0,
    reduce_last: 0,
};
