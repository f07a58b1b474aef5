//! Text window counters.
//!
//! The VIC has no display window in its raster tables: every line is
//! fetched, and a set of counters decides where the text window starts
//! and ends.
//!
//! - Horizontally a delay counter loads the origin X at the start of each
//!   line and counts down once per cycle. At zero, the column counter
//!   advances every second cycle (one character is 8 pixels, 4 per cycle)
//!   until it reaches the number of columns.
//! - Vertically a delay counter loads the origin Y at the start of the
//!   frame and counts down every second line. At zero, the row counter
//!   advances every 8 (or 16, for 8x16 characters) lines until it
//!   reaches the number of rows, and the video matrix base moves on by
//!   one row of columns.
//!
//! Characters are drawn while both delays are zero and both counters are
//! inside their limits.

use crate::registers::VicRegisters;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextWindow {
    /// Video matrix offset of the current text row.
    pub vbase: u16,

    horizontal_delay: u8,
    /// Column counter.
    pub column: u8,
    columns: u8,
    /// Set on the second cycle of a character.
    second_half: bool,

    vertical_delay: u8,
    /// Row counter.
    pub row: u8,
    rows: u8,
    line_pair: bool,

    /// Pixel line inside the character.
    pub rc: u8,
    char_height: u8,

    drawing: bool,
}

impl TextWindow {
    /// Reload every counter for a new frame.
    pub fn start_frame(&mut self, regs: &VicRegisters) {
        self.vbase = 0;
        self.vertical_delay = regs.origin_y();
        self.rows = regs.rows();
        self.char_height = regs.char_height();
        self.row = 0;
        self.line_pair = false;
        self.rc = 0;
        self.start_line(regs);
    }

    /// Reload the horizontal counters.
    pub fn start_line(&mut self, regs: &VicRegisters) {
        self.horizontal_delay = regs.origin_x();
        self.columns = regs.columns();
        self.column = 0;
        self.second_half = false;
        self.update_drawing();
    }

    /// Advance the horizontal counters by one cycle.
    pub fn next_cycle(&mut self) {
        if self.horizontal_delay != 0 {
            self.horizontal_delay -= 1;
        } else {
            self.second_half = !self.second_half;
            if !self.second_half && self.column < self.columns {
                self.column += 1;
            }
        }
        self.update_drawing();
    }

    /// Advance the vertical counters at the end of a line, then start the
    /// next one.
    pub fn end_line(&mut self, regs: &VicRegisters) {
        if self.vertical_delay != 0 {
            self.line_pair = !self.line_pair;
            if !self.line_pair {
                self.vertical_delay -= 1;
            }
        } else {
            self.rc += 1;
            if self.rc >= self.char_height {
                self.rc = 0;
                self.vbase = self.vbase.wrapping_add(u16::from(self.columns));
                if self.row < self.rows {
                    self.row += 1;
                }
            }
        }
        self.start_line(regs);
    }

    fn update_drawing(&mut self) {
        self.drawing = self.horizontal_delay == 0
            && self.vertical_delay == 0
            && self.column < self.columns
            && self.row < self.rows;
    }

    /// Inside the text window in this cycle.
    #[must_use]
    pub fn drawing(&self) -> bool {
        self.drawing
    }

    /// Video matrix / colour RAM offset of the current character.
    #[must_use]
    pub fn matrix_offset(&self) -> u16 {
        self.vbase.wrapping_add(u16::from(self.column))
    }

    /// The left half (high nibble) of the character is drawn first.
    #[must_use]
    pub fn high_nibble(&self) -> bool {
        !self.second_half
    }
}
