//! Video matrix and character/bitmap fetches.
//!
//! A bad line reads the 40 attribute bytes and the 40 screen codes of the
//! next character row into a pending buffer (c-accesses); the row becomes
//! the displayed one at the start of the following line, with the row
//! counter back at 0. Every line then reads one character generator or
//! bitmap byte per cell (g-accesses) in the cycle the cell starts being
//! drawn.

use emu_core::ChipMemory;

use crate::registers::{GraphicMode, TedRegisters};

/// Characters per text row.
pub const COLUMNS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowData {
    codes: [u8; COLUMNS],
    attributes: [u8; COLUMNS],
}

impl Default for RowData {
    fn default() -> Self {
        Self {
            codes: [0; COLUMNS],
            attributes: [0; COLUMNS],
        }
    }
}

/// What the draw engine needs for each cell of the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineData {
    pub codes: [u8; COLUMNS],
    pub attributes: [u8; COLUMNS],
    pub graphics: [u8; COLUMNS],
    /// Cell holding the hardware cursor.
    pub cursor: Option<usize>,
    /// No row is displayed: the line shows background 0.
    pub idle: bool,
}

impl Default for LineData {
    fn default() -> Self {
        Self {
            codes: [0; COLUMNS],
            attributes: [0; COLUMNS],
            graphics: [0; COLUMNS],
            cursor: None,
            idle: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchUnit {
    /// Video matrix offset of the displayed row.
    pub vcbase: u16,
    /// Offset the next bad line reads from.
    pub next_vcbase: u16,
    /// Row counter (3 bits).
    pub rc: u8,
    pub displaying: bool,
    row_pending: bool,
    next: RowData,
    row: RowData,
    pub line: LineData,
}

impl FetchUnit {
    /// Line 0: rows are fetched again from the character position reload
    /// value.
    pub fn start_frame(&mut self, reload: u16) {
        self.next_vcbase = reload & 0x3FF;
        self.displaying = false;
        self.row_pending = false;
    }

    /// A row fetched on the previous line starts; otherwise the row counter
    /// advances and the display goes idle after row 7.
    pub fn start_line(&mut self) {
        if self.row_pending {
            self.row = self.next;
            self.vcbase = self.next_vcbase;
            self.next_vcbase = (self.next_vcbase + COLUMNS as u16) & 0x3FF;
            self.rc = 0;
            self.displaying = true;
            self.row_pending = false;
        } else if self.displaying {
            if self.rc == 7 {
                self.displaying = false;
            } else {
                self.rc += 1;
            }
        }
    }

    /// c-access of `cell` into the pending row.
    pub fn c_access(&mut self, memory: &dyn ChipMemory, regs: &TedRegisters, cell: usize) {
        if cell >= COLUMNS {
            return;
        }
        let offset = (self.next_vcbase + cell as u16) & 0x3FF;
        self.next.attributes[cell] = memory.value(regs.attribute_memory() + offset);
        self.next.codes[cell] = memory.value(regs.screen_memory() + offset);
        self.row_pending = true;
    }

    /// g-access of `cell`. `memory` must be in the view matching
    /// [`fetches_from_rom`].
    pub fn g_access(&mut self, memory: &dyn ChipMemory, regs: &TedRegisters, cell: usize) {
        if cell >= COLUMNS {
            return;
        }
        self.line.idle = !self.displaying;
        if cell == 0 {
            self.line.cursor = None;
        }
        if !self.displaying {
            self.line.codes[cell] = 0;
            self.line.attributes[cell] = 0;
            self.line.graphics[cell] = 0;
            return;
        }

        let code = self.row.codes[cell];
        let position = (self.vcbase + cell as u16) & 0x3FF;
        let rc = u16::from(self.rc);
        let mode = regs.graphic_mode();
        let address = if mode.is_bitmap() {
            regs.bitmap_memory() + (position << 3) + rc
        } else {
            regs.char_memory() + (u16::from(char_index(code, mode, regs)) << 3) + rc
        };

        self.line.codes[cell] = code;
        self.line.attributes[cell] = self.row.attributes[cell];
        self.line.graphics[cell] = memory.value(address);
        if position == regs.cursor_position() {
            self.line.cursor = Some(cell);
        }
    }
}

/// Character generator index of a screen code.
fn char_index(code: u8, mode: GraphicMode, regs: &TedRegisters) -> u8 {
    match mode {
        GraphicMode::ExtendedBackground | GraphicMode::InvalidText => code & 0x3F,
        _ if regs.reverse_enabled() => code & 0x7F,
        _ => code,
    }
}

/// Whether g-accesses read the character ROM instead of RAM.
#[must_use]
pub fn fetches_from_rom(regs: &TedRegisters) -> bool {
    regs.char_rom() && !regs.graphic_mode().is_bitmap()
}
