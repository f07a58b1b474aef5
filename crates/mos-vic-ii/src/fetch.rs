//! Memory accesses of the VIC-II.
//!
//! - c-access: screen code from the video matrix plus the colour nibble
//!   from colour RAM, cycles 15-54 of a bad line, into the 40-entry
//!   matrix line buffer.
//! - g-access: character generator / bitmap byte, cycles 16-55 of every
//!   line. In idle state the chip reads `$3FFF` of the bank and draws it
//!   with code and colour 0.
//! - p/s-access: sprite pointer and three data bytes, in the sprite slots
//!   of the line.
//!
//! All accesses go through the chip's memory view; the caller switches to
//! it with [`emu_core::with_chip_view`].

use emu_core::ChipMemory;

use crate::registers::{GraphicMode, VicIIRegisters};
use crate::sprite::{SPRITE_LINES, SpriteUnit};
use crate::timing::IDLE_ADDRESS;

/// Characters per text row.
pub const COLUMNS: usize = 40;

/// Values drawn for each of the 40 cells of the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineData {
    pub codes: [u8; COLUMNS],
    pub colours: [u8; COLUMNS],
    pub graphics: [u8; COLUMNS],
}

impl Default for LineData {
    fn default() -> Self {
        Self {
            codes: [0; COLUMNS],
            colours: [0; COLUMNS],
            graphics: [0; COLUMNS],
        }
    }
}

/// Video counters, display/idle state and the fetched data.
#[derive(Debug, Clone)]
pub struct FetchUnit {
    /// Video counter (10 bits).
    pub vc: u16,
    pub vcbase: u16,
    /// Row counter (3 bits).
    pub rc: u8,
    /// Video matrix line index.
    pub vmli: usize,
    pub idle: bool,
    matrix_codes: [u8; COLUMNS],
    matrix_colours: [u8; COLUMNS],
    /// What the graphics sequencer draws.
    pub line: LineData,
}

impl Default for FetchUnit {
    fn default() -> Self {
        Self {
            vc: 0,
            vcbase: 0,
            rc: 0,
            vmli: 0,
            idle: true,
            matrix_codes: [0; COLUMNS],
            matrix_colours: [0; COLUMNS],
            line: LineData::default(),
        }
    }
}

impl FetchUnit {
    /// Line 0: the video counter base restarts at the top of the matrix.
    pub fn start_frame(&mut self) {
        self.vcbase = 0;
        self.vc = 0;
    }

    /// Cycle 14.
    pub fn start_row(&mut self, bad_line: bool) {
        self.vc = self.vcbase;
        self.vmli = 0;
        if bad_line {
            self.rc = 0;
        }
    }

    /// Cycle 58.
    pub fn end_row(&mut self, bad_line: bool) {
        if self.rc == 7 {
            self.vcbase = self.vc;
            if !bad_line {
                self.idle = true;
            }
        }
        if !self.idle {
            self.rc = (self.rc + 1) & 7;
        }
    }

    /// c-access into the matrix line buffer.
    pub fn c_access(&mut self, memory: &dyn ChipMemory, regs: &VicIIRegisters, colour_ram: u16) {
        if self.vmli >= COLUMNS {
            return;
        }
        let vc = self.vc & 0x3FF;
        self.matrix_codes[self.vmli] = memory.value(regs.screen_memory() + vc);
        self.matrix_colours[self.vmli] = memory.value_direct(colour_ram + vc) & 0x0F;
    }

    /// g-access for the cell drawn at `cell` (0-39).
    pub fn g_access(&mut self, memory: &dyn ChipMemory, regs: &VicIIRegisters, cell: usize) {
        let ecm_mask = if regs.extended_colour() { !0x0600 } else { 0xFFFF };

        if self.idle {
            let address = (regs.bank_base() + IDLE_ADDRESS) & ecm_mask;
            self.store(cell, 0, 0, memory.value(address));
            return;
        }

        let index = self.vmli.min(COLUMNS - 1);
        let code = self.matrix_codes[index];
        let colour = self.matrix_colours[index];
        let rc = u16::from(self.rc);
        let address = match regs.graphic_mode() {
            GraphicMode::Bitmap | GraphicMode::MulticolourBitmap | GraphicMode::InvalidBitmap1 | GraphicMode::InvalidBitmap2 => {
                regs.bitmap_memory() + ((self.vc & 0x3FF) << 3) + rc
            }
            GraphicMode::Char | GraphicMode::MulticolourChar | GraphicMode::ExtendedBackground | GraphicMode::InvalidText => {
                regs.char_memory() + (u16::from(code) << 3) + rc
            }
        } & ecm_mask;
        self.store(cell, code, colour, memory.value(address));

        self.vc = (self.vc + 1) & 0x3FF;
        self.vmli += 1;
    }

    fn store(&mut self, cell: usize, code: u8, colour: u8, graphics: u8) {
        if cell < COLUMNS {
            self.line.codes[cell] = code;
            self.line.colours[cell] = colour;
            self.line.graphics[cell] = graphics;
        }
    }
}

/// p-access and s-accesses of sprite `n`. Returns whether data was read.
pub fn s_access(memory: &dyn ChipMemory, regs: &VicIIRegisters, n: usize, unit: &mut SpriteUnit) -> bool {
    if !unit.active || unit.line >= SPRITE_LINES {
        unit.clear();
        return false;
    }
    let pointer = memory.value(regs.sprite_pointers() + n as u16);
    let base = regs.bank_base() + u16::from(pointer) * 64 + unit.data_offset();
    unit.load([
        memory.value(base),
        memory.value(base + 1),
        memory.value(base + 2),
    ]);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::FlatMemory;

    fn memory_with_text() -> FlatMemory {
        let mut memory = FlatMemory::new();
        // screen codes 0, 1, 2, ... at $0400
        let codes: Vec<u8> = (0..=255).collect();
        memory.load(0x0400, &codes);
        // character 1, row 2
        memory.set(0x1000 + 8 + 2, 0xA5);
        memory.load(0xD800, &[0x0E, 0x13]);
        memory.set(0x3FFF, 0x81);
        memory.set(0x39FF, 0x42);
        memory
    }

    fn display_row(fetch: &mut FetchUnit, memory: &FlatMemory, regs: &VicIIRegisters, rc: u8) {
        fetch.idle = false;
        fetch.start_row(true);
        fetch.rc = rc;
        fetch.c_access(memory, regs, 0xD800);
        for cell in 0..COLUMNS {
            fetch.g_access(memory, regs, cell);
            fetch.c_access(memory, regs, 0xD800);
        }
    }

    #[test]
    fn text_row_reads_codes_colours_and_characters() {
        let memory = memory_with_text();
        let regs = VicIIRegisters::new();
        let mut fetch = FetchUnit::default();
        display_row(&mut fetch, &memory, &regs, 2);

        assert_eq!(fetch.line.codes[1], 1);
        assert_eq!(fetch.line.graphics[1], 0xA5);
        assert_eq!(fetch.line.graphics[0], 0x00);
        assert_eq!(fetch.line.colours[0], 0x0E);
        assert_eq!(fetch.line.colours[1], 0x03);
        assert_eq!(fetch.vc, 40);
        assert_eq!(fetch.vmli, 40);
    }

    #[test]
    fn g_access_uses_row_counter() {
        let memory = memory_with_text();
        let regs = VicIIRegisters::new();
        let mut fetch = FetchUnit::default();
        fetch.idle = false;
        fetch.start_row(true);
        fetch.c_access(&memory, &regs, 0xD800);
        fetch.g_access(&memory, &regs, 0);
        fetch.c_access(&memory, &regs, 0xD800);
        fetch.rc = 2;
        fetch.g_access(&memory, &regs, 1);
        assert_eq!(fetch.line.graphics[1], 0xA5);
    }

    #[test]
    fn idle_state_reads_3fff_with_zero_code() {
        let memory = memory_with_text();
        let mut regs = VicIIRegisters::new();
        let mut fetch = FetchUnit::default();
        fetch.g_access(&memory, &regs, 5);
        assert_eq!(fetch.line.graphics[5], 0x81);
        assert_eq!(fetch.line.codes[5], 0);
        assert_eq!(fetch.vc, 0);

        regs.write(0x11, 0x5B);
        fetch.g_access(&memory, &regs, 6);
        assert_eq!(fetch.line.graphics[6], 0x42);
    }

    #[test]
    fn row_counter_goes_idle_after_row_7() {
        let mut fetch = FetchUnit {
            idle: false,
            rc: 6,
            vc: 80,
            vcbase: 40,
            ..FetchUnit::default()
        };
        fetch.end_row(false);
        assert_eq!(fetch.rc, 7);
        assert!(!fetch.idle);

        fetch.end_row(false);
        assert!(fetch.idle);
        assert_eq!(fetch.vcbase, 80);
        assert_eq!(fetch.rc, 7);
    }

    #[test]
    fn bad_line_keeps_display_state_at_row_7() {
        let mut fetch = FetchUnit {
            idle: false,
            rc: 7,
            ..FetchUnit::default()
        };
        fetch.end_row(true);
        assert!(!fetch.idle);
        assert_eq!(fetch.rc, 0);
    }

    #[test]
    fn sprite_data_follows_pointer_and_line() {
        let mut memory = FlatMemory::new();
        memory.set(0x07F8 + 2, 0x0D);
        memory.load(0x0340 + 6, &[1, 2, 3]);
        let regs = VicIIRegisters::new();
        let mut unit = SpriteUnit {
            active: true,
            line: 2,
            ..SpriteUnit::default()
        };
        assert!(s_access(&memory, &regs, 2, &mut unit));
        assert_eq!(unit.data, [1, 2, 3]);

        unit.active = false;
        assert!(!s_access(&memory, &regs, 2, &mut unit));
        assert!(!unit.has_data);
    }
}
