//! TED register bank ($FF00-$FF1F, mirrored every $20 bytes).
//!
//! | Reg       | Description                                                  |
//! |-----------|--------------------------------------------------------------|
//! | $00-$05   | Timer 1-3, low/high                                          |
//! | $06       | YSCROLL, RSEL, DEN, BMM, ECM, TEST                           |
//! | $07       | XSCROLL, CSEL, MCM, FREEZE (stored), NTSC, reverse off       |
//! | $08       | Keyboard latch                                               |
//! | $09       | IRQ status (write 1 to clear)                                |
//! | $0A       | IRQ enable, raster compare bit 8                             |
//! | $0B       | Raster compare                                               |
//! | $0C/$0D   | Cursor position                                              |
//! | $0E-$11   | Sound frequencies and control (stored only)                  |
//! | $12       | Bitmap base, character ROM fetch, sound frequency bits       |
//! | $13       | Character base, single clock                                 |
//! | $14       | Video matrix base (attributes, codes $400 higher)            |
//! | $15-$18   | Background 0-3                                               |
//! | $19       | Border                                                       |
//! | $1A/$1B   | Character position (reload on write)                         |
//! | $1C/$1D   | Raster line (read live)                                      |
//! | $1E       | Horizontal position / 2 (read live)                          |
//! | $1F       | Row counter, flash counter (read live)                       |
//!
//! Colour registers hold the hue in bits 0-3 and the luminance in bits
//! 4-6.

use bitflags::bitflags;
use tracing::{debug, warn};

use crate::timer::{RunMode, Timer};

pub const REGISTER_COUNT: usize = 0x20;

bitflags! {
    /// TED interrupt sources, as laid out in $FF09/$FF0A.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IrqSource: u8 {
        const RASTER = 0x02;
        const LIGHT_PEN = 0x04;
        const TIMER1 = 0x08;
        const TIMER2 = 0x10;
        const TIMER3 = 0x40;
    }
}

/// Graphic mode selected by ECM ($06 bit 6), BMM ($06 bit 5) and MCM
/// ($07 bit 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicMode {
    Char,
    MulticolourChar,
    Bitmap,
    MulticolourBitmap,
    ExtendedBackground,
    InvalidText,
    InvalidBitmap1,
    InvalidBitmap2,
}

impl GraphicMode {
    #[must_use]
    pub const fn from_bits(extended_colour: bool, bitmap: bool, multicolour: bool) -> Self {
        match (extended_colour, bitmap, multicolour) {
            (false, false, false) => Self::Char,
            (false, false, true) => Self::MulticolourChar,
            (false, true, false) => Self::Bitmap,
            (false, true, true) => Self::MulticolourBitmap,
            (true, false, false) => Self::ExtendedBackground,
            (true, false, true) => Self::InvalidText,
            (true, true, false) => Self::InvalidBitmap1,
            (true, true, true) => Self::InvalidBitmap2,
        }
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::InvalidText | Self::InvalidBitmap1 | Self::InvalidBitmap2)
    }

    #[must_use]
    pub const fn is_bitmap(self) -> bool {
        matches!(
            self,
            Self::Bitmap | Self::MulticolourBitmap | Self::InvalidBitmap1 | Self::InvalidBitmap2
        )
    }
}

/// Where the beam and the video counters are, as shown in $1A-$1F.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BeamInfo {
    pub line: u16,
    pub column: u16,
    /// Video matrix offset of the row being displayed (0-999).
    pub character_position: u16,
    /// Row counter (0-7).
    pub row: u8,
    /// Frame counter driving flash and cursor blink (0-15).
    pub flash_counter: u8,
}

#[derive(Debug, Clone)]
pub struct TedRegisters {
    raw: [u8; REGISTER_COUNT],
    timers: [Timer; 3],

    vertical_scroll: u8,
    horizontal_scroll: u8,
    rows25: bool,
    columns40: bool,
    display_enabled: bool,
    extended_colour: bool,
    bitmap: bool,
    multicolour: bool,
    reverse_enabled: bool,
    graphic_mode: GraphicMode,

    irq_raster_line: u16,
    irq_enabled: IrqSource,
    irq_happened: IrqSource,

    cursor_position: u16,
    character_position_reload: u16,
    char_rom: bool,
    single_clock: bool,
    char_memory: u16,
    bitmap_memory: u16,
    attribute_memory: u16,
    screen_memory: u16,

    background_colours: [u8; 4],
    border_colour: u8,

    keyboard_input: u8,
    beam: BeamInfo,
}

impl TedRegisters {
    #[must_use]
    pub fn new() -> Self {
        let mut regs = Self {
            raw: [0; REGISTER_COUNT],
            timers: [
                Timer::new(RunMode::Reload),
                Timer::new(RunMode::Continuous),
                Timer::new(RunMode::Continuous),
            ],
            vertical_scroll: 0,
            horizontal_scroll: 0,
            rows25: true,
            columns40: true,
            display_enabled: true,
            extended_colour: false,
            bitmap: false,
            multicolour: false,
            reverse_enabled: true,
            graphic_mode: GraphicMode::Char,
            irq_raster_line: 0,
            irq_enabled: IrqSource::empty(),
            irq_happened: IrqSource::empty(),
            cursor_position: 0,
            character_position_reload: 0,
            char_rom: false,
            single_clock: false,
            char_memory: 0,
            bitmap_memory: 0,
            attribute_memory: 0,
            screen_memory: 0,
            background_colours: [0; 4],
            border_colour: 0,
            keyboard_input: 0xFF,
            beam: BeamInfo::default(),
        };
        regs.initialize();
        regs
    }

    /// Power-on state.
    pub fn initialize(&mut self) {
        for reg in 0..REGISTER_COUNT {
            let value = match reg {
                0x06 => 0x1B,
                0x07 => 0x08,
                0x12 => 0x04,
                0x13 => 0xD0,
                0x14 => 0x08,
                _ => 0x00,
            };
            self.write(reg, value);
        }
        self.timers.iter_mut().for_each(Timer::initialize);
        self.irq_happened = IrqSource::empty();
        self.keyboard_input = 0xFF;
        self.beam = BeamInfo::default();
    }

    /// CPU write.
    pub fn write(&mut self, address: usize, value: u8) {
        let reg = address % REGISTER_COUNT;
        self.raw[reg] = value;

        match reg {
            0x00 | 0x02 | 0x04 => self.timers[reg / 2].write_low(value),
            0x01 | 0x03 | 0x05 => self.timers[reg / 2].write_high(value),
            0x06 => {
                self.vertical_scroll = value & 0x07;
                self.rows25 = value & 0x08 != 0;
                self.display_enabled = value & 0x10 != 0;
                self.bitmap = value & 0x20 != 0;
                self.extended_colour = value & 0x40 != 0;
                self.update_graphic_mode();
            }
            0x07 => {
                self.horizontal_scroll = value & 0x07;
                self.columns40 = value & 0x08 != 0;
                self.multicolour = value & 0x10 != 0;
                self.reverse_enabled = value & 0x80 == 0;
                self.update_graphic_mode();
            }
            0x09 => self.irq_happened.remove(IrqSource::from_bits_truncate(value)),
            0x0A => {
                self.irq_enabled = IrqSource::from_bits_truncate(value);
                self.irq_raster_line = (self.irq_raster_line & 0xFF) | (u16::from(value & 0x01) << 8);
            }
            0x0B => self.irq_raster_line = (self.irq_raster_line & 0x100) | u16::from(value),
            0x0C => self.cursor_position = (self.cursor_position & 0xFF) | (u16::from(value & 0x03) << 8),
            0x0D => self.cursor_position = (self.cursor_position & 0x300) | u16::from(value),
            0x12 => {
                self.char_rom = value & 0x04 != 0;
                self.bitmap_memory = u16::from(value & 0x38) << 10;
            }
            0x13 => {
                self.single_clock = value & 0x02 != 0;
                self.char_memory = u16::from(value & 0xFC) << 8;
            }
            0x14 => {
                self.attribute_memory = u16::from(value & 0xF8) << 8;
                self.screen_memory = self.attribute_memory + 0x400;
            }
            0x15..=0x18 => self.background_colours[reg - 0x15] = value & 0x7F,
            0x19 => self.border_colour = value & 0x7F,
            0x1A => {
                self.character_position_reload =
                    (self.character_position_reload & 0xFF) | (u16::from(value & 0x03) << 8);
            }
            0x1B => self.character_position_reload = (self.character_position_reload & 0x300) | u16::from(value),
            _ => {}
        }
    }

    /// CPU read. The TED has no read side effects.
    #[must_use]
    pub fn read(&self, address: usize) -> u8 {
        let reg = address % REGISTER_COUNT;
        match reg {
            0x00 | 0x02 | 0x04 => self.timers[reg / 2].low(),
            0x01 | 0x03 | 0x05 => self.timers[reg / 2].high(),
            0x08 => self.keyboard_input,
            0x09 => 0x21 | self.irq_happened.bits() | if self.launch_irq() { 0x80 } else { 0 },
            0x0A => self.raw[reg] | 0xA0,
            0x0C | 0x1A => self.position_high(reg),
            0x12 => self.raw[reg] | 0xC0,
            0x13 => self.raw[reg] & 0xFE,
            0x14 => self.raw[reg] | 0x07,
            0x15..=0x19 => self.raw[reg] | 0x80,
            0x1B => self.beam.character_position as u8,
            0x1C => 0xFE | (self.beam.line >> 8) as u8,
            0x1D => self.beam.line as u8,
            0x1E => (self.beam.column >> 1) as u8,
            0x1F => 0x80 | (self.beam.flash_counter & 0x0F) << 3 | (self.beam.row & 0x07),
            _ => self.raw[reg],
        }
    }

    fn position_high(&self, reg: usize) -> u8 {
        let value = if reg == 0x1A {
            self.beam.character_position
        } else {
            self.cursor_position
        };
        0xFC | (value >> 8) as u8
    }

    fn update_graphic_mode(&mut self) {
        let mode = GraphicMode::from_bits(self.extended_colour, self.bitmap, self.multicolour);
        if mode != self.graphic_mode {
            if mode.is_valid() {
                debug!(?mode, "TED graphic mode");
            } else {
                warn!(?mode, "TED invalid graphic mode selected");
            }
            self.graphic_mode = mode;
        }
    }

    /// Count one cycle on every timer, latching their interrupts.
    pub fn tick_timers(&mut self) {
        const SOURCES: [IrqSource; 3] = [IrqSource::TIMER1, IrqSource::TIMER2, IrqSource::TIMER3];
        for (timer, source) in self.timers.iter_mut().zip(SOURCES) {
            if timer.tick() {
                self.irq_happened.insert(source);
            }
        }
    }

    #[must_use]
    pub fn timer(&self, n: usize) -> &Timer {
        &self.timers[n]
    }

    pub fn raise(&mut self, source: IrqSource) {
        self.irq_happened.insert(source);
    }

    /// Whether an enabled source has latched.
    #[must_use]
    pub fn launch_irq(&self) -> bool {
        self.irq_happened.intersects(self.irq_enabled)
    }

    #[must_use]
    pub fn reason_irq_code(&self) -> u8 {
        (self.irq_happened & self.irq_enabled).bits()
    }

    #[must_use]
    pub fn irq_raster_line(&self) -> u16 {
        self.irq_raster_line
    }

    pub fn set_beam_info(&mut self, beam: BeamInfo) {
        self.beam = beam;
    }

    #[must_use]
    pub fn beam_info(&self) -> &BeamInfo {
        &self.beam
    }

    /// Column bits presented at $FF08.
    pub fn set_keyboard_input(&mut self, value: u8) {
        self.keyboard_input = value;
    }

    #[must_use]
    pub fn graphic_mode(&self) -> GraphicMode {
        self.graphic_mode
    }

    #[must_use]
    pub fn vertical_scroll(&self) -> u8 {
        self.vertical_scroll
    }

    #[must_use]
    pub fn horizontal_scroll(&self) -> u8 {
        self.horizontal_scroll
    }

    #[must_use]
    pub fn rows25(&self) -> bool {
        self.rows25
    }

    #[must_use]
    pub fn columns40(&self) -> bool {
        self.columns40
    }

    /// DEN: when clear no rows are fetched and the screen shows the border.
    #[must_use]
    pub fn display_enabled(&self) -> bool {
        self.display_enabled
    }

    /// Bit 7 of a screen code selects inverted characters (128 characters).
    #[must_use]
    pub fn reverse_enabled(&self) -> bool {
        self.reverse_enabled
    }

    #[must_use]
    pub fn single_clock(&self) -> bool {
        self.single_clock
    }

    #[must_use]
    pub fn char_rom(&self) -> bool {
        self.char_rom
    }

    #[must_use]
    pub fn cursor_position(&self) -> u16 {
        self.cursor_position
    }

    #[must_use]
    pub fn character_position_reload(&self) -> u16 {
        self.character_position_reload
    }

    #[must_use]
    pub fn char_memory(&self) -> u16 {
        self.char_memory
    }

    #[must_use]
    pub fn bitmap_memory(&self) -> u16 {
        self.bitmap_memory
    }

    #[must_use]
    pub fn attribute_memory(&self) -> u16 {
        self.attribute_memory
    }

    #[must_use]
    pub fn screen_memory(&self) -> u16 {
        self.screen_memory
    }

    #[must_use]
    pub fn background_colour(&self, n: usize) -> u8 {
        self.background_colours[n]
    }

    #[must_use]
    pub fn border_colour(&self) -> u8 {
        self.border_colour
    }
}

impl Default for TedRegisters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn power_on_is_40x25_text_with_rom_characters() {
        let regs = TedRegisters::new();
        assert_eq!(regs.graphic_mode(), GraphicMode::Char);
        assert!(regs.rows25() && regs.columns40() && regs.display_enabled());
        assert_eq!(regs.vertical_scroll(), 3);
        assert!(regs.char_rom());
        assert_eq!(regs.char_memory(), 0xD000);
        assert_eq!(regs.attribute_memory(), 0x0800);
        assert_eq!(regs.screen_memory(), 0x0C00);
    }

    #[test]
    fn every_mode_combination_is_defined() {
        let mut regs = TedRegisters::new();
        let mut seen = Vec::new();
        for bits in 0..8u8 {
            regs.write(0x06, 0x1B | (bits & 0x03) << 5);
            regs.write(0x07, 0x08 | (bits & 0x04) << 2);
            seen.push(regs.graphic_mode());
        }
        seen.sort_by_key(|m| *m as u8);
        seen.dedup();
        assert_eq!(seen.len(), 8);
        assert_eq!(seen.iter().filter(|m| m.is_valid()).count(), 5);
    }

    #[test]
    fn irq_status_is_cleared_by_writing_ones() {
        let mut regs = TedRegisters::new();
        regs.write(0x0A, 0x0A);
        regs.raise(IrqSource::RASTER);
        regs.raise(IrqSource::TIMER1);
        assert!(regs.launch_irq());
        assert_eq!(regs.reason_irq_code(), 0x0A);
        assert_eq!(regs.read(0x09), 0x80 | 0x21 | 0x0A);

        regs.write(0x09, 0x00);
        assert_eq!(regs.reason_irq_code(), 0x0A);
        regs.write(0x09, 0x02);
        assert_eq!(regs.reason_irq_code(), 0x08);
        regs.write(0x09, 0x08);
        assert!(!regs.launch_irq());
        assert_eq!(regs.read(0x09), 0x21);
    }

    #[test]
    fn raster_compare_takes_bit_8_from_ff0a() {
        let mut regs = TedRegisters::new();
        regs.write(0x0B, 0x10);
        regs.write(0x0A, 0x03);
        assert_eq!(regs.irq_raster_line(), 0x110);
        regs.write(0x0A, 0x02);
        assert_eq!(regs.irq_raster_line(), 0x010);
    }

    #[test]
    fn live_registers_follow_the_beam() {
        let mut regs = TedRegisters::new();
        regs.set_beam_info(BeamInfo {
            line: 0x105,
            column: 300,
            character_position: 0x2A8,
            row: 5,
            flash_counter: 9,
        });
        regs.write(0x1D, 0x00);
        assert_eq!(regs.read(0x1C), 0xFF);
        assert_eq!(regs.read(0x1D), 0x05);
        assert_eq!(regs.read(0x1E), 150);
        assert_eq!(regs.read(0x1A), 0xFE);
        assert_eq!(regs.read(0x1B), 0xA8);
        assert_eq!(regs.read(0x1F), 0x80 | 9 << 3 | 5);
    }

    #[test]
    fn timer_underflow_latches_its_source() {
        let mut regs = TedRegisters::new();
        regs.write(0x02, 0x03);
        regs.write(0x03, 0x00);
        regs.tick_timers();
        regs.tick_timers();
        assert_eq!(regs.read(0x09) & 0x10, 0);
        regs.tick_timers();
        assert_eq!(regs.read(0x09) & 0x10, 0x10);
        assert!(!regs.launch_irq());
    }

    #[test]
    fn colours_keep_hue_and_luminance() {
        let mut regs = TedRegisters::new();
        regs.write(0x19, 0xF3);
        assert_eq!(regs.border_colour(), 0x73);
        assert_eq!(regs.read(0x19), 0xF3);
        regs.write(0x15, 0x71);
        assert_eq!(regs.background_colour(0), 0x71);
    }

    proptest! {
        #[test]
        fn plain_registers_read_back(reg in prop::sample::select(vec![0x06usize, 0x07, 0x0B, 0x0D, 0x0E, 0x0F, 0x10, 0x11]), value: u8) {
            let mut regs = TedRegisters::new();
            regs.write(reg, value);
            prop_assert_eq!(regs.read(reg), value);
            prop_assert_eq!(regs.read(reg + REGISTER_COUNT), value);
        }
    }
}
