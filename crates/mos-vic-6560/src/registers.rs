//! VIC register bank ($9000-$900F, mirrored every $10 bytes).
//!
//! | Reg   | Description                                                   |
//! |-------|---------------------------------------------------------------|
//! | $00   | Interlace (bit 7), screen origin X in 4-pixel steps            |
//! | $01   | Screen origin Y in 2-line steps                                |
//! | $02   | Video matrix address bit 9 (bit 7), number of columns          |
//! | $03   | Raster bit 0 (bit 7, read), number of rows, 8x16 characters    |
//! | $04   | Raster bits 8-1 (read)                                         |
//! | $05   | Video matrix (bits 4-7) and character (bits 0-3) addresses     |
//! | $06   | Light pen X (read)                                             |
//! | $07   | Light pen Y (read)                                             |
//! | $08   | Paddle X (read)                                                |
//! | $09   | Paddle Y (read)                                                |
//! | $0A-$0D | Sound voices 1-4 and noise (stored only)                     |
//! | $0E   | Auxiliary colour (bits 4-7), volume (bits 0-3)                 |
//! | $0F   | Background (bits 4-7), normal/reverse (bit 3), border (0-2)    |

use tracing::debug;

pub const REGISTER_COUNT: usize = 0x10;

/// Translate a 14-bit chip address into the CPU address map: chip A13 is
/// inverted onto CPU A15, so chip $0000-$1FFF is CPU $8000-$9FFF and chip
/// $2000-$3FFF is CPU $0000-$1FFF.
#[must_use]
pub const fn cpu_address(chip_address: u16) -> u16 {
    let address = chip_address & 0x3FFF;
    if address & 0x2000 == 0 {
        0x8000 | address
    } else {
        address & 0x1FFF
    }
}

#[derive(Debug, Clone)]
pub struct VicRegisters {
    raw: [u8; REGISTER_COUNT],

    interlace: bool,
    origin_x: u8,
    origin_y: u8,
    columns: u8,
    rows: u8,
    double_height: bool,

    /// Chip-side addresses.
    screen_base: u16,
    char_base: u16,
    colour_memory: u16,

    auxiliary_colour: u8,
    background_colour: u8,
    border_colour: u8,
    reverse_mode: bool,
    volume: u8,

    light_pen: (u8, u8),
    paddles: (u8, u8),
    raster_line: u16,
}

impl VicRegisters {
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: [0; REGISTER_COUNT],
            interlace: false,
            origin_x: 0,
            origin_y: 0,
            columns: 0,
            rows: 0,
            double_height: false,
            screen_base: 0,
            char_base: 0,
            colour_memory: 0x9400,
            auxiliary_colour: 0,
            background_colour: 0,
            border_colour: 0,
            reverse_mode: false,
            volume: 0,
            light_pen: (0, 0),
            paddles: (0xFF, 0xFF),
            raster_line: 0,
        }
    }

    /// Load `values` into $00-$0F, as the KERNAL does at reset.
    pub fn initialize(&mut self, values: &[u8; REGISTER_COUNT]) {
        for (reg, &value) in values.iter().enumerate() {
            self.write(reg, value);
        }
        self.light_pen = (0, 0);
        self.paddles = (0xFF, 0xFF);
        self.raster_line = 0;
    }

    /// CPU write.
    pub fn write(&mut self, address: usize, value: u8) {
        let reg = address % REGISTER_COUNT;
        self.raw[reg] = value;

        match reg {
            0x00 => {
                self.interlace = value & 0x80 != 0;
                self.origin_x = value & 0x7F;
            }
            0x01 => self.origin_y = value,
            0x02 => {
                self.columns = value & 0x7F;
                self.update_memory_positions();
            }
            0x03 => {
                self.rows = (value >> 1) & 0x3F;
                self.double_height = value & 0x01 != 0;
            }
            0x05 => self.update_memory_positions(),
            0x0E => {
                self.auxiliary_colour = value >> 4;
                self.volume = value & 0x0F;
            }
            0x0F => {
                self.background_colour = value >> 4;
                self.reverse_mode = value & 0x08 == 0;
                self.border_colour = value & 0x07;
            }
            _ => {}
        }
    }

    /// CPU read. The VIC has no read side effects.
    #[must_use]
    pub fn read(&self, address: usize) -> u8 {
        let reg = address % REGISTER_COUNT;
        match reg {
            0x03 => (self.raw[reg] & 0x7F) | ((self.raster_line & 0x01) as u8) << 7,
            0x04 => (self.raster_line >> 1) as u8,
            0x06 => self.light_pen.0,
            0x07 => self.light_pen.1,
            0x08 => self.paddles.0,
            0x09 => self.paddles.1,
            _ => self.raw[reg],
        }
    }

    fn update_memory_positions(&mut self) {
        let bit9 = u16::from(self.raw[0x02] >> 7);
        let pointers = self.raw[0x05];
        let screen_base = u16::from(pointers >> 4) << 10 | bit9 << 9;
        let char_base = u16::from(pointers & 0x0F) << 10;
        let colour_memory = 0x9400 | bit9 << 9;

        if (screen_base, char_base) != (self.screen_base, self.char_base) {
            debug!(
                screen = format_args!("${:04X}", cpu_address(screen_base)),
                characters = format_args!("${:04X}", cpu_address(char_base)),
                colour = format_args!("${colour_memory:04X}"),
                "VIC memory pointers"
            );
        }
        self.screen_base = screen_base;
        self.char_base = char_base;
        self.colour_memory = colour_memory;
    }

    pub fn set_raster_line(&mut self, line: u16) {
        self.raster_line = line;
    }

    pub fn latch_light_pen(&mut self, x: u8, y: u8) {
        self.light_pen = (x, y);
    }

    /// Potentiometer readings shown at $08/$09.
    pub fn set_paddles(&mut self, x: u8, y: u8) {
        self.paddles = (x, y);
    }

    #[must_use]
    pub fn interlace(&self) -> bool {
        self.interlace
    }

    /// Cycles from the start of a line to the first text column.
    #[must_use]
    pub fn origin_x(&self) -> u8 {
        self.origin_x
    }

    /// Line pairs from the top of the frame to the first text row.
    #[must_use]
    pub fn origin_y(&self) -> u8 {
        self.origin_y
    }

    #[must_use]
    pub fn columns(&self) -> u8 {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// 8x16 characters.
    #[must_use]
    pub fn double_height(&self) -> bool {
        self.double_height
    }

    /// Pixel lines per character.
    #[must_use]
    pub fn char_height(&self) -> u8 {
        if self.double_height { 16 } else { 8 }
    }

    /// Video matrix, chip-side address.
    #[must_use]
    pub fn screen_base(&self) -> u16 {
        self.screen_base
    }

    /// Character generator, chip-side address.
    #[must_use]
    pub fn char_base(&self) -> u16 {
        self.char_base
    }

    /// Colour RAM, CPU address ($9400 or $9600).
    #[must_use]
    pub fn colour_memory(&self) -> u16 {
        self.colour_memory
    }

    #[must_use]
    pub fn screen_memory(&self) -> u16 {
        cpu_address(self.screen_base)
    }

    #[must_use]
    pub fn char_memory(&self) -> u16 {
        cpu_address(self.char_base)
    }

    #[must_use]
    pub fn auxiliary_colour(&self) -> u8 {
        self.auxiliary_colour
    }

    #[must_use]
    pub fn background_colour(&self) -> u8 {
        self.background_colour
    }

    #[must_use]
    pub fn border_colour(&self) -> u8 {
        self.border_colour
    }

    /// $0F bit 3 clear: hi-res characters are drawn inverted.
    #[must_use]
    pub fn reverse_mode(&self) -> bool {
        self.reverse_mode
    }

    #[must_use]
    pub fn volume(&self) -> u8 {
        self.volume
    }
}

impl Default for VicRegisters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::PAL;
    use proptest::prelude::*;

    fn reset() -> VicRegisters {
        let mut regs = VicRegisters::new();
        regs.initialize(&PAL.reset_registers);
        regs
    }

    #[test]
    fn reset_values_give_the_unexpanded_vic20_screen() {
        let regs = reset();
        assert_eq!(regs.columns(), 22);
        assert_eq!(regs.rows(), 23);
        assert!(!regs.double_height());
        assert_eq!(regs.screen_memory(), 0x1E00);
        assert_eq!(regs.char_memory(), 0x8000);
        assert_eq!(regs.colour_memory(), 0x9600);
        assert_eq!(regs.background_colour(), 1);
        assert_eq!(regs.border_colour(), 3);
        assert!(!regs.reverse_mode());
        assert_eq!(regs.origin_x(), 12);
        assert_eq!(regs.origin_y(), 38);
    }

    #[test]
    fn chip_addresses_invert_a13() {
        assert_eq!(cpu_address(0x0000), 0x8000);
        assert_eq!(cpu_address(0x0800), 0x8800);
        assert_eq!(cpu_address(0x1C00), 0x9C00);
        assert_eq!(cpu_address(0x2000), 0x0000);
        assert_eq!(cpu_address(0x3000), 0x1000);
        assert_eq!(cpu_address(0x3E00), 0x1E00);
    }

    #[test]
    fn expanded_memory_layout_moves_screen_and_colour() {
        let mut regs = reset();
        regs.write(0x02, 0x16);
        regs.write(0x05, 0xC0);
        assert_eq!(regs.screen_memory(), 0x1000);
        assert_eq!(regs.colour_memory(), 0x9400);
        regs.write(0x05, 0xCC);
        assert_eq!(regs.char_memory(), 0x1000);
    }

    #[test]
    fn raster_is_split_over_03_and_04() {
        let mut regs = reset();
        regs.set_raster_line(0x123);
        assert_eq!(regs.read(0x04), 0x91);
        assert_eq!(regs.read(0x03), 0x80 | 0x2E);
        regs.set_raster_line(0x122);
        assert_eq!(regs.read(0x03), 0x2E);
    }

    #[test]
    fn double_height_uses_16_line_characters() {
        let mut regs = reset();
        regs.write(0x03, 0x2F);
        assert!(regs.double_height());
        assert_eq!(regs.char_height(), 16);
        assert_eq!(regs.rows(), 23);
    }

    #[test]
    fn colours_and_volume() {
        let mut regs = reset();
        regs.write(0x0E, 0x7A);
        regs.write(0x0F, 0x25);
        assert_eq!(regs.auxiliary_colour(), 7);
        assert_eq!(regs.volume(), 0x0A);
        assert_eq!(regs.background_colour(), 2);
        assert_eq!(regs.border_colour(), 5);
        assert!(regs.reverse_mode());
    }

    #[test]
    fn light_pen_and_paddles_are_read_only() {
        let mut regs = reset();
        regs.latch_light_pen(40, 60);
        regs.write(0x06, 0);
        regs.write(0x07, 0);
        assert_eq!(regs.read(0x06), 40);
        assert_eq!(regs.read(0x07), 60);
        assert_eq!(regs.read(0x08), 0xFF);
        regs.set_paddles(1, 2);
        assert_eq!(regs.read(0x19), 2);
    }

    proptest! {
        #[test]
        fn plain_registers_read_back(reg in prop::sample::select(vec![0x00usize, 0x01, 0x02, 0x05, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F]), value: u8) {
            let mut regs = reset();
            regs.write(0x9000 + reg, value);
            prop_assert_eq!(regs.read(reg), value);
            prop_assert_eq!(regs.read(reg + REGISTER_COUNT), value);
        }
    }
}
