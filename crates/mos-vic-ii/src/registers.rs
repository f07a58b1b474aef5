//! VIC-II register bank ($D000-$D03F, mirrored every $40 bytes).
//!
//! | Reg       | Description                                              |
//! |-----------|----------------------------------------------------------|
//! | $00-$0F   | Sprite 0-7 X (low 8 bits) / Y                            |
//! | $10       | Sprite X bit 8                                           |
//! | $11       | YSCROLL, RSEL, DEN, BMM, ECM, raster bit 8               |
//! | $12       | Raster line (read) / raster compare (write)              |
//! | $13/$14   | Light pen X/2, Y                                         |
//! | $15       | Sprite enable                                            |
//! | $16       | XSCROLL, CSEL, MCM, RES                                  |
//! | $17       | Sprite Y expansion                                       |
//! | $18       | Video matrix / character / bitmap base                   |
//! | $19       | IRQ status (write 1 to clear)                            |
//! | $1A       | IRQ enable                                               |
//! | $1B       | Sprite behind foreground                                 |
//! | $1C       | Sprite multicolour                                       |
//! | $1D       | Sprite X expansion                                       |
//! | $1E/$1F   | Sprite-sprite / sprite-data collisions (clear on read)   |
//! | $20-$2E   | Border, background 0-3, sprite MC 0-1, sprite 0-7 colour |
//! | $2F-$3F   | Unused, read $FF                                         |

use bitflags::bitflags;
use tracing::{debug, warn};

/// Size of the register bank; addresses are taken modulo this.
pub const REGISTER_COUNT: usize = 0x40;

bitflags! {
    /// VIC-II interrupt sources, as laid out in $D019/$D01A.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IrqSource: u8 {
        const RASTER = 0x01;
        const SPRITE_DATA_COLLISION = 0x02;
        const SPRITE_SPRITE_COLLISION = 0x04;
        const LIGHT_PEN = 0x08;
    }
}

/// Graphic mode selected by ECM ($11 bit 6), BMM ($11 bit 5) and MCM
/// ($16 bit 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicMode {
    Char,
    MulticolourChar,
    Bitmap,
    MulticolourBitmap,
    ExtendedBackground,
    /// ECM + MCM.
    InvalidText,
    /// ECM + BMM.
    InvalidBitmap1,
    /// ECM + BMM + MCM.
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
}

/// Decoded attributes of one sprite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteRegisters {
    /// 9-bit X position, in raster column units.
    pub x: u16,
    pub y: u8,
    pub enabled: bool,
    pub expand_x: bool,
    pub expand_y: bool,
    pub multicolour: bool,
    /// Drawn behind foreground graphics ($1B).
    pub behind_foreground: bool,
    pub colour: u8,
}

/// The register bank and its decoded fields.
#[derive(Debug, Clone)]
pub struct VicIIRegisters {
    raw: [u8; REGISTER_COUNT],

    sprites: [SpriteRegisters; 8],
    sprite_shared_colours: [u8; 2],
    border_colour: u8,
    background_colours: [u8; 4],

    vertical_scroll: u8,
    horizontal_scroll: u8,
    rows25: bool,
    columns40: bool,
    display_enabled: bool,
    video_reset: bool,
    extended_colour: bool,
    bitmap: bool,
    multicolour: bool,
    graphic_mode: GraphicMode,

    irq_raster_line: u16,
    irq_enabled: IrqSource,
    irq_happened: IrqSource,
    sprite_sprite_collisions: u8,
    sprite_data_collisions: u8,

    /// Upper/lower border comparison lines (RSEL dependent).
    min_raster_line: u16,
    max_raster_line: u16,

    bank: u8,
    screen_memory: u16,
    char_memory: u16,
    bitmap_memory: u16,

    current_raster_line: u16,
    light_pen_active: bool,
    light_pen_x: u8,
    light_pen_y: u8,
}

impl VicIIRegisters {
    #[must_use]
    pub fn new() -> Self {
        let mut regs = Self {
            raw: [0; REGISTER_COUNT],
            sprites: [SpriteRegisters::default(); 8],
            sprite_shared_colours: [0; 2],
            border_colour: 0,
            background_colours: [0; 4],
            vertical_scroll: 0,
            horizontal_scroll: 0,
            rows25: true,
            columns40: true,
            display_enabled: true,
            video_reset: false,
            extended_colour: false,
            bitmap: false,
            multicolour: false,
            graphic_mode: GraphicMode::Char,
            irq_raster_line: 0,
            irq_enabled: IrqSource::empty(),
            irq_happened: IrqSource::empty(),
            sprite_sprite_collisions: 0,
            sprite_data_collisions: 0,
            min_raster_line: 51,
            max_raster_line: 251,
            bank: 0,
            screen_memory: 0,
            char_memory: 0,
            bitmap_memory: 0,
            current_raster_line: 0,
            light_pen_active: false,
            light_pen_x: 0,
            light_pen_y: 0,
        };
        regs.initialize();
        regs
    }

    /// Power-on state.
    pub fn initialize(&mut self) {
        for reg in 0..REGISTER_COUNT {
            let value = match reg {
                0x11 => 0x1B,
                0x16 => 0x08,
                0x18 => 0x15,
                0x19 => 0xFF,
                _ => 0x00,
            };
            self.write(reg, value);
        }
        self.irq_happened = IrqSource::empty();
        self.sprite_sprite_collisions = 0;
        self.sprite_data_collisions = 0;
        self.current_raster_line = 0;
        self.light_pen_x = 0;
        self.light_pen_y = 0;
    }

    /// CPU write.
    pub fn write(&mut self, address: usize, value: u8) {
        let reg = address % REGISTER_COUNT;
        self.raw[reg] = value;

        match reg {
            0x00..=0x0F => {
                let sprite = &mut self.sprites[reg >> 1];
                if reg & 1 == 0 {
                    sprite.x = (sprite.x & 0x100) | u16::from(value);
                } else {
                    sprite.y = value;
                }
            }
            0x10 => {
                for (i, sprite) in self.sprites.iter_mut().enumerate() {
                    sprite.x = (sprite.x & 0xFF) | (u16::from(value >> i & 1) << 8);
                }
            }
            0x11 => {
                self.vertical_scroll = value & 0x07;
                self.rows25 = value & 0x08 != 0;
                (self.min_raster_line, self.max_raster_line) =
                    if self.rows25 { (51, 251) } else { (55, 247) };
                self.display_enabled = value & 0x10 != 0;
                self.bitmap = value & 0x20 != 0;
                self.extended_colour = value & 0x40 != 0;
                self.irq_raster_line = (self.irq_raster_line & 0xFF) | (u16::from(value & 0x80) << 1);
                self.update_graphic_mode();
            }
            0x12 => self.irq_raster_line = (self.irq_raster_line & 0x100) | u16::from(value),
            0x13 | 0x14 => {}
            0x15 => self.each_sprite(value, |s, on| s.enabled = on),
            0x16 => {
                self.horizontal_scroll = value & 0x07;
                self.columns40 = value & 0x08 != 0;
                self.multicolour = value & 0x10 != 0;
                let reset = value & 0x20 != 0;
                if reset && !self.video_reset {
                    warn!("VIC-II video reset asserted");
                }
                self.video_reset = reset;
                self.update_graphic_mode();
            }
            0x17 => self.each_sprite(value, |s, on| s.expand_y = on),
            0x18 => self.update_memory_pointers(),
            0x19 => self.irq_happened.remove(IrqSource::from_bits_truncate(value)),
            0x1A => self.irq_enabled = IrqSource::from_bits_truncate(value),
            0x1B => self.each_sprite(value, |s, on| s.behind_foreground = on),
            0x1C => self.each_sprite(value, |s, on| s.multicolour = on),
            0x1D => self.each_sprite(value, |s, on| s.expand_x = on),
            0x1E | 0x1F => {}
            0x20 => self.border_colour = value & 0x0F,
            0x21..=0x24 => self.background_colours[reg - 0x21] = value & 0x0F,
            0x25 | 0x26 => self.sprite_shared_colours[reg - 0x25] = value & 0x0F,
            0x27..=0x2E => self.sprites[reg - 0x27].colour = value & 0x0F,
            _ => {}
        }
    }

    /// CPU read. Reading the collision registers clears them.
    pub fn read(&mut self, address: usize) -> u8 {
        let reg = address % REGISTER_COUNT;
        let value = self.peek(reg);
        match reg {
            0x1E => self.sprite_sprite_collisions = 0,
            0x1F => self.sprite_data_collisions = 0,
            _ => {}
        }
        value
    }

    /// Read without side effects.
    #[must_use]
    pub fn peek(&self, address: usize) -> u8 {
        let reg = address % REGISTER_COUNT;
        match reg {
            0x00..=0x10 | 0x15 | 0x17 | 0x18 | 0x1B..=0x1D => self.raw[reg],
            0x11 => (self.raw[reg] & 0x7F) | (((self.current_raster_line >> 1) & 0x80) as u8),
            0x12 => self.current_raster_line as u8,
            0x13 => if self.light_pen_active { self.light_pen_x } else { 0 },
            0x14 => if self.light_pen_active { self.light_pen_y } else { 0 },
            0x16 => self.raw[reg] | 0xC0,
            0x19 => 0x70 | self.irq_happened.bits() | if self.launch_irq() { 0x80 } else { 0 },
            0x1A => 0xF0 | self.irq_enabled.bits(),
            0x1E => self.sprite_sprite_collisions,
            0x1F => self.sprite_data_collisions,
            0x20..=0x2E => self.raw[reg] | 0xF0,
            _ => 0xFF,
        }
    }

    fn each_sprite(&mut self, value: u8, mut set: impl FnMut(&mut SpriteRegisters, bool)) {
        for (i, sprite) in self.sprites.iter_mut().enumerate() {
            set(sprite, value >> i & 1 != 0);
        }
    }

    fn update_graphic_mode(&mut self) {
        let mode = GraphicMode::from_bits(self.extended_colour, self.bitmap, self.multicolour);
        if mode != self.graphic_mode {
            if mode.is_valid() {
                debug!(?mode, "VIC-II graphic mode");
            } else {
                warn!(?mode, "VIC-II invalid graphic mode selected");
            }
            self.graphic_mode = mode;
        }
    }

    fn update_memory_pointers(&mut self) {
        let value = u16::from(self.raw[0x18]);
        let base = self.bank_base();
        self.char_memory = base + ((value & 0x0E) << 10);
        self.screen_memory = base + ((value & 0xF0) << 6);
        self.bitmap_memory = base + ((value & 0x08) << 10);
    }

    /// Select the 16K bank the chip addresses (CIA2 port A, inverted).
    pub fn set_bank(&mut self, bank: u8) {
        self.bank = bank & 0x03;
        self.update_memory_pointers();
    }

    #[must_use]
    pub fn bank(&self) -> u8 {
        self.bank
    }

    #[must_use]
    pub fn bank_base(&self) -> u16 {
        u16::from(self.bank) * 0x4000
    }

    #[must_use]
    pub fn screen_memory(&self) -> u16 {
        self.screen_memory
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
    pub fn sprite_pointers(&self) -> u16 {
        self.screen_memory + 0x3F8
    }

    #[must_use]
    pub fn sprite(&self, n: usize) -> &SpriteRegisters {
        &self.sprites[n]
    }

    #[must_use]
    pub fn sprite_shared_colour(&self, n: usize) -> u8 {
        self.sprite_shared_colours[n]
    }

    #[must_use]
    pub fn border_colour(&self) -> u8 {
        self.border_colour
    }

    #[must_use]
    pub fn background_colour(&self, n: usize) -> u8 {
        self.background_colours[n]
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

    /// DEN: when clear the whole screen shows the border colour.
    #[must_use]
    pub fn display_enabled(&self) -> bool {
        self.display_enabled
    }

    #[must_use]
    pub fn video_reset(&self) -> bool {
        self.video_reset
    }

    #[must_use]
    pub fn extended_colour(&self) -> bool {
        self.extended_colour
    }

    #[must_use]
    pub fn graphic_mode(&self) -> GraphicMode {
        self.graphic_mode
    }

    #[must_use]
    pub fn irq_raster_line(&self) -> u16 {
        self.irq_raster_line
    }

    #[must_use]
    pub fn min_raster_line(&self) -> u16 {
        self.min_raster_line
    }

    #[must_use]
    pub fn max_raster_line(&self) -> u16 {
        self.max_raster_line
    }

    pub fn set_current_raster_line(&mut self, line: u16) {
        self.current_raster_line = line;
    }

    #[must_use]
    pub fn current_raster_line(&self) -> u16 {
        self.current_raster_line
    }

    /// Latch an interrupt condition.
    pub fn raise(&mut self, source: IrqSource) {
        self.irq_happened.insert(source);
    }

    #[must_use]
    pub fn irq_happened(&self) -> IrqSource {
        self.irq_happened
    }

    #[must_use]
    pub fn irq_enabled(&self) -> IrqSource {
        self.irq_enabled
    }

    /// Latched and enabled sources, as the $D019 low nibble.
    #[must_use]
    pub fn reason_irq_code(&self) -> u8 {
        (self.irq_happened & self.irq_enabled).bits()
    }

    #[must_use]
    pub fn launch_irq(&self) -> bool {
        self.irq_happened.intersects(self.irq_enabled)
    }

    /// OR new sprite-sprite collisions into $1E. The IRQ is only raised
    /// when the register was clear.
    pub fn add_sprite_sprite_collisions(&mut self, sprites: u8) {
        if sprites == 0 {
            return;
        }
        if self.sprite_sprite_collisions == 0 {
            self.raise(IrqSource::SPRITE_SPRITE_COLLISION);
        }
        self.sprite_sprite_collisions |= sprites;
    }

    /// OR new sprite-data collisions into $1F, raising the IRQ as for $1E.
    pub fn add_sprite_data_collisions(&mut self, sprites: u8) {
        if sprites == 0 {
            return;
        }
        if self.sprite_data_collisions == 0 {
            self.raise(IrqSource::SPRITE_DATA_COLLISION);
        }
        self.sprite_data_collisions |= sprites;
    }

    /// Whether a light pen is connected; without one $13/$14 read 0.
    pub fn set_light_pen_active(&mut self, active: bool) {
        self.light_pen_active = active;
    }

    #[must_use]
    pub fn light_pen_active(&self) -> bool {
        self.light_pen_active
    }

    /// Store the beam position seen by the pen and raise its IRQ.
    pub fn latch_light_pen(&mut self, column: u16, line: u16) {
        self.light_pen_x = (column >> 1) as u8;
        self.light_pen_y = line as u8;
        self.raise(IrqSource::LIGHT_PEN);
    }
}

impl Default for VicIIRegisters {
    fn default() -> Self {
        Self::new()
    }
}
