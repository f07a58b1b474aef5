//! Pixel generation for one 8-pixel block.
//!
//! Each chip cycle in the visible zone produces eight pixels. The graphics
//! sequencer turns the fetched line data into background/foreground
//! pixels, the sprite sequencer overlays up to eight sprites, and the two
//! are merged by priority. Bit masks use bit 7 for the leftmost pixel.

use crate::fetch::LineData;
use crate::registers::{GraphicMode, VicIIRegisters};
use crate::sprite::SpriteUnit;

/// Pixels in the display window.
pub const DISPLAY_WIDTH: i32 = 320;

/// Where the current block sits relative to the display window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawContext {
    /// First display column, in visible-zone coordinates.
    pub first_display_column: u16,
    /// Screen window (display window after 38-column reduction).
    pub first_screen_column: u16,
    pub last_screen_column: u16,
    /// XSCROLL, 0-7.
    pub horizontal_scroll: u8,
    /// Visible-zone column of pixel 0 of the block.
    pub aligned_column: u16,
}

impl DrawContext {
    /// Display-window pixel shown by pixel 0 of the block; negative in the
    /// left border or while scrolled.
    #[must_use]
    pub fn graphics_start(&self) -> i32 {
        i32::from(self.aligned_column)
            - i32::from(self.first_display_column)
            - i32::from(self.horizontal_scroll)
    }
}

/// Graphics sequencer output for one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphicsBlock {
    pub background: [u8; 8],
    pub foreground: [Option<u8>; 8],
    /// Pixels that take part in sprite-data collisions.
    pub collision_mask: u8,
    /// Drawn in one of the invalid modes (black).
    pub invalid: bool,
}

impl GraphicsBlock {
    fn filled(background: u8) -> Self {
        Self {
            background: [background; 8],
            ..Self::default()
        }
    }

    fn set_foreground(&mut self, i: usize, colour: u8, collides: bool) {
        self.foreground[i] = Some(colour);
        if collides {
            self.collision_mask |= 0x80 >> i;
        }
    }
}

/// Run the graphics sequencer over one block.
#[must_use]
pub fn draw_graphics(
    ctx: &DrawContext,
    mode: GraphicMode,
    line: &LineData,
    regs: &VicIIRegisters,
) -> GraphicsBlock {
    let mut block = GraphicsBlock::filled(regs.background_colour(0));
    let start = ctx.graphics_start();
    if start <= -8 || start >= DISPLAY_WIDTH {
        return block;
    }

    if !mode.is_valid() {
        block.background = [0; 8];
        block.invalid = true;
        return block;
    }

    for i in 0..8 {
        let pixel = start + i as i32;
        if pixel < 0 {
            continue;
        }
        if pixel >= DISPLAY_WIDTH {
            break;
        }
        let pixel = pixel as usize;
        let cell = pixel >> 3;
        let data = line.graphics[cell];
        let code = line.codes[cell];
        let colour = line.colours[cell];
        let bit = data >> (7 - (pixel & 7)) & 1 != 0;
        let pair = data >> (6 - (pixel & 6)) & 3;

        match mode {
            GraphicMode::Char => {
                if bit {
                    block.set_foreground(i, colour & 0x0F, true);
                }
            }
            GraphicMode::MulticolourChar => {
                if colour & 0x08 == 0 {
                    if bit {
                        block.set_foreground(i, colour & 0x07, true);
                    }
                } else {
                    match pair {
                        0b01 => block.background[i] = regs.background_colour(1),
                        0b10 => block.set_foreground(i, regs.background_colour(2), true),
                        0b11 => block.set_foreground(i, colour & 0x07, true),
                        _ => {}
                    }
                }
            }
            GraphicMode::ExtendedBackground => {
                if bit {
                    block.set_foreground(i, colour & 0x0F, true);
                } else {
                    block.background[i] = regs.background_colour(usize::from(code >> 6));
                }
            }
            GraphicMode::Bitmap => {
                if bit {
                    block.set_foreground(i, code >> 4, true);
                } else {
                    block.background[i] = code & 0x0F;
                }
            }
            GraphicMode::MulticolourBitmap => match pair {
                0b01 => block.background[i] = code >> 4,
                0b10 => block.set_foreground(i, code & 0x0F, true),
                0b11 => block.set_foreground(i, colour & 0x0F, true),
                _ => {}
            },
            GraphicMode::InvalidText | GraphicMode::InvalidBitmap1 | GraphicMode::InvalidBitmap2 => {}
        }
    }
    block
}

/// Sprite sequencer output for one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteBlock {
    /// Colour of the highest-priority sprite pixel.
    pub colour: [Option<u8>; 8],
    /// Which sprite supplied `colour`.
    pub owner: [u8; 8],
    /// Opaque pixels per sprite.
    pub masks: [u8; 8],
}

/// Overlay the sprites on a block whose pixel 0 is at raster `column`.
///
/// `line_length` is the number of columns on a line; sprite X positions
/// wrap at it.
#[must_use]
pub fn draw_sprites(
    column: u16,
    line_length: u16,
    units: &[SpriteUnit; 8],
    regs: &VicIIRegisters,
) -> SpriteBlock {
    let mut block = SpriteBlock::default();

    // Sprite 0 has the highest priority, so it is drawn last.
    for n in (0..8).rev() {
        let unit = &units[n];
        if !unit.has_data {
            continue;
        }
        let attrs = regs.sprite(n);
        let pixel_width: u16 = if attrs.expand_x { 2 } else { 1 };
        let width = 24 * pixel_width;
        let pattern = unit.pattern();

        for i in 0..8u16 {
            let offset = (column + i + line_length - attrs.x % line_length) % line_length;
            if offset >= width {
                continue;
            }
            let x = u32::from(offset / pixel_width);
            let colour = if attrs.multicolour {
                match pattern >> (22 - (x & !1)) & 3 {
                    0b01 => Some(regs.sprite_shared_colour(0)),
                    0b10 => Some(attrs.colour),
                    0b11 => Some(regs.sprite_shared_colour(1)),
                    _ => None,
                }
            } else {
                (pattern >> (23 - x) & 1 != 0).then_some(attrs.colour)
            };

            if let Some(colour) = colour {
                let i = usize::from(i);
                block.colour[i] = Some(colour);
                block.owner[i] = n as u8;
                block.masks[n] |= 0x80 >> i;
            }
        }
    }
    block
}

/// Merge graphics and sprites by priority into palette indices.
#[must_use]
pub fn compose(graphics: &GraphicsBlock, sprites: &SpriteBlock, regs: &VicIIRegisters) -> [u8; 8] {
    let mut out = [0; 8];
    for (i, pixel) in out.iter_mut().enumerate() {
        let base = if graphics.invalid {
            0
        } else {
            graphics.foreground[i].unwrap_or(graphics.background[i])
        };
        *pixel = match sprites.colour[i] {
            Some(colour) => {
                let behind = regs.sprite(usize::from(sprites.owner[i])).behind_foreground;
                if behind && graphics.foreground[i].is_some() {
                    base
                } else {
                    colour
                }
            }
            None => base,
        };
    }
    out
}
