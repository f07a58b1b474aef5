//! Sprite DMA and display sequencing.

use crate::registers::SpriteRegisters;

/// Lines of data in a sprite (63 bytes / 3).
pub const SPRITE_LINES: u8 = 21;

/// Runtime state of one sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteUnit {
    /// DMA switched on (the sprite is being displayed this frame).
    pub active: bool,
    /// Data line fetched next (0-21).
    pub line: u8,
    /// Y expansion flip-flop: the line advances only while it is set.
    pub expansion_ff: bool,
    /// Pattern for the line being displayed.
    pub data: [u8; 3],
    /// Whether `data` was fetched for the line being displayed.
    pub has_data: bool,
}

impl Default for SpriteUnit {
    fn default() -> Self {
        Self {
            active: false,
            line: 0,
            expansion_ff: true,
            data: [0; 3],
            has_data: false,
        }
    }
}

impl SpriteUnit {
    /// Cycle 55: toggle the expansion flip-flop and start DMA when the Y
    /// coordinate matches the raster line.
    pub fn check_dma_start(&mut self, regs: &SpriteRegisters, raster_line: u16) {
        if regs.expand_y {
            self.expansion_ff = !self.expansion_ff;
        } else {
            self.expansion_ff = true;
        }

        if regs.enabled && !self.active && regs.y == raster_line as u8 {
            self.active = true;
            self.line = 0;
            if regs.expand_y {
                self.expansion_ff = false;
            }
        }
    }

    /// Cycle 15: move to the next data line; DMA stops after line 20.
    pub fn advance_line(&mut self) {
        if !self.active {
            return;
        }
        if self.expansion_ff {
            self.line += 1;
        }
        if self.line >= SPRITE_LINES {
            self.active = false;
        }
    }

    /// Offset of the next line's data inside the 64-byte sprite block.
    #[must_use]
    pub fn data_offset(&self) -> u16 {
        u16::from(self.line) * 3
    }

    pub fn load(&mut self, data: [u8; 3]) {
        self.data = data;
        self.has_data = true;
    }

    pub fn clear(&mut self) {
        self.data = [0; 3];
        self.has_data = false;
    }

    /// The 24-bit shift register contents, bit 23 = leftmost pixel.
    #[must_use]
    pub fn pattern(&self) -> u32 {
        u32::from(self.data[0]) << 16 | u32::from(self.data[1]) << 8 | u32::from(self.data[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_at(y: u8, expand_y: bool) -> SpriteRegisters {
        SpriteRegisters {
            y,
            enabled: true,
            expand_y,
            ..SpriteRegisters::default()
        }
    }

    /// Data lines fetched at cycle 58 of each raster line, running the
    /// cycle 15 and cycle 55 steps in order from line `start`.
    fn fetched_lines(regs: &SpriteRegisters, start: u16) -> Vec<u8> {
        let mut unit = SpriteUnit::default();
        let mut fetched = Vec::new();
        for raster in start..start + 60 {
            unit.advance_line();
            unit.check_dma_start(regs, raster);
            if unit.active {
                fetched.push(unit.line);
            }
        }
        fetched
    }

    #[test]
    fn dma_starts_on_matching_line_only() {
        let regs = enabled_at(100, false);
        let mut unit = SpriteUnit::default();
        unit.check_dma_start(&regs, 99);
        assert!(!unit.active);
        unit.check_dma_start(&regs, 100);
        assert!(unit.active);
        assert_eq!(unit.line, 0);
    }

    #[test]
    fn low_byte_of_raster_line_is_compared() {
        let regs = enabled_at(0x05, false);
        let mut unit = SpriteUnit::default();
        unit.check_dma_start(&regs, 0x105);
        assert!(unit.active);
    }

    #[test]
    fn unexpanded_sprite_runs_21_lines() {
        let fetched = fetched_lines(&enabled_at(50, false), 50);
        assert_eq!(fetched, (0..21).collect::<Vec<u8>>());
    }

    #[test]
    fn expanded_sprite_runs_42_lines() {
        let fetched = fetched_lines(&enabled_at(50, true), 50);
        assert_eq!(fetched.len(), 42);
        assert_eq!(&fetched[..4], &[0, 0, 1, 1]);
        assert_eq!(fetched.last(), Some(&20));
    }

    #[test]
    fn disabled_sprite_never_starts() {
        let regs = SpriteRegisters {
            y: 50,
            ..SpriteRegisters::default()
        };
        let mut unit = SpriteUnit::default();
        unit.check_dma_start(&regs, 50);
        assert!(!unit.active);
    }

    #[test]
    fn pattern_is_msb_first() {
        let mut unit = SpriteUnit::default();
        unit.load([0x80, 0x00, 0x01]);
        assert_eq!(unit.pattern(), 0x80_0001);
    }
}
