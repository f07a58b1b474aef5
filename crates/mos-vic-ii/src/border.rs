//! Main and vertical border flip-flops.
//!
//! The main flip-flop covers the side borders, the vertical one the top
//! and bottom borders. Both are compared against the screen window, so
//! the 38-column and 24-row settings move the edges. Opening the border
//! (clearing the main flip-flop) needs the vertical flip-flop clear.

use crate::registers::VicIIRegisters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderUnit {
    pub main: bool,
    pub vertical: bool,
}

impl Default for BorderUnit {
    fn default() -> Self {
        Self {
            main: true,
            vertical: true,
        }
    }
}

impl BorderUnit {
    /// Compare `line` against the top/bottom border lines. Runs at the left
    /// edge of the screen window and at the end of every line.
    pub fn check_vertical(&mut self, line: u16, regs: &VicIIRegisters) {
        if line == regs.max_raster_line() {
            self.vertical = true;
        } else if line == regs.min_raster_line() && regs.display_enabled() {
            self.vertical = false;
        }
    }

    /// Run the comparators over the 8 pixels starting at `aligned_column`
    /// (visible-zone coordinates) and return the border pixels as a mask.
    pub fn block(
        &mut self,
        aligned_column: u16,
        first_screen_column: u16,
        last_screen_column: u16,
        line: u16,
        regs: &VicIIRegisters,
    ) -> u8 {
        let mut mask = 0;
        for i in 0..8u16 {
            let x = aligned_column + i;
            if x == last_screen_column + 1 {
                self.main = true;
            }
            if x == first_screen_column {
                self.check_vertical(line, regs);
                if !self.vertical {
                    self.main = false;
                }
            }
            if self.main {
                mask |= 0x80 >> i;
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_line(border: &mut BorderUnit, line: u16, first: u16, last: u16, regs: &VicIIRegisters) -> Vec<u8> {
        (0..48)
            .map(|block| border.block(block * 8, first, last, line, regs))
            .collect()
    }

    #[test]
    fn border_opens_only_on_display_lines() {
        let regs = VicIIRegisters::new();
        let mut border = BorderUnit::default();

        let masks = run_line(&mut border, 50, 32, 351, &regs);
        assert!(masks.iter().all(|&m| m == 0xFF));

        let masks = run_line(&mut border, 51, 32, 351, &regs);
        assert_eq!(masks[3], 0xFF);
        assert_eq!(masks[4], 0x00);
        assert_eq!(masks[43], 0x00);
        assert_eq!(masks[44], 0xFF);
    }

    #[test]
    fn narrow_screen_moves_both_edges() {
        let mut regs = VicIIRegisters::new();
        regs.write(0x16, 0x00);
        let mut border = BorderUnit {
            vertical: false,
            ..BorderUnit::default()
        };
        // 38 columns: screen window 39..=342
        let masks = run_line(&mut border, 100, 39, 342, &regs);
        assert_eq!(masks[4], 0b1111_1110);
        assert_eq!(masks[42], 0b0000_0001);
        assert_eq!(masks[43], 0xFF);
    }

    #[test]
    fn display_disabled_keeps_the_border_closed() {
        let mut regs = VicIIRegisters::new();
        regs.write(0x11, 0x0B);
        let mut border = BorderUnit::default();
        for line in 0..312 {
            let masks = run_line(&mut border, line, 32, 351, &regs);
            assert!(masks.iter().all(|&m| m == 0xFF), "line {line}");
            border.check_vertical(line, &regs);
        }
    }

    #[test]
    fn bottom_border_closes_at_max_line() {
        let regs = VicIIRegisters::new();
        let mut border = BorderUnit::default();
        border.check_vertical(51, &regs);
        assert!(!border.vertical);
        border.check_vertical(251, &regs);
        assert!(border.vertical);
    }
}
