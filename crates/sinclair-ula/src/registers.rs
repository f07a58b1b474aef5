//! Port $FE. The ULA decodes only A0: every even port is the ULA.
//!
//! Write: border colour (bits 0-2), MIC (bit 3), speaker/EAR (bit 4).
//!
//! Read: bits 0-4 are the keyboard half-rows selected by the zero bits of
//! the address high byte, ANDed together (0 = pressed); bit 6 is the EAR
//! input; bits 5 and 7 read 1.
//!
//! | A8  | A9  | A10 | A11 | A12 | A13 | A14 | A15   |
//! |-----|-----|-----|-----|-----|-----|-----|-------|
//! | CS-V| A-G | Q-T | 1-5 | 0-6 | P-Y | Ent-H | Sp-B |

pub const KEYBOARD_ROWS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UlaRegisters {
    raw: u8,
    border: u8,
    mic: bool,
    speaker: bool,
    keyboard: [u8; KEYBOARD_ROWS],
    ear_input: bool,
}

impl UlaRegisters {
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: 0x07,
            border: 7,
            mic: false,
            speaker: false,
            keyboard: [0x1F; KEYBOARD_ROWS],
            ear_input: false,
        }
    }

    /// True if `port` is decoded by the ULA.
    #[must_use]
    pub const fn is_ula_port(port: u16) -> bool {
        port & 0x01 == 0
    }

    /// OUT to `port`; ignored for odd ports.
    pub fn write(&mut self, port: u16, value: u8) {
        if !Self::is_ula_port(port) {
            return;
        }
        self.raw = value;
        self.border = value & 0x07;
        self.mic = value & 0x08 != 0;
        self.speaker = value & 0x10 != 0;
    }

    /// IN from `port`, or `None` for odd ports (the bus floats).
    #[must_use]
    pub fn read(&self, port: u16) -> Option<u8> {
        if !Self::is_ula_port(port) {
            return None;
        }
        let high = (port >> 8) as u8;
        let keys = self
            .keyboard
            .iter()
            .enumerate()
            .filter(|&(row, _)| high & (1 << row) == 0)
            .fold(0x1F, |acc, (_, &bits)| acc & bits);
        let ear = if self.ear_input { 0x40 } else { 0 };
        Some(0xA0 | ear | keys)
    }

    /// Last byte written to the port.
    #[must_use]
    pub fn raw(&self) -> u8 {
        self.raw
    }

    #[must_use]
    pub fn border(&self) -> u8 {
        self.border
    }

    #[must_use]
    pub fn mic(&self) -> bool {
        self.mic
    }

    #[must_use]
    pub fn speaker(&self) -> bool {
        self.speaker
    }

    /// Set half-row `row` (0-7); bits 0-4 active low.
    pub fn set_keyboard_row(&mut self, row: usize, bits: u8) {
        if let Some(slot) = self.keyboard.get_mut(row) {
            *slot = bits | 0xE0;
        }
    }

    pub fn set_ear_input(&mut self, level: bool) {
        self.ear_input = level;
    }
}

impl Default for UlaRegisters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn write_decodes_border_mic_and_speaker() {
        let mut regs = UlaRegisters::new();
        regs.write(0x00FE, 0x1A);
        assert_eq!(regs.border(), 2);
        assert!(regs.mic());
        assert!(regs.speaker());
        assert_eq!(regs.raw(), 0x1A);
    }

    #[test]
    fn odd_ports_are_not_decoded() {
        let mut regs = UlaRegisters::new();
        regs.write(0x00FF, 0x02);
        assert_eq!(regs.border(), 7);
        assert_eq!(regs.read(0x00FF), None);
    }

    #[test]
    fn idle_keyboard_reads_bf() {
        let regs = UlaRegisters::new();
        assert_eq!(regs.read(0x00FE), Some(0xBF));
    }

    #[test]
    fn half_rows_are_selected_by_the_high_byte() {
        let mut regs = UlaRegisters::new();
        // A pressed on row 1, SPACE on row 7
        regs.set_keyboard_row(1, 0x1E);
        regs.set_keyboard_row(7, 0x1E);
        assert_eq!(regs.read(0xFDFE), Some(0xBE));
        assert_eq!(regs.read(0x7FFE), Some(0xBE));
        assert_eq!(regs.read(0xFEFE), Some(0xBF));
        assert_eq!(regs.read(0x00FE), Some(0xBE));
    }

    #[test]
    fn ear_input_is_bit_6() {
        let mut regs = UlaRegisters::new();
        regs.set_ear_input(true);
        assert_eq!(regs.read(0xFEFE), Some(0xFF));
    }

    #[test]
    fn out_of_range_row_is_ignored() {
        let mut regs = UlaRegisters::new();
        regs.set_keyboard_row(8, 0);
        assert_eq!(regs.read(0x00FE), Some(0xBF));
    }

    proptest! {
        #[test]
        fn unused_bits_read_one(high: u8, rows in prop::array::uniform8(0u8..0x20)) {
            let mut regs = UlaRegisters::new();
            for (row, bits) in rows.iter().enumerate() {
                regs.set_keyboard_row(row, *bits);
            }
            let value = regs.read(u16::from(high) << 8 | 0xFE).expect("even port");
            prop_assert_eq!(value & 0xA0, 0xA0);
        }
    }
}
