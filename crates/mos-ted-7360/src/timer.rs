//! The three 16-bit down counters of the TED.
//!
//! Timer 1 reloads from its latch when it reaches zero; timers 2 and 3
//! keep counting down from $FFFF. Writing the low byte stops a timer,
//! writing the high byte (re)starts it. Each timer counts once per chip
//! cycle.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunMode {
    /// Start again from the latched value.
    Reload,
    /// Wrap to $FFFF.
    Continuous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timer {
    mode: RunMode,
    latch: u16,
    counter: u16,
    running: bool,
}

impl Timer {
    #[must_use]
    pub const fn new(mode: RunMode) -> Self {
        Self {
            mode,
            latch: 0,
            counter: 0,
            running: false,
        }
    }

    pub fn initialize(&mut self) {
        self.latch = 0;
        self.counter = 0;
        self.running = false;
    }

    pub fn write_low(&mut self, value: u8) {
        self.running = false;
        self.latch = (self.latch & 0xFF00) | u16::from(value);
        self.counter = (self.counter & 0xFF00) | u16::from(value);
    }

    pub fn write_high(&mut self, value: u8) {
        self.latch = (self.latch & 0x00FF) | (u16::from(value) << 8);
        self.counter = self.latch;
        self.running = true;
    }

    #[must_use]
    pub fn low(&self) -> u8 {
        self.counter as u8
    }

    #[must_use]
    pub fn high(&self) -> u8 {
        (self.counter >> 8) as u8
    }

    #[must_use]
    pub fn counter(&self) -> u16 {
        self.counter
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Count one cycle. Returns `true` when the counter reached zero.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.counter = self.counter.wrapping_sub(1);
        if self.counter != 0 {
            return false;
        }
        if self.mode == RunMode::Reload {
            self.counter = self.latch;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(timer: &mut Timer, cycles: u32) -> u32 {
        (0..cycles).filter(|_| timer.tick()).count() as u32
    }

    #[test]
    fn low_byte_stops_high_byte_starts() {
        let mut timer = Timer::new(RunMode::Reload);
        timer.write_low(0x10);
        assert!(!timer.is_running());
        assert_eq!(run(&mut timer, 100), 0);

        timer.write_high(0x00);
        assert!(timer.is_running());
        assert_eq!(timer.counter(), 0x0010);
    }

    #[test]
    fn reload_timer_fires_every_latch_cycles() {
        let mut timer = Timer::new(RunMode::Reload);
        timer.write_low(0x20);
        timer.write_high(0x00);
        assert_eq!(run(&mut timer, 0x1F), 0);
        assert!(timer.tick());
        assert_eq!(timer.counter(), 0x20);
        assert_eq!(run(&mut timer, 0x20 * 3), 3);
    }

    #[test]
    fn continuous_timer_wraps_to_ffff() {
        let mut timer = Timer::new(RunMode::Continuous);
        timer.write_low(0x02);
        timer.write_high(0x00);
        assert_eq!(run(&mut timer, 2), 1);
        assert_eq!(timer.counter(), 0);
        timer.tick();
        assert_eq!(timer.counter(), 0xFFFF);
        assert_eq!((timer.high(), timer.low()), (0xFF, 0xFF));
    }
}
