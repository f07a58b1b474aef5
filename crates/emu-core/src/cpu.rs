//! What a video chip needs from the CPU.
//!
//! The chip only reads the cycle counter, steals cycles (bad lines, sprite
//! DMA) and raises interrupt requests. Instruction execution lives in the
//! CPU crates.

/// Interrupt input a chip can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterruptLine {
    /// Maskable interrupt (6502 IRQ, Z80 INT).
    Irq,
    /// Non-maskable interrupt.
    Nmi,
}

/// A level-style interrupt request; the CPU decides when to take it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptRequest {
    pub line: InterruptLine,
    /// CPU cycle the condition was raised on.
    pub at_cycle: u64,
    /// Requesting chip, for tracing.
    pub source: &'static str,
    /// Chip-specific cause bits (e.g. VIC-II $D019 low nibble).
    pub reason: u8,
}

/// CPU as seen from a video chip.
pub trait Cpu {
    /// Monotonic count of elapsed CPU cycles.
    fn clock_cycles(&self) -> u64;

    /// Charge `cycles` stolen by the chip to the CPU.
    fn add_clock_cycles(&mut self, cycles: u32);

    fn request_interrupt(&mut self, request: InterruptRequest);
}

/// A CPU stand-in that only counts cycles and records requests.
#[derive(Debug, Clone, Default)]
pub struct CycleCpu {
    cycles: u64,
    stolen: u64,
    requests: Vec<InterruptRequest>,
}

impl CycleCpu {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `cycles` CPU cycles.
    pub fn advance(&mut self, cycles: u64) {
        self.cycles += cycles;
    }

    /// Total cycles charged through [`Cpu::add_clock_cycles`].
    #[must_use]
    pub fn stolen_cycles(&self) -> u64 {
        self.stolen
    }

    #[must_use]
    pub fn requests(&self) -> &[InterruptRequest] {
        &self.requests
    }

    pub fn take_requests(&mut self) -> Vec<InterruptRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl Cpu for CycleCpu {
    fn clock_cycles(&self) -> u64 {
        self.cycles
    }

    fn add_clock_cycles(&mut self, cycles: u32) {
        self.cycles += u64::from(cycles);
        self.stolen += u64::from(cycles);
    }

    fn request_interrupt(&mut self, request: InterruptRequest) {
        self.requests.push(request);
    }
}
