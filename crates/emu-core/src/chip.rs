use crate::{ChipError, ChipMemory, Cpu, EventQueue, Raster, ScreenMemory};

/// A raster-driven video chip.
///
/// The machine calls [`simulate`](Self::simulate) after every CPU step; the
/// chip runs as many of its own cycles as the CPU has run since the previous
/// call. The first call after [`initialize`](Self::initialize) only records
/// the CPU's cycle count.
pub trait GraphicalChip {
    /// Reset to power-on state and check the chip can run against `memory`.
    fn initialize(&mut self, memory: &dyn ChipMemory) -> Result<(), ChipError>;

    /// Catch up with the CPU.
    fn simulate(&mut self, cpu: &mut dyn Cpu, memory: &mut dyn ChipMemory);

    fn raster(&self) -> &Raster;

    fn screen_memory(&self) -> &ScreenMemory;

    fn events(&mut self) -> &mut EventQueue;
}
