//! Sinclair ULA (ZX Spectrum 48K).
//!
//! The ULA runs a 7 MHz pixel clock, two pixels per CPU T-state, and
//! fetches one bitmap and one attribute byte per 8-pixel cell from the
//! screen at $4000. It drives the border and the MIC/EAR lines through
//! port $FE, reads the keyboard on the same port and raises the Z80's
//! INT once per frame.
//!
//! # Timing
//!
//! - 312 lines of 224 T-states (69,888 per frame, 50.08 Hz)
//! - INT held for 32 T-states at the start of the frame
//! - The first screen byte is fetched 14,336 T-states after INT
//!
//! # Framebuffer
//!
//! 320 x 288 palette indices: 48 border lines above and below the
//! 256 x 192 screen, 32 border pixels left and right.
//!
//! # Contention
//!
//! The chip does not stall the CPU by itself. The CPU asks
//! [`Ula::contention`] and [`Ula::io_contention`] before each access and
//! charges the delay; [`Ula::read_port`] returns the floating bus on odd
//! ports.

mod contention;
mod draw;
mod palette;
mod registers;
mod timing;

use emu_core::{
    ChipError, ChipEvent, ChipMemory, Cpu, EventQueue, GraphicalChip, InterruptLine,
    InterruptRequest, Observable, Raster, ScreenMemory, Value, with_chip_view,
};
use tracing::{debug, trace};

use crate::draw::Cell;

pub use crate::contention::{
    CONTENTION_END_T_STATE, CONTENTION_PATTERN, contention, in_contention_area, io_contention,
};
pub use crate::draw::{ATTRIBUTE_OFFSET, SCREEN_BASE, attribute_address, bitmap_address};
pub use crate::palette::PALETTE;
pub use crate::registers::{KEYBOARD_ROWS, UlaRegisters};
pub use crate::timing::{
    FLASH_FRAMES, HORIZONTAL, INT_LENGTH_PIXELS, INT_LINE, LINES_PER_FRAME, PIXELS_PER_T_STATE,
    SCREEN_COLUMNS, SCREEN_LINES, T_STATES_PER_FRAME, T_STATES_PER_LINE, VERTICAL,
};

const CHIP_NAME: &str = "ULA";

/// How the chip is wired into the machine. The 48K ULA only exists in a
/// 50 Hz version, so there is no video standard to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UlaConfig {
    /// Memory view the chip fetches the screen through.
    pub view: usize,
}

impl Default for UlaConfig {
    fn default() -> Self {
        Self { view: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct Ula {
    config: UlaConfig,
    raster: Raster,
    screen: ScreenMemory,
    events: EventQueue,
    regs: UlaRegisters,

    /// Cell being drawn.
    cell: Cell,

    flash_counter: u8,
    flash_phase: bool,
    frames: u64,

    last_cpu_cycles: Option<u64>,
}

impl Ula {
    #[must_use]
    pub fn new(config: UlaConfig) -> Self {
        let raster = Raster::new(VERTICAL, HORIZONTAL, 1);
        let screen = ScreenMemory::new(
            usize::from(raster.visible_columns()),
            usize::from(raster.visible_lines()),
            &PALETTE,
        );
        Self {
            config,
            raster,
            screen,
            events: EventQueue::new(),
            regs: UlaRegisters::new(),
            cell: Cell::default(),
            flash_counter: 0,
            flash_phase: false,
            frames: 0,
            last_cpu_cycles: None,
        }
    }

    /// Power-on state: white border, beam 64 T-states before INT.
    pub fn initialize(&mut self, memory: &dyn ChipMemory) -> Result<(), ChipError> {
        self.raster.validate()?;
        if !memory.has_view(self.config.view) {
            return Err(ChipError::ViewNotFound {
                chip: CHIP_NAME,
                view: self.config.view,
            });
        }

        self.raster.initialize();
        self.regs = UlaRegisters::new();
        self.screen.clear(self.regs.border());
        self.events.clear();
        self.cell = Cell::default();
        self.flash_counter = 0;
        self.flash_phase = false;
        self.frames = 0;
        self.last_cpu_cycles = None;

        debug!(
            lines = LINES_PER_FRAME,
            t_states_per_line = T_STATES_PER_LINE,
            view = self.config.view,
            "ULA initialized"
        );
        Ok(())
    }

    /// Run the T-states the CPU has executed since the previous call.
    pub fn simulate(&mut self, cpu: &mut dyn Cpu, memory: &mut dyn ChipMemory) {
        let now = cpu.clock_cycles();
        let Some(last) = self.last_cpu_cycles else {
            self.last_cpu_cycles = Some(now);
            return;
        };

        for cycle in last..now {
            for _ in 0..PIXELS_PER_T_STATE {
                self.tick(memory);
            }
            if self.raster.current_line() == INT_LINE && self.raster.current_column() == 0 {
                self.start_frame(cpu, cycle + 1);
            }
        }

        self.last_cpu_cycles = Some(now.max(last));
    }

    /// One pixel clock.
    fn tick(&mut self, memory: &mut dyn ChipMemory) {
        let line = self.raster.current_line();
        let column = self.raster.current_column();

        if line < SCREEN_LINES && column < SCREEN_COLUMNS && column % 8 == 0 {
            self.fetch_cell(memory, line as u8, (column / 8) as u8);
        }

        if self.raster.is_in_visible_zone() {
            let (x, y) = self.raster.current_visible_position();
            let colour = if self.raster.is_in_display_zone() {
                self.cell.pixel(column, self.flash_phase)
            } else {
                self.regs.border()
            };
            self.screen.set_pixel(usize::from(x), usize::from(y), colour);
        }

        self.raster.move_cycles(1);
    }

    fn start_frame(&mut self, cpu: &mut dyn Cpu, at_cycle: u64) {
        self.frames += 1;
        self.flash_counter += 1;
        if self.flash_counter >= FLASH_FRAMES {
            self.flash_counter = 0;
            self.flash_phase = !self.flash_phase;
        }

        trace!(frame = self.frames, at_cycle, "ULA INT");
        cpu.request_interrupt(InterruptRequest {
            line: InterruptLine::Irq,
            at_cycle,
            source: CHIP_NAME,
            reason: 0,
        });
        self.events.notify(ChipEvent::GraphicsReady);
    }

    fn fetch_cell(&mut self, memory: &mut dyn ChipMemory, screen_y: u8, column: u8) {
        self.cell = with_chip_view(&mut *memory, self.config.view, |m| Cell {
            bitmap: m.value(bitmap_address(screen_y, column)),
            attribute: m.value(attribute_address(screen_y, column)),
        });
    }

    /// Line and T-state as the CPU sees them: the line starts at the first
    /// screen pixel, T-state 0 fetches the first byte.
    #[must_use]
    pub fn beam_position(&self) -> (u16, u16) {
        let line = self.raster.current_line();
        let column = self.raster.current_column();
        let line = if column >= HORIZONTAL.first {
            (line + LINES_PER_FRAME - 1) % LINES_PER_FRAME
        } else {
            line
        };
        (line, column / PIXELS_PER_T_STATE)
    }

    /// T-states since INT was asserted.
    #[must_use]
    pub fn frame_t_state(&self) -> u32 {
        let (line, t_state) = self.beam_position();
        let lines = (line + LINES_PER_FRAME - INT_LINE) % LINES_PER_FRAME;
        u32::from(lines) * u32::from(T_STATES_PER_LINE) + u32::from(t_state)
    }

    /// INT is held for the first 32 T-states of the frame.
    #[must_use]
    pub fn int_active(&self) -> bool {
        self.raster.current_line() == INT_LINE && self.raster.current_column() < INT_LENGTH_PIXELS
    }

    /// Delay for a memory access at the current beam position.
    #[must_use]
    pub fn contention(&self, contended: bool) -> u8 {
        let (line, t_state) = self.beam_position();
        contention(line, t_state, contended)
    }

    /// Delay for an I/O cycle to `port` at the current beam position.
    #[must_use]
    pub fn io_contention(&self, port: u16) -> u8 {
        let (line, t_state) = self.beam_position();
        let contended_high = (0x40..=0x7F).contains(&(port >> 8));
        io_contention(line, t_state, UlaRegisters::is_ula_port(port), contended_high)
    }

    /// What an unattached port reads: the byte the ULA is fetching, $FF
    /// when it is not.
    ///
    /// Every 8 T-states the ULA reads bitmap, attribute, bitmap + 1,
    /// attribute + 1, then leaves the bus idle for 4 T-states.
    #[must_use]
    pub fn floating_bus(&self, memory: &mut dyn ChipMemory) -> u8 {
        let (line, t_state) = self.beam_position();
        if !in_contention_area(line, t_state) {
            return 0xFF;
        }
        let phase = t_state % 8;
        if phase >= 4 {
            return 0xFF;
        }

        let column = (t_state / 8 * 2 + phase / 2) as u8;
        let address = if phase % 2 == 0 {
            bitmap_address(line as u8, column)
        } else {
            attribute_address(line as u8, column)
        };
        with_chip_view(&mut *memory, self.config.view, |m| m.value(address))
    }

    /// IN from `port`.
    pub fn read_port(&self, port: u16, memory: &mut dyn ChipMemory) -> u8 {
        match self.regs.read(port) {
            Some(value) => value,
            None => self.floating_bus(memory),
        }
    }

    /// OUT to `port`.
    pub fn write_port(&mut self, port: u16, value: u8) {
        let mic = self.regs.mic();
        let border = self.regs.border();
        self.regs.write(port, value);

        if self.regs.border() != border {
            trace!(border = self.regs.border(), "ULA border");
        }
        if self.regs.mic() != mic {
            self.events.notify(ChipEvent::MicLevel(self.regs.mic()));
        }
    }

    /// Set keyboard half-row `row`; bits 0-4 active low.
    pub fn set_keyboard_row(&mut self, row: usize, bits: u8) {
        self.regs.set_keyboard_row(row, bits);
    }

    /// Level on the EAR socket (tape input).
    pub fn set_ear_input(&mut self, level: bool) {
        self.regs.set_ear_input(level);
    }

    #[must_use]
    pub fn flash_phase(&self) -> bool {
        self.flash_phase
    }

    /// Frames started since initialization.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn registers(&self) -> &UlaRegisters {
        &self.regs
    }

    #[must_use]
    pub fn config(&self) -> &UlaConfig {
        &self.config
    }
}

impl Default for Ula {
    fn default() -> Self {
        Self::new(UlaConfig::default())
    }
}

impl GraphicalChip for Ula {
    fn initialize(&mut self, memory: &dyn ChipMemory) -> Result<(), ChipError> {
        Ula::initialize(self, memory)
    }

    fn simulate(&mut self, cpu: &mut dyn Cpu, memory: &mut dyn ChipMemory) {
        Ula::simulate(self, cpu, memory);
    }

    fn raster(&self) -> &Raster {
        &self.raster
    }

    fn screen_memory(&self) -> &ScreenMemory {
        &self.screen
    }

    fn events(&mut self) -> &mut EventQueue {
        &mut self.events
    }
}

const QUERY_PATHS: &[&str] = &[
    "raster.line",
    "raster.column",
    "beam.line",
    "beam.t_state",
    "frame.t_state",
    "frame.count",
    "int.active",
    "contended",
    "border",
    "mic",
    "speaker",
    "flash.phase",
    "flash.counter",
];

impl Observable for Ula {
    fn query(&self, path: &str) -> Option<Value> {
        let (line, t_state) = self.beam_position();
        let value: Value = match path {
            "raster.line" => self.raster.current_line().into(),
            "raster.column" => self.raster.current_column().into(),
            "beam.line" => line.into(),
            "beam.t_state" => t_state.into(),
            "frame.t_state" => self.frame_t_state().into(),
            "frame.count" => self.frames.into(),
            "int.active" => self.int_active().into(),
            "contended" => in_contention_area(line, t_state).into(),
            "border" => self.regs.border().into(),
            "mic" => self.regs.mic().into(),
            "speaker" => self.regs.speaker().into(),
            "flash.phase" => self.flash_phase.into(),
            "flash.counter" => self.flash_counter.into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
