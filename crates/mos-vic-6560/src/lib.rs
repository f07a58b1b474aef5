//! MOS 6561 (PAL) / 6560 (NTSC) VIC, the VIC-20 video chip.
//!
//! The VIC reads its video matrix, colour RAM and character data on the
//! half of the cycle the CPU does not use, so it never stalls the CPU and
//! has no bad lines. It has no interrupts either; the VIC-20 times the
//! frame with its VIAs.
//!
//! # Timing
//!
//! - PAL: 312 lines of 71 cycles (22,152 per frame)
//! - NTSC: 261 lines of 65 cycles (16,965 per frame)
//!
//! # Framebuffer
//!
//! The visible zone, 467 x 284 (PAL) or 420 x 233 (NTSC) palette indices,
//! with chip pixels doubled horizontally. Where the text window falls
//! depends on the origin registers $00/$01.
//!
//! Sound ($0A-$0E) is stored but not synthesised.

mod draw;
mod palette;
mod registers;
mod timing;
mod window;

use emu_core::{
    ChipError, ChipEvent, ChipMemory, Cpu, EventQueue, GraphicalChip, Observable, Raster,
    ScreenMemory, Value, VideoStandard, with_chip_view,
};
use tracing::debug;

use crate::draw::{CellData, draw_cell};
use crate::window::TextWindow;

pub use crate::palette::PALETTE;
pub use crate::registers::{REGISTER_COUNT, VicRegisters, cpu_address};
pub use crate::timing::{NTSC, PAL, PIXELS_PER_CYCLE, Timing};

const CHIP_NAME: &str = "VIC";

/// How the chip is wired into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VicConfig {
    pub standard: VideoStandard,
    /// Memory view the chip fetches through.
    pub view: usize,
}

impl Default for VicConfig {
    fn default() -> Self {
        Self {
            standard: VideoStandard::Pal,
            view: 1,
        }
    }
}

/// VIC chip.
#[derive(Debug, Clone)]
pub struct Vic {
    config: VicConfig,
    timing: &'static Timing,
    raster: Raster,
    screen: ScreenMemory,
    events: EventQueue,
    regs: VicRegisters,

    window: TextWindow,
    /// Data fetched for the current cycle.
    cell: CellData,

    first_vblank_entered: bool,

    /// Pen position in framebuffer coordinates.
    light_pen: Option<(u16, u16)>,
    light_pen_latched: bool,

    last_cpu_cycles: Option<u64>,
}

impl Vic {
    #[must_use]
    pub fn new(config: VicConfig) -> Self {
        let timing = Timing::for_standard(config.standard);
        let raster = Raster::new(timing.vertical, timing.horizontal, PIXELS_PER_CYCLE);
        let screen = ScreenMemory::new(
            usize::from(raster.visible_columns()),
            usize::from(raster.visible_lines()),
            &PALETTE,
        );
        Self {
            config,
            timing,
            raster,
            screen,
            events: EventQueue::new(),
            regs: VicRegisters::new(),
            window: TextWindow::default(),
            cell: CellData::default(),
            first_vblank_entered: false,
            light_pen: None,
            light_pen_latched: false,
            last_cpu_cycles: None,
        }
    }

    /// Reset to the state the KERNAL leaves the chip in.
    pub fn initialize(&mut self, memory: &dyn ChipMemory) -> Result<(), ChipError> {
        self.raster.validate()?;
        if !memory.has_view(self.config.view) {
            return Err(ChipError::ViewNotFound {
                chip: CHIP_NAME,
                view: self.config.view,
            });
        }

        self.raster.initialize();
        self.regs.initialize(&self.timing.reset_registers);
        self.screen.clear(0);
        self.events.clear();
        self.window = TextWindow::default();
        self.window.start_frame(&self.regs);
        self.cell = CellData::default();
        self.first_vblank_entered = true;
        self.light_pen_latched = false;
        self.last_cpu_cycles = None;

        debug!(
            standard = %self.config.standard,
            lines = self.timing.vertical.max,
            cycles_per_line = self.timing.cycles_per_line,
            "VIC initialized"
        );
        Ok(())
    }

    /// Run the cycles the CPU has executed since the previous call.
    pub fn simulate(&mut self, cpu: &mut dyn Cpu, memory: &mut dyn ChipMemory) {
        let now = cpu.clock_cycles();
        let Some(last) = self.last_cpu_cycles else {
            self.last_cpu_cycles = Some(now);
            return;
        };

        for _ in last..now {
            self.step(memory);
        }

        self.regs.set_raster_line(self.raster.current_line());
        self.last_cpu_cycles = Some(now.max(last));
    }

    fn step(&mut self, memory: &mut dyn ChipMemory) {
        self.fetch_cycle(memory);

        if self.raster.is_in_visible_zone() {
            self.draw_block();
        }

        if self.raster.move_cycles(1) {
            self.regs.set_raster_line(self.raster.current_line());
            if self.raster.current_line() == 0 {
                self.window.start_frame(&self.regs);
                self.light_pen_latched = false;
            } else {
                self.window.end_line(&self.regs);
            }
        } else {
            self.window.next_cycle();
        }

        let in_first_vblank = self.raster.is_in_first_vblank_zone();
        if in_first_vblank && !self.first_vblank_entered {
            self.events.notify(ChipEvent::GraphicsReady);
        }
        self.first_vblank_entered = in_first_vblank;
    }

    fn fetch_cycle(&mut self, memory: &mut dyn ChipMemory) {
        if !self.window.drawing() {
            return;
        }
        let Self {
            config,
            regs,
            window,
            cell,
            ..
        } = self;

        let offset = window.matrix_offset();
        *cell = with_chip_view(&mut *memory, config.view, |m| {
            let code = m.value(cpu_address(regs.screen_base().wrapping_add(offset)));
            let colour = m.value_direct(regs.colour_memory().wrapping_add(offset & 0x3FF)) & 0x0F;
            let char_offset = u16::from(code) * u16::from(regs.char_height()) + u16::from(window.rc);
            let data = m.value(cpu_address(regs.char_base().wrapping_add(char_offset)));
            CellData {
                colour,
                nibble: if window.high_nibble() { data >> 4 } else { data & 0x0F },
            }
        });
    }

    fn draw_block(&mut self) {
        let (x, y) = self.raster.current_visible_position();
        let width = self.raster.visible_columns().saturating_sub(x).min(PIXELS_PER_CYCLE);

        if self.window.drawing() {
            let pixels = draw_cell(self.cell, &self.regs);
            for (i, colour) in (0..width).zip(pixels) {
                self.screen.set_pixel(usize::from(x + i), usize::from(y), colour);
            }
        } else {
            self.screen.set_horizontal_line(
                usize::from(x),
                usize::from(y),
                usize::from(width),
                self.regs.border_colour(),
            );
        }

        self.check_light_pen(x, y);
    }

    fn check_light_pen(&mut self, x: u16, y: u16) {
        let Some((pen_x, pen_y)) = self.light_pen else {
            return;
        };
        if self.light_pen_latched || pen_y != y || !(x..x + PIXELS_PER_CYCLE).contains(&pen_x) {
            return;
        }
        let column = self.raster.current_column() + (pen_x - x);
        let line = self.raster.current_line();
        self.regs.latch_light_pen((column / 4) as u8, (line / 2) as u8);
        self.light_pen_latched = true;
    }

    /// Cycle within the raster line, from 0.
    #[must_use]
    pub fn cycle(&self) -> u8 {
        (self.raster.horizontal().current_position_at_base0() / PIXELS_PER_CYCLE) as u8
    }

    #[must_use]
    pub fn read_register(&self, address: u16) -> u8 {
        self.regs.read(usize::from(address))
    }

    pub fn write_register(&mut self, address: u16, value: u8) {
        self.regs.write(usize::from(address), value);
    }

    /// Connect a light pen pointing at framebuffer position `(x, y)`, or
    /// disconnect it with `None`.
    pub fn set_light_pen(&mut self, position: Option<(u16, u16)>) {
        self.light_pen = position;
    }

    /// Paddle potentiometer readings.
    pub fn set_paddles(&mut self, x: u8, y: u8) {
        self.regs.set_paddles(x, y);
    }

    #[must_use]
    pub fn registers(&self) -> &VicRegisters {
        &self.regs
    }

    #[must_use]
    pub fn config(&self) -> &VicConfig {
        &self.config
    }

    #[must_use]
    pub fn timing(&self) -> &'static Timing {
        self.timing
    }
}

impl Default for Vic {
    fn default() -> Self {
        Self::new(VicConfig::default())
    }
}

impl GraphicalChip for Vic {
    fn initialize(&mut self, memory: &dyn ChipMemory) -> Result<(), ChipError> {
        Vic::initialize(self, memory)
    }

    fn simulate(&mut self, cpu: &mut dyn Cpu, memory: &mut dyn ChipMemory) {
        Vic::simulate(self, cpu, memory);
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
    "raster.cycle",
    "window.drawing",
    "window.column",
    "window.row",
    "window.rc",
    "window.vbase",
    "memory.screen",
    "memory.characters",
    "memory.colour",
    "reverse",
    "interlace",
];

impl Observable for Vic {
    fn query(&self, path: &str) -> Option<Value> {
        let value: Value = match path {
            "raster.line" => self.raster.current_line().into(),
            "raster.column" => self.raster.current_column().into(),
            "raster.cycle" => self.cycle().into(),
            "window.drawing" => self.window.drawing().into(),
            "window.column" => self.window.column.into(),
            "window.row" => self.window.row.into(),
            "window.rc" => self.window.rc.into(),
            "window.vbase" => self.window.vbase.into(),
            "memory.screen" => self.regs.screen_memory().into(),
            "memory.characters" => self.regs.char_memory().into(),
            "memory.colour" => self.regs.colour_memory().into(),
            "reverse" => self.regs.reverse_mode().into(),
            "interlace" => self.regs.interlace().into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
