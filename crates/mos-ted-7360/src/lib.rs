//! MOS 7360/8360 TED, the video chip of the Commodore 16 and Plus/4.
//!
//! Raster engine with bad lines (40 CPU cycles stolen per character row),
//! the five graphic modes of the VIC-II family plus the TED extras: a
//! 121-colour palette, reverse characters, flashing attributes, the
//! hardware cursor and three interval timers sharing the IRQ output.
//!
//! # Timing
//!
//! - 57 cycles of 8 pixels per line, 312 (PAL) or 262 (NTSC) lines
//! - Text rows occupy lines 4-203; a row is fetched on the line before
//!   it is shown, when `(line & 7) == YSCROLL`
//!
//! Cycles are counted from 0 at horizontal position 376.
//!
//! # Framebuffer
//!
//! 400 x 290 (PAL) or 400 x 245 (NTSC) colour values; the display window
//! starts at (24, 42) on PAL.
//!
//! Sound synthesis is not modelled: the sound registers are stored and
//! read back.

mod draw;
mod fetch;
mod palette;
mod registers;
mod timer;
mod timing;

use emu_core::{
    ChipError, ChipEvent, ChipMemory, Cpu, EventQueue, GraphicalChip, InterruptLine,
    InterruptRequest, Observable, Raster, ScreenMemory, Value, VideoStandard, with_chip_view,
};
use tracing::{debug, trace};

use crate::draw::{DrawContext, draw_graphics};
use crate::fetch::{FetchUnit, fetches_from_rom};

pub use crate::palette::{PALETTE, colour_index};
pub use crate::registers::{BeamInfo, GraphicMode, IrqSource, REGISTER_COUNT, TedRegisters};
pub use crate::timer::{RunMode, Timer};
pub use crate::timing::{
    BAD_LINE_STALL_CYCLES, CYCLES_PER_LINE, FIRST_BAD_LINE, LAST_BAD_LINE, NTSC, PAL,
    PIXELS_PER_CYCLE, Timing,
};
use crate::timing::{
    FIRST_C_ACCESS_CYCLE, FIRST_G_ACCESS_CYCLE, FLASH_FRAMES, LAST_C_ACCESS_CYCLE,
    LAST_G_ACCESS_CYCLE,
};

const CHIP_NAME: &str = "TED";

/// How the chip is wired into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TedConfig {
    pub standard: VideoStandard,
    /// View for video matrix, bitmap and RAM character fetches.
    pub ram_view: usize,
    /// View for character fetches with $FF12 bit 2 set.
    pub rom_view: usize,
}

impl Default for TedConfig {
    fn default() -> Self {
        Self {
            standard: VideoStandard::Pal,
            ram_view: 1,
            rom_view: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ted {
    config: TedConfig,
    timing: &'static Timing,
    raster: Raster,
    screen: ScreenMemory,
    events: EventQueue,
    regs: TedRegisters,
    fetch_unit: FetchUnit,

    /// DEN seen on line 0.
    video_active: bool,
    bad_line: bool,
    stall_charged: bool,

    irq_line: bool,
    last_vblank_entered: bool,

    flash_counter: u8,
    flash_on: bool,

    last_cpu_cycles: Option<u64>,
}

impl Ted {
    #[must_use]
    pub fn new(config: TedConfig) -> Self {
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
            regs: TedRegisters::new(),
            fetch_unit: FetchUnit::default(),
            video_active: false,
            bad_line: false,
            stall_charged: false,
            irq_line: false,
            last_vblank_entered: false,
            flash_counter: 0,
            flash_on: false,
            last_cpu_cycles: None,
        }
    }

    /// Reset to power-on state.
    pub fn initialize(&mut self, memory: &dyn ChipMemory) -> Result<(), ChipError> {
        self.raster.validate()?;
        for view in [self.config.ram_view, self.config.rom_view] {
            if !memory.has_view(view) {
                return Err(ChipError::ViewNotFound { chip: CHIP_NAME, view });
            }
        }

        self.raster.initialize();
        self.regs.initialize();
        self.screen.clear(0);
        self.events.clear();
        self.fetch_unit = FetchUnit::default();
        self.video_active = false;
        self.bad_line = false;
        self.stall_charged = false;
        self.irq_line = false;
        self.last_vblank_entered = false;
        self.flash_counter = 0;
        self.flash_on = false;
        self.last_cpu_cycles = None;
        self.update_display_reduction();
        self.update_beam_info();

        debug!(
            standard = %self.config.standard,
            lines = self.timing.vertical.max,
            cycles_per_line = CYCLES_PER_LINE,
            "TED initialized"
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

        let elapsed = now.saturating_sub(last);
        for i in 0..elapsed {
            self.step(cpu, memory, last + i);
        }

        self.update_beam_info();
        self.last_cpu_cycles = Some(last + elapsed);
    }

    fn step(&mut self, cpu: &mut dyn Cpu, memory: &mut dyn ChipMemory, at_cycle: u64) {
        let line = self.raster.current_line();
        let cycle = self.cycle();
        self.update_display_reduction();
        self.regs.tick_timers();

        let stolen = self.check_bad_line(line, cycle);
        self.fetch_cycle(cycle, memory);

        if self.raster.is_in_visible_zone() {
            self.draw_block();
        }

        if stolen > 0 {
            cpu.add_clock_cycles(stolen);
        }

        if self.raster.move_cycles(1) {
            self.start_line();
        }
        self.update_irq(cpu, at_cycle);

        let in_last_vblank = self.raster.is_in_last_vblank_zone();
        if in_last_vblank && !self.last_vblank_entered {
            self.events.notify(ChipEvent::GraphicsReady);
        }
        self.last_vblank_entered = in_last_vblank;
    }

    fn check_bad_line(&mut self, line: u16, cycle: u8) -> u32 {
        if line == FIRST_BAD_LINE && self.regs.display_enabled() {
            self.video_active = true;
        }

        self.bad_line = self.is_bad_line(line);
        if !self.bad_line || self.stall_charged || cycle > LAST_C_ACCESS_CYCLE {
            return 0;
        }
        self.stall_charged = true;
        let stall = u32::from(LAST_C_ACCESS_CYCLE + 1 - cycle.max(FIRST_C_ACCESS_CYCLE));
        trace!(line, yscroll = self.regs.vertical_scroll(), stall, "TED bad line");
        stall
    }

    fn fetch_cycle(&mut self, cycle: u8, memory: &mut dyn ChipMemory) {
        let Self {
            config,
            fetch_unit,
            regs,
            bad_line,
            ..
        } = self;

        if *bad_line && (FIRST_C_ACCESS_CYCLE..=LAST_C_ACCESS_CYCLE).contains(&cycle) {
            let cell = usize::from(cycle - FIRST_C_ACCESS_CYCLE);
            with_chip_view(&mut *memory, config.ram_view, |m| fetch_unit.c_access(m, regs, cell));
        }
        if (FIRST_G_ACCESS_CYCLE..=LAST_G_ACCESS_CYCLE).contains(&cycle) {
            let cell = usize::from(cycle - FIRST_G_ACCESS_CYCLE);
            let view = if fetches_from_rom(regs) {
                config.rom_view
            } else {
                config.ram_view
            };
            with_chip_view(&mut *memory, view, |m| fetch_unit.g_access(m, regs, cell));
        }
    }

    fn draw_block(&mut self) {
        let (x, y) = self.raster.current_visible_position();
        let horizontal = self.raster.horizontal();
        let ctx = DrawContext {
            first_display_column: horizontal.first_display_position(),
            horizontal_scroll: self.regs.horizontal_scroll(),
            aligned_column: x,
        };
        let screen_columns = horizontal.first_screen_position()..=horizontal.last_screen_position();
        let screen_line = self.raster.vertical().is_in_screen_zone() && self.regs.display_enabled();

        let graphics = draw_graphics(&ctx, &self.fetch_unit.line, &self.regs, self.flash_on);
        for (i, colour) in (0u16..).zip(graphics) {
            let column = x + i;
            let colour = if screen_line && screen_columns.contains(&column) {
                colour
            } else {
                self.regs.border_colour()
            };
            self.screen.set_pixel(usize::from(column), usize::from(y), colour);
        }
    }

    fn start_line(&mut self) {
        self.bad_line = false;
        self.stall_charged = false;

        let line = self.raster.current_line();
        if line == 0 {
            self.start_frame();
        }
        self.fetch_unit.start_line();
        if line == self.regs.irq_raster_line() {
            trace!(line, "TED raster IRQ");
            self.regs.raise(IrqSource::RASTER);
        }
    }

    fn start_frame(&mut self) {
        self.fetch_unit.start_frame(self.regs.character_position_reload());
        self.video_active = false;
        self.flash_counter = (self.flash_counter + 1) % FLASH_FRAMES;
        if self.flash_counter == 0 {
            self.flash_on = !self.flash_on;
        }
    }

    fn update_irq(&mut self, cpu: &mut dyn Cpu, at_cycle: u64) {
        let asserted = self.regs.launch_irq();
        if asserted && !self.irq_line {
            cpu.request_interrupt(InterruptRequest {
                line: InterruptLine::Irq,
                at_cycle,
                source: CHIP_NAME,
                reason: self.regs.reason_irq_code(),
            });
        }
        self.irq_line = asserted;
    }

    fn update_display_reduction(&mut self) {
        self.raster
            .reduce_display_zone(!self.regs.rows25(), !self.regs.columns40());
    }

    fn update_beam_info(&mut self) {
        self.regs.set_beam_info(BeamInfo {
            line: self.raster.current_line(),
            column: self.raster.current_column(),
            character_position: self.fetch_unit.vcbase,
            row: self.fetch_unit.rc,
            flash_counter: self.flash_counter,
        });
    }

    /// Cycle within the raster line, from 0.
    #[must_use]
    pub fn cycle(&self) -> u8 {
        (self.raster.horizontal().current_position_at_base0() / PIXELS_PER_CYCLE) as u8
    }

    /// Bad line condition for `line` with the current YSCROLL.
    #[must_use]
    pub fn is_bad_line(&self, line: u16) -> bool {
        self.video_active
            && (FIRST_BAD_LINE..=LAST_BAD_LINE).contains(&line)
            && (line & 0x07) as u8 == self.regs.vertical_scroll()
    }

    /// CPU read of $FF00-$FF1F.
    #[must_use]
    pub fn read_register(&self, address: u16) -> u8 {
        self.regs.read(usize::from(address))
    }

    /// CPU write of $FF00-$FF1F.
    pub fn write_register(&mut self, address: u16, value: u8) {
        self.regs.write(usize::from(address), value);
        self.update_display_reduction();
    }

    /// Keyboard column bits read back at $FF08.
    pub fn set_keyboard_input(&mut self, value: u8) {
        self.regs.set_keyboard_input(value);
    }

    /// Phase of flashing characters and the cursor.
    #[must_use]
    pub fn flash_on(&self) -> bool {
        self.flash_on
    }

    #[must_use]
    pub fn irq_asserted(&self) -> bool {
        self.regs.launch_irq()
    }

    #[must_use]
    pub fn registers(&self) -> &TedRegisters {
        &self.regs
    }

    #[must_use]
    pub fn config(&self) -> &TedConfig {
        &self.config
    }

    #[must_use]
    pub fn timing(&self) -> &'static Timing {
        self.timing
    }
}

impl Default for Ted {
    fn default() -> Self {
        Self::new(TedConfig::default())
    }
}

impl GraphicalChip for Ted {
    fn initialize(&mut self, memory: &dyn ChipMemory) -> Result<(), ChipError> {
        Ted::initialize(self, memory)
    }

    fn simulate(&mut self, cpu: &mut dyn Cpu, memory: &mut dyn ChipMemory) {
        Ted::simulate(self, cpu, memory);
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
    "mode",
    "bad_line",
    "video.active",
    "video.displaying",
    "video.vcbase",
    "video.rc",
    "flash.counter",
    "flash.on",
    "cursor",
    "irq.status",
    "irq.enable",
    "irq.line",
    "timer1",
    "timer2",
    "timer3",
    "clock.single",
];

impl Observable for Ted {
    fn query(&self, path: &str) -> Option<Value> {
        let value: Value = match path {
            "raster.line" => self.raster.current_line().into(),
            "raster.column" => self.raster.current_column().into(),
            "raster.cycle" => self.cycle().into(),
            "mode" => format!("{:?}", self.regs.graphic_mode()).into(),
            "bad_line" => self.bad_line.into(),
            "video.active" => self.video_active.into(),
            "video.displaying" => self.fetch_unit.displaying.into(),
            "video.vcbase" => self.fetch_unit.vcbase.into(),
            "video.rc" => self.fetch_unit.rc.into(),
            "flash.counter" => self.flash_counter.into(),
            "flash.on" => self.flash_on.into(),
            "cursor" => self.regs.cursor_position().into(),
            "irq.status" => self.regs.read(0x09).into(),
            "irq.enable" => self.regs.read(0x0A).into(),
            "irq.line" => self.irq_line.into(),
            "timer1" => self.regs.timer(0).counter().into(),
            "timer2" => self.regs.timer(1).counter().into(),
            "timer3" => self.regs.timer(2).counter().into(),
            "clock.single" => self.regs.single_clock().into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
