//! MOS 6569 (PAL) / 6567 (NTSC) VIC-II video chip.
//!
//! Cycle-exact raster engine: bad lines with CPU cycle stealing, the
//! VC/VCBASE/RC video counters, idle state, sprite DMA, the border
//! flip-flops, all graphic modes, sprite collisions and the light pen.
//!
//! # Timing (PAL)
//!
//! - 312 raster lines per frame, 63 cycles per line (19,656 per frame)
//! - The line counter increments at cycle 1, column 404 ($194)
//! - Bad lines: $30-$F7 where `(line & 7) == YSCROLL`, 43 cycles stolen
//!
//! The NTSC 6567R56A has 262 lines of 64 cycles.
//!
//! # Framebuffer
//!
//! The visible zone, 384 x 274 (PAL) or 384 x 224 (NTSC) palette indices.
//! The 320 x 200 display window starts at (32, 35) on PAL.

mod border;
mod collision;
mod draw;
mod fetch;
mod palette;
mod registers;
mod sprite;
mod timing;

use emu_core::{
    ChipError, ChipEvent, ChipMemory, Cpu, EventQueue, GraphicalChip, InterruptLine,
    InterruptRequest, Observable, Raster, ScreenMemory, Value, VideoStandard, with_chip_view,
};
use tracing::{debug, trace};

use crate::border::BorderUnit;
use crate::collision::{sprite_data_collisions, sprite_sprite_collisions};
use crate::draw::{DrawContext, compose, draw_graphics, draw_sprites};
use crate::fetch::{FetchUnit, s_access};
use crate::sprite::SpriteUnit;

pub use crate::palette::PALETTE;
pub use crate::registers::{GraphicMode, IrqSource, REGISTER_COUNT, SpriteRegisters, VicIIRegisters};
pub use crate::timing::{
    BAD_LINE_STALL_CYCLES, FIRST_BAD_LINE, LAST_BAD_LINE, NTSC, PAL, PIXELS_PER_CYCLE, Timing,
};
use crate::timing::{BAD_LINE_BA_CYCLE, LAST_C_ACCESS_CYCLE, SPRITE_STALL_CYCLES};

/// Name used in interrupt requests and errors.
const CHIP_NAME: &str = "VIC-II";

/// How the chip is wired into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VicIIConfig {
    pub standard: VideoStandard,
    /// Memory view the chip fetches through.
    pub view: usize,
    /// Physical address of the colour RAM nibbles.
    pub colour_ram: u16,
}

impl Default for VicIIConfig {
    fn default() -> Self {
        Self {
            standard: VideoStandard::Pal,
            view: 1,
            colour_ram: 0xD800,
        }
    }
}

/// VIC-II chip.
#[derive(Debug, Clone)]
pub struct VicII {
    config: VicIIConfig,
    timing: &'static Timing,
    raster: Raster,
    screen: ScreenMemory,
    events: EventQueue,
    regs: VicIIRegisters,

    fetch_unit: FetchUnit,
    sprites: [SpriteUnit; 8],
    border: BorderUnit,

    /// DEN seen during line $30; bad lines are only possible when set.
    video_active: bool,
    /// Bad line condition in the current cycle.
    bad_line: bool,
    /// Bad-line stall already charged on this line.
    stall_charged: bool,

    /// Level of the IRQ output after the last cycle.
    irq_line: bool,
    last_vblank_entered: bool,

    /// Pen position in framebuffer coordinates.
    light_pen: Option<(u16, u16)>,
    light_pen_latched: bool,

    /// CPU cycle count the chip has caught up with; `None` before the
    /// first `simulate`.
    last_cpu_cycles: Option<u64>,
}

impl VicII {
    #[must_use]
    pub fn new(config: VicIIConfig) -> Self {
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
            regs: VicIIRegisters::new(),
            fetch_unit: FetchUnit::default(),
            sprites: [SpriteUnit::default(); 8],
            border: BorderUnit::default(),
            video_active: false,
            bad_line: false,
            stall_charged: false,
            irq_line: false,
            last_vblank_entered: false,
            light_pen: None,
            light_pen_latched: false,
            last_cpu_cycles: None,
        }
    }

    /// Reset to power-on state.
    ///
    /// Fails when the raster tables are inconsistent or `memory` has no
    /// view with the configured id.
    pub fn initialize(&mut self, memory: &dyn ChipMemory) -> Result<(), ChipError> {
        self.raster.validate()?;
        if !memory.has_view(self.config.view) {
            return Err(ChipError::ViewNotFound {
                chip: CHIP_NAME,
                view: self.config.view,
            });
        }

        self.raster.initialize();
        self.regs.initialize();
        self.screen.clear(0);
        self.events.clear();
        self.fetch_unit = FetchUnit::default();
        self.sprites = [SpriteUnit::default(); 8];
        self.border = BorderUnit::default();
        self.video_active = false;
        self.bad_line = false;
        self.stall_charged = false;
        self.irq_line = false;
        self.last_vblank_entered = false;
        self.light_pen_latched = false;
        self.last_cpu_cycles = None;
        self.update_display_reduction();

        debug!(
            standard = %self.config.standard,
            lines = self.timing.vertical.max,
            cycles_per_line = self.timing.cycles_per_line,
            "VIC-II initialized"
        );
        Ok(())
    }

    /// Run the cycles the CPU has executed since the previous call.
    ///
    /// Cycles stolen from the CPU during this call are added to its
    /// counter and caught up with on the next call.
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

        self.regs.set_current_raster_line(self.raster.current_line());
        self.last_cpu_cycles = Some(last + elapsed);
    }

    fn step(&mut self, cpu: &mut dyn Cpu, memory: &mut dyn ChipMemory, at_cycle: u64) {
        let line = self.raster.current_line();
        let cycle = self.cycle();
        self.update_display_reduction();

        let mut stolen = self.check_bad_line(line, cycle);
        stolen += self.fetch_cycle(cycle, memory);
        match cycle {
            14 => self.fetch_unit.start_row(self.bad_line),
            15 => self.sprites.iter_mut().for_each(SpriteUnit::advance_line),
            55 => self.check_sprite_dma(line),
            58 => self.fetch_unit.end_row(self.bad_line),
            _ => {}
        }

        if self.raster.is_in_visible_zone() {
            self.draw_block(line);
        }
        if cycle == self.timing.cycles_per_line {
            self.border.check_vertical(line, &self.regs);
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

    /// Latch DEN on line $30, evaluate the bad line condition and return
    /// the cycles it steals from the CPU.
    fn check_bad_line(&mut self, line: u16, cycle: u8) -> u32 {
        if line == FIRST_BAD_LINE && self.regs.display_enabled() {
            self.video_active = true;
        }

        self.bad_line = self.is_bad_line(line);
        if !self.bad_line {
            return 0;
        }
        self.fetch_unit.idle = false;

        if self.stall_charged || cycle > LAST_C_ACCESS_CYCLE {
            return 0;
        }
        self.stall_charged = true;
        let stall = u32::from(LAST_C_ACCESS_CYCLE + 1 - cycle.max(BAD_LINE_BA_CYCLE));
        trace!(line, yscroll = self.regs.vertical_scroll(), stall, "VIC-II bad line");
        stall
    }

    /// Memory accesses of `cycle`; returns the cycles stolen by sprite DMA.
    fn fetch_cycle(&mut self, cycle: u8, memory: &mut dyn ChipMemory) -> u32 {
        let sprite = self.timing.sprite_fetched_at(cycle);
        let g_access = (16..=55).contains(&cycle);
        let c_access = self.bad_line && (15..=LAST_C_ACCESS_CYCLE).contains(&cycle);
        if sprite.is_none() && !g_access && !c_access {
            return 0;
        }

        let view = self.config.view;
        let colour_ram = self.config.colour_ram;
        let Self {
            fetch_unit,
            sprites,
            regs,
            ..
        } = self;
        with_chip_view(&mut *memory, view, |m| {
            let mut stolen = 0;
            if let Some(n) = sprite {
                if s_access(m, regs, n, &mut sprites[n]) {
                    stolen += SPRITE_STALL_CYCLES;
                }
            }
            if g_access {
                fetch_unit.g_access(m, regs, usize::from(cycle - 16));
            }
            if c_access {
                fetch_unit.c_access(m, regs, colour_ram);
            }
            stolen
        })
    }

    fn check_sprite_dma(&mut self, line: u16) {
        for (n, unit) in self.sprites.iter_mut().enumerate() {
            let was_active = unit.active;
            unit.check_dma_start(self.regs.sprite(n), line);
            if unit.active && !was_active {
                trace!(sprite = n, line, "VIC-II sprite DMA on");
            }
        }
    }

    /// Draw the 8 pixels of the current cycle and detect collisions.
    fn draw_block(&mut self, line: u16) {
        let (x, y) = self.raster.current_visible_position();
        let aligned = x.saturating_sub(PIXELS_PER_CYCLE / 2);
        let horizontal = self.raster.horizontal();
        let line_length = horizontal.max_positions();
        let ctx = DrawContext {
            first_display_column: horizontal.first_display_position(),
            first_screen_column: horizontal.first_screen_position(),
            last_screen_column: horizontal.last_screen_position(),
            horizontal_scroll: self.regs.horizontal_scroll(),
            aligned_column: aligned,
        };
        // raster column of pixel 0
        let column = (self.raster.current_column() + line_length - PIXELS_PER_CYCLE / 2) % line_length;

        let border = self.border.block(
            aligned,
            ctx.first_screen_column,
            ctx.last_screen_column,
            line,
            &self.regs,
        );
        let graphics = draw_graphics(&ctx, self.regs.graphic_mode(), &self.fetch_unit.line, &self.regs);
        let sprites = draw_sprites(column, line_length, &self.sprites, &self.regs);
        let mut pixels = compose(&graphics, &sprites, &self.regs);

        let video_reset = self.regs.video_reset();
        if !video_reset {
            let drawn = !border;
            let masks = sprites.masks.map(|mask| mask & drawn);
            self.regs
                .add_sprite_data_collisions(sprite_data_collisions(graphics.collision_mask & drawn, &masks));
            self.regs.add_sprite_sprite_collisions(sprite_sprite_collisions(&masks));
        }

        for (i, pixel) in pixels.iter_mut().enumerate() {
            if border & (0x80 >> i) != 0 {
                *pixel = self.regs.border_colour();
            } else if video_reset {
                *pixel = 0;
            }
            self.screen.set_pixel(usize::from(aligned) + i, usize::from(y), *pixel);
        }

        self.check_light_pen(aligned, column, y, line);
    }

    fn check_light_pen(&mut self, aligned: u16, column: u16, row: u16, line: u16) {
        let Some((pen_x, pen_y)) = self.light_pen else {
            return;
        };
        if self.light_pen_latched || pen_y != row || !(aligned..aligned + PIXELS_PER_CYCLE).contains(&pen_x) {
            return;
        }
        let line_length = self.raster.horizontal().max_positions();
        self.regs.latch_light_pen((column + pen_x - aligned) % line_length, line);
        self.light_pen_latched = true;
    }

    fn start_line(&mut self) {
        self.bad_line = false;
        self.stall_charged = false;

        let line = self.raster.current_line();
        if line == 0 {
            self.fetch_unit.start_frame();
            self.video_active = false;
            self.light_pen_latched = false;
        }
        if line == self.regs.irq_raster_line() {
            trace!(line, "VIC-II raster IRQ");
            self.regs.raise(IrqSource::RASTER);
        }
    }

    /// Request an interrupt on a rising edge of the IRQ output.
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

    /// Cycle within the raster line, 1-based.
    #[must_use]
    pub fn cycle(&self) -> u8 {
        (self.raster.horizontal().current_position_at_base0() / PIXELS_PER_CYCLE) as u8 + 1
    }

    /// Bad line condition for `line` with the current YSCROLL.
    #[must_use]
    pub fn is_bad_line(&self, line: u16) -> bool {
        self.video_active
            && (FIRST_BAD_LINE..=LAST_BAD_LINE).contains(&line)
            && (line & 0x07) as u8 == self.regs.vertical_scroll()
    }

    /// CPU read of $D000-$D3FF.
    pub fn read_register(&mut self, address: u16) -> u8 {
        self.regs.read(usize::from(address))
    }

    /// Read without clearing the collision registers.
    #[must_use]
    pub fn peek_register(&self, address: u16) -> u8 {
        self.regs.peek(usize::from(address))
    }

    /// CPU write of $D000-$D3FF.
    pub fn write_register(&mut self, address: u16, value: u8) {
        self.regs.write(usize::from(address), value);
        self.update_display_reduction();
    }

    /// 16K bank selected through CIA2 port A.
    pub fn set_bank(&mut self, bank: u8) {
        self.regs.set_bank(bank);
    }

    /// Connect a light pen pointing at framebuffer position `(x, y)`, or
    /// disconnect it with `None`.
    pub fn set_light_pen(&mut self, position: Option<(u16, u16)>) {
        self.light_pen = position;
        self.regs.set_light_pen_active(position.is_some());
    }

    /// Level of the IRQ output.
    #[must_use]
    pub fn irq_asserted(&self) -> bool {
        self.regs.launch_irq()
    }

    #[must_use]
    pub fn registers(&self) -> &VicIIRegisters {
        &self.regs
    }

    #[must_use]
    pub fn config(&self) -> &VicIIConfig {
        &self.config
    }

    #[must_use]
    pub fn timing(&self) -> &'static Timing {
        self.timing
    }
}

impl Default for VicII {
    fn default() -> Self {
        Self::new(VicIIConfig::default())
    }
}

impl GraphicalChip for VicII {
    fn initialize(&mut self, memory: &dyn ChipMemory) -> Result<(), ChipError> {
        VicII::initialize(self, memory)
    }

    fn simulate(&mut self, cpu: &mut dyn Cpu, memory: &mut dyn ChipMemory) {
        VicII::simulate(self, cpu, memory);
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
    "video.idle",
    "video.vc",
    "video.vcbase",
    "video.rc",
    "irq.status",
    "irq.enable",
    "irq.line",
    "border.main",
    "border.vertical",
    "sprites.dma",
    "collisions.sprite_sprite",
    "collisions.sprite_data",
];

impl Observable for VicII {
    fn query(&self, path: &str) -> Option<Value> {
        let value: Value = match path {
            "raster.line" => self.raster.current_line().into(),
            "raster.column" => self.raster.current_column().into(),
            "raster.cycle" => self.cycle().into(),
            "mode" => format!("{:?}", self.regs.graphic_mode()).into(),
            "bad_line" => self.bad_line.into(),
            "video.active" => self.video_active.into(),
            "video.idle" => self.fetch_unit.idle.into(),
            "video.vc" => self.fetch_unit.vc.into(),
            "video.vcbase" => self.fetch_unit.vcbase.into(),
            "video.rc" => self.fetch_unit.rc.into(),
            "irq.status" => self.regs.peek(0x19).into(),
            "irq.enable" => self.regs.peek(0x1A).into(),
            "irq.line" => self.irq_line.into(),
            "border.main" => self.border.main.into(),
            "border.vertical" => self.border.vertical.into(),
            "sprites.dma" => self
                .sprites
                .iter()
                .enumerate()
                .fold(0u8, |acc, (n, s)| if s.active { acc | 1 << n } else { acc })
                .into(),
            "collisions.sprite_sprite" => self.regs.peek(0x1E).into(),
            "collisions.sprite_data" => self.regs.peek(0x1F).into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctor::ctor;
    use emu_core::{CycleCpu, FlatMemory};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::DEBUG)
            .pretty()
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
    }

    fn ready() -> (VicII, CycleCpu, FlatMemory) {
        let mut memory = FlatMemory::new();
        memory.add_view(1);
        let mut vic = VicII::default();
        vic.initialize(&memory).expect("initialize");
        let mut cpu = CycleCpu::new();
        vic.simulate(&mut cpu, &mut memory);
        (vic, cpu, memory)
    }

    #[test]
    fn unknown_view_is_an_initialization_error() {
        let memory = FlatMemory::new();
        let mut vic = VicII::default();
        let err = vic.initialize(&memory).expect_err("view 1 missing");
        assert_eq!(err, ChipError::ViewNotFound { chip: "VIC-II", view: 1 });
    }

    #[test]
    fn first_simulate_only_records_the_cpu_clock() {
        let mut memory = FlatMemory::new();
        memory.add_view(1);
        let mut vic = VicII::default();
        vic.initialize(&memory).expect("initialize");
        let mut cpu = CycleCpu::new();
        cpu.advance(1000);
        vic.simulate(&mut cpu, &mut memory);
        assert_eq!(vic.raster.current_line(), 0);
        assert_eq!(vic.cycle(), 1);
        assert_eq!(memory.view_switches(), 0);
    }

    #[test]
    fn cycle_counter_follows_the_beam() {
        let (mut vic, mut cpu, mut memory) = ready();
        cpu.advance(10);
        vic.simulate(&mut cpu, &mut memory);
        assert_eq!(vic.cycle(), 11);
        assert_eq!(vic.query("raster.column"), Some(Value::U16(484)));

        cpu.advance(53);
        vic.simulate(&mut cpu, &mut memory);
        assert_eq!(vic.cycle(), 1);
        assert_eq!(vic.query("raster.line"), Some(Value::U16(1)));
        assert_eq!(vic.peek_register(0xD012), 1);
    }

    #[test]
    fn ntsc_lines_have_64_cycles() {
        let mut memory = FlatMemory::new();
        memory.add_view(1);
        let mut vic = VicII::new(VicIIConfig {
            standard: VideoStandard::Ntsc,
            ..VicIIConfig::default()
        });
        vic.initialize(&memory).expect("initialize");
        let mut cpu = CycleCpu::new();
        vic.simulate(&mut cpu, &mut memory);
        let start = vic.raster.current_line();
        cpu.advance(64);
        vic.simulate(&mut cpu, &mut memory);
        assert_eq!(vic.raster.current_line(), start + 1);
        assert_eq!(vic.screen_memory().rows(), 224);
    }

    #[test]
    fn registers_are_mirrored_every_64_bytes() {
        let mut vic = VicII::default();
        vic.write_register(0xD020 + 0x40, 0x02);
        assert_eq!(vic.peek_register(0xD020), 0xF2);
        assert_eq!(vic.read_register(0xD3E0), 0xF2);
    }

    #[test]
    fn narrow_screen_reduces_the_raster_zones() {
        let mut vic = VicII::default();
        vic.write_register(0x16, 0x00);
        vic.write_register(0x11, 0x13);
        assert!(vic.raster.horizontal().is_display_zone_reduced());
        assert!(vic.raster.vertical().is_display_zone_reduced());
        assert_eq!(vic.raster.horizontal().screen_positions(), 304);
        assert_eq!(vic.raster.vertical().screen_positions(), 192);
    }

    #[test]
    fn every_query_path_answers() {
        let vic = VicII::default();
        for path in vic.query_paths() {
            assert!(vic.query(path).is_some(), "{path}");
        }
        assert_eq!(vic.query("nope"), None);
        assert_eq!(vic.query("mode"), Some(Value::from("Char")));
    }
}
