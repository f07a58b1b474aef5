use ctor::ctor;
use emu_core::{
    ChipEvent, ChipMemory, CycleCpu, FlatMemory, GraphicalChip, InterruptLine, Observable, Value,
};
use mos_vic_ii::{BAD_LINE_STALL_CYCLES, FIRST_BAD_LINE, LAST_BAD_LINE, PAL, VicII};
use proptest::prelude::*;
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

const FRAME_CYCLES: u64 = 312 * 63;
const LINE_CYCLES: u64 = 63;

struct Machine {
    vic: VicII,
    cpu: CycleCpu,
    memory: FlatMemory,
}

impl Machine {
    /// Initialized chip with the baseline `simulate` already done.
    fn new() -> Self {
        let mut memory = FlatMemory::new();
        memory.add_view(1);
        let mut vic = VicII::default();
        vic.initialize(&memory).expect("initialize");
        let mut cpu = CycleCpu::new();
        vic.simulate(&mut cpu, &mut memory);
        Self { vic, cpu, memory }
    }

    fn run(&mut self, cycles: u64) {
        self.cpu.advance(cycles);
        self.vic.simulate(&mut self.cpu, &mut self.memory);
    }

    fn pixel(&self, x: usize, y: usize) -> u8 {
        self.vic.screen_memory().pixel(x, y).expect("pixel inside framebuffer")
    }

    /// Character 0 solid, colour RAM white, border light blue.
    fn solid_text(&mut self) {
        self.memory.load(0x1000, &[0xFF; 8]);
        self.memory.load(0xD800, &[0x01; 1000]);
        self.vic.write_register(0xD020, 0x0E);
        self.vic.write_register(0xD021, 0x06);
    }

    fn sprite(&mut self, n: u16, x: u8, y: u8) {
        self.memory.set(0x07F8 + n, 0x0D);
        self.memory.load(0x0340, &[0xFF; 63]);
        self.vic.write_register(0xD000 + n * 2, x);
        self.vic.write_register(0xD001 + n * 2, y);
        let enabled = self.vic.peek_register(0xD015);
        self.vic.write_register(0xD015, enabled | 1 << n);
    }
}

#[test]
fn one_frame_fires_graphics_ready_once_and_wraps_to_line_0() {
    let mut m = Machine::new();
    m.vic.write_register(0xD020, 0x00);
    m.vic.write_register(0xD021, 0x00);

    m.run(FRAME_CYCLES);

    let events: Vec<_> = m.vic.events().drain().collect();
    assert_eq!(events, vec![ChipEvent::GraphicsReady]);
    assert_eq!(m.vic.raster().current_line(), 0);
    assert_eq!(m.vic.cycle(), 1);
    assert_eq!(m.vic.peek_register(0xD012), 0);
    assert_eq!(m.vic.peek_register(0xD011) & 0x80, 0);
}

#[test]
fn second_frame_fires_again() {
    let mut m = Machine::new();
    m.run(FRAME_CYCLES);
    assert!(m.vic.events().take_graphics_ready());
    m.run(FRAME_CYCLES);
    assert!(m.vic.events().take_graphics_ready());
}

#[test]
fn bad_line_steals_43_cycles() {
    let mut m = Machine::new();
    // YSCROLL 3 at power-on: the first bad line is $33
    m.run(0x33 * LINE_CYCLES);
    assert_eq!(m.cpu.stolen_cycles(), 0);

    m.run(1);
    assert_eq!(m.cpu.stolen_cycles(), u64::from(BAD_LINE_STALL_CYCLES));
    assert_eq!(m.vic.query("bad_line"), Some(Value::Bool(true)));
}

#[test]
fn display_disabled_on_line_30_means_no_bad_lines() {
    let mut m = Machine::new();
    m.vic.write_register(0xD011, 0x0B);
    m.run(FRAME_CYCLES);
    assert_eq!(m.cpu.stolen_cycles(), 0);
}

#[test]
fn whole_frame_of_text_steals_25_bad_lines() {
    let mut m = Machine::new();
    m.run(FRAME_CYCLES);
    assert_eq!(m.cpu.stolen_cycles(), 25 * u64::from(BAD_LINE_STALL_CYCLES));
}

#[test]
fn sprite_dma_steals_two_cycles_per_line() {
    let mut m = Machine::new();
    m.sprite(3, 100, 10);
    // DMA starts at cycle 55 of line 10; sprite 3 is fetched at cycle 1
    m.run(12 * LINE_CYCLES + 1);
    assert_eq!(m.cpu.stolen_cycles(), 4);
}

#[test]
fn raster_irq_is_requested_on_the_compare_line() {
    let mut m = Machine::new();
    m.vic.write_register(0xD012, 0x40);
    m.vic.write_register(0xD01A, 0x01);

    m.run(0x3F * LINE_CYCLES);
    assert!(m.cpu.requests().is_empty());

    m.run(2 * LINE_CYCLES);
    let requests = m.cpu.take_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].line, InterruptLine::Irq);
    assert_eq!(requests[0].source, "VIC-II");
    assert_eq!(requests[0].reason, 0x01);
    assert!(m.vic.irq_asserted());
    assert_eq!(m.vic.peek_register(0xD019), 0xF1);

    m.vic.write_register(0xD019, 0x01);
    assert!(!m.vic.irq_asserted());
}

#[test]
fn disabled_sources_latch_without_requesting() {
    let mut m = Machine::new();
    m.vic.write_register(0xD012, 0x10);
    m.run(0x20 * LINE_CYCLES);
    assert!(m.cpu.requests().is_empty());
    assert_eq!(m.vic.peek_register(0xD019), 0x71);
}

#[test]
fn cpu_view_is_restored_after_simulate() {
    let mut m = Machine::new();
    m.run(FRAME_CYCLES);
    assert!(m.memory.view_switches() > 0);
    assert_eq!(m.memory.active_view(), FlatMemory::CPU_VIEW);
}

#[test]
fn text_is_drawn_inside_the_border() {
    let mut m = Machine::new();
    m.solid_text();
    m.run(FRAME_CYCLES);

    // display window origin on PAL
    assert_eq!(m.pixel(32, 35), 0x01);
    assert_eq!(m.pixel(351, 35), 0x01);
    assert_eq!(m.pixel(32, 234), 0x01);
    assert_eq!(m.pixel(31, 35), 0x0E);
    assert_eq!(m.pixel(352, 35), 0x0E);
    assert_eq!(m.pixel(32, 34), 0x0E);
    assert_eq!(m.pixel(32, 235), 0x0E);
    assert_eq!(m.pixel(0, 0), 0x0E);
}

#[test]
fn narrow_screen_widens_the_border() {
    let mut m = Machine::new();
    m.solid_text();
    m.vic.write_register(0xD016, 0x00);
    m.run(FRAME_CYCLES);
    assert_eq!(m.pixel(38, 100), 0x0E);
    assert_eq!(m.pixel(39, 100), 0x01);
    assert_eq!(m.pixel(342, 100), 0x01);
    assert_eq!(m.pixel(343, 100), 0x0E);
}

#[test]
fn invalid_mode_draws_black() {
    let mut m = Machine::new();
    m.solid_text();
    m.vic.write_register(0xD011, 0x7B);
    m.run(FRAME_CYCLES);
    assert_eq!(m.pixel(100, 100), 0x00);
    assert_eq!(m.pixel(0, 100), 0x0E);
}

#[test]
fn video_reset_blanks_the_display_window() {
    let mut m = Machine::new();
    m.solid_text();
    m.vic.write_register(0xD016, 0x28);
    m.run(FRAME_CYCLES);
    assert_eq!(m.pixel(100, 100), 0x00);
    assert_eq!(m.pixel(0, 100), 0x0E);
}

#[test]
fn overlapping_sprites_collide() {
    let mut m = Machine::new();
    m.vic.write_register(0xD01A, 0x04);
    m.sprite(0, 100, 100);
    m.sprite(1, 110, 100);
    m.run(FRAME_CYCLES);

    assert_eq!(m.vic.peek_register(0xD01E), 0x03);
    assert_eq!(m.vic.peek_register(0xD01F), 0x00);
    assert_eq!(m.vic.peek_register(0xD019) & 0x04, 0x04);
    assert_eq!(m.cpu.requests().len(), 1);
    assert_eq!(m.cpu.requests()[0].reason, 0x04);

    assert_eq!(m.vic.read_register(0xD01E), 0x03);
    assert_eq!(m.vic.read_register(0xD01E), 0x00);
}

#[test]
fn sprite_over_text_collides_with_data() {
    let mut m = Machine::new();
    m.solid_text();
    m.sprite(2, 100, 100);
    m.run(FRAME_CYCLES);
    assert_eq!(m.vic.peek_register(0xD01F), 0x04);
    assert_eq!(m.vic.peek_register(0xD019) & 0x02, 0x02);
}

#[test]
fn sprites_in_the_border_do_not_collide() {
    let mut m = Machine::new();
    m.sprite(0, 100, 20);
    m.sprite(1, 104, 20);
    m.run(FRAME_CYCLES);
    assert_eq!(m.vic.peek_register(0xD01E), 0x00);
}

#[test]
fn sprite_is_drawn_at_its_coordinates() {
    let mut m = Machine::new();
    m.vic.write_register(0xD021, 0x00);
    m.vic.write_register(0xD027, 0x07);
    m.sprite(0, 24, 51);
    m.run(FRAME_CYCLES);
    // X 24 is the first display column; Y 51 is drawn from the next line
    assert_eq!(m.pixel(32, 36), 0x07);
    assert_eq!(m.pixel(55, 36), 0x07);
    assert_eq!(m.pixel(56, 36), 0x00);
    assert_eq!(m.pixel(32, 35), 0x00);
    assert_eq!(m.pixel(32, 56), 0x07);
    assert_eq!(m.pixel(32, 57), 0x00);
}

#[test]
fn light_pen_latches_beam_position_once() {
    let mut m = Machine::new();
    m.vic.set_light_pen(Some((100, 100)));
    m.run(FRAME_CYCLES);
    assert_eq!(m.vic.peek_register(0xD014), 116);
    assert_eq!(m.vic.peek_register(0xD013), 46);
    assert_eq!(m.vic.peek_register(0xD019) & 0x08, 0x08);
}

#[test]
fn palette_frame_converts_to_argb() {
    let mut m = Machine::new();
    m.solid_text();
    m.run(FRAME_CYCLES);
    let argb = m.vic.screen_memory().to_argb();
    assert_eq!(argb.len(), 384 * 274);
    assert_eq!(argb[0], mos_vic_ii::PALETTE[0x0E]);
}

#[test]
fn pal_geometry_matches_the_framebuffer() {
    let m = Machine::new();
    let raster = m.vic.raster();
    assert_eq!(raster.visible_columns(), 384);
    assert_eq!(raster.visible_lines(), 274);
    assert_eq!(u64::from(PAL.cycles_per_frame()), FRAME_CYCLES);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn bad_lines_follow_yscroll(k in 0u8..8) {
        let mut m = Machine::new();
        m.vic.write_register(0xD011, 0x18 | k);
        m.run(u64::from(FIRST_BAD_LINE + 1) * LINE_CYCLES);

        for line in 0..312u16 {
            let expected = (FIRST_BAD_LINE..=LAST_BAD_LINE).contains(&line)
                && (line & 7) as u8 == k;
            prop_assert_eq!(m.vic.is_bad_line(line), expected, "line {}", line);
        }
    }
}
