//! Shared building blocks for the video chips: raster geometry, the
//! palette-indexed framebuffer, and the CPU/memory collaborator traits.

mod chip;
mod config;
mod cpu;
mod error;
mod event;
mod memory;
mod observable;
pub mod raster;
mod screen;

pub use chip::GraphicalChip;
pub use config::VideoStandard;
pub use cpu::{Cpu, CycleCpu, InterruptLine, InterruptRequest};
pub use error::ChipError;
pub use event::{ChipEvent, EventQueue};
pub use memory::{ChipMemory, FlatMemory, with_chip_view};
pub use observable::{Observable, Value};
pub use raster::{Axis, Raster, RasterData, RasterGeometry};
pub use screen::ScreenMemory;
