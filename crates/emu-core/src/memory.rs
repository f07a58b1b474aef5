//! Memory as seen by a video chip.
//!
//! The CPU and the video chip share physical RAM but decode it through
//! different maps ("views"): the VIC-II sees the character ROM at $1000 in
//! banks 0 and 2, the TED can fetch from ROM or RAM, and so on. A chip
//! switches to its own view for a fetch and must put the CPU view back
//! before returning; [`with_chip_view`] does both.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

/// Byte-addressable memory with switchable views.
pub trait ChipMemory {
    /// Make `view` the active address map.
    fn set_active_view(&mut self, view: usize);

    /// Restore the CPU's address map.
    fn set_cpu_view(&mut self);

    /// Whether `view` is a map this memory knows.
    fn has_view(&self, view: usize) -> bool;

    /// Read through the active view.
    fn value(&self, address: u16) -> u8;

    /// Read physical RAM, bypassing the active view (colour RAM, for
    /// example, is wired straight to the chip).
    fn value_direct(&self, address: u16) -> u8;

    /// Read `count` consecutive bytes through the active view.
    fn values(&self, address: u16, count: usize) -> Vec<u8> {
        (0..count)
            .map(|i| self.value(address.wrapping_add(i as u16)))
            .collect()
    }

    fn set(&mut self, address: u16, value: u8);
}

/// Run `fetch` with `view` active, then restore the CPU view.
pub fn with_chip_view<M, T>(memory: &mut M, view: usize, fetch: impl FnOnce(&M) -> T) -> T
where
    M: ChipMemory + ?Sized,
{
    memory.set_active_view(view);
    let result = fetch(memory);
    memory.set_cpu_view();
    result
}

/// 64 KiB of RAM with per-view overlays.
///
/// View 0 is the CPU view. Other views read RAM except where an overlay
/// (a ROM image, for instance) has been installed for them.
#[derive(Debug, Clone)]
pub struct FlatMemory {
    ram: Vec<u8>,
    views: BTreeSet<usize>,
    overlays: HashMap<usize, HashMap<u16, u8>>,
    active: usize,
    view_switches: usize,
}

impl FlatMemory {
    pub const CPU_VIEW: usize = 0;

    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; 0x1_0000],
            views: BTreeSet::from([Self::CPU_VIEW]),
            overlays: HashMap::new(),
            active: Self::CPU_VIEW,
            view_switches: 0,
        }
    }

    /// Declare a view; reads through it see RAM until overlaid.
    pub fn add_view(&mut self, view: usize) {
        if self.views.insert(view) {
            debug!(view, "memory view added");
        }
    }

    /// Install `bytes` at `address` as seen through `view` only.
    pub fn overlay(&mut self, view: usize, address: u16, bytes: &[u8]) {
        self.add_view(view);
        let map = self.overlays.entry(view).or_default();
        for (i, &b) in bytes.iter().enumerate() {
            map.insert(address.wrapping_add(i as u16), b);
        }
    }

    /// Write a block straight into RAM.
    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.ram[usize::from(address.wrapping_add(i as u16))] = b;
        }
    }

    #[must_use]
    pub fn active_view(&self) -> usize {
        self.active
    }

    /// Number of times a non-CPU view has been activated.
    #[must_use]
    pub fn view_switches(&self) -> usize {
        self.view_switches
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipMemory for FlatMemory {
    fn set_active_view(&mut self, view: usize) {
        if view != Self::CPU_VIEW {
            if !self.views.contains(&view) {
                warn!(view, "switching to an unregistered memory view");
            }
            self.view_switches += 1;
        }
        self.active = view;
    }

    fn set_cpu_view(&mut self) {
        self.active = Self::CPU_VIEW;
    }

    fn has_view(&self, view: usize) -> bool {
        self.views.contains(&view)
    }

    fn value(&self, address: u16) -> u8 {
        self.overlays
            .get(&self.active)
            .and_then(|map| map.get(&address))
            .copied()
            .unwrap_or(self.ram[usize::from(address)])
    }

    fn value_direct(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn set(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }
}
