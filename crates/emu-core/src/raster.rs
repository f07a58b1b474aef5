//! Raster beam tracking.
//!
//! A video chip sweeps the CRT beam across a fixed number of positions per
//! line and a fixed number of lines per frame. Each axis is described by a
//! [`RasterGeometry`] (the constant PAL/NTSC table) and tracked at runtime
//! by a [`RasterData`]. A [`Raster`] combines the two axes.
//!
//! # Zones (per axis, in beam order)
//!
//! ```text
//! first ... first_visible ... first_display ... last_display ... last_visible ... last
//! |  blank  |                 visible                                       |  blank  |
//!                             |  display (screen when reduced)  |
//! ```
//!
//! Positions are absolute counter values as the hardware reports them (the
//! VIC-II line counter starts a PAL line at column 404, for example).
//! Internally every position is also kept "at base 0", i.e. relative to
//! `first`, so zone checks are plain range comparisons even when the
//! counter wraps in the middle of the line.

use std::fmt;

use crate::ChipError;

/// Which beam axis a geometry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => write!(f, "horizontal"),
            Self::Vertical => write!(f, "vertical"),
        }
    }
}

/// Constant description of one raster axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterGeometry {
    /// Counter value where the axis starts (blank zone begins).
    pub first: u16,
    /// First position the CRT shows.
    pub first_visible: u16,
    /// First position of the full-size display window.
    pub first_display: u16,
    /// Last position of the full-size display window.
    pub last_display: u16,
    /// Last position the CRT shows.
    pub last_visible: u16,
    /// Last counter value before wrapping back to `first`.
    pub last: u16,
    /// Number of positions on the axis.
    pub max: u16,
    /// Positions removed from the start of the display window when reduced.
    pub reduce_first: u16,
    /// Positions removed from the end of the display window when reduced.
    pub reduce_last: u16,
}

impl RasterGeometry {
    /// Convert an absolute counter value to an offset from `first`.
    #[must_use]
    pub const fn to_base0(&self, position: u16) -> u16 {
        ((position as u32 + self.max as u32 - self.first as u32) % self.max as u32) as u16
    }

    /// Check the table is internally consistent.
    pub fn validate(&self, axis: Axis) -> Result<(), ChipError> {
        let invalid = |reason: String| ChipError::InvalidRasterGeometry { axis, reason };

        if self.max == 0 {
            return Err(invalid("axis has no positions".to_string()));
        }
        for (name, p) in [
            ("first", self.first),
            ("first_visible", self.first_visible),
            ("first_display", self.first_display),
            ("last_display", self.last_display),
            ("last_visible", self.last_visible),
            ("last", self.last),
        ] {
            if p >= self.max {
                return Err(invalid(format!("{name} ({p}) is outside 0..{}", self.max)));
            }
        }
        if self.to_base0(self.last) != self.max - 1 {
            return Err(invalid(format!(
                "last ({}) is not the position before first ({})",
                self.last, self.first
            )));
        }

        let fv = self.to_base0(self.first_visible);
        let fd = self.to_base0(self.first_display);
        let ld = self.to_base0(self.last_display);
        let lv = self.to_base0(self.last_visible);
        if !(fv <= fd && fd <= ld && ld <= lv) {
            return Err(invalid(format!(
                "zones out of order (visible {fv}..={lv}, display {fd}..={ld})"
            )));
        }
        if u32::from(self.reduce_first) + u32::from(self.reduce_last) > u32::from(ld - fd) {
            return Err(invalid("reduction larger than the display window".to_string()));
        }
        Ok(())
    }
}

/// Runtime state of one raster axis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterData {
    geometry: RasterGeometry,

    first_visible0: u16,
    first_display0: u16,
    last_display0: u16,
    last_visible0: u16,

    /// Display window after reduction (the "screen" zone).
    first_screen0: u16,
    last_screen0: u16,
    display_zone_reduced: bool,

    current: u16,
    current0: u16,
}

impl RasterData {
    /// Build the runtime axis from a table that is known to be valid.
    #[must_use]
    pub fn new(geometry: RasterGeometry) -> Self {
        debug_assert!(
            geometry.to_base0(geometry.last) == geometry.max - 1,
            "raster geometry: last position must precede first"
        );

        let first_display0 = geometry.to_base0(geometry.first_display);
        let last_display0 = geometry.to_base0(geometry.last_display);
        Self {
            geometry,
            first_visible0: geometry.to_base0(geometry.first_visible),
            first_display0,
            last_display0,
            last_visible0: geometry.to_base0(geometry.last_visible),
            first_screen0: first_display0,
            last_screen0: last_display0,
            display_zone_reduced: false,
            current: geometry.first,
            current0: 0,
        }
    }

    /// Build the runtime axis, rejecting inconsistent tables.
    pub fn try_new(geometry: RasterGeometry, axis: Axis) -> Result<Self, ChipError> {
        geometry.validate(axis)?;
        Ok(Self::new(geometry))
    }

    /// Move back to `first` and undo any display reduction.
    pub fn initialize(&mut self) {
        self.current = self.geometry.first;
        self.current0 = 0;
        self.reduce_display_zone(false);
    }

    #[must_use]
    pub fn geometry(&self) -> &RasterGeometry {
        &self.geometry
    }

    /// Absolute counter value.
    #[must_use]
    pub fn current_position(&self) -> u16 {
        self.current
    }

    /// Offset of the beam from `first`.
    #[must_use]
    pub fn current_position_at_base0(&self) -> u16 {
        self.current0
    }

    #[must_use]
    pub fn max_positions(&self) -> u16 {
        self.geometry.max
    }

    #[must_use]
    pub fn to_base0(&self, position: u16) -> u16 {
        self.geometry.to_base0(position)
    }

    #[must_use]
    pub fn is_in_blank_zone(&self) -> bool {
        self.current0 < self.first_visible0 || self.current0 > self.last_visible0
    }

    #[must_use]
    pub fn is_in_first_blank_zone(&self) -> bool {
        self.current0 < self.first_visible0
    }

    #[must_use]
    pub fn is_in_last_blank_zone(&self) -> bool {
        self.current0 > self.last_visible0
    }

    #[must_use]
    pub fn is_in_visible_zone(&self) -> bool {
        (self.first_visible0..=self.last_visible0).contains(&self.current0)
    }

    /// Inside the full-size display window, ignoring any reduction.
    #[must_use]
    pub fn is_in_display_zone(&self) -> bool {
        (self.first_display0..=self.last_display0).contains(&self.current0)
    }

    /// Inside the display window as currently reduced.
    #[must_use]
    pub fn is_in_screen_zone(&self) -> bool {
        (self.first_screen0..=self.last_screen0).contains(&self.current0)
    }

    /// Advance the beam by `i` positions.
    ///
    /// Returns `true` when the advance wrapped past the last position, i.e.
    /// a new line (horizontal axis) or frame (vertical axis) began.
    pub fn add(&mut self, i: u16) -> bool {
        let max = u32::from(self.geometry.max);
        let next = u32::from(self.current0) + u32::from(i);
        self.current0 = (next % max) as u16;
        self.current = ((u32::from(self.current0) + u32::from(self.geometry.first)) % max) as u16;
        next >= max
    }

    pub fn next(&mut self) -> bool {
        self.add(1)
    }

    /// How far past the wrap point an advance of `i` would land, if it wraps.
    #[must_use]
    pub fn simulate_add(&self, i: u16) -> Option<u16> {
        let next = u32::from(self.current0) + u32::from(i);
        let max = u32::from(self.geometry.max);
        (next >= max).then(|| ((next - max) % max) as u16)
    }

    /// Absolute counter value one position ahead, without moving.
    #[must_use]
    pub fn next_position(&self) -> u16 {
        let mut ahead = self.clone();
        ahead.next();
        ahead.current
    }

    /// Absolute counter value one position behind, without moving.
    #[must_use]
    pub fn previous_position(&self) -> u16 {
        let mut behind = self.clone();
        behind.add(self.geometry.max - 1);
        behind.current
    }

    /// Shrink (or restore) the display window to the screen window.
    ///
    /// Repeating a call with the same value changes nothing.
    pub fn reduce_display_zone(&mut self, reduce: bool) {
        if reduce == self.display_zone_reduced {
            return;
        }
        self.display_zone_reduced = reduce;
        if reduce {
            self.first_screen0 = self.first_display0 + self.geometry.reduce_first;
            self.last_screen0 = self.last_display0 - self.geometry.reduce_last;
        } else {
            self.first_screen0 = self.first_display0;
            self.last_screen0 = self.last_display0;
        }
    }

    #[must_use]
    pub fn is_display_zone_reduced(&self) -> bool {
        self.display_zone_reduced
    }

    /// Beam position inside the visible zone (0 at `first_visible`).
    ///
    /// Only meaningful while [`is_in_visible_zone`](Self::is_in_visible_zone).
    #[must_use]
    pub fn current_visible_position(&self) -> u16 {
        self.current0.saturating_sub(self.first_visible0)
    }

    /// Beam position relative to the start of the display window; negative
    /// in the leading border.
    #[must_use]
    pub fn current_display_position(&self) -> i32 {
        i32::from(self.current0) - i32::from(self.first_display0)
    }

    #[must_use]
    pub fn visible_positions(&self) -> u16 {
        self.last_visible0 - self.first_visible0 + 1
    }

    /// Start of the display window, in visible-zone coordinates.
    #[must_use]
    pub fn first_display_position(&self) -> u16 {
        self.first_display0 - self.first_visible0
    }

    #[must_use]
    pub fn last_display_position(&self) -> u16 {
        self.last_display0 - self.first_visible0
    }

    /// Start of the (possibly reduced) screen window, in visible-zone
    /// coordinates.
    #[must_use]
    pub fn first_screen_position(&self) -> u16 {
        self.first_screen0 - self.first_visible0
    }

    #[must_use]
    pub fn last_screen_position(&self) -> u16 {
        self.last_screen0 - self.first_visible0
    }

    #[must_use]
    pub fn display_positions(&self) -> u16 {
        self.last_display0 - self.first_display0 + 1
    }

    #[must_use]
    pub fn screen_positions(&self) -> u16 {
        self.last_screen0 - self.first_screen0 + 1
    }

    /// Where an absolute counter value falls inside the visible zone.
    #[must_use]
    pub fn position_in_visible_zone(&self, position: u16) -> Option<u16> {
        let p0 = self.to_base0(position % self.geometry.max);
        (self.first_visible0..=self.last_visible0)
            .contains(&p0)
            .then(|| p0 - self.first_visible0)
    }
}

/// Two-axis beam tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Raster {
    vertical: RasterData,
    horizontal: RasterData,
    /// Horizontal positions covered by one chip cycle.
    step: u16,
}

impl Raster {
    #[must_use]
    pub fn new(vertical: RasterGeometry, horizontal: RasterGeometry, step: u16) -> Self {
        Self {
            vertical: RasterData::new(vertical),
            horizontal: RasterData::new(horizontal),
            step,
        }
    }

    pub fn try_new(
        vertical: RasterGeometry,
        horizontal: RasterGeometry,
        step: u16,
    ) -> Result<Self, ChipError> {
        Ok(Self {
            vertical: RasterData::try_new(vertical, Axis::Vertical)?,
            horizontal: RasterData::try_new(horizontal, Axis::Horizontal)?,
            step,
        })
    }

    /// Check both axes again (after deserialising, for example).
    pub fn validate(&self) -> Result<(), ChipError> {
        self.vertical.geometry().validate(Axis::Vertical)?;
        self.horizontal.geometry().validate(Axis::Horizontal)
    }

    pub fn initialize(&mut self) {
        self.vertical.initialize();
        self.horizontal.initialize();
    }

    #[must_use]
    pub fn vertical(&self) -> &RasterData {
        &self.vertical
    }

    #[must_use]
    pub fn horizontal(&self) -> &RasterData {
        &self.horizontal
    }

    #[must_use]
    pub fn step(&self) -> u16 {
        self.step
    }

    /// Advance the beam by `cycles` chip cycles.
    ///
    /// Returns `true` when at least one new line began.
    pub fn move_cycles(&mut self, cycles: u16) -> bool {
        let mut new_line = false;
        for _ in 0..cycles {
            if self.horizontal.add(self.step) {
                self.vertical.next();
                new_line = true;
            }
        }
        new_line
    }

    /// Absolute line counter.
    #[must_use]
    pub fn current_line(&self) -> u16 {
        self.vertical.current_position()
    }

    /// Absolute column counter.
    #[must_use]
    pub fn current_column(&self) -> u16 {
        self.horizontal.current_position()
    }

    /// Beam position in framebuffer coordinates, as `(x, y)`.
    #[must_use]
    pub fn current_visible_position(&self) -> (u16, u16) {
        (
            self.horizontal.current_visible_position(),
            self.vertical.current_visible_position(),
        )
    }

    /// Beam position relative to the display window origin, as `(x, y)`.
    #[must_use]
    pub fn current_display_position(&self) -> (i32, i32) {
        (
            self.horizontal.current_display_position(),
            self.vertical.current_display_position(),
        )
    }

    #[must_use]
    pub fn visible_columns(&self) -> u16 {
        self.horizontal.visible_positions()
    }

    #[must_use]
    pub fn visible_lines(&self) -> u16 {
        self.vertical.visible_positions()
    }

    /// Framebuffer row for an absolute line number, if that line is shown.
    #[must_use]
    pub fn line_in_visible_zone(&self, line: u16) -> Option<u16> {
        self.vertical.position_in_visible_zone(line)
    }

    #[must_use]
    pub fn is_in_visible_zone(&self) -> bool {
        self.vertical.is_in_visible_zone() && self.horizontal.is_in_visible_zone()
    }

    #[must_use]
    pub fn is_in_display_zone(&self) -> bool {
        self.vertical.is_in_display_zone() && self.horizontal.is_in_display_zone()
    }

    #[must_use]
    pub fn is_in_screen_zone(&self) -> bool {
        self.vertical.is_in_screen_zone() && self.horizontal.is_in_screen_zone()
    }

    #[must_use]
    pub fn is_in_vblank(&self) -> bool {
        self.vertical.is_in_blank_zone()
    }

    #[must_use]
    pub fn is_in_first_vblank_zone(&self) -> bool {
        self.vertical.is_in_first_blank_zone()
    }

    #[must_use]
    pub fn is_in_last_vblank_zone(&self) -> bool {
        self.vertical.is_in_last_blank_zone()
    }

    #[must_use]
    pub fn is_in_hblank(&self) -> bool {
        self.horizontal.is_in_blank_zone()
    }

    /// Reduce rows (`vertical`) and columns (`horizontal`) independently.
    pub fn reduce_display_zone(&mut self, vertical: bool, horizontal: bool) {
        self.vertical.reduce_display_zone(vertical);
        self.horizontal.reduce_display_zone(horizontal);
    }

    /// Put the beam at an absolute position.
    #[doc(hidden)]
    pub fn set_position(&mut self, line: u16, column: u16) {
        self.vertical.initialize_at(line);
        self.horizontal.initialize_at(column);
    }
}

impl RasterData {
    fn initialize_at(&mut self, position: u16) {
        self.current0 = self.to_base0(position % self.geometry.max);
        self.current = position % self.geometry.max;
    }
}
