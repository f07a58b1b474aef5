//! Palette-indexed framebuffer.
//!
//! Chips write colour indices; presenters convert to ARGB32 with
//! [`ScreenMemory::to_argb`] between `simulate` calls. Writes outside the
//! buffer are dropped rather than wrapped.

/// Framebuffer of palette indices, one byte per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenMemory {
    columns: usize,
    rows: usize,
    pixels: Vec<u8>,
    palette: Vec<u32>,
}

impl ScreenMemory {
    /// Create a buffer cleared to colour index 0.
    #[must_use]
    pub fn new(columns: usize, rows: usize, palette: &[u32]) -> Self {
        Self {
            columns,
            rows,
            pixels: vec![0; columns * rows],
            palette: palette.to_vec(),
        }
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn palette(&self) -> &[u32] {
        &self.palette
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, colour: u8) {
        if x < self.columns && y < self.rows {
            self.pixels[y * self.columns + x] = colour;
        }
    }

    /// Fill `len` pixels of row `y` starting at `x`, clipped to the row.
    pub fn set_horizontal_line(&mut self, x: usize, y: usize, len: usize, colour: u8) {
        if y >= self.rows || x >= self.columns {
            return;
        }
        let end = (x + len).min(self.columns);
        let start = y * self.columns;
        self.pixels[start + x..start + end].fill(colour);
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.columns && y < self.rows).then(|| self.pixels[y * self.columns + x])
    }

    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        (y < self.rows).then(|| &self.pixels[y * self.columns..(y + 1) * self.columns])
    }

    pub fn clear(&mut self, colour: u8) {
        self.pixels.fill(colour);
    }

    /// The frame as ARGB32. Indices outside the palette come out opaque black.
    #[must_use]
    pub fn to_argb(&self) -> Vec<u32> {
        self.pixels
            .iter()
            .map(|&c| self.palette.get(usize::from(c)).copied().unwrap_or(0xFF00_0000))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREYS: [u32; 2] = [0xFF00_0000, 0xFFFF_FFFF];

    #[test]
    fn horizontal_line_is_clipped_to_the_row() {
        let mut screen = ScreenMemory::new(10, 2, &GREYS);
        screen.set_horizontal_line(6, 0, 8, 1);
        assert_eq!(screen.row(0), Some(&[0, 0, 0, 0, 0, 0, 1, 1, 1, 1][..]));
        assert_eq!(screen.row(1), Some(&[0; 10][..]));
    }

    #[test]
    fn out_of_range_writes_are_dropped() {
        let mut screen = ScreenMemory::new(4, 4, &GREYS);
        screen.set_pixel(4, 0, 1);
        screen.set_pixel(0, 4, 1);
        screen.set_horizontal_line(9, 1, 3, 1);
        assert!(screen.to_argb().iter().all(|&p| p == 0xFF00_0000));
        assert_eq!(screen.pixel(4, 0), None);
    }

    #[test]
    fn argb_uses_palette_and_falls_back_to_black() {
        let mut screen = ScreenMemory::new(3, 1, &GREYS);
        screen.set_pixel(1, 0, 1);
        screen.set_pixel(2, 0, 7);
        assert_eq!(screen.to_argb(), vec![0xFF00_0000, 0xFFFF_FFFF, 0xFF00_0000]);
    }
}
