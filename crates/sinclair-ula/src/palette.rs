//! Spectrum colours as ARGB32: 0-7 normal, 8-15 BRIGHT.

pub const PALETTE: [u32; 16] = [
    0xFF00_0000, // Black
    0xFF00_00D7, // Blue
    0xFFD7_0000, // Red
    0xFFD7_00D7, // Magenta
    0xFF00_D700, // Green
    0xFF00_D7D7, // Cyan
    0xFFD7_D700, // Yellow
    0xFFD7_D7D7, // White
    0xFF00_0000, // Bright black
    0xFF00_00FF,
    0xFFFF_0000,
    0xFFFF_00FF,
    0xFF00_FF00,
    0xFF00_FFFF,
    0xFFFF_FF00,
    0xFFFF_FFFF,
];
