//! VIC-20 colours as ARGB32, using the VICE "mike-pal" palette values.

/// Colours 0-7 are available for characters; all 16 for the background
/// and auxiliary colour.
pub const PALETTE: [u32; 16] = [
    0xFF00_0000, // 0: Black
    0xFFFF_FFFF, // 1: White
    0xFFB6_1F21, // 2: Red
    0xFF4D_F0FF, // 3: Cyan
    0xFFB4_3FFF, // 4: Purple
    0xFF44_E237, // 5: Green
    0xFF1A_34FF, // 6: Blue
    0xFFDC_D71B, // 7: Yellow
    0xFFCA_5400, // 8: Orange
    0xFFE9_B072, // 9: Light Orange
    0xFFE7_9293, // 10: Pink
    0xFF9A_F7FD, // 11: Light Cyan
    0xFFE0_9FFF, // 12: Light Purple
    0xFF8F_E493, // 13: Light Green
    0xFF82_90FF, // 14: Light Blue
    0xFFE5_DE85, // 15: Light Yellow
];
