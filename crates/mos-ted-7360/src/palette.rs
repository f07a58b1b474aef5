//! TED colours as ARGB32.
//!
//! A colour byte holds the hue in bits 0-3 and the luminance in bits 4-6,
//! so the palette is indexed by `luminance << 4 | hue`. Hue 0 is black at
//! every luminance, which leaves 121 distinct colours.

/// Indexed 0-127 by the 7-bit colour value.
pub const PALETTE: [u32; 128] = [
    // luminance 0
    0xFF00_0000, 0xFF47_4747, 0xFF8B_2A2B, 0xFF03_6563,
    0xFF7F_1C92, 0xFF0A_720B, 0xFF38_38C0, 0xFF57_5700,
    0xFF82_3704, 0xFF6C_4900, 0xFF35_6800, 0xFF8D_2156,
    0xFF02_6D3C, 0xFF1D_49AB, 0xFF4B_2DC4, 0xFF21_6F00,
    // luminance 1
    0xFF00_0000, 0xFF68_6868, 0xFFAC_4B4C, 0xFF24_8684,
    0xFFA0_3DB3, 0xFF2B_932C, 0xFF59_59E2, 0xFF78_7800,
    0xFFA3_5825, 0xFF8D_6A00, 0xFF56_8900, 0xFFAE_4278,
    0xFF23_8E5E, 0xFF3E_6ACC, 0xFF6C_4EE5, 0xFF42_9000,
    // luminance 2
    0xFF00_0000, 0xFF75_7575, 0xFFB9_5859, 0xFF31_9291,
    0xFFAC_4AC0, 0xFF38_A038, 0xFF65_65EE, 0xFF84_8400,
    0xFFAF_6431, 0xFF9A_760B, 0xFF63_9500, 0xFFBA_4F84,
    0xFF2F_9A6A, 0xFF4B_77D8, 0xFF78_5BF1, 0xFF4F_9C0C,
    // luminance 3
    0xFF00_0000, 0xFF81_8181, 0xFFC5_6465, 0xFF3D_9E9D,
    0xFFB9_56CC, 0xFF44_AC45, 0xFF71_72FA, 0xFF91_9108,
    0xFFBC_703D, 0xFFA6_8318, 0xFF6F_A209, 0xFFC6_5B90,
    0xFF3C_A776, 0xFF57_83E4, 0xFF85_67FD, 0xFF5B_A919,
    // luminance 4
    0xFF00_0000, 0xFF92_9292, 0xFFD6_7476, 0xFF4E_AFAE,
    0xFFC9_67DD, 0xFF55_BC55, 0xFF82_82FF, 0xFFA1_A119,
    0xFFCC_814E, 0xFFB7_9328, 0xFF80_B21A, 0xFFD7_6BA1,
    0xFF4C_B787, 0xFF68_94F5, 0xFF95_78FF, 0xFF6C_B929,
    // luminance 5
    0xFF00_0000, 0xFFB3_B3B3, 0xFFF7_9697, 0xFF6F_D0CF,
    0xFFEA_88FE, 0xFF76_DE76, 0xFFA3_A3FF, 0xFFC2_C23A,
    0xFFED_A26F, 0xFFD8_B449, 0xFFA1_D33B, 0xFFF8_8CC2,
    0xFF6D_D8A8, 0xFF89_B5FF, 0xFFB6_99FF, 0xFF8D_DA4A,
    // luminance 6
    0xFF00_0000, 0xFFCB_CBCB, 0xFFFF_AEB0, 0xFF88_E9E7,
    0xFFFF_A1FF, 0xFF8E_F68F, 0xFFBC_BCFF, 0xFFDB_DB52,
    0xFFFF_BB88, 0xFFF0_CD62, 0xFFB9_EC53, 0xFFFF_A5DB,
    0xFF86_F1C1, 0xFFA2_CEFF, 0xFFCF_B1FF, 0xFFA5_F363,
    // luminance 7
    0xFF00_0000, 0xFFF5_F5F5, 0xFFFF_D8D9, 0xFFB1_FFFF,
    0xFFFF_CAFF, 0xFFB8_FFB9, 0xFFE5_E5FF, 0xFFFF_FF7C,
    0xFFFF_E4B1, 0xFFFF_F68B, 0xFFE3_FF7D, 0xFFFF_CFFF,
    0xFFAF_FFEA, 0xFFCB_F7FF, 0xFFF8_DBFF, 0xFFCF_FF8D,
];

/// Palette index of a colour register or attribute byte.
#[must_use]
pub const fn colour_index(value: u8) -> u8 {
    value & 0x7F
}
