use std::fmt;

/// Television standard a chip is built for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VideoStandard {
    #[default]
    Pal,
    Ntsc,
}

impl VideoStandard {
    #[must_use]
    pub const fn frames_per_second(self) -> u32 {
        match self {
            Self::Pal => 50,
            Self::Ntsc => 60,
        }
    }
}

impl fmt::Display for VideoStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pal => write!(f, "PAL"),
            Self::Ntsc => write!(f, "NTSC"),
        }
    }
}
