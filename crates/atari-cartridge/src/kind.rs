use std::fmt;

use serde::{Deserialize, Serialize};

/// Bank-switching scheme, identified by its conventional hex tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapperKind {
    /// No bank switching, or not yet detected.
    Unknown,
    F8,
    F6,
    F4,
    /// CBS RAM Plus.
    Fa,
    /// Megaboy.
    F0,
    /// Parker Bros.
    E0,
    /// Tigervision, tag 3F.
    Tigervision,
    /// Activision.
    Fe,
    /// M-Network.
    E7,
    /// Pitfall II display processor, tag DC.
    Dpc,
    /// Starpath Supercharger, tag 66.
    Supercharger,
    /// CommaVid, tag C0.
    CommaVid,
}

impl MapperKind {
    pub const ALL: [Self; 13] = [
        Self::Unknown,
        Self::F8,
        Self::F6,
        Self::F4,
        Self::Fa,
        Self::F0,
        Self::E0,
        Self::Tigervision,
        Self::Fe,
        Self::E7,
        Self::Dpc,
        Self::Supercharger,
        Self::CommaVid,
    ];

    #[must_use]
    pub const fn tag(self) -> u16 {
        match self {
            Self::Unknown => 0x00,
            Self::F8 => 0xF8,
            Self::F6 => 0xF6,
            Self::F4 => 0xF4,
            Self::Fa => 0xFA,
            Self::F0 => 0xF0,
            Self::E0 => 0xE0,
            Self::Tigervision => 0x3F,
            Self::Fe => 0xFE,
            Self::E7 => 0xE7,
            Self::Dpc => 0xDC,
            Self::Supercharger => 0x66,
            Self::CommaVid => 0xC0,
        }
    }

    #[must_use]
    pub fn from_tag(tag: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for MapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "none"),
            kind => write!(f, "{:02X}", kind.tag()),
        }
    }
}
