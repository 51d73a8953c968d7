//! Collision latches.
//!
//! Fifteen pairwise latches, read back two per register in bits 7 and 6.
//! Flag bit `2 * reg + 1` is register `reg` bit 7, `2 * reg` is bit 6.
//!
//! | Reg | Name   | Bit 7 | Bit 6 |
//! |-----|--------|-------|-------|
//! | 0   | CXM0P  | M0-P1 | M0-P0 |
//! | 1   | CXM1P  | M1-P0 | M1-P1 |
//! | 2   | CXP0FB | P0-PF | P0-BL |
//! | 3   | CXP1FB | P1-PF | P1-BL |
//! | 4   | CXM0FB | M0-PF | M0-BL |
//! | 5   | CXM1FB | M1-PF | M1-BL |
//! | 6   | CXBLPF | BL-PF |       |
//! | 7   | CXPPMM | P0-P1 | M0-M1 |

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which objects draw on the current colour clock.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Objects: u8 {
        const P0 = 0b00_0001;
        const P1 = 0b00_0010;
        const M0 = 0b00_0100;
        const M1 = 0b00_1000;
        const BL = 0b01_0000;
        const PF = 0b10_0000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Collisions: u16 {
        const M0_P0 = 1 << 0;
        const M0_P1 = 1 << 1;
        const M1_P1 = 1 << 2;
        const M1_P0 = 1 << 3;
        const P0_BL = 1 << 4;
        const P0_PF = 1 << 5;
        const P1_BL = 1 << 6;
        const P1_PF = 1 << 7;
        const M0_BL = 1 << 8;
        const M0_PF = 1 << 9;
        const M1_BL = 1 << 10;
        const M1_PF = 1 << 11;
        const BL_PF = 1 << 13;
        const M0_M1 = 1 << 14;
        const P0_P1 = 1 << 15;
    }
}

const PAIRS: [(Objects, Objects, Collisions); 15] = [
    (Objects::M0, Objects::P0, Collisions::M0_P0),
    (Objects::M0, Objects::P1, Collisions::M0_P1),
    (Objects::M1, Objects::P1, Collisions::M1_P1),
    (Objects::M1, Objects::P0, Collisions::M1_P0),
    (Objects::P0, Objects::BL, Collisions::P0_BL),
    (Objects::P0, Objects::PF, Collisions::P0_PF),
    (Objects::P1, Objects::BL, Collisions::P1_BL),
    (Objects::P1, Objects::PF, Collisions::P1_PF),
    (Objects::M0, Objects::BL, Collisions::M0_BL),
    (Objects::M0, Objects::PF, Collisions::M0_PF),
    (Objects::M1, Objects::BL, Collisions::M1_BL),
    (Objects::M1, Objects::PF, Collisions::M1_PF),
    (Objects::BL, Objects::PF, Collisions::BL_PF),
    (Objects::M0, Objects::M1, Collisions::M0_M1),
    (Objects::P0, Objects::P1, Collisions::P0_P1),
];

impl Collisions {
    /// Latches set by the objects overlapping on one colour clock.
    #[must_use]
    pub fn between(objects: Objects) -> Self {
        PAIRS
            .iter()
            .filter(|(a, b, _)| objects.contains(*a | *b))
            .fold(Self::empty(), |acc, (_, _, flag)| acc | *flag)
    }

    /// Bits 7-6 of collision register `reg` (0-7).
    #[must_use]
    pub fn register(self, reg: u16) -> u8 {
        (((self.bits() >> ((reg & 7) * 2)) & 0x03) as u8) << 6
    }
}
