//! Movable objects: two players, two missiles, one ball.
//!
//! Positions are colour clocks from the left edge of the visible line
//! (0-159). Horizontal motion values are signed 4-bit nibbles; HMOVE moves
//! an object left by its motion value.

use serde::{Deserialize, Serialize};

const LINE_WIDTH: i16 = 160;

/// Copies drawn per NUSIZ mode, one entry per 8-clock column.
const PLAYER_COPIES: [[bool; 9]; 8] = [
    [true, false, false, false, false, false, false, false, false],
    [true, false, true, false, false, false, false, false, false],
    [true, false, false, false, true, false, false, false, false],
    [true, false, true, false, true, false, false, false, false],
    [true, false, false, false, false, false, false, false, true],
    [true, true, false, false, false, false, false, false, false],
    [true, false, false, false, true, false, false, false, true],
    [true, true, true, true, false, false, false, false, false],
];

/// Missiles copy like players but never stretch: the double and quad
/// width modes draw a single copy.
const MISSILE_COPIES: [[bool; 9]; 8] = [
    [true, false, false, false, false, false, false, false, false],
    [true, false, true, false, false, false, false, false, false],
    [true, false, false, false, true, false, false, false, false],
    [true, false, true, false, true, false, false, false, false],
    [true, false, false, false, false, false, false, false, true],
    [true, false, false, false, false, false, false, false, false],
    [true, false, false, false, true, false, false, false, true],
    [true, false, false, false, false, false, false, false, false],
];

/// Decode an HMxx register value into a signed motion.
#[must_use]
pub fn motion_from_register(value: u8) -> i8 {
    ((value & 0xF0) as i8) >> 4
}

fn moved(x: u8, motion: i16) -> u8 {
    (i16::from(x) - motion).rem_euclid(LINE_WIDTH) as u8
}

/// Offset of `beam` from an object at `x`, allowing copies that wrap past
/// the right edge to continue at the left.
fn offset_from(beam: i16, x: u8) -> Option<i16> {
    let span = 9 * 8;
    let offset = beam - i16::from(x);
    if (0..span).contains(&offset) {
        return Some(offset);
    }
    let wrapped = beam - (i16::from(x) - LINE_WIDTH);
    (0..span).contains(&wrapped).then_some(wrapped)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub x: u8,
    pub motion: i8,
    /// GRPx as last written.
    pub graphics: u8,
    /// GRPx captured when the other player's graphics were written.
    pub graphics_delayed: u8,
    /// VDELPx: draw from the delayed copy.
    pub vertical_delay: bool,
    /// REFPx.
    pub reflect: bool,
    /// NUSIZx bits 2-0.
    pub copies: u8,
}

impl Player {
    /// Strobe RESPx.
    pub fn reset_position(&mut self, beam: i16, in_hblank: bool) {
        self.x = if in_hblank {
            3
        } else {
            (beam + 5).rem_euclid(LINE_WIDTH) as u8
        };
    }

    pub fn apply_motion(&mut self, extra: i16) {
        self.x = moved(self.x, i16::from(self.motion) + extra);
    }

    /// Whether the player draws at beam column `beam`.
    #[must_use]
    pub fn pixel(&self, beam: i16) -> bool {
        let shape = if self.vertical_delay {
            self.graphics_delayed
        } else {
            self.graphics
        };
        if shape == 0 {
            return false;
        }
        let Some(offset) = offset_from(beam, self.x) else {
            return false;
        };
        let mode = usize::from(self.copies & 7);
        if !PLAYER_COPIES[mode][(offset >> 3) as usize] {
            return false;
        }
        let bit = match mode {
            5 => offset >> 1,
            7 => offset >> 2,
            _ => offset,
        } & 7;
        if self.reflect {
            (shape >> bit) & 1 != 0
        } else {
            (shape << bit) & 0x80 != 0
        }
    }

    /// Where a missile locked to this player (RESMPx) sits.
    #[must_use]
    pub fn missile_lock_position(&self) -> u8 {
        let centre = match self.copies & 7 {
            5 => 8,
            7 => 16,
            _ => 4,
        };
        (u16::from(self.x) + centre).rem_euclid(LINE_WIDTH as u16) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Missile {
    pub x: u8,
    pub motion: i8,
    /// ENAMx.
    pub enabled: bool,
    /// Width in clocks: 1, 2, 4 or 8.
    pub size: u8,
    /// NUSIZx bits 2-0, shared with the player.
    pub copies: u8,
    /// RESMPx: hidden and pinned to its player.
    pub locked: bool,
}

impl Default for Missile {
    fn default() -> Self {
        Self {
            x: 0,
            motion: 0,
            enabled: false,
            size: 1,
            copies: 0,
            locked: false,
        }
    }
}

impl Missile {
    /// Strobe RESMx.
    pub fn reset_position(&mut self, beam: i16, in_hblank: bool) {
        self.x = if in_hblank {
            2
        } else {
            (beam + 4).rem_euclid(LINE_WIDTH) as u8
        };
    }

    pub fn apply_motion(&mut self, extra: i16) {
        self.x = moved(self.x, i16::from(self.motion) + extra);
    }

    #[must_use]
    pub fn pixel(&self, beam: i16) -> bool {
        if !self.enabled || self.locked {
            return false;
        }
        let offset = beam - i16::from(self.x);
        if !(0..9 * 8).contains(&offset) {
            return false;
        }
        if !MISSILE_COPIES[usize::from(self.copies & 7)][(offset >> 3) as usize] {
            return false;
        }
        (offset & 7) < i16::from(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub x: u8,
    pub motion: i8,
    /// ENABL as last written.
    pub enabled: bool,
    /// ENABL captured when GRP1 was written.
    pub enabled_delayed: bool,
    /// VDELBL.
    pub vertical_delay: bool,
    /// Width in clocks: 1, 2, 4 or 8.
    pub size: u8,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            x: 0,
            motion: 0,
            enabled: false,
            enabled_delayed: false,
            vertical_delay: false,
            size: 1,
        }
    }
}

impl Ball {
    /// Strobe RESBL.
    pub fn reset_position(&mut self, beam: i16, in_hblank: bool) {
        self.x = if in_hblank {
            2
        } else {
            (beam + 4).rem_euclid(LINE_WIDTH) as u8
        };
    }

    pub fn apply_motion(&mut self, extra: i16) {
        self.x = moved(self.x, i16::from(self.motion) + extra);
    }

    #[must_use]
    pub fn pixel(&self, beam: i16) -> bool {
        let shown = if self.vertical_delay {
            self.enabled_delayed
        } else {
            self.enabled
        };
        let x = i16::from(self.x);
        shown && beam >= x && beam < x + i16::from(self.size)
    }
}
