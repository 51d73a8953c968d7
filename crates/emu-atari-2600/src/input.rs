//! Host-side input snapshot.
//!
//! The host replaces the whole snapshot each time it calls
//! [`Atari2600::set_input`](crate::Atari2600::set_input). The bus turns it
//! into the levels seen on the RIOT ports and the TIA input pins:
//!
//! | Line        | Source                                          |
//! |-------------|-------------------------------------------------|
//! | SWCHA 7-4   | left joystick R/L/D/U, paddle 0/1 buttons (7/6) |
//! | SWCHA 3-0   | right joystick R/L/D/U, paddle 2/3 buttons (3/2)|
//! | SWCHB 0/1   | reset / select (active low)                     |
//! | SWCHB 3     | colour (1) / black and white (0)                |
//! | SWCHB 6/7   | left / right difficulty (1 = A)                 |
//! | INPT0-3     | paddle charge, keypad columns 0-1               |
//! | INPT4/5     | fire buttons, keypad column 2                   |

use serde::{Deserialize, Serialize};

/// Size of the pressed-key indicator set.
pub const KEY_COUNT: usize = 256;

/// Paddle rotation limits in degrees.
pub const PADDLE_MIN: i16 = -135;
pub const PADDLE_MAX: i16 = 135;

/// A 5-way digital joystick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joystick {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub button: bool,
}

impl Joystick {
    /// Direction nibble as seen on SWCHA (R/L/D/U, active low).
    #[must_use]
    pub fn nibble(self) -> u8 {
        let mut lines = 0x0F;
        if self.right {
            lines &= !0x08;
        }
        if self.left {
            lines &= !0x04;
        }
        if self.down {
            lines &= !0x02;
        }
        if self.up {
            lines &= !0x01;
        }
        lines
    }
}

/// An analog paddle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paddle {
    pub button: bool,
    /// Rotation in degrees, -135 (fully clockwise) to 135.
    pub position: i16,
}

impl Paddle {
    /// Scanlines the pot capacitor needs to charge at this position.
    #[must_use]
    pub fn charge_lines(self) -> u64 {
        let position = i32::from(self.position.clamp(PADDLE_MIN, PADDLE_MAX));
        let lines = (135 - position) * 380 / 270;
        u64::try_from(lines.clamp(0, 380)).unwrap_or(0)
    }
}

/// A 12-key keypad, indexed row-major: `1 2 3 / 4 5 6 / 7 8 9 / * 0 #`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypad {
    pub keys: [bool; 12],
}

impl Keypad {
    pub const ROWS: usize = 4;
    pub const COLUMNS: usize = 3;

    #[must_use]
    pub fn is_pressed(&self, row: usize, column: usize) -> bool {
        self.keys[row * Self::COLUMNS + column]
    }

    pub fn set(&mut self, row: usize, column: usize, pressed: bool) {
        self.keys[row * Self::COLUMNS + column] = pressed;
    }
}

/// Everything the host feeds the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// Pressed-key indicators, used by the debug session.
    #[serde(skip, default = "no_keys")]
    pub keys: [bool; KEY_COUNT],
    pub reset: bool,
    pub select: bool,
    /// Console in black-and-white mode.
    pub black_and_white: bool,
    /// Difficulty switches, `true` = A (pro).
    pub left_difficulty: bool,
    pub right_difficulty: bool,
    pub joysticks: [Joystick; 2],
    pub paddles: [Paddle; 4],
    pub keypads: [Keypad; 2],
}

fn no_keys() -> [bool; KEY_COUNT] {
    [false; KEY_COUNT]
}

impl Default for Input {
    fn default() -> Self {
        Self {
            keys: no_keys(),
            reset: false,
            select: false,
            black_and_white: false,
            left_difficulty: false,
            right_difficulty: false,
            joysticks: [Joystick::default(); 2],
            paddles: [Paddle::default(); 4],
            keypads: [Keypad::default(); 2],
        }
    }
}

impl Input {
    /// Levels driven onto SWCHA by joysticks and paddle buttons.
    #[must_use]
    pub fn port_a_lines(&self) -> u8 {
        let mut lines = (self.joysticks[0].nibble() << 4) | self.joysticks[1].nibble();
        for (paddle, bit) in self.paddles.iter().zip([0x80, 0x40, 0x08, 0x04]) {
            if paddle.button {
                lines &= !bit;
            }
        }
        lines
    }

    /// Levels driven onto SWCHB by the console switches. Bits 2, 4 and 5
    /// are not connected and read low.
    #[must_use]
    pub fn port_b_lines(&self) -> u8 {
        let mut lines = 0;
        if !self.reset {
            lines |= 0x01;
        }
        if !self.select {
            lines |= 0x02;
        }
        if !self.black_and_white {
            lines |= 0x08;
        }
        if self.left_difficulty {
            lines |= 0x40;
        }
        if self.right_difficulty {
            lines |= 0x80;
        }
        lines
    }
}
