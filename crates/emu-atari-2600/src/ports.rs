//! Controller port state behind the TIA input pins.
//!
//! INPT0-3 sense the paddle pots. Setting VBLANK bit 7 grounds the pot
//! capacitors; clearing it lets them charge, and a pin reads high once its
//! capacitor crosses the threshold. Charge time is proportional to the pot
//! resistance, so a program measures the paddle by counting scanlines.
//!
//! INPT4/5 sense the fire buttons. With VBLANK bit 6 set they latch low on
//! the first press and stay low until latch mode is re-armed.
//!
//! Keypads reuse the same pins as columns while rows are driven through
//! SWCHA outputs.

use serde::{Deserialize, Serialize};

use crate::input::{Input, Joystick, Keypad, Paddle};

/// Processor cycles per scanline.
pub const CYCLES_PER_LINE: u64 = 76;

/// Paddle polls per frame that, with no button polls, look like paddle code.
const PADDLE_POLLS_WITHOUT_BUTTONS: u32 = 20;
/// Paddle polls per frame that look like paddle code regardless of buttons.
const PADDLE_POLLS_ALONE: u32 = 60;
/// Consecutive paddle-looking frames before joysticks are switched off.
const PADDLE_FRAMES: u32 = 20;

/// Infers from polling patterns whether the program reads paddles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddleHeuristic {
    frame: u64,
    paddle_polls: u32,
    button_polls: u32,
    paddle_frames: u32,
    in_use: bool,
}

impl PaddleHeuristic {
    pub fn count_paddle_poll(&mut self) {
        self.paddle_polls = self.paddle_polls.saturating_add(1);
    }

    pub fn count_button_poll(&mut self) {
        self.button_polls = self.button_polls.saturating_add(1);
    }

    /// Close the polling window when the TIA starts a new frame.
    pub fn observe_frame(&mut self, frame: u64) {
        if self.in_use || frame == self.frame {
            return;
        }
        self.frame = frame;
        let looks_like_paddles = (self.paddle_polls >= PADDLE_POLLS_WITHOUT_BUTTONS
            && self.button_polls == 0)
            || self.paddle_polls >= PADDLE_POLLS_ALONE;
        self.paddle_polls = 0;
        self.button_polls = 0;

        if !looks_like_paddles {
            self.paddle_frames = 0;
            return;
        }
        self.paddle_frames += 1;
        if self.paddle_frames >= PADDLE_FRAMES {
            log::info!("paddle polling detected: joysticks disabled");
            self.in_use = true;
        }
    }

    #[must_use]
    pub fn paddles_in_use(&self) -> bool {
        self.in_use
    }
}

/// Latches, pot timing and keypad selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerPorts {
    /// VBLANK bit 6.
    latch_mode: bool,
    /// INPT4/5 latches, `true` until the button is pressed.
    latches: [bool; 2],
    /// VBLANK bit 7: pot capacitors grounded.
    pot_dump: bool,
    /// Capacitors are charging.
    pot_timing: bool,
    timing_start: u64,
    charged: [bool; 4],
    /// A row of this keypad has been driven at some point.
    keypad_selected: [bool; 2],
    heuristic: PaddleHeuristic,
}

impl ControllerPorts {
    #[must_use]
    pub fn new() -> Self {
        Self {
            latches: [true; 2],
            ..Self::default()
        }
    }

    /// Handle VBLANK bits 6 and 7.
    pub fn write_vblank(&mut self, value: u8, cycles: u64) {
        let was_latching = self.latch_mode;
        self.latch_mode = value & 0x40 != 0;
        if !(was_latching && self.latch_mode) {
            self.latches = [true; 2];
        }

        let dump = value & 0x80 != 0;
        if dump {
            self.pot_timing = false;
            self.charged = [false; 4];
        } else if self.pot_dump {
            self.pot_timing = true;
            self.timing_start = cycles;
            self.charged = [false; 4];
        }
        self.pot_dump = dump;
    }

    /// Bookkeeping after a batch of cycles.
    pub fn after_cycles(&mut self, input: &Input, cycles: u64, frame: u64) {
        if self.latch_mode {
            for (latch, stick) in self.latches.iter_mut().zip(&input.joysticks) {
                *latch = *latch && !stick.button;
            }
        }

        if self.pot_timing {
            let lines = cycles.saturating_sub(self.timing_start) / CYCLES_PER_LINE;
            for (charged, paddle) in self.charged.iter_mut().zip(&input.paddles) {
                if lines >= paddle.charge_lines() {
                    *charged = true;
                }
            }
            self.heuristic.observe_frame(frame);
        }
    }

    /// Track keypad row selection from the SWCHA output register.
    pub fn observe_port_a(&mut self, output: u8, direction: u8) {
        let driven_low = !output & direction;
        if driven_low & 0xF0 != 0 {
            self.keypad_selected[0] = true;
        }
        if driven_low & 0x0F != 0 {
            self.keypad_selected[1] = true;
        }
    }

    /// Bit 7 of INPT0-5 (`pin` 0-5). `port_a` is SWCHA's output register
    /// and direction mask, used for keypad row selects.
    pub fn read_pin(&mut self, pin: usize, input: &Input, port_a: (u8, u8)) -> bool {
        if let Some((keypad, column)) = keypad_column(pin)
            && self.keypad_selected[keypad]
        {
            return !column_pressed(&input.keypads[keypad], keypad, column, port_a);
        }

        if pin < 4 {
            self.heuristic.count_paddle_poll();
            return !self.pot_dump && self.charged[pin];
        }

        self.heuristic.count_button_poll();
        let player = pin - 4;
        if self.latch_mode {
            self.latches[player]
        } else {
            !input.joysticks[player].button
        }
    }

    /// Apply the paddle/joystick and keypad suppression rules to a fresh
    /// input snapshot.
    #[must_use]
    pub fn filter(&self, mut input: Input) -> Input {
        if self.heuristic.paddles_in_use() {
            input.joysticks = [Joystick::default(); 2];
        } else {
            input.paddles = [Paddle::default(); 4];
        }
        for (stick, selected) in input.joysticks.iter_mut().zip(self.keypad_selected) {
            if selected {
                *stick = Joystick::default();
            }
        }
        input
    }

    #[must_use]
    pub fn paddles_in_use(&self) -> bool {
        self.heuristic.paddles_in_use()
    }

    #[must_use]
    pub fn keypad_selected(&self, keypad: usize) -> bool {
        self.keypad_selected[keypad & 1]
    }

    #[must_use]
    pub fn charged(&self, paddle: usize) -> bool {
        self.charged[paddle & 3]
    }
}

/// Keypad and column sensed by an input pin.
fn keypad_column(pin: usize) -> Option<(usize, usize)> {
    match pin {
        0 => Some((0, 0)),
        1 => Some((0, 1)),
        4 => Some((0, 2)),
        2 => Some((1, 0)),
        3 => Some((1, 1)),
        5 => Some((1, 2)),
        _ => None,
    }
}

fn column_pressed(keypad: &Keypad, index: usize, column: usize, (output, direction): (u8, u8)) -> bool {
    let shift = if index == 0 { 4 } else { 0 };
    (0..Keypad::ROWS).any(|row| {
        let bit = 1u8 << (shift + row);
        let selected = direction & bit != 0 && output & bit == 0;
        selected && keypad.is_pressed(row, column)
    })
}
