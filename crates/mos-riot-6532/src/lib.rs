//! MOS 6532 RIOT (RAM-I/O-Timer).
//!
//! The 6532 pairs two 8-bit I/O ports with an interval timer. Its 128 bytes
//! of RAM are decoded separately by the host bus, so this model covers the
//! port and timer registers only.
//!
//! # Registers (selected by A2-A0, A4 on writes)
//!
//! | Addr  | Read   | Write                         |
//! |-------|--------|-------------------------------|
//! | 0     | SWCHA  | SWCHA (port A output)         |
//! | 1     | SWACNT | SWACNT (port A direction)     |
//! | 2     | SWCHB  | SWCHB (port B output)         |
//! | 3     | SWBCNT | SWBCNT (port B direction)     |
//! | 4 / 6 | INTIM  | edge-detect control (A4 = 0)  |
//! | 5 / 7 | INSTAT | edge-detect control (A4 = 0)  |
//! | 0x14-0x17 |    | TIM1T / TIM8T / TIM64T / T1024T |
//!
//! A direction bit of 1 makes the pin an output: reads of that bit return
//! the value last written rather than the external line.

#![allow(clippy::cast_possible_truncation)]

mod timer;

use emu_core::{Observable, Tickable, Value};
use serde::{Deserialize, Serialize};

pub use timer::{DIVIDERS, Timer};

/// MOS 6532 port and timer registers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Riot6532 {
    /// Interval timer.
    timer: Timer,
    /// Port A output register.
    port_a: u8,
    /// Port A data direction register (1 = output).
    ddr_a: u8,
    /// Port B output register.
    port_b: u8,
    /// Port B data direction register (1 = output).
    ddr_b: u8,
    /// External input lines for port A.
    pub external_a: u8,
    /// External input lines for port B.
    pub external_b: u8,
}

impl Riot6532 {
    /// Create a RIOT whose timer powers up holding `timer_value`.
    #[must_use]
    pub fn new(timer_value: u8) -> Self {
        Self {
            timer: Timer::new(timer_value),
            port_a: 0,
            ddr_a: 0,
            port_b: 0,
            ddr_b: 0,
            external_a: 0xFF,
            external_b: 0xFF,
        }
    }

    /// Read a register. Address bits above A2 are ignored.
    pub fn read(&mut self, addr: u16) -> u8 {
        match addr & 0x07 {
            0 => self.swcha(),
            1 => self.ddr_a,
            2 => self.swchb(),
            3 => self.ddr_b,
            4 | 6 => self.timer.read_intim(),
            _ => self.timer.read_instat(),
        }
    }

    /// Read a register without side effects.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr & 0x07 {
            0 => self.swcha(),
            1 => self.ddr_a,
            2 => self.swchb(),
            3 => self.ddr_b,
            4 | 6 => self.timer.value(),
            _ => self.timer.peek_instat(),
        }
    }

    /// Write a register.
    pub fn write(&mut self, addr: u16, value: u8) {
        if addr & 0x14 == 0x14 {
            self.timer.write(DIVIDERS[(addr & 0x03) as usize], value);
            return;
        }
        if addr & 0x04 != 0 {
            log::debug!("RIOT edge-detect control write {addr:#06X} = {value:#04X} ignored");
            return;
        }
        match addr & 0x03 {
            0 => self.port_a = value,
            1 => self.ddr_a = value,
            2 => self.port_b = value,
            _ => self.ddr_b = value,
        }
    }

    fn swcha(&self) -> u8 {
        (self.external_a & !self.ddr_a) | (self.port_a & self.ddr_a)
    }

    fn swchb(&self) -> u8 {
        (self.external_b & !self.ddr_b) | (self.port_b & self.ddr_b)
    }

    /// Port A bits currently driven as outputs, with their direction mask.
    ///
    /// Keypad controllers scan rows through these lines.
    #[must_use]
    pub fn port_a_output(&self) -> (u8, u8) {
        (self.port_a, self.ddr_a)
    }

    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}

impl Default for Riot6532 {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Tickable for Riot6532 {
    /// One processor cycle.
    fn tick(&mut self) {
        self.timer.clock();
    }
}

impl Observable for Riot6532 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "timer.value" => Some(self.timer.value().into()),
            "timer.divider" => Some(self.timer.divider().into()),
            "timer.instat" => Some(self.timer.peek_instat().into()),
            "swcha" => Some(self.swcha().into()),
            "swacnt" => Some(self.ddr_a.into()),
            "swchb" => Some(self.swchb().into()),
            "swbcnt" => Some(self.ddr_b.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "timer.value",
            "timer.divider",
            "timer.instat",
            "swcha",
            "swacnt",
            "swchb",
            "swbcnt",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_port_reads_external_lines() {
        let mut riot = Riot6532::new(0);
        riot.external_a = 0b1010_0101;
        assert_eq!(riot.read(0x280), 0b1010_0101);
    }

    #[test]
    fn output_bits_read_back_written_value() {
        let mut riot = Riot6532::new(0);
        riot.external_a = 0xFF;
        riot.write(0x281, 0xF0);
        riot.write(0x280, 0x00);
        assert_eq!(riot.read(0x280), 0x0F);
        assert_eq!(riot.read(0x281), 0xF0);
    }

    #[test]
    fn port_b_direction_masks_switches() {
        let mut riot = Riot6532::new(0);
        riot.external_b = 0x0B;
        riot.write(0x283, 0x34);
        riot.write(0x282, 0x14);
        assert_eq!(riot.read(0x282), 0x1F);
    }

    #[test]
    fn timer_writes_select_divider_by_address() {
        let mut riot = Riot6532::new(0);
        riot.write(0x296, 0x10);
        assert_eq!(riot.timer().divider(), 64);
        assert_eq!(riot.read(0x284), 0x0F);
        riot.write(0x297, 0x10);
        assert_eq!(riot.timer().divider(), 1024);
    }

    #[test]
    fn edge_control_writes_do_not_touch_timer() {
        let mut riot = Riot6532::new(0x55);
        riot.write(0x284, 0x10);
        assert_eq!(riot.peek(0x284), 0x55);
        assert_eq!(riot.timer().divider(), 1024);
    }

    #[test]
    fn tick_advances_timer() {
        let mut riot = Riot6532::new(0);
        riot.write(0x294, 5);
        riot.tick();
        assert_eq!(riot.read(0x286), 3);
    }

    #[test]
    fn instat_mirrors() {
        let mut riot = Riot6532::new(0);
        riot.write(0x294, 0);
        assert_eq!(riot.read(0x285) & 0x80, 0x80);
        assert_eq!(riot.read(0x287) & 0x80, 0x80);
    }

    #[test]
    fn observable_paths() {
        let riot = Riot6532::new(0x42);
        assert_eq!(riot.query("timer.value"), Some(Value::U8(0x42)));
        assert_eq!(riot.query("timer.divider"), Some(Value::U16(1024)));
        assert_eq!(riot.query("nope"), None);
    }
}
