//! RIOT interval timer.
//!
//! An 8-bit down-counter clocked every `divider` processor cycles. Writing
//! TIM1T/TIM8T/TIM64T/T1024T loads the counter, selects the divider and
//! decrements once as part of the write. After the counter wraps past zero
//! it keeps decrementing once per cycle until INTIM is read.

use serde::{Deserialize, Serialize};

/// Dividers selected by the low two address bits of a timer write.
pub const DIVIDERS: [u16; 4] = [1, 8, 64, 1024];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// Counter value (INTIM).
    value: u8,
    /// Cycles per decrement.
    divider: u16,
    /// Cycles elapsed since the last decrement.
    elapsed: u16,
    /// Counter has wrapped and is free-running at one decrement per cycle.
    underflow: bool,
    /// INSTAT bit 6: wrapped since INSTAT was last read.
    flag_since_instat_read: bool,
    /// INSTAT bit 7: wrapped since the timer was last written.
    flag_since_write: bool,
}

impl Timer {
    /// Power-on state: the counter holds `value` with the /1024 divider.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self {
            value,
            divider: 1024,
            elapsed: 0,
            underflow: false,
            flag_since_instat_read: false,
            flag_since_write: false,
        }
    }

    /// Advance one processor cycle.
    pub fn clock(&mut self) {
        self.elapsed += 1;
        if self.elapsed >= self.divider || self.underflow {
            self.elapsed = 0;
            self.decrement();
        }
    }

    fn decrement(&mut self) {
        self.value = self.value.wrapping_sub(1);
        if self.value == 0xFF && !self.underflow {
            self.underflow = true;
            self.flag_since_instat_read = true;
            self.flag_since_write = true;
        }
    }

    /// Load the counter and select a divider.
    pub fn write(&mut self, divider: u16, value: u8) {
        self.value = value;
        self.divider = divider.max(1);
        self.elapsed = 0;
        self.underflow = false;
        self.flag_since_write = false;
        self.decrement();
    }

    /// Read INTIM. Leaves free-running mode if the counter had wrapped.
    pub fn read_intim(&mut self) -> u8 {
        if self.underflow {
            self.underflow = false;
            self.elapsed = 0;
        }
        self.value
    }

    /// Read INSTAT. Clears the since-INSTAT flag.
    pub fn read_instat(&mut self) -> u8 {
        let status = self.peek_instat();
        self.flag_since_instat_read = false;
        status
    }

    /// INSTAT without the read side effect.
    #[must_use]
    pub fn peek_instat(&self) -> u8 {
        (u8::from(self.flag_since_write) << 7) | (u8::from(self.flag_since_instat_read) << 6)
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.value
    }

    #[must_use]
    pub fn divider(&self) -> u16 {
        self.divider
    }

    #[must_use]
    pub fn is_free_running(&self) -> bool {
        self.underflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_decrements_immediately() {
        let mut t = Timer::new(0);
        t.write(64, 0x40);
        assert_eq!(t.read_intim(), 0x3F);
    }

    #[test]
    fn decrements_after_divider_cycles() {
        let mut t = Timer::new(0);
        t.write(8, 10);
        for _ in 0..7 {
            t.clock();
        }
        assert_eq!(t.value(), 9);
        t.clock();
        assert_eq!(t.value(), 8);
    }

    #[test]
    fn wrap_sets_both_flags_and_free_runs() {
        let mut t = Timer::new(0);
        t.write(1, 1);
        assert_eq!(t.value(), 0);
        t.clock();
        assert_eq!(t.value(), 0xFF);
        assert!(t.is_free_running());
        assert_eq!(t.peek_instat(), 0xC0);
        t.clock();
        assert_eq!(t.value(), 0xFE);
    }

    #[test]
    fn instat_read_clears_only_bit6() {
        let mut t = Timer::new(0);
        t.write(1, 1);
        t.clock();
        assert_eq!(t.read_instat(), 0xC0);
        assert_eq!(t.read_instat(), 0x80);
    }

    #[test]
    fn intim_read_stops_free_running() {
        let mut t = Timer::new(0);
        t.write(64, 0);
        assert_eq!(t.value(), 0xFF);
        assert!(t.is_free_running());
        t.read_intim();
        for _ in 0..63 {
            t.clock();
        }
        assert_eq!(t.value(), 0xFF);
        t.clock();
        assert_eq!(t.value(), 0xFE);
    }

    #[test]
    fn rewrite_clears_since_write_flag() {
        let mut t = Timer::new(0);
        t.write(1, 1);
        t.clock();
        t.write(1024, 0x20);
        assert_eq!(t.peek_instat(), 0x40);
    }
}
