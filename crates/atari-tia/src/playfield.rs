//! 20-bit playfield with double-buffered latch.
//!
//! Bits 19-0 hold the left half of the line left-to-right, four colour
//! clocks per bit. PF0 supplies bits 19-16 (from its high nibble, LSB
//! first), PF1 bits 15-8 (MSB first), PF2 bits 7-0 (LSB first).
//!
//! Register writes land in `to_load`; the pattern the beam sees only
//! changes on the latch phase, once every four colour clocks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playfield {
    active: u32,
    to_load: u32,
    /// CTRLPF bit 0: mirror the right half instead of repeating it.
    pub reflect: bool,
}

impl Playfield {
    pub fn write_pf0(&mut self, value: u8) {
        self.to_load = (self.to_load & !0x0F_0000) | (u32::from(value.reverse_bits() & 0x0F) << 16);
    }

    pub fn write_pf1(&mut self, value: u8) {
        self.to_load = (self.to_load & !0x00_FF00) | (u32::from(value) << 8);
    }

    pub fn write_pf2(&mut self, value: u8) {
        self.to_load = (self.to_load & !0x00_00FF) | u32::from(value.reverse_bits());
    }

    /// Copy the pending pattern into the one being drawn.
    pub fn latch(&mut self) {
        self.active = self.to_load;
    }

    #[must_use]
    pub fn active(&self) -> u32 {
        self.active
    }

    #[must_use]
    pub fn pending(&self) -> u32 {
        self.to_load
    }

    /// Whether the playfield draws at visible column `beam`.
    #[must_use]
    pub fn pixel(&self, beam: i16) -> bool {
        let mut column = beam >> 2;
        if !(0..40).contains(&column) {
            return false;
        }
        if column >= 20 {
            column -= 20;
            if self.reflect {
                column = 19 - column;
            }
        }
        self.active & (1 << (19 - column)) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latched(pf0: u8, pf1: u8, pf2: u8) -> Playfield {
        let mut pf = Playfield::default();
        pf.write_pf0(pf0);
        pf.write_pf1(pf1);
        pf.write_pf2(pf2);
        pf.latch();
        pf
    }

    #[test]
    fn writes_do_not_show_until_latched() {
        let mut pf = Playfield::default();
        pf.write_pf1(0xFF);
        assert!(!pf.pixel(16));
        pf.latch();
        assert!(pf.pixel(16));
    }

    #[test]
    fn pf0_high_nibble_lsb_first() {
        let pf = latched(0x10, 0, 0);
        assert!(pf.pixel(0));
        assert!(pf.pixel(3));
        assert!(!pf.pixel(4));
    }

    #[test]
    fn pf1_msb_first() {
        let pf = latched(0, 0x80, 0);
        assert!(pf.pixel(16));
        assert!(!pf.pixel(20));
    }

    #[test]
    fn pf2_lsb_first() {
        let pf = latched(0, 0, 0x01);
        assert!(pf.pixel(48));
        assert!(!pf.pixel(52));
        let pf = latched(0, 0, 0x80);
        assert!(pf.pixel(76));
    }

    #[test]
    fn right_half_repeats_or_mirrors() {
        let mut pf = latched(0x10, 0, 0);
        assert!(pf.pixel(80));
        assert!(!pf.pixel(156));
        pf.reflect = true;
        assert!(!pf.pixel(80));
        assert!(pf.pixel(156));
    }

    #[test]
    fn blanking_columns_never_draw() {
        let pf = latched(0xF0, 0xFF, 0xFF);
        assert!(!pf.pixel(-4));
        assert!(!pf.pixel(160));
    }
}
