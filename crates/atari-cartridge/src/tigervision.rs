//! Tigervision (3F): the lower 2K of the window shows the 2K bank whose
//! number was last written to any address $00-$3F; the upper 2K is fixed
//! to the last 2K of the image. Such writes also reach the TIA, so games
//! use the mirrors above $40 for their TIA registers.

use serde::{Deserialize, Serialize};

use crate::{Board, MapperKind, rom_byte};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tigervision {
    bank: u16,
}

fn banks(rom: &[u8]) -> u16 {
    (rom.len() / 0x800).max(1) as u16
}

impl Tigervision {
    /// Starts with the second-last bank so the window matches the last
    /// 4K, as a flat cartridge would show it.
    #[must_use]
    pub fn new(rom: &[u8]) -> Self {
        Self {
            bank: banks(rom).saturating_sub(2),
        }
    }
}

impl Board for Tigervision {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let offset = usize::from(addr & 0x07FF);
        if addr & 0x0800 == 0 {
            rom_byte(rom, usize::from(self.bank) * 0x800 + offset)
        } else {
            rom_byte(rom, rom.len().saturating_sub(0x800) + offset)
        }
    }

    fn write(&mut self, rom: &[u8], addr: u16, value: u8) {
        if addr & 0x1FFF <= 0x003F {
            self.bank = u16::from(value) % banks(rom);
        }
    }

    fn kind(&self) -> MapperKind {
        MapperKind::Tigervision
    }

    fn current_bank(&self) -> u16 {
        self.bank
    }

    fn bank_count(&self, rom: &[u8]) -> u16 {
        banks(rom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_writes_select_bank() {
        let rom: Vec<u8> = (0..0x2000).map(|i| (i / 0x800) as u8).collect();
        let mut board = Tigervision::new(&rom);
        assert_eq!(board.read(&rom, 0x1000), 2);
        assert_eq!(board.read(&rom, 0x1800), 3);
        board.write(&rom, 0x003F, 1);
        assert_eq!(board.read(&rom, 0x1000), 1);
        assert_eq!(board.read(&rom, 0x1FFF), 3);
        // Out-of-range numbers wrap to a real bank.
        board.write(&rom, 0x0010, 6);
        assert_eq!(board.current_bank(), 2);
        // TIA mirrors above $3F leave the bank alone.
        board.write(&rom, 0x0042, 0);
        assert_eq!(board.current_bank(), 2);
    }
}
