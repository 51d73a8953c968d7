//! CBS RAM Plus (FA): three 4K banks selected at $1FF8-$1FFA, and 256
//! bytes of RAM written at $1000-$10FF and read at $1100-$11FF.

use serde::{Deserialize, Serialize};

use crate::{Board, MapperKind, rom_byte};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CbsRamPlus {
    bank: u16,
    ram: Vec<u8>,
}

impl Default for CbsRamPlus {
    fn default() -> Self {
        Self::new()
    }
}

impl CbsRamPlus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bank: 2,
            ram: vec![0; 256],
        }
    }

    fn switch(&mut self, addr: u16) {
        if (0x1FF8..=0x1FFA).contains(&addr) {
            self.bank = addr - 0x1FF8;
        }
    }
}

impl Board for CbsRamPlus {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        let value = match addr {
            0x1100..=0x11FF => self.ram[usize::from(addr & 0xFF)],
            0x1000..=0x10FF => {
                self.ram[usize::from(addr & 0xFF)] = 0xFF;
                0
            }
            _ => rom_byte(rom, usize::from(self.bank) * 0x1000 + usize::from(addr & 0x0FFF)),
        };
        self.switch(addr);
        value
    }

    fn write(&mut self, _rom: &[u8], addr: u16, value: u8) {
        let addr = addr & 0x1FFF;
        if (0x1000..=0x10FF).contains(&addr) {
            self.ram[usize::from(addr & 0xFF)] = value;
        } else {
            self.switch(addr);
        }
    }

    fn kind(&self) -> MapperKind {
        MapperKind::Fa
    }

    fn current_bank(&self) -> u16 {
        self.bank
    }

    fn bank_count(&self, _rom: &[u8]) -> u16 {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_and_banks() {
        let rom: Vec<u8> = (0..0x3000).map(|i| (i / 0x1000) as u8 + 0x10).collect();
        let mut board = CbsRamPlus::new();
        assert_eq!(board.read(&rom, 0x1800), 0x12);
        board.write(&rom, 0x1010, 0x77);
        assert_eq!(board.read(&rom, 0x1110), 0x77);
        board.read(&rom, 0x1FF9);
        assert_eq!(board.current_bank(), 1);
        assert_eq!(board.read(&rom, 0x1800), 0x11);
    }
}
