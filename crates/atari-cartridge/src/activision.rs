//! Activision (FE): two 4K banks, chosen by A13 of the code being run.
//! Subroutine calls and returns move execution between $Dxxx (A13 clear)
//! and $Fxxx (A13 set), so the bank follows the last cartridge read,
//! including the stack and vector fetches the bus sees as plain reads.

use serde::{Deserialize, Serialize};

use crate::{Board, BusActivity, MapperKind, rom_byte};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activision {
    bank: u16,
}

impl Activision {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bank_for(addr: u16) -> u16 {
        if addr & 0x2000 != 0 { 0 } else { 1 }
    }
}

impl Board for Activision {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        self.bank = Self::bank_for(addr);
        rom_byte(rom, usize::from(self.bank) * 0x1000 + usize::from(addr & 0x0FFF))
    }

    fn write(&mut self, _rom: &[u8], _addr: u16, _value: u8) {}

    fn kind(&self) -> MapperKind {
        MapperKind::Fe
    }

    fn current_bank(&self) -> u16 {
        self.bank
    }

    fn bank_count(&self, _rom: &[u8]) -> u16 {
        2
    }

    fn tick(&mut self, activity: &BusActivity) {
        let addr = activity.last_read_address;
        if addr & 0x1000 != 0 {
            self.bank = Self::bank_for(addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a13_picks_bank() {
        let rom: Vec<u8> = (0..0x2000).map(|i| (i / 0x1000) as u8).collect();
        let mut board = Activision::new();
        assert_eq!(board.read(&rom, 0xF000), 0);
        assert_eq!(board.read(&rom, 0xD000), 1);
        assert_eq!(board.current_bank(), 1);
    }

    #[test]
    fn tick_follows_last_read() {
        let mut board = Activision::new();
        board.tick(&BusActivity {
            last_read_address: 0xD123,
            ..BusActivity::default()
        });
        assert_eq!(board.current_bank(), 1);
        // Reads outside cartridge space don't move it.
        board.tick(&BusActivity {
            last_read_address: 0x01FF,
            ..BusActivity::default()
        });
        assert_eq!(board.current_bank(), 1);
        board.tick(&BusActivity {
            last_read_address: 0xF000,
            ..BusActivity::default()
        });
        assert_eq!(board.current_bank(), 0);
    }
}
