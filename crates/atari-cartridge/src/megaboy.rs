//! Megaboy (F0): sixteen 4K banks. Each access to $1FF0 advances to the
//! next bank; $1FEC reads back the current bank number.

use serde::{Deserialize, Serialize};

use crate::{Board, MapperKind, rom_byte};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Megaboy {
    bank: u16,
}

impl Default for Megaboy {
    fn default() -> Self {
        Self::new()
    }
}

impl Megaboy {
    #[must_use]
    pub fn new() -> Self {
        Self { bank: 15 }
    }
}

impl Board for Megaboy {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        let value = if addr == 0x1FEC {
            self.bank as u8
        } else {
            rom_byte(rom, usize::from(self.bank) * 0x1000 + usize::from(addr & 0x0FFF))
        };
        if addr == 0x1FF0 {
            self.bank = (self.bank + 1) & 0x0F;
        }
        value
    }

    fn write(&mut self, _rom: &[u8], addr: u16, _value: u8) {
        if addr & 0x1FFF == 0x1FF0 {
            self.bank = (self.bank + 1) & 0x0F;
        }
    }

    fn kind(&self) -> MapperKind {
        MapperKind::F0
    }

    fn current_bank(&self) -> u16 {
        self.bank
    }

    fn bank_count(&self, _rom: &[u8]) -> u16 {
        16
    }
}
