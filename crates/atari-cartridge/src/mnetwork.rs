//! M-Network (E7): 16K of ROM in eight 2K banks plus 2K of RAM.
//!
//! | Window      | Contents                                             |
//! |-------------|------------------------------------------------------|
//! | $1000-$17FF | ROM bank 0-6, or with bank 7 selected: 1K RAM,       |
//! |             | written at $1000-$13FF, read at $1400-$17FF          |
//! | $1800-$19FF | 256-byte RAM bank 0-3, written at $1800-$18FF,       |
//! |             | read at $1900-$19FF                                  |
//! | $1A00-$1FFF | last 1.5K of ROM                                     |
//!
//! $1FE0-$1FE6 select ROM banks, $1FE7 the 1K RAM, $1FE8-$1FEB the
//! 256-byte RAM bank.

use serde::{Deserialize, Serialize};

use crate::{Board, MapperKind, rom_byte};

/// Bank number meaning "1K RAM in the lower window".
const RAM_BANK: u16 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MNetwork {
    bank: u16,
    ram_bank: u16,
    ram: Vec<u8>,
}

impl Default for MNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl MNetwork {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bank: 0,
            ram_bank: 0,
            ram: vec![0; 2048],
        }
    }

    #[must_use]
    pub fn ram_bank(&self) -> u16 {
        self.ram_bank
    }

    fn switch(&mut self, addr: u16) {
        match addr {
            0x1FE0..=0x1FE6 => self.bank = addr - 0x1FE0,
            0x1FE7 => self.bank = RAM_BANK,
            0x1FE8..=0x1FEB => self.ram_bank = addr - 0x1FE8,
            _ => {}
        }
    }

    fn small_ram_index(&self, addr: u16) -> usize {
        0x400 + usize::from(self.ram_bank) * 0x100 + usize::from(addr & 0xFF)
    }
}

impl Board for MNetwork {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        match addr {
            0x1000..=0x17FF if self.bank == RAM_BANK => {
                if addr >= 0x1400 {
                    self.ram[usize::from(addr & 0x3FF)]
                } else {
                    0
                }
            }
            0x1000..=0x17FF => rom_byte(rom, usize::from(self.bank) * 0x800 + usize::from(addr & 0x7FF)),
            0x1800..=0x18FF => 0,
            0x1900..=0x19FF => self.ram[self.small_ram_index(addr)],
            _ => {
                let value = rom_byte(rom, rom.len().saturating_sub(0x600) + usize::from(addr - 0x1A00));
                self.switch(addr);
                value
            }
        }
    }

    fn write(&mut self, _rom: &[u8], addr: u16, value: u8) {
        let addr = addr & 0x1FFF;
        match addr {
            0x1000..=0x13FF if self.bank == RAM_BANK => self.ram[usize::from(addr & 0x3FF)] = value,
            0x1800..=0x18FF => {
                let index = self.small_ram_index(addr);
                self.ram[index] = value;
            }
            _ => self.switch(addr),
        }
    }

    fn kind(&self) -> MapperKind {
        MapperKind::E7
    }

    fn current_bank(&self) -> u16 {
        self.bank
    }

    /// Seven ROM banks and the RAM bank, numbered up to 8.
    fn bank_count(&self, _rom: &[u8]) -> u16 {
        RAM_BANK + 1
    }
}
