//! Parker Bros (E0): the window is four 1K slices. Slices 0-2 each show
//! any of the eight 1K banks; slice 3 always shows bank 7.
//!
//! $1FE0-$1FE7 select slice 0, $1FE8-$1FEF slice 1, $1FF0-$1FF7 slice 2,
//! the low three address bits giving the bank.

use serde::{Deserialize, Serialize};

use crate::{Board, MapperKind, rom_byte};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkerBros {
    slices: [u16; 3],
}

impl Default for ParkerBros {
    fn default() -> Self {
        Self::new()
    }
}

impl ParkerBros {
    #[must_use]
    pub fn new() -> Self {
        Self { slices: [4, 5, 6] }
    }

    #[must_use]
    pub fn slices(&self) -> [u16; 3] {
        self.slices
    }

    fn switch(&mut self, addr: u16) {
        if (0x1FE0..=0x1FF7).contains(&addr) {
            let offset = addr - 0x1FE0;
            self.slices[usize::from(offset >> 3)] = offset & 7;
        }
    }
}

impl Board for ParkerBros {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        let slice = usize::from((addr & 0x0FFF) >> 10);
        let bank = self.slices.get(slice).copied().unwrap_or(7);
        let value = rom_byte(rom, usize::from(bank) * 0x400 + usize::from(addr & 0x3FF));
        self.switch(addr);
        value
    }

    fn write(&mut self, _rom: &[u8], addr: u16, _value: u8) {
        self.switch(addr & 0x1FFF);
    }

    fn kind(&self) -> MapperKind {
        MapperKind::E0
    }

    /// Bank in slice 0.
    fn current_bank(&self) -> u16 {
        self.slices[0]
    }

    fn bank_count(&self, _rom: &[u8]) -> u16 {
        8
    }
}
