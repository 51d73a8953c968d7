//! Atari's own schemes: F8 (8K), F6 (16K) and F4 (32K).
//!
//! Touching any address in the control window (read or write) selects the
//! bank at that offset. Some carts add a Superchip: 128 bytes of RAM with
//! separate write ($1000-$107F) and read ($1080-$10FF) ports.

use serde::{Deserialize, Serialize};

use crate::{Board, MapperKind, rom_byte};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Superchip {
    ram: Vec<u8>,
    /// Switched on by the first write to the write port.
    active: bool,
}

impl Default for Superchip {
    fn default() -> Self {
        Self {
            ram: vec![0; 128],
            active: false,
        }
    }
}

impl Superchip {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `addr` is already masked to 13 bits and inside $1000-$10FF.
    fn read(&mut self, addr: u16) -> u8 {
        let index = usize::from(addr & 0x7F);
        if addr >= 0x1080 {
            self.ram[index]
        } else {
            // A read from the write port drives junk into the RAM.
            self.ram[index] = 0xFF;
            0
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if !self.active {
            log::info!("Superchip RAM activated");
            self.active = true;
        }
        self.ram[usize::from(addr & 0x7F)] = value;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standard {
    kind: MapperKind,
    bank: u16,
    superchip: Superchip,
}

impl Standard {
    /// Powers up in the last bank.
    #[must_use]
    pub fn new(kind: MapperKind) -> Self {
        let mut board = Self {
            kind,
            bank: 0,
            superchip: Superchip::default(),
        };
        board.bank = board.banks() - 1;
        board
    }

    fn control_base(&self) -> u16 {
        match self.kind {
            MapperKind::F6 => 0x1FF6,
            MapperKind::F4 => 0x1FF4,
            _ => 0x1FF8,
        }
    }

    fn banks(&self) -> u16 {
        match self.kind {
            MapperKind::F6 => 4,
            MapperKind::F4 => 8,
            _ => 2,
        }
    }

    fn switch(&mut self, addr: u16) {
        let base = self.control_base();
        if (base..base + self.banks()).contains(&addr) {
            self.bank = addr - base;
        }
    }

    #[must_use]
    pub fn superchip(&self) -> &Superchip {
        &self.superchip
    }
}

impl Board for Standard {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        let value = if self.superchip.active && (0x1000..=0x10FF).contains(&addr) {
            self.superchip.read(addr)
        } else {
            rom_byte(rom, usize::from(self.bank) * 0x1000 + usize::from(addr & 0x0FFF))
        };
        self.switch(addr);
        value
    }

    fn write(&mut self, _rom: &[u8], addr: u16, value: u8) {
        let addr = addr & 0x1FFF;
        if (0x1000..=0x107F).contains(&addr) {
            self.superchip.write(addr, value);
        } else {
            self.switch(addr);
        }
    }

    fn kind(&self) -> MapperKind {
        self.kind
    }

    fn current_bank(&self) -> u16 {
        self.bank
    }

    fn bank_count(&self, _rom: &[u8]) -> u16 {
        self.banks()
    }
}
