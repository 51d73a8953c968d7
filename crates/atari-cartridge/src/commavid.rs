//! CommaVid (C0): 1K of RAM read at $1000-$13FF and written at
//! $1400-$17FF, with the last 2K of the image at $1800-$1FFF.

use serde::{Deserialize, Serialize};

use crate::{Board, MapperKind, rom_byte};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommaVid {
    ram: Vec<u8>,
}

impl Default for CommaVid {
    fn default() -> Self {
        Self::new()
    }
}

impl CommaVid {
    #[must_use]
    pub fn new() -> Self {
        Self { ram: vec![0; 1024] }
    }
}

impl Board for CommaVid {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        match addr {
            0x1000..=0x13FF => self.ram[usize::from(addr & 0x3FF)],
            0x1400..=0x17FF => 0,
            _ => rom_byte(rom, rom.len().saturating_sub(0x800) + usize::from(addr & 0x7FF)),
        }
    }

    fn write(&mut self, _rom: &[u8], addr: u16, value: u8) {
        let addr = addr & 0x1FFF;
        if (0x1400..=0x17FF).contains(&addr) {
            self.ram[usize::from(addr & 0x3FF)] = value;
        }
    }

    fn kind(&self) -> MapperKind {
        MapperKind::CommaVid
    }

    /// A 4K image carries the RAM's initial contents in its first 1K.
    fn initialize(&mut self, rom: &[u8]) {
        if rom.len() == 0x1000 {
            self.ram.copy_from_slice(&rom[..0x400]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_ports_and_rom() {
        let rom: Vec<u8> = (0..0x1000).map(|i| (i >> 4) as u8).collect();
        let mut board = CommaVid::new();
        board.initialize(&rom);
        assert_eq!(board.read(&rom, 0x1010), rom[0x10]);
        board.write(&rom, 0x1410, 0x99);
        assert_eq!(board.read(&rom, 0x1010), 0x99);
        assert_eq!(board.read(&rom, 0x1800), rom[0x800]);
        assert_eq!(board.read(&rom, 0x1FFF), rom[0xFFF]);
    }
}
