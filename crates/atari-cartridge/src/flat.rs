use serde::{Deserialize, Serialize};

use crate::{Board, MapperKind, rom_byte};

/// No bank switching. Images under 4K mirror through the window; larger
/// images show their last 4K until detection settles on a real scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flat;

impl Board for Flat {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let offset = usize::from(addr & 0x0FFF);
        let base = rom.len().saturating_sub(0x1000);
        rom_byte(rom, base + offset)
    }

    fn write(&mut self, _rom: &[u8], _addr: u16, _value: u8) {}

    fn kind(&self) -> MapperKind {
        MapperKind::Unknown
    }
}
