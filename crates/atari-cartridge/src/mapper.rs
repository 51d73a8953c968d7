use serde::{Deserialize, Serialize};

use crate::{
    Activision, BusActivity, CartridgeError, CbsRamPlus, CommaVid, Dpc, Flat, MNetwork, MapperKind, Megaboy,
    ParkerBros, Standard, Supercharger, Tigervision,
};

/// One bank-switching circuit.
///
/// Addresses are passed unmasked; each board decodes what it needs.
/// `write` sees every bus write, including those outside cartridge space.
pub trait Board {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8;
    fn write(&mut self, rom: &[u8], addr: u16, value: u8);
    fn kind(&self) -> MapperKind;

    /// Bank currently visible, for boards with a single selector.
    fn current_bank(&self) -> u16 {
        0
    }

    /// Number of values `current_bank` can take.
    fn bank_count(&self, _rom: &[u8]) -> u16 {
        1
    }

    /// Once per processor cycle. Default: nothing.
    fn tick(&mut self, _activity: &BusActivity) {}

    /// Once at power-on, after the image is attached.
    fn initialize(&mut self, _rom: &[u8]) {}
}

/// The active board, as a closed set so state can be saved by tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Mapper {
    Flat(Flat),
    Standard(Standard),
    CbsRamPlus(CbsRamPlus),
    Megaboy(Megaboy),
    ParkerBros(ParkerBros),
    Tigervision(Tigervision),
    Activision(Activision),
    MNetwork(MNetwork),
    Dpc(Dpc),
    Supercharger(Supercharger),
    CommaVid(CommaVid),
}

macro_rules! with_board {
    ($mapper:expr, $board:ident => $body:expr) => {
        match $mapper {
            Mapper::Flat($board) => $body,
            Mapper::Standard($board) => $body,
            Mapper::CbsRamPlus($board) => $body,
            Mapper::Megaboy($board) => $body,
            Mapper::ParkerBros($board) => $body,
            Mapper::Tigervision($board) => $body,
            Mapper::Activision($board) => $body,
            Mapper::MNetwork($board) => $body,
            Mapper::Dpc($board) => $body,
            Mapper::Supercharger($board) => $body,
            Mapper::CommaVid($board) => $body,
        }
    };
}

impl Mapper {
    /// Power-on state of `kind` for `rom`.
    #[must_use]
    pub fn new(kind: MapperKind, rom: &[u8]) -> Self {
        match kind {
            MapperKind::Unknown => Self::Flat(Flat),
            MapperKind::F8 | MapperKind::F6 | MapperKind::F4 => Self::Standard(Standard::new(kind)),
            MapperKind::Fa => Self::CbsRamPlus(CbsRamPlus::new()),
            MapperKind::F0 => Self::Megaboy(Megaboy::new()),
            MapperKind::E0 => Self::ParkerBros(ParkerBros::new()),
            MapperKind::Tigervision => Self::Tigervision(Tigervision::new(rom)),
            MapperKind::Fe => Self::Activision(Activision::new()),
            MapperKind::E7 => Self::MNetwork(MNetwork::new()),
            MapperKind::Dpc => Self::Dpc(Dpc::new()),
            MapperKind::Supercharger => Self::Supercharger(Supercharger::new()),
            MapperKind::CommaVid => Self::CommaVid(CommaVid::new()),
        }
    }

    /// Rebuild from a tag and the state `save_state` produced.
    pub fn restore(tag: u16, state: serde_json::Value) -> Result<Self, CartridgeError> {
        let kind = MapperKind::from_tag(tag).ok_or(CartridgeError::UnknownMapperTag(tag))?;
        let mapper = match kind {
            MapperKind::Unknown => Self::Flat(serde_json::from_value(state)?),
            MapperKind::F8 | MapperKind::F6 | MapperKind::F4 => Self::Standard(serde_json::from_value(state)?),
            MapperKind::Fa => Self::CbsRamPlus(serde_json::from_value(state)?),
            MapperKind::F0 => Self::Megaboy(serde_json::from_value(state)?),
            MapperKind::E0 => Self::ParkerBros(serde_json::from_value(state)?),
            MapperKind::Tigervision => Self::Tigervision(serde_json::from_value(state)?),
            MapperKind::Fe => Self::Activision(serde_json::from_value(state)?),
            MapperKind::E7 => Self::MNetwork(serde_json::from_value(state)?),
            MapperKind::Dpc => Self::Dpc(serde_json::from_value(state)?),
            MapperKind::Supercharger => Self::Supercharger(serde_json::from_value(state)?),
            MapperKind::CommaVid => Self::CommaVid(serde_json::from_value(state)?),
        };
        if mapper.kind() != kind {
            return Err(CartridgeError::UnknownMapperTag(tag));
        }
        Ok(mapper)
    }

    /// Tag plus private state.
    pub fn save_state(&self) -> Result<(u16, serde_json::Value), CartridgeError> {
        let state = with_board!(self, board => serde_json::to_value(board)?);
        Ok((self.kind().tag(), state))
    }

    pub fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        with_board!(self, board => board.read(rom, addr))
    }

    pub fn write(&mut self, rom: &[u8], addr: u16, value: u8) {
        with_board!(self, board => board.write(rom, addr, value));
    }

    #[must_use]
    pub fn kind(&self) -> MapperKind {
        with_board!(self, board => board.kind())
    }

    #[must_use]
    pub fn current_bank(&self) -> u16 {
        with_board!(self, board => board.current_bank())
    }

    #[must_use]
    pub fn bank_count(&self, rom: &[u8]) -> u16 {
        with_board!(self, board => board.bank_count(rom))
    }

    pub fn tick(&mut self, activity: &BusActivity) {
        with_board!(self, board => board.tick(activity));
    }

    pub fn initialize(&mut self, rom: &[u8]) {
        with_board!(self, board => board.initialize(rom));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_for(kind: MapperKind) -> Vec<u8> {
        let size = match kind {
            MapperKind::Unknown | MapperKind::CommaVid => 4096,
            MapperKind::F8 | MapperKind::E0 | MapperKind::Fe => 8192,
            MapperKind::F6 | MapperKind::E7 => 16 * 1024,
            MapperKind::F4 | MapperKind::Tigervision => 32 * 1024,
            MapperKind::Fa => 12 * 1024,
            MapperKind::F0 => 64 * 1024,
            MapperKind::Dpc => 10_240,
            MapperKind::Supercharger => 8448,
        };
        (0..size).map(|i| (i * 7) as u8).collect()
    }

    #[test]
    fn bank_stays_in_range_under_any_access() {
        for kind in MapperKind::ALL {
            let rom = image_for(kind);
            let mut mapper = Mapper::new(kind, &rom);
            mapper.initialize(&rom);
            let count = mapper.bank_count(&rom);
            let mut activity = BusActivity::default();
            for addr in (0x0000..0x2000u16).chain(0xF000..=0xFFFF) {
                let value = mapper.read(&rom, addr);
                mapper.write(&rom, addr, value.wrapping_add(addr as u8));
                activity.last_address = addr;
                activity.last_read_address = addr;
                activity.cycle += 1;
                mapper.tick(&activity);
                assert!(
                    mapper.current_bank() < count,
                    "{kind}: bank {} of {count} after {addr:#06X}",
                    mapper.current_bank()
                );
            }
        }
    }

    #[test]
    fn every_kind_survives_save_and_restore() {
        for kind in MapperKind::ALL {
            let rom = image_for(kind);
            let mapper = Mapper::new(kind, &rom);
            let (tag, state) = mapper.save_state().expect("save");
            let restored = Mapper::restore(tag, state).expect("restore");
            assert_eq!(restored.kind(), kind);
        }
    }

    #[test]
    fn restore_rejects_mismatched_state() {
        let rom = image_for(MapperKind::F8);
        let (_, state) = Mapper::new(MapperKind::F8, &rom).save_state().expect("save");
        assert!(Mapper::restore(0xE0, state).is_err());
    }
}
