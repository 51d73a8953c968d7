//! Atari 2600 cartridges.
//!
//! The console exposes only 4K of cartridge space ($1000-$1FFF, A12 set).
//! Larger games bolt a bank-switching circuit onto the ROM; the circuit
//! watches the address bus and swaps which part of the image is visible.
//! Nothing in the image says which circuit a game used, so the scheme is
//! inferred from a hash of the image, its size, and the first accesses the
//! program makes to a recognisable control address.
//!
//! | Tag  | Scheme              | Image sizes     |
//! |------|---------------------|-----------------|
//! | $00  | none (flat)         | 2K, 4K          |
//! | $F8  | Atari F8            | 8K              |
//! | $F6  | Atari F6            | 16K             |
//! | $F4  | Atari F4            | 32K             |
//! | $FA  | CBS RAM Plus        | 12K             |
//! | $F0  | Megaboy             | 64K             |
//! | $E0  | Parker Bros         | 8K              |
//! | $3F  | Tigervision         | 8K-64K          |
//! | $FE  | Activision          | 8K              |
//! | $E7  | M-Network           | 16K             |
//! | $DC  | DPC (Pitfall II)    | 10K             |
//! | $66  | Starpath Supercharger | 8K + 256      |
//! | $C0  | CommaVid            | 2K, 4K          |

#![allow(clippy::cast_possible_truncation)]

mod activision;
mod cbs;
mod commavid;
pub mod detect;
mod dpc;
mod flat;
mod kind;
mod mapper;
mod megaboy;
mod mnetwork;
mod parker;
mod standard;
mod supercharger;
mod tigervision;

use std::sync::Arc;

pub use activision::Activision;
pub use cbs::CbsRamPlus;
pub use commavid::CommaVid;
pub use dpc::Dpc;
pub use flat::Flat;
pub use kind::MapperKind;
pub use mapper::{Board, Mapper};
pub use megaboy::Megaboy;
pub use mnetwork::MNetwork;
pub use parker::ParkerBros;
pub use standard::{Standard, Superchip};
pub use supercharger::Supercharger;
pub use tigervision::Tigervision;

/// Failures while identifying or restoring a cartridge.
#[derive(Debug, thiserror::Error)]
pub enum CartridgeError {
    #[error("cartridge image is empty")]
    EmptyImage,
    #[error("no bank-switching scheme fits a {size}-byte image")]
    UnknownSize { size: usize },
    #[error("unknown mapper tag {0:#04x}")]
    UnknownMapperTag(u16),
    #[error("mapper state: {0}")]
    State(#[from] serde_json::Error),
}

/// What the bus did on the cycle a mapper is being ticked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusActivity {
    /// Address of the most recent read or write.
    pub last_address: u16,
    /// Address of the most recent read.
    pub last_read_address: u16,
    /// Processor cycles since power-on.
    pub cycle: u64,
}

/// Byte `index` of the image, wrapping for images smaller than the window.
pub(crate) fn rom_byte(rom: &[u8], index: usize) -> u8 {
    if rom.is_empty() {
        0
    } else {
        rom[index % rom.len()]
    }
}

/// A cartridge image plus the circuit that maps it into $1000-$1FFF.
#[derive(Debug, Clone)]
pub struct Cartridge {
    rom: Arc<[u8]>,
    mapper: Mapper,
    /// Detection may still replace the flat mapping.
    undetermined: bool,
}

impl Default for Cartridge {
    fn default() -> Self {
        Self {
            rom: Arc::from(Vec::new()),
            mapper: Mapper::Flat(Flat),
            undetermined: false,
        }
    }
}

impl Cartridge {
    /// Identify the mapper from the image hash and size. Images that need
    /// an access pattern to decide start flat and undetermined.
    pub fn new(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        if rom.is_empty() {
            return Err(CartridgeError::EmptyImage);
        }
        let rom: Arc<[u8]> = Arc::from(rom);
        let known = detect::from_hash(&rom).or_else(|| detect::from_size(rom.len()));
        let mut cart = match known {
            Some(kind) => {
                log::info!("Mapper: {kind} ({} bytes)", rom.len());
                Self {
                    mapper: Mapper::new(kind, &rom),
                    rom,
                    undetermined: false,
                }
            }
            None => Self {
                mapper: Mapper::Flat(Flat),
                rom,
                undetermined: true,
            },
        };
        cart.mapper.initialize(&cart.rom);
        Ok(cart)
    }

    /// Use `kind` regardless of what detection would pick.
    pub fn with_mapper(rom: Vec<u8>, kind: MapperKind) -> Result<Self, CartridgeError> {
        if rom.is_empty() {
            return Err(CartridgeError::EmptyImage);
        }
        let rom: Arc<[u8]> = Arc::from(rom);
        let mut mapper = Mapper::new(kind, &rom);
        mapper.initialize(&rom);
        log::info!("Mapper: {kind} (forced)");
        Ok(Self {
            rom,
            mapper,
            undetermined: false,
        })
    }

    /// Rebuild a cartridge around `rom` from saved mapper state.
    /// `undetermined` is the saved [`Cartridge::is_undetermined`]; a forced
    /// flat mapper stays settled.
    pub fn restore(
        rom: Arc<[u8]>,
        tag: u16,
        state: serde_json::Value,
        undetermined: bool,
    ) -> Result<Self, CartridgeError> {
        let mapper = Mapper::restore(tag, state)?;
        Ok(Self {
            rom,
            mapper,
            undetermined,
        })
    }

    /// Mapper tag and private state for a snapshot.
    pub fn save_state(&self) -> Result<(u16, serde_json::Value), CartridgeError> {
        self.mapper.save_state()
    }

    /// Settle an undetermined mapper using this access as a hint. Does
    /// nothing once a mapper is chosen.
    ///
    /// `last_write` is the address of the previous write, used to tell a
    /// Tigervision bank switch from a register-clearing loop.
    pub fn resolve(&mut self, addr: u16, is_write: bool, last_write: u16) -> Result<(), CartridgeError> {
        if !self.undetermined {
            return Ok(());
        }
        if let Some(kind) = detect::from_access(self.rom.len(), addr, is_write, last_write)? {
            log::info!("Mapper: {kind} (detected on access to {addr:#06X})");
            self.mapper = Mapper::new(kind, &self.rom);
            self.mapper.initialize(&self.rom);
            self.undetermined = false;
        }
        Ok(())
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        self.mapper.read(&self.rom, addr)
    }

    /// Offered every bus write, not only those in cartridge space.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.mapper.write(&self.rom, addr, value);
    }

    pub fn tick(&mut self, activity: &BusActivity) {
        self.mapper.tick(activity);
    }

    #[must_use]
    pub fn kind(&self) -> MapperKind {
        self.mapper.kind()
    }

    #[must_use]
    pub fn current_bank(&self) -> u16 {
        self.mapper.current_bank()
    }

    #[must_use]
    pub fn bank_count(&self) -> u16 {
        self.mapper.bank_count(&self.rom)
    }

    #[must_use]
    pub fn is_undetermined(&self) -> bool {
        self.undetermined
    }

    #[must_use]
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// The image, shared with snapshots restored from this cartridge.
    #[must_use]
    pub fn rom(&self) -> &Arc<[u8]> {
        &self.rom
    }
}
