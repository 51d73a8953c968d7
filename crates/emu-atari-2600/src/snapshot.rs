//! Save states.
//!
//! A snapshot is gzip-compressed JSON:
//!
//! ```text
//! { "version": 3,
//!   "info": "atari2600 snapshot",
//!   "state": { "cpu": ..., "bus": ... },
//!   "mapper": { "number": <tag>, "data": ..., "undetermined": <bool> } }
//! ```
//!
//! The cartridge image is not stored. Loading builds a new machine that
//! shares the image of the machine doing the load; the loading machine is
//! never modified.

use std::io::Read;

use atari_cartridge::{Cartridge, MapperKind};
use emu_core::Cpu;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Atari2600;
use crate::bus::Atari2600Bus;
use crate::error::Error;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 3;
pub const SNAPSHOT_INFO: &str = "atari2600 snapshot";

/// Upgrades a decoded snapshot document by one version.
type Migration = fn(&mut Value) -> Result<(), String>;

/// Migrations keyed by the version they upgrade from.
const MIGRATIONS: &[(u32, Migration)] = &[(1, rename_timer_interval), (2, record_detection_pending)];

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    info: String,
    state: Value,
    mapper: MapperRecord,
}

#[derive(Serialize, Deserialize)]
struct MapperRecord {
    number: u16,
    data: Value,
    /// Detection still waiting for an access hint.
    undetermined: bool,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Serialize)]
struct StateRef<'a, C> {
    cpu: &'a C,
    bus: &'a Atari2600Bus,
}

#[derive(Deserialize)]
struct State<C> {
    cpu: C,
    bus: Atari2600Bus,
}

impl<C: Cpu + Serialize> Atari2600<C> {
    /// Encode the complete machine state.
    ///
    /// # Errors
    ///
    /// Fails only if the processor core's state cannot be encoded.
    pub fn save_snapshot(&self) -> Result<Vec<u8>, Error> {
        let cartridge = self.bus.cartridge();
        let (number, data) = cartridge.save_state()?;
        let snapshot = Snapshot {
            version: CURRENT_SNAPSHOT_VERSION,
            info: SNAPSHOT_INFO.to_string(),
            state: serde_json::to_value(StateRef {
                cpu: &self.cpu,
                bus: &self.bus,
            })?,
            mapper: MapperRecord {
                number,
                data,
                undetermined: cartridge.is_undetermined(),
            },
        };

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        serde_json::to_writer(&mut encoder, &snapshot)?;
        Ok(encoder.finish()?)
    }
}

impl<C: Cpu + DeserializeOwned> Atari2600<C> {
    /// Build an independent machine from a snapshot, upgrading older
    /// versions first.
    ///
    /// # Errors
    ///
    /// Fails on a corrupt container, a version newer than
    /// [`CURRENT_SNAPSHOT_VERSION`], a version with no migration path, or
    /// an unknown mapper tag.
    pub fn load_snapshot(&self, bytes: &[u8]) -> Result<Self, Error> {
        let mut json = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut json)?;
        let mut document: Value = serde_json::from_slice(&json)?;

        let found = Header::deserialize(&document)?.version;
        if found > CURRENT_SNAPSHOT_VERSION {
            return Err(Error::FutureSnapshotVersion {
                found,
                supported: CURRENT_SNAPSHOT_VERSION,
            });
        }
        migrate(&mut document, found)?;

        let snapshot: Snapshot = serde_json::from_value(document)?;
        let State { cpu, mut bus } = serde_json::from_value::<State<C>>(snapshot.state)?;
        let cartridge = Cartridge::restore(
            self.bus.cartridge().rom().clone(),
            snapshot.mapper.number,
            snapshot.mapper.data,
            snapshot.mapper.undetermined,
        )?;
        bus.attach_cartridge(cartridge);
        Ok(Self::from_parts(cpu, bus))
    }
}

/// Run the migration chain from `found` up to the current version.
fn migrate(document: &mut Value, found: u32) -> Result<(), Error> {
    for version in found..CURRENT_SNAPSHOT_VERSION {
        let (_, migration) = MIGRATIONS
            .iter()
            .find(|(from, _)| *from == version)
            .ok_or(Error::UnknownSnapshotVersion(version))?;
        log::debug!("migrating snapshot from version {version}");
        migration(document).map_err(|reason| Error::SnapshotMigration { version, reason })?;
        document["version"] = Value::from(version + 1);
    }
    Ok(())
}

/// Version 1 called the RIOT timer divider `interval`.
fn rename_timer_interval(document: &mut Value) -> Result<(), String> {
    let timer = document
        .pointer_mut("/state/bus/riot/timer")
        .and_then(Value::as_object_mut)
        .ok_or("no RIOT timer in state")?;
    let interval = timer.remove("interval").ok_or("RIOT timer has no interval")?;
    timer.insert("divider".to_string(), interval);
    Ok(())
}

/// Version 2 did not record whether detection was pending; only a flat
/// mapper could have been waiting.
fn record_detection_pending(document: &mut Value) -> Result<(), String> {
    let mapper = document
        .get_mut("mapper")
        .and_then(Value::as_object_mut)
        .ok_or("no mapper record")?;
    let number = mapper.get("number").and_then(Value::as_u64).ok_or("mapper record has no number")?;
    let pending = number == u64::from(MapperKind::Unknown.tag());
    mapper.insert("undetermined".to_string(), Value::from(pending));
    Ok(())
}
