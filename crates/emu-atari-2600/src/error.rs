//! Machine-level failures.

use atari_cartridge::CartridgeError;

/// Everything that can stop the machine or reject a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cartridge: {0}")]
    Cartridge(#[from] CartridgeError),
    #[error("snapshot version {found} is newer than supported version {supported}")]
    FutureSnapshotVersion { found: u32, supported: u32 },
    #[error("no migration registered for snapshot version {0}")]
    UnknownSnapshotVersion(u32),
    #[error("migrating snapshot from version {version}: {reason}")]
    SnapshotMigration { version: u32, reason: String },
    #[error("snapshot encoding: {0}")]
    SnapshotEncoding(#[from] serde_json::Error),
    #[error("snapshot container: {0}")]
    SnapshotIo(#[from] std::io::Error),
    #[error("processor fault: {0}")]
    Processor(String),
    /// The machine stopped on an earlier fatal error.
    #[error("machine halted: {0}")]
    Halted(String),
    #[error("{len} bytes at {address:#06X} fall outside RAM ($80-$FF)")]
    BinaryOutOfRange { address: u16, len: usize },
}
