//! Machine configuration.

use std::time::Duration;

use atari_cartridge::MapperKind;
pub use atari_tia::TvFormat;

/// Wall-clock limit for the power-on TV format probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Seed for power-on RAM and timer contents.
pub const DEFAULT_POWER_ON_SEED: u64 = 0x2600_0000_5EED_0001;

/// Configuration for constructing an [`Atari2600`](crate::Atari2600) instance.
#[derive(Debug, Clone)]
pub struct Atari2600Config {
    /// Raw cartridge image (no header).
    pub rom_data: Vec<u8>,
    /// TV standard. `None` runs the probe to classify it.
    pub tv_format: Option<TvFormat>,
    /// Forced bank-switching scheme. `None` detects it.
    pub mapper: Option<MapperKind>,
    pub probe_timeout: Duration,
    /// Seeds the pseudo-random RAM and timer contents at power-on.
    pub power_on_seed: u64,
}

impl Atari2600Config {
    #[must_use]
    pub fn new(rom_data: Vec<u8>) -> Self {
        Self {
            rom_data,
            tv_format: None,
            mapper: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            power_on_seed: DEFAULT_POWER_ON_SEED,
        }
    }

    /// Skip the probe and use `format`.
    #[must_use]
    pub fn with_tv_format(mut self, format: TvFormat) -> Self {
        self.tv_format = Some(format);
        self
    }

    #[must_use]
    pub fn with_mapper(mut self, kind: MapperKind) -> Self {
        self.mapper = Some(kind);
        self
    }

    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.power_on_seed = seed;
        self
    }
}
