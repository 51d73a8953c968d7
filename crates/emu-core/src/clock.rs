//! Crystal frequencies.

/// The crystal every other clock in a machine is divided from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Crystal frequency in Hz (`3_579_545` for the NTSC colour clock).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Rate of a component clocked at `1 / divisor` of the crystal.
    #[must_use]
    pub const fn divided_hz(&self, divisor: u64) -> u64 {
        self.frequency_hz / divisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processor_runs_at_a_third_of_the_colour_clock() {
        assert_eq!(MasterClock::new(3_579_545).divided_hz(3), 1_193_181);
        assert_eq!(MasterClock::new(3_546_894).divided_hz(3), 1_182_298);
    }
}
