//! TV standards and frame-length classification.

use emu_core::MasterClock;
use serde::{Deserialize, Serialize};

use crate::palette;

/// Scanlines between VSYNC pulses above which a frame counts as long.
pub const LONG_FRAME_THRESHOLD: u32 = 263;
/// Consecutive frames of one length class needed to classify.
pub const FRAMES_TO_CLASSIFY: u32 = 20;

/// Television standard. Selects border height, palette and clock rate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TvFormat {
    /// 262 lines, 60 Hz.
    #[default]
    Ntsc,
    /// 312 lines, 50 Hz.
    Pal,
}

impl TvFormat {
    /// Nominal scanlines per frame.
    #[must_use]
    pub const fn scanlines_per_frame(self) -> u16 {
        match self {
            Self::Ntsc => 262,
            Self::Pal => 312,
        }
    }

    /// Lines between the end of VSYNC and the first framebuffer row.
    #[must_use]
    pub const fn top_border(self) -> i16 {
        match self {
            Self::Ntsc => 37,
            Self::Pal => 45,
        }
    }

    /// Colour clock crystal. The processor runs at a third of this.
    #[must_use]
    pub const fn master_clock(self) -> MasterClock {
        match self {
            Self::Ntsc => MasterClock::new(3_579_545),
            Self::Pal => MasterClock::new(3_546_894),
        }
    }

    /// Processor clock in Hz.
    #[must_use]
    pub const fn cpu_hz(self) -> u64 {
        self.master_clock().divided_hz(3)
    }

    #[must_use]
    pub const fn palette(self) -> &'static [u32; 128] {
        match self {
            Self::Ntsc => &palette::NTSC,
            Self::Pal => &palette::PAL,
        }
    }
}

/// Classifies the TV standard a program targets from its VSYNC spacing.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatProbe {
    /// Consecutive frames longer than the threshold.
    long_streak: u32,
    /// Consecutive frames at or below the threshold.
    short_streak: u32,
}

impl FormatProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame's line count. Returns a format once one length
    /// class has held for [`FRAMES_TO_CLASSIFY`] frames.
    pub fn observe(&mut self, lines: u32) -> Option<TvFormat> {
        if lines > LONG_FRAME_THRESHOLD {
            self.long_streak += 1;
            self.short_streak = 0;
        } else {
            self.short_streak += 1;
            self.long_streak = 0;
        }
        if self.long_streak >= FRAMES_TO_CLASSIFY {
            Some(TvFormat::Pal)
        } else if self.short_streak >= FRAMES_TO_CLASSIFY {
            Some(TvFormat::Ntsc)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_clock_is_a_third_of_colour_clock() {
        assert_eq!(TvFormat::Ntsc.cpu_hz(), 1_193_181);
        assert_eq!(TvFormat::Pal.cpu_hz(), 1_182_298);
    }

    #[test]
    fn classifies_after_twenty_long_frames() {
        let mut probe = FormatProbe::new();
        for _ in 0..19 {
            assert_eq!(probe.observe(312), None);
        }
        assert_eq!(probe.observe(312), Some(TvFormat::Pal));
    }

    #[test]
    fn a_short_frame_breaks_the_long_streak() {
        let mut probe = FormatProbe::new();
        for _ in 0..15 {
            probe.observe(312);
        }
        probe.observe(262);
        for _ in 0..19 {
            assert_eq!(probe.observe(312), None);
        }
        assert_eq!(probe.observe(312), Some(TvFormat::Pal));
    }

    #[test]
    fn threshold_is_inclusive_for_short() {
        let mut probe = FormatProbe::new();
        let mut result = None;
        for _ in 0..20 {
            result = probe.observe(263);
        }
        assert_eq!(result, Some(TvFormat::Ntsc));
    }
}
