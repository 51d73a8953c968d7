//! TIA sound: two channels mixed into 44.1 kHz stereo.
//!
//! Each channel has a 4-bit waveform control (AUDC), a 5-bit frequency
//! divider (AUDF) and a 4-bit volume (AUDV). The channels are clocked twice
//! per scanline (every 38 processor cycles); the divider then stretches
//! each waveform step over AUDF + 1 clocks.
//!
//! | AUDC           | Waveform                         |
//! |----------------|----------------------------------|
//! | 0, 11          | constant high (volume only)      |
//! | 1              | 4-bit poly                       |
//! | 2              | 4-bit poly clocked every 15      |
//! | 3              | 4-bit poly gated by 5-bit poly   |
//! | 4, 5           | square (toggle)                  |
//! | 6, 10          | divide by 31                     |
//! | 7              | square gated by 5-bit poly       |
//! | 8              | 9-bit poly                       |
//! | 9              | 5-bit poly                       |
//! | 12, 13, 14, 15 | as 4/5, 6 and 7, further /3      |

#![allow(clippy::cast_precision_loss)]

use emu_core::Tickable;
use serde::{Deserialize, Serialize};

use crate::sample_buffer::SampleBuffer;

/// Host sample rate.
pub const SAMPLE_RATE: u32 = 44_100;
/// Processor cycles between channel clocks.
pub const CYCLES_PER_AUDIO_CLOCK: u8 = 38;
/// Sum of both channels at full volume.
const MAX_LEVEL: f64 = 30.0;

fn step_poly4(p: u8) -> u8 {
    let bit = (p ^ (p >> 1)) & 1;
    (p >> 1) | (bit << 3)
}

fn step_poly5(p: u8) -> u8 {
    let bit = (p ^ (p >> 2)) & 1;
    (p >> 1) | (bit << 4)
}

fn step_poly9(p: u16) -> u16 {
    let bit = (p ^ (p >> 4)) & 1;
    (p >> 1) | (bit << 8)
}

/// One sound channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// AUDC: waveform select (4 bits).
    control: u8,
    /// AUDF: frequency divider (5 bits).
    frequency: u8,
    /// AUDV: volume (4 bits).
    volume: u8,
    /// Counts up to `frequency`.
    divider: u8,
    /// Extra /3 stage for AUDC 12-15.
    prescale: u8,
    /// Sub-divider for the /15 and /31 generators.
    counter: u8,
    poly4: u8,
    poly5: u8,
    poly9: u16,
    output: bool,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            control: 0,
            frequency: 0,
            volume: 0,
            divider: 0,
            prescale: 0,
            counter: 0,
            poly4: 0x0F,
            poly5: 0x1F,
            poly9: 0x1FF,
            output: false,
        }
    }
}

impl Channel {
    pub fn set_control(&mut self, value: u8) {
        self.control = value & 0x0F;
    }

    pub fn set_frequency(&mut self, value: u8) {
        self.frequency = value & 0x1F;
    }

    pub fn set_volume(&mut self, value: u8) {
        self.volume = value & 0x0F;
    }

    #[must_use]
    pub fn control(&self) -> u8 {
        self.control
    }

    #[must_use]
    pub fn frequency(&self) -> u8 {
        self.frequency
    }

    #[must_use]
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Current generator output bit.
    #[must_use]
    pub fn output(&self) -> bool {
        self.output
    }

    /// Output bit scaled by volume.
    #[must_use]
    pub fn level(&self) -> u8 {
        if self.output { self.volume } else { 0 }
    }

    /// One audio clock (twice per scanline).
    pub fn clock(&mut self) {
        if self.divider < self.frequency {
            self.divider += 1;
            return;
        }
        self.divider = 0;
        if self.control & 0x0C == 0x0C {
            self.prescale += 1;
            if self.prescale < 3 {
                return;
            }
            self.prescale = 0;
        }
        self.step_waveform();
    }

    fn step_waveform(&mut self) {
        match self.control {
            1 => {
                self.poly4 = step_poly4(self.poly4);
                self.output = self.poly4 & 1 != 0;
            }
            2 => {
                self.counter += 1;
                if self.counter >= 15 {
                    self.counter = 0;
                    self.poly4 = step_poly4(self.poly4);
                }
                self.output = self.poly4 & 1 != 0;
            }
            3 => {
                self.poly5 = step_poly5(self.poly5);
                if self.poly5 & 1 != 0 {
                    self.poly4 = step_poly4(self.poly4);
                }
                self.output = self.poly4 & 1 != 0;
            }
            4 | 5 | 12 | 13 => self.output = !self.output,
            6 | 10 | 14 => {
                self.counter = (self.counter + 1) % 31;
                self.output = self.counter < 18;
            }
            7 | 15 => {
                self.poly5 = step_poly5(self.poly5);
                if self.poly5 & 1 != 0 {
                    self.output = !self.output;
                }
            }
            8 => {
                self.poly9 = step_poly9(self.poly9);
                self.output = self.poly9 & 1 != 0;
            }
            9 => {
                self.poly5 = step_poly5(self.poly5);
                self.output = self.poly5 & 1 != 0;
            }
            _ => self.output = true,
        }
    }
}

/// Both channels plus the downsampling mixer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audio {
    channels: [Channel; 2],
    /// Processor cycles since the last channel clock.
    clock_phase: u8,
    /// Sum of channel levels since the last emitted sample.
    level_sum: u32,
    /// Processor cycles folded into `level_sum`.
    level_count: u32,
    /// Fractional processor cycles towards the next sample.
    sample_phase: f64,
    /// Processor clock / sample rate.
    cycles_per_sample: f64,
    buffer: SampleBuffer,
}

impl Audio {
    #[must_use]
    pub fn new(cpu_hz: u64) -> Self {
        Self {
            channels: [Channel::default(), Channel::default()],
            clock_phase: 0,
            level_sum: 0,
            level_count: 0,
            sample_phase: 0.0,
            cycles_per_sample: cpu_hz as f64 / f64::from(SAMPLE_RATE),
            buffer: SampleBuffer::new(),
        }
    }

    /// Retune the downsampler after a TV standard change.
    pub fn set_cpu_hz(&mut self, cpu_hz: u64) {
        self.cycles_per_sample = cpu_hz as f64 / f64::from(SAMPLE_RATE);
    }

    /// Write AUDC0/1, AUDF0/1 or AUDV0/1 (TIA registers 0x15-0x1A).
    pub fn write(&mut self, reg: u16, value: u8) {
        match reg {
            0x15 => self.channels[0].set_control(value),
            0x16 => self.channels[1].set_control(value),
            0x17 => self.channels[0].set_frequency(value),
            0x18 => self.channels[1].set_frequency(value),
            0x19 => self.channels[0].set_volume(value),
            0x1A => self.channels[1].set_volume(value),
            _ => {}
        }
    }

    #[must_use]
    pub fn channel(&self, index: usize) -> &Channel {
        &self.channels[index & 1]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut Channel {
        &mut self.channels[index & 1]
    }

    /// Drain mixed samples (16-bit little-endian, interleaved L/R).
    pub fn read_samples<'a>(&mut self, out: &'a mut [u8]) -> &'a [u8] {
        self.buffer.read(out)
    }

    #[must_use]
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.len()
    }

    fn emit_sample(&mut self) {
        let average = if self.level_count == 0 {
            0.0
        } else {
            f64::from(self.level_sum) / f64::from(self.level_count)
        };
        self.level_sum = 0;
        self.level_count = 0;
        let sample = (average / MAX_LEVEL * 32767.0) as i16;
        let [lo, hi] = sample.to_le_bytes();
        self.buffer.write(&[lo, hi, lo, hi]);
    }
}

impl Tickable for Audio {
    /// One processor cycle.
    fn tick(&mut self) {
        self.clock_phase += 1;
        if self.clock_phase >= CYCLES_PER_AUDIO_CLOCK {
            self.clock_phase = 0;
            self.channels[0].clock();
            self.channels[1].clock();
        }

        self.level_sum += u32::from(self.channels[0].level() + self.channels[1].level());
        self.level_count += 1;

        self.sample_phase += 1.0;
        if self.sample_phase >= self.cycles_per_sample {
            self.sample_phase -= self.cycles_per_sample;
            self.emit_sample();
        }
    }
}
