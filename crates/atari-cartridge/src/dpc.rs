//! DPC, the display processor in Pitfall II.
//!
//! An F8-style pair of 4K banks ($1FF8/$1FF9) plus 2K of graphics data
//! behind eight data fetchers, a random number generator and a
//! three-voice music mixer.
//!
//! Reads $1000-$103F and writes $1040-$107F, decoded as
//! `function = (addr >> 3) & 7`, `fetcher = addr & 7`:
//!
//! | Fn | Read                                    | Write                      |
//! |----|-----------------------------------------|----------------------------|
//! | 0  | 0-3: random; 4-7: music amplitude       | top of window              |
//! | 1  | display data                            | bottom of window           |
//! | 2  | display data masked by window flag      | counter low byte           |
//! | 3  | (unused)                                | counter high bits, music   |
//! | 4-5| (unused)                                | (unused)                   |
//! | 6  | (unused)                                | reset random               |
//! | 7  | window flag                             | (unused)                   |

use serde::{Deserialize, Serialize};

use crate::{Board, BusActivity, MapperKind, rom_byte};

/// Offset of the graphics data in the image.
const DISPLAY_BASE: usize = 0x2000;
/// Processor cycles per music oscillator step.
const OSCILLATOR_PERIOD: u8 = 60;
/// Mix level for each combination of active voices.
const AMPLITUDES: [u8; 8] = [0x0, 0x4, 0x5, 0x9, 0x6, 0xA, 0xB, 0xF];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dpc {
    bank: u16,
    tops: [u8; 8],
    bottoms: [u8; 8],
    /// 11-bit down counters.
    counters: [u16; 8],
    /// Set while a counter's low byte is inside its window.
    flags: [bool; 8],
    /// Fetchers 5-7 free-run as oscillators when set.
    music_mode: [bool; 3],
    random: u8,
    oscillator_clock: u8,
}

impl Default for Dpc {
    fn default() -> Self {
        Self::new()
    }
}

impl Dpc {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bank: 1,
            tops: [0; 8],
            bottoms: [0; 8],
            counters: [0; 8],
            flags: [false; 8],
            music_mode: [false; 3],
            random: 1,
            oscillator_clock: 0,
        }
    }

    #[must_use]
    pub fn counter(&self, fetcher: usize) -> u16 {
        self.counters[fetcher & 7]
    }

    #[must_use]
    pub fn flag(&self, fetcher: usize) -> bool {
        self.flags[fetcher & 7]
    }

    fn clock_random(&mut self) {
        let r = self.random;
        let feedback = ((r >> 7) ^ (r >> 5) ^ (r >> 4) ^ (r >> 3)) & 1;
        self.random = (r << 1) | (feedback ^ 1);
    }

    fn music_amplitude(&self) -> u8 {
        let mut voices = 0;
        for (i, on) in self.music_mode.iter().enumerate() {
            if *on && self.flags[5 + i] {
                voices |= 1 << i;
            }
        }
        AMPLITUDES[voices]
    }

    fn step_oscillators(&mut self) {
        for i in 5..8 {
            if !self.music_mode[i - 5] {
                continue;
            }
            let top = self.tops[i];
            let low = self.counters[i] as u8;
            let new_low = if top == 0 {
                0
            } else if low == 0 {
                top
            } else {
                low - 1
            };
            if new_low <= self.bottoms[i] {
                self.flags[i] = false;
            } else if new_low <= top {
                self.flags[i] = true;
            }
            self.counters[i] = (self.counters[i] & 0x0700) | u16::from(new_low);
        }
    }

    fn display_byte(&self, rom: &[u8], fetcher: usize) -> u8 {
        let offset = 0x07FF - usize::from(self.counters[fetcher] & 0x07FF);
        rom_byte(rom, DISPLAY_BASE + offset)
    }

    fn read_register(&mut self, rom: &[u8], addr: u16) -> u8 {
        let fetcher = usize::from(addr & 7);
        let function = (addr >> 3) & 7;

        let low = self.counters[fetcher] as u8;
        if low == self.tops[fetcher] {
            self.flags[fetcher] = true;
        } else if low == self.bottoms[fetcher] {
            self.flags[fetcher] = false;
        }

        let value = match function {
            0 if fetcher < 4 => {
                self.clock_random();
                self.random
            }
            0 => self.music_amplitude(),
            1 => self.display_byte(rom, fetcher),
            2 => {
                if self.flags[fetcher] {
                    self.display_byte(rom, fetcher)
                } else {
                    0
                }
            }
            7 => {
                if self.flags[fetcher] {
                    0xFF
                } else {
                    0
                }
            }
            _ => {
                log::debug!("DPC read of unused function {function} (fetcher {fetcher})");
                0
            }
        };

        let oscillating = fetcher >= 5 && self.music_mode[fetcher - 5];
        if !oscillating {
            self.counters[fetcher] = self.counters[fetcher].wrapping_sub(1) & 0x07FF;
        }
        value
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        let fetcher = usize::from(addr & 7);
        let function = (addr >> 3) & 7;
        match function {
            0 => {
                self.tops[fetcher] = value;
                self.flags[fetcher] = false;
            }
            1 => self.bottoms[fetcher] = value,
            2 => self.counters[fetcher] = (self.counters[fetcher] & 0x0700) | u16::from(value),
            3 => {
                self.counters[fetcher] = (u16::from(value & 0x07) << 8) | (self.counters[fetcher] & 0x00FF);
                if fetcher >= 5 {
                    self.music_mode[fetcher - 5] = value & 0x10 != 0;
                }
            }
            6 => self.random = 1,
            _ => log::debug!("DPC write to unused function {function} (fetcher {fetcher}) = {value:#04X}"),
        }
    }

    fn switch(&mut self, addr: u16) {
        if matches!(addr, 0x1FF8 | 0x1FF9) {
            self.bank = addr - 0x1FF8;
        }
    }
}

impl Board for Dpc {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        let value = if (0x1000..=0x103F).contains(&addr) {
            self.read_register(rom, addr)
        } else {
            rom_byte(rom, usize::from(self.bank) * 0x1000 + usize::from(addr & 0x0FFF))
        };
        self.switch(addr);
        value
    }

    fn write(&mut self, _rom: &[u8], addr: u16, value: u8) {
        let addr = addr & 0x1FFF;
        if (0x1040..=0x107F).contains(&addr) {
            self.write_register(addr, value);
        } else {
            self.switch(addr);
        }
    }

    fn kind(&self) -> MapperKind {
        MapperKind::Dpc
    }

    fn current_bank(&self) -> u16 {
        self.bank
    }

    fn bank_count(&self, _rom: &[u8]) -> u16 {
        2
    }

    fn tick(&mut self, _activity: &BusActivity) {
        self.oscillator_clock += 1;
        if self.oscillator_clock >= OSCILLATOR_PERIOD {
            self.oscillator_clock = 0;
            self.step_oscillators();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom() -> Vec<u8> {
        let mut rom = vec![0u8; 10_240];
        for i in 0..0x800 {
            rom[DISPLAY_BASE + i] = i as u8;
        }
        rom
    }

    #[test]
    fn fetcher_reads_display_data_downward() {
        let rom = rom();
        let mut dpc = Dpc::new();
        // Counter = $7FE points at display offset 1.
        dpc.write(&rom, 0x1050, 0xFE);
        dpc.write(&rom, 0x1058, 0x07);
        assert_eq!(dpc.counter(0), 0x7FE);
        assert_eq!(dpc.read(&rom, 0x1008), 1);
        assert_eq!(dpc.read(&rom, 0x1008), 2);
        assert_eq!(dpc.counter(0), 0x7FC);
    }

    #[test]
    fn window_flag_masks_data() {
        let rom = rom();
        let mut dpc = Dpc::new();
        dpc.write(&rom, 0x1041, 0x10); // top
        dpc.write(&rom, 0x1049, 0x0E); // bottom
        dpc.write(&rom, 0x1051, 0x11); // counter low
        assert_eq!(dpc.read(&rom, 0x1039), 0, "above the window");
        assert_eq!(dpc.read(&rom, 0x1039), 0xFF, "hit top");
        assert_eq!(dpc.read(&rom, 0x1039), 0xFF);
        assert_eq!(dpc.read(&rom, 0x1039), 0, "hit bottom");
    }

    #[test]
    fn random_is_nonzero_and_resettable() {
        let rom = rom();
        let mut dpc = Dpc::new();
        let first: Vec<u8> = (0..8).map(|_| dpc.read(&rom, 0x1000)).collect();
        assert!(first.iter().all(|&v| v != 0));
        dpc.write(&rom, 0x1070, 0);
        let again: Vec<u8> = (0..8).map(|_| dpc.read(&rom, 0x1003)).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn music_oscillator_steps_every_sixty_cycles() {
        let rom = rom();
        let mut dpc = Dpc::new();
        dpc.write(&rom, 0x1045, 0x03); // top of voice 0
        dpc.write(&rom, 0x104D, 0x01); // bottom
        dpc.write(&rom, 0x105D, 0x10); // music mode, high bits 0
        dpc.write(&rom, 0x1055, 0x00); // low byte 0
        let activity = BusActivity::default();
        for _ in 0..59 {
            dpc.tick(&activity);
        }
        assert_eq!(dpc.counter(5), 0);
        dpc.tick(&activity);
        assert_eq!(dpc.counter(5), 3);
        assert!(dpc.flag(5));
        assert_eq!(dpc.read(&rom, 0x1004), 0x4);
        for _ in 0..120 {
            dpc.tick(&activity);
        }
        assert_eq!(dpc.counter(5), 1);
        assert!(!dpc.flag(5));
        // Music fetchers aren't clocked by reads.
        dpc.read(&rom, 0x100D);
        assert_eq!(dpc.counter(5), 1);
    }

    #[test]
    fn bank_switch_like_f8() {
        let mut rom = rom();
        rom[0x0100] = 0xAA;
        rom[0x1100] = 0xBB;
        let mut dpc = Dpc::new();
        assert_eq!(dpc.read(&rom, 0x1100), 0xBB);
        dpc.read(&rom, 0x1FF8);
        assert_eq!(dpc.current_bank(), 0);
        assert_eq!(dpc.read(&rom, 0x1100), 0xAA);
    }
}
