//! Atari 2600 bus: address decode and the per-cycle scheduler.
//!
//! The 6507 drives 13 address lines. Three of them select the chip:
//!
//! | A12 | A9 | A7 | Target                       |
//! |-----|----|----|------------------------------|
//! | 1   | x  | x  | cartridge ($1000-$1FFF)      |
//! | 0   | x  | 0  | TIA ($00-$7F, mirrored)      |
//! | 0   | 0  | 1  | RIOT RAM ($80-$FF, mirrored) |
//! | 0   | 1  | 1  | RIOT ports and timer ($280)  |
//!
//! TIA reads only drive bits 7-6; the rest float and read back whatever
//! was last on the data bus.
//!
//! Every processor cycle advances the RIOT timer once, the cartridge once,
//! the TIA three colour clocks and the audio mixer once.

#![allow(clippy::cast_possible_truncation)]

use atari_cartridge::{BusActivity, Cartridge};
use atari_tia::Tia;
use emu_core::{Bus, CpuHost, Tickable, Ticks};
use mos_riot_6532::Riot6532;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::input::Input;
use crate::ports::ControllerPorts;

/// Bytes of RIOT RAM.
pub const RAM_SIZE: usize = 128;

/// The machine side of the processor: memory map plus every chip.
#[derive(Debug, Serialize, Deserialize)]
pub struct Atari2600Bus {
    ram: Vec<u8>,
    /// Never serialized: snapshots carry the mapper separately and reuse
    /// the image already loaded.
    #[serde(skip)]
    cartridge: Cartridge,
    tia: Tia,
    riot: Riot6532,
    input: Input,
    ports: ControllerPorts,
    /// Processor cycles since power-on.
    cycles: u64,
    /// Last byte driven on the data bus.
    data_bus: u8,
    last_address: u16,
    last_read_address: u16,
    last_write_address: u16,
    #[serde(skip)]
    fatal: Option<Error>,
}

impl Atari2600Bus {
    #[must_use]
    pub fn new(cartridge: Cartridge, tia: Tia, mut ram: Vec<u8>, timer: u8) -> Self {
        ram.resize(RAM_SIZE, 0);
        let mut bus = Self {
            ram,
            cartridge,
            tia,
            riot: Riot6532::new(timer),
            input: Input::default(),
            ports: ControllerPorts::new(),
            cycles: 0,
            data_bus: 0,
            last_address: 0,
            last_read_address: 0,
            last_write_address: 0,
            fatal: None,
        };
        bus.set_input(Input::default());
        bus
    }

    /// Replace the input snapshot and drive the port lines from it.
    pub fn set_input(&mut self, input: Input) {
        let input = self.ports.filter(input);
        self.riot.external_a = input.port_a_lines();
        self.riot.external_b = input.port_b_lines();
        self.input = input;
    }

    /// Read without side effects. Cartridge space and the TIA are not
    /// peekable: reading them can switch banks or count input polls.
    #[must_use]
    pub fn peek(&self, addr: u16) -> Option<u8> {
        let addr = addr & 0x1FFF;
        if addr & 0x1000 != 0 || addr & 0x80 == 0 {
            None
        } else if addr & 0x200 == 0 {
            Some(self.ram[usize::from(addr & 0x7F)])
        } else {
            Some(self.riot.peek(addr))
        }
    }

    /// Copy `bytes` into RAM starting at `offset` (0-127).
    pub(crate) fn load_ram(&mut self, offset: usize, bytes: &[u8]) {
        self.ram[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Latch a fatal error. Ticking stops until the machine is rebuilt.
    pub(crate) fn raise(&mut self, error: Error) {
        if self.fatal.is_none() {
            log::warn!("machine stopped: {error}");
            self.fatal = Some(error);
        }
    }

    pub(crate) fn take_fatal(&mut self) -> Option<Error> {
        self.fatal.take()
    }

    pub(crate) fn attach_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = cartridge;
    }

    pub(crate) fn tia_mut(&mut self) -> &mut Tia {
        &mut self.tia
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    #[must_use]
    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    #[must_use]
    pub fn tia(&self) -> &Tia {
        &self.tia
    }

    #[must_use]
    pub fn riot(&self) -> &Riot6532 {
        &self.riot
    }

    #[must_use]
    pub fn input(&self) -> &Input {
        &self.input
    }

    #[must_use]
    pub fn ports(&self) -> &ControllerPorts {
        &self.ports
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn read_tia(&mut self, addr: u16) -> u8 {
        let reg = addr & 0x0F;
        let driven = match reg {
            0x00..=0x07 => self.tia.collision_register(reg),
            0x08..=0x0D => {
                let pin = usize::from(reg - 0x08);
                if self.ports.read_pin(pin, &self.input, self.riot.port_a_output()) {
                    0x80
                } else {
                    0x00
                }
            }
            _ => return self.data_bus,
        };
        (driven & 0xC0) | (self.data_bus & 0x3F)
    }

    fn write_tia(&mut self, addr: u16, value: u8) {
        let reg = addr & 0x3F;
        if reg == 0x01 {
            self.ports.write_vblank(value, self.cycles);
        }
        self.tia.write(reg, value);
    }

    fn write_riot(&mut self, addr: u16, value: u8) {
        self.riot.write(addr, value);
        if addr & 0x04 == 0 && addr & 0x02 == 0 {
            let (output, direction) = self.riot.port_a_output();
            self.ports.observe_port_a(output, direction);
        }
    }
}

impl Bus for Atari2600Bus {
    fn read(&mut self, address: u16) -> u8 {
        let addr = address & 0x1FFF;
        self.last_address = address;
        self.last_read_address = address;

        let value = if addr & 0x1000 != 0 {
            if let Err(error) = self.cartridge.resolve(address, false, self.last_write_address) {
                self.raise(error.into());
            }
            self.cartridge.read(address)
        } else if addr & 0x80 == 0 {
            self.read_tia(addr)
        } else if addr & 0x200 == 0 {
            self.ram[usize::from(addr & 0x7F)]
        } else {
            self.riot.read(addr)
        };

        self.data_bus = value;
        value
    }

    fn write(&mut self, address: u16, value: u8) {
        let addr = address & 0x1FFF;
        self.last_address = address;

        // Bank-switching circuits watch every write, not only cartridge space.
        if let Err(error) = self.cartridge.resolve(address, true, self.last_write_address) {
            self.raise(error.into());
        }
        self.cartridge.write(address, value);

        if addr & 0x1000 == 0 {
            if addr & 0x80 == 0 {
                self.write_tia(addr, value);
            } else if addr & 0x200 == 0 {
                self.ram[usize::from(addr & 0x7F)] = value;
            } else {
                self.write_riot(addr, value);
            }
        }

        self.last_write_address = address;
        self.data_bus = value;
    }
}

impl CpuHost for Atari2600Bus {
    fn run_cycles(&mut self, cycles: u32) {
        for _ in 0..cycles {
            if self.fatal.is_some() {
                break;
            }
            self.cycles += 1;
            self.riot.tick();
            self.cartridge.tick(&BusActivity {
                last_address: self.last_address,
                last_read_address: self.last_read_address,
                cycle: self.cycles,
            });
            self.tia.tick_n(Ticks::new(3));
            self.tia.audio_mut().tick();
        }
        self.ports
            .after_cycles(&self.input, self.cycles, self.tia.frame_count());
    }

    fn report_fatal_error(&mut self, message: String) {
        self.raise(Error::Processor(message));
    }
}
