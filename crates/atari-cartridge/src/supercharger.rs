//! Starpath Supercharger (66).
//!
//! 6K of RAM in three 2K banks and a 2K BIOS ROM, arranged into the two
//! halves of the window by one of eight layouts. The program writes RAM
//! without a write strobe: touching $10xx latches `xx`, and the first
//! address then held on the bus for five consecutive cycles receives it.
//! If that address is $1FF8 the byte goes to the control register instead:
//!
//! | Bits | Meaning            |
//! |------|--------------------|
//! | 4-2  | layout             |
//! | 1    | BIOS ROM powered off |
//! | 0    | RAM writes enabled |
//!
//! The image carries the RAM contents in its first 6K, the BIOS after
//! that, and a header at $2000 holding the entry point and initial
//! control value.

use serde::{Deserialize, Serialize};

use crate::{Board, BusActivity, MapperKind, rom_byte};

const BANK_SIZE: usize = 0x800;
const RAM_SIZE: usize = 3 * BANK_SIZE;
const BIOS_BASE: usize = RAM_SIZE;
const HEADER_BASE: usize = 0x2000;
/// Cycles an address must stay on the bus to receive the latched byte.
const PULSE_CYCLES: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Ram(usize),
    Bios,
}

/// (lower 2K, upper 2K) per layout.
const LAYOUTS: [(Slot, Slot); 8] = [
    (Slot::Ram(2), Slot::Bios),
    (Slot::Ram(0), Slot::Bios),
    (Slot::Ram(2), Slot::Ram(0)),
    (Slot::Ram(0), Slot::Ram(2)),
    (Slot::Ram(2), Slot::Bios),
    (Slot::Ram(1), Slot::Bios),
    (Slot::Ram(2), Slot::Ram(1)),
    (Slot::Ram(1), Slot::Ram(2)),
];

/// A latched byte waiting for a stable address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Pulse {
    address: u16,
    cycles: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supercharger {
    ram: Vec<u8>,
    control: u8,
    /// Byte latched by the last $10xx access.
    data: u8,
    /// Address being held and for how long, while a write is pending.
    pulse: Option<Pulse>,
    /// Entry point served once to the reset vector fetch.
    entry: Option<[u8; 2]>,
}

impl Default for Supercharger {
    fn default() -> Self {
        Self::new()
    }
}

impl Supercharger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; RAM_SIZE],
            control: 0,
            data: 0,
            pulse: None,
            entry: None,
        }
    }

    #[must_use]
    pub fn control(&self) -> u8 {
        self.control
    }

    fn slot(&self, addr: u16) -> Slot {
        let (lower, upper) = LAYOUTS[usize::from((self.control >> 2) & 7)];
        if addr & 0x0800 == 0 { lower } else { upper }
    }

    fn latch(&mut self, addr: u16) {
        if self.pulse.is_none() && (0x1000..=0x10FF).contains(&addr) {
            self.data = addr as u8;
            self.pulse = Some(Pulse { address: addr, cycles: 0 });
        }
    }

    fn commit(&mut self, addr: u16) {
        let addr = addr & 0x1FFF;
        if addr == 0x1FF8 {
            log::debug!("Supercharger control = {:#04X}", self.data);
            self.control = self.data;
        } else if self.control & 0x01 != 0
            && addr & 0x1000 != 0
            && let Slot::Ram(bank) = self.slot(addr)
        {
            self.ram[bank * BANK_SIZE + usize::from(addr & 0x07FF)] = self.data;
        }
    }
}

impl Board for Supercharger {
    fn read(&mut self, rom: &[u8], addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        if let Some(entry) = self.entry {
            match addr {
                0x1FFC => return entry[0],
                0x1FFD => {
                    self.entry = None;
                    return entry[1];
                }
                _ => {}
            }
        }
        self.latch(addr);
        match self.slot(addr) {
            Slot::Ram(bank) => self.ram[bank * BANK_SIZE + usize::from(addr & 0x07FF)],
            Slot::Bios if self.control & 0x02 != 0 => 0,
            Slot::Bios => rom_byte(rom, BIOS_BASE + usize::from(addr & 0x07FF)),
        }
    }

    fn write(&mut self, _rom: &[u8], addr: u16, _value: u8) {
        self.latch(addr & 0x1FFF);
    }

    fn kind(&self) -> MapperKind {
        MapperKind::Supercharger
    }

    fn current_bank(&self) -> u16 {
        u16::from((self.control >> 2) & 7)
    }

    fn bank_count(&self, _rom: &[u8]) -> u16 {
        LAYOUTS.len() as u16
    }

    fn tick(&mut self, activity: &BusActivity) {
        let Some(pulse) = self.pulse else {
            return;
        };
        let address = activity.last_address & 0x1FFF;
        let cycles = if address == pulse.address { pulse.cycles + 1 } else { 1 };
        if cycles >= PULSE_CYCLES {
            self.pulse = None;
            self.commit(address);
        } else {
            self.pulse = Some(Pulse { address, cycles });
        }
    }

    /// Load the RAM image and arm the header's entry point and layout.
    fn initialize(&mut self, rom: &[u8]) {
        let len = rom.len().min(RAM_SIZE);
        self.ram[..len].copy_from_slice(&rom[..len]);
        if let Some(header) = rom.get(HEADER_BASE..HEADER_BASE + 3) {
            self.entry = Some([header[0], header[1]]);
            self.control = header[2];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Vec<u8> {
        let mut rom = vec![0u8; 0x2100];
        for (i, byte) in rom[..RAM_SIZE].iter_mut().enumerate() {
            *byte = (i / BANK_SIZE) as u8 + 1;
        }
        rom[BIOS_BASE..HEADER_BASE].fill(0xB1);
        rom[HEADER_BASE] = 0x34;
        rom[HEADER_BASE + 1] = 0xF2;
        rom[HEADER_BASE + 2] = 0x01 | (1 << 2);
        rom
    }

    fn cycles(board: &mut Supercharger, addr: u16, n: u8) {
        let activity = BusActivity {
            last_address: addr,
            last_read_address: addr,
            cycle: 0,
        };
        for _ in 0..n {
            board.tick(&activity);
        }
    }

    #[test]
    fn entry_point_served_once() {
        let rom = image();
        let mut board = Supercharger::new();
        board.initialize(&rom);
        assert_eq!(board.control(), 0x05);
        assert_eq!(board.read(&rom, 0xFFFC), 0x34);
        assert_eq!(board.read(&rom, 0xFFFD), 0xF2);
        // Layout 1: upper half is the BIOS.
        assert_eq!(board.read(&rom, 0xFFFD), 0xB1);
    }

    #[test]
    fn layout_selects_ram_banks() {
        let rom = image();
        let mut board = Supercharger::new();
        board.initialize(&rom);
        assert_eq!(board.read(&rom, 0x1234), 1);
    }

    #[test]
    fn write_pulse_commits_after_five_stable_cycles() {
        let rom = image();
        let mut board = Supercharger::new();
        board.initialize(&rom);
        board.read(&rom, 0x10AB);
        cycles(&mut board, 0x10AB, 1);
        cycles(&mut board, 0x1300, 4);
        assert_eq!(board.ram[0x300], 1, "not yet");
        cycles(&mut board, 0x1300, 1);
        assert_eq!(board.ram[0x300], 0xAB);
    }

    #[test]
    fn moving_address_never_commits() {
        let rom = image();
        let mut board = Supercharger::new();
        board.initialize(&rom);
        board.read(&rom, 0x10AB);
        for addr in [0x1301, 0x1302, 0x1303, 0x1304, 0x1300] {
            cycles(&mut board, addr, 1);
        }
        assert_eq!(board.ram[0x300], 1);
        assert!(board.pulse.is_some());
        cycles(&mut board, 0x1300, 4);
        assert_eq!(board.ram[0x300], 0xAB);
        assert_eq!(board.ram[0x304], 1);
    }

    #[test]
    fn pulse_to_control_register() {
        let rom = image();
        let mut board = Supercharger::new();
        board.initialize(&rom);
        // Layout 3, writes enabled.
        board.read(&rom, 0x100D);
        cycles(&mut board, 0x1FF8, 5);
        assert_eq!(board.control(), 0x0D);
        assert_eq!(board.current_bank(), 3);
        assert_eq!(board.read(&rom, 0x1800), 3);
    }

    #[test]
    fn writes_disabled_leave_ram_alone() {
        let rom = image();
        let mut board = Supercharger::new();
        board.initialize(&rom);
        board.read(&rom, 0x1004);
        cycles(&mut board, 0x1FF8, 5);
        assert_eq!(board.control(), 0x04);
        board.read(&rom, 0x1077);
        cycles(&mut board, 0x1300, 5);
        assert_eq!(board.read(&rom, 0x1300), 1);
    }
}
