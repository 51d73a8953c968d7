//! Cycle-accurate Atari 2600 emulator core.
//!
//! The colour clock ticks at 3,579,545 Hz (NTSC crystal). The TIA draws
//! one pixel per colour clock and the 6507 runs at a third of that
//! (1,193,182 Hz), so every processor cycle is three TIA clocks.
//!
//! One scanline = 228 colour clocks = 76 processor cycles.
//! One NTSC frame = 262 scanlines, PAL = 312.
//!
//! The processor core is external: [`Atari2600`] is generic over any
//! [`emu_core::Cpu`], which drives the machine through
//! [`emu_core::CpuHost`].

mod atari2600;
mod bus;
mod config;
pub mod debug;
mod error;
pub mod input;
mod ports;
pub mod snapshot;
#[cfg(test)]
mod testing;

pub use atari_cartridge::MapperKind;
pub use atari2600::Atari2600;
pub use bus::{Atari2600Bus, RAM_SIZE};
pub use config::{Atari2600Config, TvFormat};
pub use debug::{DebugCommand, DebugSession, RunOutcome};
pub use error::Error;
pub use input::{Input, Joystick, Keypad, Paddle};
pub use ports::{CYCLES_PER_LINE, ControllerPorts};
