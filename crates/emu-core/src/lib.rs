//! Core traits and types for cycle-accurate emulation.
//!
//! Everything ticks at a fixed ratio of the master crystal. The processor
//! core is a separate component: it drives the machine through the
//! [`CpuHost`] callback contract and never sees chip internals.

mod bus;
mod clock;
mod cpu;
mod observable;
mod tickable;
mod ticks;

pub use bus::Bus;
pub use clock::MasterClock;
pub use cpu::{Cpu, CpuHost};
pub use observable::{Observable, Value, parse_address};
pub use tickable::Tickable;
pub use ticks::Ticks;
