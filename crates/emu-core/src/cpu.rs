//! Processor core contract.

use crate::Bus;

/// The machine side of the processor callback contract.
///
/// A processor core performs its memory accesses through [`Bus`] and then
/// reports how many cycles the instruction consumed with
/// [`run_cycles`](CpuHost::run_cycles). Every peripheral advances inside
/// that call, so chip state moves in lockstep with instruction execution.
pub trait CpuHost: Bus {
    /// Advance all peripherals by `cycles` processor cycles.
    fn run_cycles(&mut self, cycles: u32);

    /// Report an unrecoverable processor fault (illegal opcode, jam).
    ///
    /// The host latches the fault and stops the run at the next
    /// instruction boundary.
    fn report_fatal_error(&mut self, message: String);
}

/// A processor core driven one instruction at a time.
pub trait Cpu {
    /// Execute one instruction against the host.
    ///
    /// A pending reset is serviced instead of an instruction: the core
    /// fetches the reset vector through the host.
    fn step<H: CpuHost>(&mut self, host: &mut H);

    /// Current program counter.
    fn pc(&self) -> u16;

    /// Raise the reset line. Takes effect on the next [`step`](Cpu::step).
    fn reset(&mut self);

    /// One-line register dump for debugger output.
    fn status_line(&self) -> String {
        format!("PC:{:04X} ", self.pc())
    }
}
