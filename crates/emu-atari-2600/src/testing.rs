//! Processor stand-in for unit tests.

use emu_core::{Cpu, CpuHost};
use serde::{Deserialize, Serialize};

/// Fetches one byte per step and burns two cycles. A pending reset reads
/// the vector at $FFFC and takes seven.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchCpu {
    pub pc: u16,
    pub reset: bool,
}

impl Cpu for FetchCpu {
    fn step<H: CpuHost>(&mut self, host: &mut H) {
        if self.reset {
            self.reset = false;
            let lo = host.read(0xFFFC);
            let hi = host.read(0xFFFD);
            self.pc = u16::from_le_bytes([lo, hi]);
            host.run_cycles(7);
            return;
        }
        host.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        host.run_cycles(2);
    }

    fn pc(&self) -> u16 {
        self.pc
    }

    fn reset(&mut self) {
        self.reset = true;
    }
}

/// 4K of NOPs entered at $F000.
pub fn rom_4k() -> Vec<u8> {
    let mut rom = vec![0xEA; 4096];
    rom[0xFFC] = 0x00;
    rom[0xFFD] = 0xF0;
    rom
}
