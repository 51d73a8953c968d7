//! Shared helpers for the integration tests.
//!
//! The machine needs a processor core, so these tests drive it with a
//! scripted stand-in: each "instruction" is a list of bus operations
//! followed by the cycles it consumes.

#![allow(dead_code)]

use emu_atari_2600::{Atari2600, Atari2600Config, TvFormat};
use emu_core::{Cpu, CpuHost};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Read(u16),
    Write(u16, u8),
    Cycles(u32),
}

/// Replays `script` one instruction per step. After the last instruction
/// it jumps back to `loop_from`, or idles two cycles per step if `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCpu {
    script: Vec<Vec<Op>>,
    loop_from: Option<usize>,
    next: usize,
    reset: bool,
    /// Bytes returned by every `Read`, in order.
    pub reads: Vec<u8>,
}

impl ScriptCpu {
    pub fn new(script: Vec<Vec<Op>>, loop_from: Option<usize>) -> Self {
        Self {
            script,
            loop_from,
            next: 0,
            reset: false,
            reads: Vec::new(),
        }
    }
}

impl Cpu for ScriptCpu {
    fn step<H: CpuHost>(&mut self, host: &mut H) {
        if self.reset {
            self.reset = false;
            host.read(0xFFFC);
            host.read(0xFFFD);
            host.run_cycles(7);
            return;
        }
        if self.next >= self.script.len() {
            match self.loop_from {
                Some(start) if start < self.script.len() => self.next = start,
                _ => {
                    host.run_cycles(2);
                    return;
                }
            }
        }
        for op in &self.script[self.next] {
            match *op {
                Op::Read(addr) => self.reads.push(host.read(addr)),
                Op::Write(addr, value) => host.write(addr, value),
                Op::Cycles(cycles) => host.run_cycles(cycles),
            }
        }
        self.next += 1;
    }

    fn pc(&self) -> u16 {
        0xF000 | (self.next as u16 & 0x0FFF)
    }

    fn reset(&mut self) {
        self.reset = true;
    }
}

/// One frame of `lines` scanlines: three lines of VSYNC, then the rest.
pub fn frame(lines: u32) -> Vec<Op> {
    vec![
        Op::Write(0x00, 0x02),
        Op::Cycles(3 * 76),
        Op::Write(0x00, 0x00),
        Op::Cycles((lines - 3) * 76),
    ]
}

/// An image of `size` bytes whose every byte differs from its neighbours.
pub fn patterned_rom(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i as u8) ^ ((i >> 8) as u8).rotate_left(3)).collect()
}

pub fn ntsc_machine(rom: Vec<u8>, cpu: ScriptCpu) -> Atari2600<ScriptCpu> {
    init_logger();
    let config = Atari2600Config::new(rom).with_tv_format(TvFormat::Ntsc);
    Atari2600::new(&config, || cpu.clone()).expect("machine")
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
