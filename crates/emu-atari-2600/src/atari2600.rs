//! Top-level Atari 2600 system.
//!
//! The colour clock runs at 3,579,545 Hz (NTSC) or 3,546,894 Hz (PAL).
//! The 6507 runs at a third of that, and every processor cycle ticks the
//! TIA three times. One NTSC frame is 262 lines of 76 processor cycles.
//!
//! The processor core is supplied by the host. It drives the machine
//! through [`CpuHost`](emu_core::CpuHost), implemented by
//! [`Atari2600Bus`].

use std::time::{Duration, Instant};

use atari_cartridge::Cartridge;
use atari_tia::{FB_HEIGHT, FB_WIDTH, Tia, TvFormat};
use emu_core::{Cpu, CpuHost, Observable, Value, parse_address};

use crate::bus::{Atari2600Bus, RAM_SIZE};
use crate::config::Atari2600Config;
use crate::error::Error;
use crate::input::Input;
use crate::ports::CYCLES_PER_LINE;

/// Atari 2600 system, generic over the processor core.
#[derive(Debug)]
pub struct Atari2600<C> {
    pub(crate) cpu: C,
    pub(crate) bus: Atari2600Bus,
    /// Set once a fatal error has been reported.
    halted: Option<String>,
}

impl<C: Cpu> Atari2600<C> {
    /// Power on a machine.
    ///
    /// Without a TV format in `config`, a throwaway instance runs headless
    /// with neutral input until the TIA classifies the frame length (or the
    /// probe timeout expires), then a fresh instance is built for that
    /// format. `make_cpu` is called once per instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is empty or cannot be mapped.
    pub fn new(config: &Atari2600Config, mut make_cpu: impl FnMut() -> C) -> Result<Self, Error> {
        let format = match config.tv_format {
            Some(format) => format,
            None => Self::build(config, make_cpu(), None)?.probe_tv_format(config.probe_timeout),
        };
        Self::build(config, make_cpu(), Some(format))
    }

    fn build(config: &Atari2600Config, mut cpu: C, format: Option<TvFormat>) -> Result<Self, Error> {
        let cartridge = match config.mapper {
            Some(kind) => Cartridge::with_mapper(config.rom_data.clone(), kind)?,
            None => Cartridge::new(config.rom_data.clone())?,
        };
        let tia = format.map_or_else(Tia::detecting, Tia::new);

        let mut noise = PowerOnNoise::new(config.power_on_seed);
        let ram = (0..RAM_SIZE).map(|_| noise.next_byte()).collect();
        let timer = noise.next_byte();

        cpu.reset();
        Ok(Self {
            cpu,
            bus: Atari2600Bus::new(cartridge, tia, ram, timer),
            halted: None,
        })
    }

    /// Consume a detecting instance, returning the TV format it settles on.
    fn probe_tv_format(mut self, timeout: Duration) -> TvFormat {
        let started = Instant::now();
        while self.bus.tia().detected_format().is_none() && started.elapsed() < timeout {
            if self.step().is_err() {
                break;
            }
        }
        self.bus.tia().detected_format().unwrap_or_else(|| {
            log::debug!("TV format probe gave up after {:?}", started.elapsed());
            TvFormat::default()
        })
    }

    pub(crate) fn from_parts(cpu: C, bus: Atari2600Bus) -> Self {
        Self {
            cpu,
            bus,
            halted: None,
        }
    }

    /// Advance one instruction, or one cycle while WSYNC holds the
    /// processor.
    ///
    /// # Errors
    ///
    /// Returns the fatal error raised during this step, and
    /// [`Error::Halted`] on every later call.
    pub fn step(&mut self) -> Result<(), Error> {
        if let Some(reason) = &self.halted {
            return Err(Error::Halted(reason.clone()));
        }

        if self.bus.tia().wait_for_hblank() {
            self.bus.run_cycles(1);
        } else {
            self.cpu.step(&mut self.bus);
        }

        match self.bus.take_fatal() {
            Some(error) => {
                self.halted = Some(error.to_string());
                Err(error)
            }
            None => Ok(()),
        }
    }

    /// Step until the TIA completes a frame. Gives up after two nominal
    /// frames of cycles for programs that never strobe VSYNC.
    ///
    /// Returns whether a frame completed.
    ///
    /// # Errors
    ///
    /// Propagates a fatal error from [`step`](Self::step).
    pub fn run_frame(&mut self) -> Result<bool, Error> {
        let budget = 2 * u64::from(self.tv_format().scanlines_per_frame()) * CYCLES_PER_LINE;
        let start = self.bus.cycles();
        while self.bus.cycles() - start < budget {
            self.step()?;
            if self.frame_ready() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether a new frame is ready. Clears the flag.
    pub fn frame_ready(&mut self) -> bool {
        self.bus.tia_mut().take_frame_ready()
    }

    /// RGBA framebuffer, 160x264.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        self.bus.tia().framebuffer()
    }

    #[must_use]
    pub fn framebuffer_width(&self) -> usize {
        FB_WIDTH
    }

    #[must_use]
    pub fn framebuffer_height(&self) -> usize {
        FB_HEIGHT
    }

    /// Drain buffered audio (44.1 kHz, 16-bit little-endian stereo) into
    /// `out`, returning the filled prefix.
    pub fn read_sound<'a>(&mut self, out: &'a mut [u8]) -> &'a [u8] {
        self.bus.tia_mut().audio_mut().read_samples(out)
    }

    /// Replace the input snapshot.
    pub fn set_input(&mut self, input: Input) {
        self.bus.set_input(input);
    }

    /// Copy `bytes` into RAM at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BinaryOutOfRange`] unless the whole range lies in
    /// $80-$FF.
    pub fn load_binary(&mut self, address: u16, bytes: &[u8]) -> Result<(), Error> {
        let start = usize::from(address);
        if !(0x80..=0xFF).contains(&start) || start + bytes.len() > 0x100 {
            return Err(Error::BinaryOutOfRange {
                address,
                len: bytes.len(),
            });
        }
        self.bus.load_ram(start - 0x80, bytes);
        Ok(())
    }

    /// Processor cycles since power-on.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.bus.cycles()
    }

    /// Processor clock of the active TV format.
    #[must_use]
    pub fn cycles_per_second(&self) -> u64 {
        self.tv_format().cpu_hz()
    }

    #[must_use]
    pub fn tv_format(&self) -> TvFormat {
        self.bus.tia().format()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.bus.tia().frame_count()
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    #[must_use]
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &Atari2600Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Atari2600Bus {
        &mut self.bus
    }

    /// Run cycles on the bus directly, bypassing the processor.
    pub fn run_cycles(&mut self, cycles: u32) {
        self.bus.run_cycles(cycles);
    }
}

impl<C: Cpu> Observable for Atari2600<C> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("tia.") {
            self.bus.tia().query(rest)
        } else if let Some(rest) = path.strip_prefix("riot.") {
            self.bus.riot().query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest)
                .and_then(|addr| self.bus.peek(addr))
                .map(Value::U8)
        } else {
            let cartridge = self.bus.cartridge();
            match path {
                "cpu.pc" => Some(self.cpu.pc().into()),
                "cart.mapper" => Some(cartridge.kind().to_string().into()),
                "cart.bank" => Some(cartridge.current_bank().into()),
                "cart.banks" => Some(cartridge.bank_count().into()),
                "cart.undetermined" => Some(cartridge.is_undetermined().into()),
                "input.paddles" => Some(self.bus.ports().paddles_in_use().into()),
                "cycles" => Some(self.bus.cycles().into()),
                "frame_count" => Some(self.frame_count().into()),
                "tv_format" => Some(format!("{:?}", self.tv_format()).into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.pc",
            "tia.<tia_paths>",
            "riot.<riot_paths>",
            "cart.mapper",
            "cart.bank",
            "cart.banks",
            "cart.undetermined",
            "input.paddles",
            "memory.<address>",
            "cycles",
            "frame_count",
            "tv_format",
        ]
    }
}

/// SplitMix64 stream for power-on RAM and timer contents.
struct PowerOnNoise(u64);

impl PowerOnNoise {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_byte(&mut self) -> u8 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        (z ^ (z >> 31)).to_le_bytes()[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FetchCpu, rom_4k};
    use emu_core::Bus;

    fn make_machine(seed: u64) -> Atari2600<FetchCpu> {
        let config = Atari2600Config::new(rom_4k())
            .with_tv_format(TvFormat::Ntsc)
            .with_seed(seed);
        Atari2600::new(&config, FetchCpu::default).expect("machine")
    }

    #[test]
    fn reset_fetches_vector() {
        let mut machine = make_machine(1);
        machine.step().expect("step");
        assert_eq!(machine.cpu().pc(), 0xF000);
        assert_eq!(machine.cycles(), 7);
    }

    #[test]
    fn power_on_noise_follows_seed() {
        let a = make_machine(1);
        let b = make_machine(1);
        let c = make_machine(2);
        assert_eq!(a.bus().ram(), b.bus().ram());
        assert_ne!(a.bus().ram(), c.bus().ram());
    }

    #[test]
    fn wsync_stalls_processor() {
        let mut machine = make_machine(1);
        machine.step().expect("reset");
        machine.bus_mut().write(0x0002, 0);
        let pc = machine.cpu().pc();
        machine.step().expect("stalled step");
        assert_eq!(machine.cpu().pc(), pc, "instruction did not retire");
        assert_eq!(machine.cycles(), 8);
    }

    #[test]
    fn fatal_error_halts() {
        let mut machine = make_machine(1);
        machine.bus_mut().report_fatal_error("jam".into());
        assert!(matches!(machine.step(), Err(Error::Processor(_))));
        assert!(machine.is_halted());
        assert!(matches!(machine.step(), Err(Error::Halted(_))));
    }

    #[test]
    fn load_binary_only_targets_ram() {
        let mut machine = make_machine(1);
        machine.load_binary(0x80, &[1, 2, 3]).expect("in range");
        assert_eq!(machine.bus().ram()[..3], [1, 2, 3]);
        machine.load_binary(0xFF, &[9]).expect("last byte");
        assert!(machine.load_binary(0xFF, &[1, 2]).is_err());
        assert!(machine.load_binary(0x7F, &[1]).is_err());
        assert!(machine.load_binary(0x1000, &[]).is_err());
    }

    #[test]
    fn observable_paths() {
        let mut machine = make_machine(1);
        machine.load_binary(0x90, &[0x5A]).expect("load");
        machine.step().expect("step");
        assert_eq!(machine.query("cpu.pc"), Some(Value::U16(0xF000)));
        assert_eq!(machine.query("memory.0x90"), Some(Value::U8(0x5A)));
        assert_eq!(machine.query("memory.$1000"), None);
        assert_eq!(machine.query("cart.mapper"), Some(Value::from("none")));
        assert_eq!(machine.query("cycles"), Some(Value::U64(7)));
        assert_eq!(machine.query("tv_format"), Some(Value::from("Ntsc")));
        assert!(machine.query("tia.x").is_some());
        assert!(machine.query("riot.timer.value").is_some());
        assert_eq!(machine.query("bogus"), None);
    }

    #[test]
    fn cycles_per_second_follows_format() {
        let machine = make_machine(1);
        assert_eq!(machine.cycles_per_second(), TvFormat::Ntsc.cpu_hz());
    }

    #[test]
    fn probe_times_out_to_ntsc() {
        let config = Atari2600Config::new(rom_4k()).with_probe_timeout(Duration::from_millis(20));
        let machine = Atari2600::new(&config, FetchCpu::default).expect("machine");
        assert_eq!(machine.tv_format(), TvFormat::Ntsc);
        assert_eq!(machine.cycles(), 0, "probe instance discarded");
    }
}
