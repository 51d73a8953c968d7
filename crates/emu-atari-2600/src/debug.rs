//! Interactive step debugger.
//!
//! Commands are typed on the host keyboard and submitted with return:
//!
//! | Command  | Action                                   |
//! |----------|------------------------------------------|
//! | `s`      | execute one instruction                  |
//! | `c`      | run freely until `` ` `` is pressed      |
//! | `l`      | run to the next scanline                 |
//! | `f`      | run to the next frame                    |
//! | `d`      | print the status line                    |
//! | `r <pc>` | run until the program counter is `<pc>`  |
//! | (empty)  | repeat the previous command              |
//!
//! Headless callers never need a session; [`Atari2600::step`] ignores the
//! keyboard entirely.

use std::fmt::Write as _;
use std::str::FromStr;
use std::time::{Duration, Instant};

use emu_core::Cpu;

use crate::Atari2600;
use crate::error::Error;
use crate::input::KEY_COUNT;

/// Wall-clock bound on `l`, `f` and `r`.
pub const RUN_UNTIL_TIMEOUT: Duration = Duration::from_secs(5);

const KEY_SUBMIT: usize = b'\r' as usize;
const KEY_PAUSE: usize = b'`' as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugCommand {
    Step,
    Continue,
    StepLine,
    StepFrame,
    Display,
    RunTo(u16),
    Repeat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`r` needs a hex address")]
    MissingAddress,
    #[error("bad address `{0}`")]
    BadAddress(String),
}

impl FromStr for DebugCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::Repeat);
        };
        match name {
            "s" => Ok(Self::Step),
            "c" => Ok(Self::Continue),
            "l" => Ok(Self::StepLine),
            "f" => Ok(Self::StepFrame),
            "d" => Ok(Self::Display),
            "r" => {
                let arg = words.next().ok_or(ParseCommandError::MissingAddress)?;
                let hex = arg
                    .strip_prefix("0x")
                    .or_else(|| arg.strip_prefix('$'))
                    .unwrap_or(arg);
                u16::from_str_radix(hex, 16)
                    .map(Self::RunTo)
                    .map_err(|_| ParseCommandError::BadAddress(arg.to_string()))
            }
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

/// How a bounded run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Reached,
    TimedOut { pc: u16 },
}

impl<C: Cpu> Atari2600<C> {
    /// Step until `done` holds or `timeout` elapses. A timeout leaves the
    /// machine where it stopped, ready to resume.
    ///
    /// # Errors
    ///
    /// Propagates a fatal error from [`step`](Self::step).
    pub fn run_until(
        &mut self,
        mut done: impl FnMut(&Self) -> bool,
        timeout: Duration,
    ) -> Result<RunOutcome, Error> {
        let started = Instant::now();
        while !done(self) {
            self.step()?;
            if started.elapsed() > timeout {
                return Ok(RunOutcome::TimedOut { pc: self.cpu.pc() });
            }
        }
        Ok(RunOutcome::Reached)
    }

    /// Processor registers, timer and beam position on one line.
    #[must_use]
    pub fn status_line(&self) -> String {
        let tia = self.bus.tia();
        let timer = self.bus.riot().timer();
        let p1 = tia.player(1);
        format!(
            "{}T:{:02X}/{:04} beam:{:03},{:03} P1:{:03}{:+}",
            self.cpu.status_line(),
            timer.value(),
            timer.divider(),
            tia.x(),
            tia.y(),
            p1.x,
            p1.motion,
        )
    }
}

/// Keyboard-driven debugger state, kept by the host alongside the machine.
#[derive(Debug, Clone)]
pub struct DebugSession {
    line: String,
    last_command: DebugCommand,
    previous_keys: [bool; KEY_COUNT],
    running: bool,
    timeout: Duration,
}

impl Default for DebugSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugSession {
    /// A paused session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            line: String::new(),
            last_command: DebugCommand::Step,
            previous_keys: [false; KEY_COUNT],
            running: false,
            timeout: RUN_UNTIL_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Handle newly pressed keys, then step the machine if the session is
    /// running. Returns debugger output, if any.
    ///
    /// # Errors
    ///
    /// Propagates a fatal error from the machine.
    pub fn step<C: Cpu>(&mut self, machine: &mut Atari2600<C>) -> Result<Option<String>, Error> {
        let keys = machine.bus().input().keys;
        let pressed: Vec<usize> = (0..KEY_COUNT)
            .filter(|&key| keys[key] && !self.previous_keys[key])
            .collect();
        self.previous_keys = keys;

        let mut output = None;
        for key in pressed {
            if let Some(text) = self.key(machine, key)? {
                output = Some(text);
            }
        }

        if self.running {
            machine.step()?;
        }
        Ok(output)
    }

    fn key<C: Cpu>(&mut self, machine: &mut Atari2600<C>, key: usize) -> Result<Option<String>, Error> {
        match key {
            KEY_PAUSE => {
                self.running = false;
                self.line.clear();
                Ok(Some("paused".to_string()))
            }
            KEY_SUBMIT if !self.running => {
                let line = std::mem::take(&mut self.line);
                match line.parse::<DebugCommand>() {
                    Ok(command) => self.execute(machine, command).map(Some),
                    Err(error) => Ok(Some(format!("* ERR - {error}"))),
                }
            }
            _ if !self.running => {
                if let Ok(byte) = u8::try_from(key)
                    && (byte.is_ascii_graphic() || byte == b' ')
                {
                    self.line.push(char::from(byte));
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Run one command and return what it printed.
    ///
    /// # Errors
    ///
    /// Propagates a fatal error from the machine.
    pub fn execute<C: Cpu>(&mut self, machine: &mut Atari2600<C>, command: DebugCommand) -> Result<String, Error> {
        let command = if command == DebugCommand::Repeat {
            self.last_command
        } else {
            command
        };
        self.last_command = command;

        let mut out = String::new();
        let outcome = match command {
            DebugCommand::Continue => {
                self.running = true;
                return Ok("continuing".to_string());
            }
            DebugCommand::Display | DebugCommand::Repeat => RunOutcome::Reached,
            DebugCommand::Step => {
                machine.step()?;
                RunOutcome::Reached
            }
            DebugCommand::StepLine => {
                let start = machine.bus().tia().y();
                machine.run_until(|m| m.bus().tia().y() != start, self.timeout)?
            }
            DebugCommand::StepFrame => {
                let start = machine.frame_count();
                machine.run_until(|m| m.frame_count() != start, self.timeout)?
            }
            DebugCommand::RunTo(pc) => {
                let _ = writeln!(out, "running to {pc:#06X}");
                machine.run_until(|m| m.cpu().pc() == pc, self.timeout)?
            }
        };
        if let RunOutcome::TimedOut { pc } = outcome {
            let _ = writeln!(out, "TIMED OUT: ran to {pc:#06X}");
        }
        out.push_str(&machine.status_line());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Atari2600Config, TvFormat};
    use crate::input::Input;
    use crate::testing::{FetchCpu, rom_4k};

    fn make_machine() -> Atari2600<FetchCpu> {
        let config = Atari2600Config::new(rom_4k()).with_tv_format(TvFormat::Ntsc);
        Atari2600::new(&config, FetchCpu::default).expect("machine")
    }

    fn press(machine: &mut Atari2600<FetchCpu>, session: &mut DebugSession, text: &str) -> Option<String> {
        let mut output = None;
        for byte in text.bytes() {
            let mut input = Input::default();
            input.keys[usize::from(byte)] = true;
            machine.set_input(input);
            output = session.step(machine).expect("step").or(output);
            machine.set_input(Input::default());
            output = session.step(machine).expect("step").or(output);
        }
        output
    }

    #[test]
    fn parses_commands() {
        assert_eq!("s".parse(), Ok(DebugCommand::Step));
        assert_eq!(" c ".parse(), Ok(DebugCommand::Continue));
        assert_eq!("".parse(), Ok(DebugCommand::Repeat));
        assert_eq!("r f00a".parse(), Ok(DebugCommand::RunTo(0xF00A)));
        assert_eq!("r $F00A".parse(), Ok(DebugCommand::RunTo(0xF00A)));
        assert_eq!("r".parse::<DebugCommand>(), Err(ParseCommandError::MissingAddress));
        assert!(matches!("r zz".parse::<DebugCommand>(), Err(ParseCommandError::BadAddress(_))));
        assert!(matches!("x".parse::<DebugCommand>(), Err(ParseCommandError::Unknown(_))));
    }

    #[test]
    fn paused_session_does_not_step() {
        let mut machine = make_machine();
        let mut session = DebugSession::new();
        session.step(&mut machine).expect("step");
        assert_eq!(machine.cycles(), 0);
    }

    #[test]
    fn typed_step_command_runs_one_instruction() {
        let mut machine = make_machine();
        let mut session = DebugSession::new();
        let output = press(&mut machine, &mut session, "s\r").expect("output");
        assert_eq!(machine.cycles(), 7);
        assert!(output.starts_with("PC:F000"));

        // Empty line repeats.
        press(&mut machine, &mut session, "\r");
        assert_eq!(machine.cycles(), 9);
    }

    #[test]
    fn continue_then_pause() {
        let mut machine = make_machine();
        let mut session = DebugSession::new();
        press(&mut machine, &mut session, "c\r");
        assert!(session.is_running());
        let cycles = machine.cycles();
        assert!(cycles > 0);

        press(&mut machine, &mut session, "`");
        assert!(!session.is_running());
        session.step(&mut machine).expect("step");
        let paused_at = machine.cycles();
        session.step(&mut machine).expect("step");
        assert_eq!(machine.cycles(), paused_at);
    }

    #[test]
    fn run_to_pc() {
        let mut machine = make_machine();
        let mut session = DebugSession::new();
        let output = session
            .execute(&mut machine, DebugCommand::RunTo(0xF010))
            .expect("run");
        assert_eq!(machine.cpu().pc(), 0xF010);
        assert!(output.starts_with("running to 0xF010"));
    }

    #[test]
    fn step_line_reaches_next_scanline() {
        let mut machine = make_machine();
        let mut session = DebugSession::new();
        let start = machine.bus().tia().y();
        session.execute(&mut machine, DebugCommand::StepLine).expect("run");
        assert_eq!(machine.bus().tia().y(), start + 1);
    }

    #[test]
    fn unreachable_target_times_out() {
        let mut machine = make_machine();
        let mut session = DebugSession::new().with_timeout(Duration::from_millis(10));
        // The NOP sled never vsyncs.
        let output = session.execute(&mut machine, DebugCommand::StepFrame).expect("run");
        assert!(output.starts_with("TIMED OUT"));
        assert!(machine.step().is_ok(), "machine still usable");
    }

    #[test]
    fn bad_command_reports_error() {
        let mut machine = make_machine();
        let mut session = DebugSession::new();
        let output = press(&mut machine, &mut session, "x\r").expect("output");
        assert!(output.starts_with("* ERR"));
        assert_eq!(machine.cycles(), 0);
    }
}
