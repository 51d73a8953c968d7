//! Atari TIA (Television Interface Adapter).
//!
//! The TIA generates video one colour clock at a time, three clocks per
//! processor cycle. A scanline is 228 clocks: 68 of horizontal blank
//! followed by 160 visible. The beam column `x` runs -68..=159.
//!
//! There is no frame buffer in the real chip. The program races the beam,
//! rewriting object registers between and during lines; this model renders
//! each visible clock into an RGBA buffer as it happens.
//!
//! # Write registers ($00-$2C)
//!
//! | Addr | Name   | Addr | Name   | Addr | Name   |
//! |------|--------|------|--------|------|--------|
//! | $00  | VSYNC  | $0F  | PF2    | $1E  | ENAM1  |
//! | $01  | VBLANK | $10  | RESP0  | $1F  | ENABL  |
//! | $02  | WSYNC  | $11  | RESP1  | $20  | HMP0   |
//! | $03  | RSYNC  | $12  | RESM0  | $21  | HMP1   |
//! | $04  | NUSIZ0 | $13  | RESM1  | $22  | HMM0   |
//! | $05  | NUSIZ1 | $14  | RESBL  | $23  | HMM1   |
//! | $06  | COLUP0 | $15  | AUDC0  | $24  | HMBL   |
//! | $07  | COLUP1 | $16  | AUDC1  | $25  | VDELP0 |
//! | $08  | COLUPF | $17  | AUDF0  | $26  | VDELP1 |
//! | $09  | COLUBK | $18  | AUDF1  | $27  | VDELBL |
//! | $0A  | CTRLPF | $19  | AUDV0  | $28  | RESMP0 |
//! | $0B  | REFP0  | $1A  | AUDV1  | $29  | RESMP1 |
//! | $0C  | REFP1  | $1B  | GRP0   | $2A  | HMOVE  |
//! | $0D  | PF0    | $1C  | GRP1   | $2B  | HMCLR  |
//! | $0E  | PF1    | $1D  | ENAM0  | $2C  | CXCLR  |
//!
//! Reads $00-$07 return collision latches (see [`collisions`]); the input
//! ports $08-$0D are wired by the host machine.

#![allow(clippy::cast_possible_truncation)]

pub mod audio;
pub mod collisions;
pub mod format;
pub mod objects;
pub mod palette;
pub mod playfield;
pub mod sample_buffer;

use emu_core::{Observable, Tickable, Value};
use serde::{Deserialize, Serialize};

pub use audio::{Audio, Channel};
pub use collisions::{Collisions, Objects};
pub use format::{FormatProbe, TvFormat};
pub use objects::{Ball, Missile, Player};
pub use playfield::Playfield;
pub use sample_buffer::SampleBuffer;

/// Framebuffer width in pixels (one per visible colour clock).
pub const FB_WIDTH: usize = 160;
/// Framebuffer height in lines.
pub const FB_HEIGHT: usize = 264;
/// Horizontal blank length in colour clocks.
pub const HBLANK_CLOCKS: i16 = 68;
/// Colour clocks per scanline.
pub const CLOCKS_PER_LINE: u32 = 228;
/// Clocks blanked at the start of a line after a late HMOVE.
pub const COMB_WIDTH: i16 = 8;
/// Extra leftward motion applied by a late HMOVE.
const LATE_HMOVE_EXTRA: i16 = 8;
/// The line counter stops here if a program never issues VSYNC.
const MAX_LINE: i16 = 275;

/// When an HMOVE strobe arrived relative to horizontal blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HmoveStrobe {
    /// Inside horizontal blank: motion applies on the next clock.
    Early,
    /// During the visible line: motion applies at the next blank with the
    /// extra offset, and the next line starts with the comb.
    Late,
}

/// Atari TIA video state and its sound channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tia {
    /// RGBA8, `FB_WIDTH` x `FB_HEIGHT`.
    framebuffer: Vec<u8>,
    format: TvFormat,
    /// Format was given or already classified; the probe is idle.
    format_locked: bool,
    probe: FormatProbe,

    /// Beam column, -68..=159.
    x: i16,
    /// Beam line relative to the first framebuffer row.
    y: i16,
    in_hblank: bool,
    /// WSYNC: the processor is halted until the next line starts.
    wait_for_hblank: bool,
    vsync: bool,
    vblank: bool,
    frame_ready: bool,
    frame_count: u64,
    /// Lines since the last VSYNC rising edge.
    lines_since_vsync: u32,

    players: [Player; 2],
    missiles: [Missile; 2],
    ball: Ball,
    playfield: Playfield,
    collisions: Collisions,
    /// CTRLPF bit 2: playfield and ball draw over players and missiles.
    playfield_priority: bool,
    /// CTRLPF bit 1: playfield takes the player colours.
    score_mode: bool,
    /// COLUP0, COLUP1, COLUPF, COLUBK.
    colours: [u8; 4],

    hmove: Option<HmoveStrobe>,
    /// Blanking the first `COMB_WIDTH` clocks of this line.
    comb: bool,

    audio: Audio,
}

impl Tia {
    /// A TIA for a known TV standard.
    #[must_use]
    pub fn new(format: TvFormat) -> Self {
        let mut tia = Self::detecting();
        tia.set_format(format);
        tia
    }

    /// A TIA that classifies the TV standard from the program's VSYNC
    /// spacing. Renders as NTSC until then.
    #[must_use]
    pub fn detecting() -> Self {
        let format = TvFormat::default();
        let mut framebuffer = vec![0; FB_WIDTH * FB_HEIGHT * 4];
        for pixel in framebuffer.chunks_exact_mut(4) {
            pixel[3] = 0xFF;
        }
        Self {
            framebuffer,
            format,
            format_locked: false,
            probe: FormatProbe::new(),
            x: -HBLANK_CLOCKS,
            y: 0,
            in_hblank: true,
            wait_for_hblank: false,
            vsync: false,
            vblank: false,
            frame_ready: false,
            frame_count: 0,
            lines_since_vsync: 0,
            players: [Player::default(), Player::default()],
            missiles: [Missile::default(), Missile::default()],
            ball: Ball::default(),
            playfield: Playfield::default(),
            collisions: Collisions::empty(),
            playfield_priority: false,
            score_mode: false,
            colours: [0; 4],
            hmove: None,
            comb: false,
            audio: Audio::new(format.cpu_hz()),
        }
    }

    /// Fix the TV standard and stop classifying.
    pub fn set_format(&mut self, format: TvFormat) {
        self.format = format;
        self.format_locked = true;
        self.audio.set_cpu_hz(format.cpu_hz());
    }

    #[must_use]
    pub fn format(&self) -> TvFormat {
        self.format
    }

    /// The TV standard, once given or classified.
    #[must_use]
    pub fn detected_format(&self) -> Option<TvFormat> {
        self.format_locked.then_some(self.format)
    }

    /// Write a TIA register. Only A5-A0 are decoded.
    pub fn write(&mut self, reg: u16, value: u8) {
        let reg = reg & 0x3F;
        match reg {
            0x00 => self.write_vsync(value & 0x02 != 0),
            0x01 => self.vblank = value & 0x02 != 0,
            0x02 => self.wait_for_hblank = true,
            0x03 => {
                self.x = -HBLANK_CLOCKS;
                self.in_hblank = true;
            }
            0x04 | 0x05 => {
                let i = usize::from(reg - 0x04);
                self.players[i].copies = value & 0x07;
                self.missiles[i].copies = value & 0x07;
                self.missiles[i].size = 1 << ((value >> 4) & 0x03);
            }
            0x06..=0x09 => self.colours[usize::from(reg - 0x06)] = value & 0xFE,
            0x0A => {
                self.playfield.reflect = value & 0x01 != 0;
                self.score_mode = value & 0x02 != 0;
                self.playfield_priority = value & 0x04 != 0;
                self.ball.size = 1 << ((value >> 4) & 0x03);
            }
            0x0B | 0x0C => self.players[usize::from(reg - 0x0B)].reflect = value & 0x08 != 0,
            0x0D => self.playfield.write_pf0(value),
            0x0E => self.playfield.write_pf1(value),
            0x0F => self.playfield.write_pf2(value),
            0x10 | 0x11 => {
                self.players[usize::from(reg - 0x10)].reset_position(self.x, self.in_hblank);
            }
            0x12 | 0x13 => {
                self.missiles[usize::from(reg - 0x12)].reset_position(self.x, self.in_hblank);
            }
            0x14 => self.ball.reset_position(self.x, self.in_hblank),
            0x15..=0x1A => self.audio.write(reg, value),
            0x1B => {
                self.players[0].graphics = value;
                self.players[1].graphics_delayed = self.players[1].graphics;
            }
            0x1C => {
                self.players[1].graphics = value;
                self.players[0].graphics_delayed = self.players[0].graphics;
                self.ball.enabled_delayed = self.ball.enabled;
            }
            0x1D | 0x1E => self.missiles[usize::from(reg - 0x1D)].enabled = value & 0x02 != 0,
            0x1F => self.ball.enabled = value & 0x02 != 0,
            0x20 | 0x21 => {
                self.players[usize::from(reg - 0x20)].motion = objects::motion_from_register(value);
            }
            0x22 | 0x23 => {
                self.missiles[usize::from(reg - 0x22)].motion = objects::motion_from_register(value);
            }
            0x24 => self.ball.motion = objects::motion_from_register(value),
            0x25 | 0x26 => {
                self.players[usize::from(reg - 0x25)].vertical_delay = value & 0x01 != 0;
            }
            0x27 => self.ball.vertical_delay = value & 0x01 != 0,
            0x28 | 0x29 => self.missiles[usize::from(reg - 0x28)].locked = value & 0x02 != 0,
            0x2A => {
                self.hmove = Some(if self.in_hblank {
                    HmoveStrobe::Early
                } else {
                    HmoveStrobe::Late
                });
            }
            0x2B => {
                self.players[0].motion = 0;
                self.players[1].motion = 0;
                self.missiles[0].motion = 0;
                self.missiles[1].motion = 0;
                self.ball.motion = 0;
            }
            0x2C => self.collisions = Collisions::empty(),
            _ => log::debug!("TIA write to unused register {reg:#04X} = {value:#04X}"),
        }
    }

    fn write_vsync(&mut self, on: bool) {
        if on && !self.vsync {
            self.frame_ready = true;
            self.frame_count += 1;
            if !self.format_locked
                && let Some(format) = self.probe.observe(self.lines_since_vsync)
            {
                log::info!("TV format classified as {format:?} after {} frames", self.frame_count);
                self.set_format(format);
            }
            self.lines_since_vsync = 0;
        } else if !on && self.vsync {
            self.y = -self.format.top_border();
        }
        self.vsync = on;
    }

    /// Bits 7-6 of collision register `reg` (0-7).
    #[must_use]
    pub fn collision_register(&self, reg: u16) -> u8 {
        self.collisions.register(reg)
    }

    #[must_use]
    pub fn collisions(&self) -> Collisions {
        self.collisions
    }

    fn apply_motion(&mut self, extra: i16) {
        for p in &mut self.players {
            p.apply_motion(extra);
        }
        for m in &mut self.missiles {
            m.apply_motion(extra);
        }
        self.ball.apply_motion(extra);
    }

    fn start_line(&mut self) {
        self.x = -HBLANK_CLOCKS;
        self.in_hblank = true;
        self.wait_for_hblank = false;
        self.y = (self.y + 1).min(MAX_LINE);
        self.lines_since_vsync = self.lines_since_vsync.saturating_add(1);
        if self.hmove == Some(HmoveStrobe::Late) {
            self.hmove = None;
            self.apply_motion(LATE_HMOVE_EXTRA);
            self.comb = true;
        }
    }

    /// Resolve object bits, latch collisions and pick a colour register.
    fn resolve_pixel(&mut self, beam: i16) -> u8 {
        let mut objects = Objects::empty();
        objects.set(Objects::PF, self.playfield.pixel(beam));
        objects.set(Objects::BL, self.ball.pixel(beam));
        objects.set(Objects::P0, self.players[0].pixel(beam));
        objects.set(Objects::P1, self.players[1].pixel(beam));
        objects.set(Objects::M0, self.missiles[0].pixel(beam));
        objects.set(Objects::M1, self.missiles[1].pixel(beam));
        self.collisions |= Collisions::between(objects);

        let [p0, p1, pf, bk] = self.colours;
        let playfield_colour = if self.score_mode && objects.contains(Objects::PF) {
            if beam < 80 { p0 } else { p1 }
        } else {
            pf
        };
        let pfbl = objects.intersects(Objects::PF | Objects::BL);
        let p0m0 = objects.intersects(Objects::P0 | Objects::M0);
        let p1m1 = objects.intersects(Objects::P1 | Objects::M1);

        if self.playfield_priority {
            if pfbl {
                pf
            } else if p0m0 {
                p0
            } else if p1m1 {
                p1
            } else {
                bk
            }
        } else if p0m0 {
            p0
        } else if p1m1 {
            p1
        } else if pfbl {
            playfield_colour
        } else {
            bk
        }
    }

    fn draw_pixel(&mut self) {
        let beam = self.x;
        let colour = if self.vblank || self.comb {
            0
        } else {
            self.resolve_pixel(beam)
        };
        if (0..FB_HEIGHT as i16).contains(&self.y) {
            let [r, g, b] = palette::rgb(self.format.palette()[usize::from(colour >> 1)]);
            let offset = (self.y as usize * FB_WIDTH + beam as usize) * 4;
            self.framebuffer[offset..offset + 3].copy_from_slice(&[r, g, b]);
        }
    }

    /// Returns true once per completed frame.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    /// RGBA8 pixels, `FB_WIDTH` x `FB_HEIGHT`.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    #[must_use]
    pub fn wait_for_hblank(&self) -> bool {
        self.wait_for_hblank
    }

    #[must_use]
    pub fn x(&self) -> i16 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i16 {
        self.y
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn in_vblank(&self) -> bool {
        self.vblank
    }

    #[must_use]
    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    #[must_use]
    pub fn player(&self, index: usize) -> &Player {
        &self.players[index & 1]
    }

    #[must_use]
    pub fn missile(&self, index: usize) -> &Missile {
        &self.missiles[index & 1]
    }

    #[must_use]
    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    #[must_use]
    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut Audio {
        &mut self.audio
    }
}

impl Tickable for Tia {
    /// One colour clock.
    fn tick(&mut self) {
        for i in 0..2 {
            if self.missiles[i].locked {
                self.missiles[i].x = self.players[i].missile_lock_position();
            }
        }
        if self.hmove == Some(HmoveStrobe::Early) {
            self.hmove = None;
            self.apply_motion(0);
        }

        if self.x >= 0 {
            if self.x == 0 {
                self.in_hblank = false;
            } else if self.x == COMB_WIDTH {
                self.comb = false;
            }
            self.draw_pixel();
        }

        if self.x.rem_euclid(4) == 3 {
            self.playfield.latch();
        }

        self.x += 1;
        if self.x == FB_WIDTH as i16 {
            self.start_line();
        }
    }
}

impl Observable for Tia {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "x" => Some(self.x.into()),
            "y" => Some(self.y.into()),
            "frame_count" => Some(self.frame_count.into()),
            "format" => Some(format!("{:?}", self.format).into()),
            "format_locked" => Some(self.format_locked.into()),
            "hblank" => Some(self.in_hblank.into()),
            "vblank" => Some(self.vblank.into()),
            "vsync" => Some(self.vsync.into()),
            "wsync" => Some(self.wait_for_hblank.into()),
            "collisions" => Some(self.collisions.bits().into()),
            "playfield" => Some(self.playfield.active().into()),
            "p0.x" => Some(self.players[0].x.into()),
            "p1.x" => Some(self.players[1].x.into()),
            "m0.x" => Some(self.missiles[0].x.into()),
            "m1.x" => Some(self.missiles[1].x.into()),
            "bl.x" => Some(self.ball.x.into()),
            "p0.motion" => Some(self.players[0].motion.into()),
            "p1.motion" => Some(self.players[1].motion.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "x",
            "y",
            "frame_count",
            "format",
            "format_locked",
            "hblank",
            "vblank",
            "vsync",
            "wsync",
            "collisions",
            "playfield",
            "p0.x",
            "p1.x",
            "m0.x",
            "m1.x",
            "bl.x",
            "p0.motion",
            "p1.motion",
        ]
    }
}
