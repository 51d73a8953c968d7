//! Saving, restoring and continuing must be indistinguishable from never
//! having saved.

mod common;

use common::{Op, ScriptCpu, init_logger, ntsc_machine, patterned_rom};
use emu_atari_2600::{Atari2600, Atari2600Config, Input, MapperKind, TvFormat};

/// Busy program: bank switches, graphics, sound and timer writes each frame.
fn busy_script() -> Vec<Vec<Op>> {
    vec![
        vec![Op::Write(0x15, 0x08), Op::Write(0x17, 0x03), Op::Write(0x19, 0x0A), Op::Cycles(6)],
        vec![Op::Write(0x00, 0x02), Op::Cycles(3 * 76), Op::Write(0x00, 0x00), Op::Cycles(2)],
        vec![Op::Write(0x09, 0x84), Op::Write(0x0D, 0xF0), Op::Write(0x0F, 0xAA), Op::Cycles(9)],
        vec![Op::Write(0x1FF9, 0), Op::Read(0x1100), Op::Write(0x0296, 0x20), Op::Cycles(8)],
        vec![Op::Write(0x0002, 0), Op::Write(0x1B, 0x3C), Op::Write(0x10, 0), Op::Cycles(5)],
        vec![Op::Read(0x0284), Op::Read(0x000C), Op::Write(0x1FF8, 0), Op::Cycles(7)],
        vec![Op::Write(0x0002, 0), Op::Cycles(76 * 30)],
    ]
}

fn input_for(step: usize) -> Input {
    let mut input = Input::default();
    input.joysticks[0].button = step % 7 == 0;
    input.joysticks[0].left = step % 3 == 0;
    input
}

fn run(machine: &mut Atari2600<ScriptCpu>, steps: std::ops::Range<usize>) -> (Vec<u8>, Vec<u8>) {
    let mut sound = Vec::new();
    let mut buffer = vec![0; 1024];
    for step in steps {
        machine.set_input(input_for(step));
        machine.step().expect("step");
        sound.extend_from_slice(machine.read_sound(&mut buffer));
    }
    (machine.framebuffer().to_vec(), sound)
}

#[test]
fn restored_machine_runs_identically() {
    let mut live = ntsc_machine(patterned_rom(8192), ScriptCpu::new(busy_script(), Some(1)));
    run(&mut live, 0..500);

    let snapshot = live.save_snapshot().expect("save");
    let mut restored = live.load_snapshot(&snapshot).expect("load");
    assert_eq!(restored.cycles(), live.cycles());
    assert_eq!(restored.bus().cartridge().kind(), live.bus().cartridge().kind());
    assert_eq!(restored.bus().cartridge().current_bank(), live.bus().cartridge().current_bank());

    let expected = run(&mut live, 500..1500);
    let actual = run(&mut restored, 500..1500);
    assert_eq!(actual.0, expected.0, "framebuffer");
    assert_eq!(actual.1, expected.1, "sound");
    assert_eq!(restored.cpu(), live.cpu());
}

#[test]
fn failed_load_leaves_machine_untouched() {
    let mut machine = ntsc_machine(patterned_rom(4096), ScriptCpu::new(busy_script(), Some(1)));
    run(&mut machine, 0..50);
    let cycles = machine.cycles();
    assert!(machine.load_snapshot(&[0x1F, 0x8B, 0x08, 0x00]).is_err());
    assert_eq!(machine.cycles(), cycles);
    assert!(machine.step().is_ok());
}

#[test]
fn forced_flat_mapper_stays_flat_after_restore() {
    init_logger();
    let script = vec![vec![Op::Cycles(10)], vec![Op::Write(0x1FF8, 0), Op::Read(0x1000)]];
    let cpu = ScriptCpu::new(script, None);
    let config = Atari2600Config::new(patterned_rom(8192))
        .with_tv_format(TvFormat::Ntsc)
        .with_mapper(MapperKind::Unknown);
    let mut live = Atari2600::new(&config, || cpu.clone()).expect("machine");
    // Reset sequence, then the idle instruction.
    live.step().expect("reset");
    live.step().expect("idle");

    let mut restored = live.load_snapshot(&live.save_snapshot().expect("save")).expect("load");
    assert!(!restored.bus().cartridge().is_undetermined());

    // An F8 hotspot must not settle a forced mapper.
    live.step().expect("live");
    restored.step().expect("restored");
    assert_eq!(live.bus().cartridge().kind(), MapperKind::Unknown);
    assert_eq!(restored.bus().cartridge().kind(), MapperKind::Unknown);
    assert_eq!(restored.cpu().reads, live.cpu().reads);
    assert_eq!(restored.cpu().reads.len(), 1);
}
