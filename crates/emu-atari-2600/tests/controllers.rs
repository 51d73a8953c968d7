//! Controller wiring seen by a program: joysticks, paddles, keypads and
//! console switches.

mod common;

use common::{Op, ScriptCpu, ntsc_machine, patterned_rom};
use emu_atari_2600::{Atari2600, CYCLES_PER_LINE, Input};
use emu_core::{Bus, Observable, Value};

fn idle_machine() -> Atari2600<ScriptCpu> {
    ntsc_machine(patterned_rom(4096), ScriptCpu::new(vec![], None))
}

#[test]
fn paddle_charge_is_timed_in_scanlines() {
    let mut machine = idle_machine();
    machine.bus_mut().write(0x0001, 0x80);
    machine.bus_mut().write(0x0001, 0x00);
    machine.set_input(Input::default());

    // Joysticks are active by default, so paddle positions read as centred:
    // 190 lines to charge.
    machine.run_cycles(189 * CYCLES_PER_LINE as u32);
    assert_eq!(machine.bus_mut().read(0x0008) & 0x80, 0);
    machine.run_cycles(CYCLES_PER_LINE as u32);
    assert_eq!(machine.bus_mut().read(0x0008) & 0x80, 0x80);
}

/// Frame loop of a paddle game: dump, release, then poll INPT0 on every
/// line without ever touching the fire buttons.
fn paddle_game() -> Vec<Vec<Op>> {
    let mut frame = vec![
        Op::Write(0x00, 0x02),
        Op::Write(0x01, 0x80),
        Op::Cycles(3 * 76),
        Op::Write(0x00, 0x00),
        Op::Write(0x01, 0x00),
    ];
    for _ in 0..259 {
        frame.push(Op::Read(0x0008));
        frame.push(Op::Cycles(76));
    }
    vec![frame]
}

#[test]
fn paddle_polling_switches_input_to_paddles() {
    let mut machine = ntsc_machine(patterned_rom(4096), ScriptCpu::new(paddle_game(), Some(0)));
    machine.step().expect("reset");
    for _ in 0..25 {
        machine.step().expect("frame");
    }
    assert_eq!(machine.query("input.paddles"), Some(Value::Bool(true)));

    // Joystick directions are now ignored, paddle buttons are not.
    let mut input = Input::default();
    input.joysticks[0].up = true;
    input.paddles[0].button = true;
    input.paddles[0].position = 135;
    machine.set_input(input);
    assert_eq!(machine.bus_mut().read(0x0280), 0x7F);
}

#[test]
fn keypad_rows_scan_through_port_a() {
    let mut machine = idle_machine();
    let mut input = Input::default();
    // Right keypad "#": row 3, column 2 (INPT5).
    input.keypads[1].set(3, 2, true);
    machine.set_input(input.clone());

    machine.bus_mut().write(0x0281, 0x0F);
    machine.bus_mut().write(0x0280, 0x07);
    assert_eq!(machine.bus_mut().read(0x000D) & 0x80, 0, "column 2 pulled low");
    assert_eq!(machine.bus_mut().read(0x000B) & 0x80, 0x80);

    machine.bus_mut().write(0x0280, 0x0E);
    assert_eq!(machine.bus_mut().read(0x000D) & 0x80, 0x80, "row 3 not selected");

    // Once scanned, the right joystick is ignored.
    input.joysticks[1].down = true;
    machine.set_input(input);
    assert!(!machine.bus().input().joysticks[1].down);
}

#[test]
fn console_switches_and_difficulty() {
    let mut machine = idle_machine();
    assert_eq!(machine.bus_mut().read(0x0282), 0x0B);

    machine.set_input(Input {
        reset: true,
        left_difficulty: true,
        ..Input::default()
    });
    assert_eq!(machine.bus_mut().read(0x0282), 0x4A);
}

#[test]
fn latched_fire_button() {
    let mut machine = idle_machine();
    machine.bus_mut().write(0x0001, 0x40);

    let mut input = Input::default();
    input.joysticks[1].button = true;
    machine.set_input(input);
    machine.run_cycles(1);
    machine.set_input(Input::default());
    machine.run_cycles(1);

    assert_eq!(machine.bus_mut().read(0x000D) & 0x80, 0);
    assert_eq!(machine.bus_mut().read(0x000C) & 0x80, 0x80);
}
