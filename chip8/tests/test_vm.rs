use std::time::Duration;

use chip8::{constants::*, prelude::*};

const MAZE: &[u8] = include_bytes!("../programs/maze");

fn headless(bytecode: &[u8]) -> Chip8Vm {
    let mut vm = Chip8Vm::new(Chip8Conf {
        clock_frequency: None,
        seed: Some(7),
        ..Chip8Conf::default()
    });
    vm.load_bytecode(bytecode).unwrap();
    vm
}

fn v(vm: &Chip8Vm, index: u8) -> u8 {
    vm.cpu().registers().get(index).unwrap()
}

#[test]
#[rustfmt::skip]
fn test_load_and_add() {
    let mut vm = headless(&[
        0x60, 0x05, // LD v0, 5
        0x70, 0x03, // ADD v0, 3
    ]);

    vm.run_steps(2).unwrap();
    assert_eq!(v(&vm, 0), 8);
    assert_eq!(vm.cpu().registers().pc(), 0x204);
}

#[test]
#[rustfmt::skip]
fn test_add_carry() {
    let mut vm = headless(&[
        0x60, 0xFF, // LD v0, 0xFF
        0x61, 0x01, // LD v1, 1
        0x80, 0x14, // ADD v0, v1
    ]);

    vm.run_steps(3).unwrap();
    assert_eq!(v(&vm, 0), 0);
    assert_eq!(v(&vm, 0xF), 1);
}

#[test]
#[rustfmt::skip]
fn test_sub_borrow() {
    let mut vm = headless(&[
        0x60, 0x05, // LD v0, 5
        0x61, 0x06, // LD v1, 6
        0x80, 0x15, // SUB v0, v1
    ]);

    vm.run_steps(3).unwrap();
    assert_eq!(v(&vm, 0), 0xFF);
    assert_eq!(v(&vm, 0xF), 0);
}

#[test]
#[rustfmt::skip]
fn test_flag_register_as_operand() {
    // The flag result overwrites the arithmetic result when Vx is VF.
    let mut vm = headless(&[
        0x6F, 0xFF, // LD vF, 0xFF
        0x61, 0x02, // LD v1, 2
        0x8F, 0x14, // ADD vF, v1
    ]);

    vm.run_steps(3).unwrap();
    assert_eq!(v(&vm, 0xF), 1);
}

#[test]
fn test_call_return() {
    let mut bytecode = vec![0u8; 0x102];
    bytecode[0..2].copy_from_slice(&[0x23, 0x00]); // CALL 0x300
    bytecode[2..4].copy_from_slice(&[0x60, 0x01]); // LD v0, 1
    bytecode[0x100..0x102].copy_from_slice(&[0x00, 0xEE]); // RET

    let mut vm = headless(&bytecode);

    assert_eq!(vm.step(), Ok(Flow::Jump));
    assert_eq!(vm.cpu().registers().pc(), 0x300);
    assert_eq!(vm.cpu().stack().len(), 1);

    assert_eq!(vm.step(), Ok(Flow::Jump));
    assert_eq!(vm.cpu().registers().pc(), 0x202);
    assert!(vm.cpu().stack().is_empty());

    vm.step().unwrap();
    assert_eq!(v(&vm, 0), 1);
}

#[test]
fn test_stack_overflow() {
    // Recurse forever.
    let mut vm = headless(&[0x22, 0x00]); // CALL 0x200

    vm.run_steps(16).unwrap();
    assert_eq!(vm.cpu().stack().len(), 16);

    let err = vm.step().unwrap_err();
    let fault = err.fault().unwrap();
    assert_eq!(fault.cause, Chip8Error::StackOverflow);
    assert_eq!(fault.pc, 0x200);
    assert_eq!(fault.opcode, Some(0x2200));
    assert_eq!(vm.fault(), Some(fault));
}

#[test]
fn test_unknown_opcode() {
    let mut vm = headless(&[0xFF, 0xFF]);

    let err = vm.step().unwrap_err();
    assert_eq!(
        err.fault().map(|f| &f.cause),
        Some(&Chip8Error::UnknownOpcode(0xFFFF))
    );

    // Loading a program clears the fault.
    vm.load_bytecode(&[0x60, 0x01]).unwrap();
    assert!(vm.fault().is_none());
    assert_eq!(vm.step(), Ok(Flow::Ok));
}

#[test]
fn test_program_too_large() {
    let mut vm = headless(&[0x60, 0x01]);
    let err = vm.load_bytecode(&vec![0; PROGRAM_CAPACITY + 1]).unwrap_err();

    assert_eq!(
        err,
        Chip8Error::LargeProgram {
            size: PROGRAM_CAPACITY + 1,
            capacity: PROGRAM_CAPACITY,
        }
    );

    // Previous program is intact.
    assert_eq!(vm.cpu().memory().read_word(MEM_START), Ok(0x6001));
}

#[test]
#[rustfmt::skip]
fn test_draw_twice_restores_screen() {
    let mut vm = headless(&[
        0x60, 0x0A, // LD v0, 10
        0x61, 0x05, // LD v1, 5
        0x62, 0x07, // LD v2, 7
        0xF2, 0x29, // LD F, v2
        0xD0, 0x15, // DRW v0, v1, 5
        0xD0, 0x15, // DRW v0, v1, 5
    ]);

    vm.run_steps(5).unwrap();
    assert_eq!(v(&vm, 0xF), 0);
    assert!(vm.display_buffer().iter().any(|px| *px));

    assert_eq!(vm.step(), Ok(Flow::Draw));
    assert_eq!(v(&vm, 0xF), 1);
    assert!(vm.display_buffer().iter().all(|px| !*px));
}

#[test]
#[rustfmt::skip]
fn test_draw_wraps() {
    let mut vm = headless(&[
        0x60, 0x3C, // LD v0, 60
        0x61, 0x00, // LD v1, 0
        0xA2, 0x08, // LD I, 0x208
        0xD0, 0x11, // DRW v0, v1, 1
        0xFF, 0x00, // sprite
    ]);

    vm.run_steps(4).unwrap();
    let display = vm.cpu().display();
    for x in [60, 61, 62, 63, 0, 1, 2, 3] {
        assert!(display.pixel(x, 0), "pixel {x} should be lit");
    }
    assert!(!display.pixel(4, 0));
    assert!(!display.pixel(59, 0));
}

#[test]
#[rustfmt::skip]
fn test_timers_decoupled_from_clock() {
    let mut vm = Chip8Vm::new(Chip8Conf {
        clock_frequency: Some(Hz(10_000)),
        seed: Some(0),
        ..Chip8Conf::default()
    });
    vm.load_bytecode(&[
        0x60, 0xC8, // LD v0, 200
        0xF0, 0x15, // LD DT, v0
        0x12, 0x04, // JP 0x204
    ]).unwrap();

    // One simulated second at 10kHz.
    let mut sched = Scheduler::new(vm, NullDevices);
    for _ in 0..10_000 {
        sched.cycle(Duration::from_micros(100)).unwrap();
    }

    let delay = sched.vm().cpu().timers().delay();
    let ticks = 200 - delay;
    assert!((59..=60).contains(&ticks), "{ticks} timer ticks");
}

#[test]
#[rustfmt::skip]
fn test_timers_at_slow_clock() {
    let bytecode = [
        0x60, 0xC8, // LD v0, 200
        0xF0, 0x15, // LD DT, v0
        0x12, 0x04, // JP 0x204
    ];
    let conf = Chip8Conf {
        clock_frequency: Some(Hz(10)),
        seed: Some(0),
        ..Chip8Conf::default()
    };

    // Timers start counting from the second cycle.
    let mut vm = Chip8Vm::new(conf.clone());
    vm.load_bytecode(&bytecode).unwrap();
    let mut sched = Scheduler::new(vm, NullDevices);
    sched.cycle(Duration::ZERO).unwrap();
    for _ in 0..10 {
        sched.cycle(Duration::from_millis(100)).unwrap();
    }
    let ticks = 200 - sched.vm().cpu().timers().delay();
    assert!((59..=60).contains(&ticks), "{ticks} timer ticks");

    // Simulated time advances one 100ms instruction period per cycle,
    // and the first cycle's ticks land before the delay is set.
    let mut vm = Chip8Vm::new(conf);
    vm.load_bytecode(&bytecode).unwrap();
    let mut sched = Scheduler::new(vm, NullDevices);
    sched.run_simulated(11).unwrap();
    let ticks = 200 - sched.vm().cpu().timers().delay();
    assert!((59..=60).contains(&ticks), "{ticks} timer ticks");
}

#[test]
fn test_timers_drop_stall_backlog() {
    let mut vm = headless(&[
        0x60, 0xC8, // LD v0, 200
        0xF0, 0x15, // LD DT, v0
        0x12, 0x04, // JP 0x204
    ]);
    vm.run_steps(2).unwrap();

    let mut sched = Scheduler::new(vm, NullDevices);
    sched.cycle(Duration::from_secs(10)).unwrap();

    assert_eq!(sched.vm().cpu().timers().delay(), 200 - MAX_TIMER_CATCHUP as u8);
}

#[test]
fn test_maze_runs() {
    let mut vm = headless(MAZE);

    vm.run_steps(10_000).unwrap();
    assert!(vm.fault().is_none());
    // Ends spinning on the last jump.
    assert_eq!(vm.cpu().registers().pc(), 0x218);
    assert!(vm.display_buffer().iter().any(|px| *px));
}

#[test]
fn test_maze_scheduled() {
    let vm = headless(MAZE);
    let mut sched = Scheduler::new(vm, NullDevices);

    assert_eq!(sched.run_simulated(5_000), Ok(Flow::Jump));
}

#[test]
fn test_disassemble_maze() {
    let mut buf = String::new();
    Disassembler::new(MAZE).disassemble(&mut buf).unwrap();

    let lines: Vec<&str> = buf.lines().collect();
    assert_eq!(lines.len(), MAZE.len() / 2);
    assert_eq!(lines[0], "0x0200 A21E LD I, 0x21E");
    assert_eq!(lines[1], "0x0202 C201 RND v2, 1");
    assert_eq!(lines[13], "0x021A 8040 0b10000000 0b01000000");
}
