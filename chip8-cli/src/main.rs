//! Entrypoint for CLI
mod error;
mod term;

use std::{env, fs, process, time::Instant};

use chip8::{prelude::*, IMPL_VERSION};
use log::{error, info, LevelFilter};

use crate::{error::AppError, term::TermDevices};

static USAGE: &str = r#"
usage: chip8 CMD FILE [OPTIONS]

commands:
    run     Run the target ROM file in the terminal
    dis     Disassemble the the target ROM into readable assembly
    dump    Run the target ROM headless for STEPS cycles, then print the screen

options:
    --hz N  Instructions executed per second (run only, default 700)

keys:
    1 2 3 4
    q w e r
    a s d f
    z x c v     Esc quits

examples:
    chip8 run breakout.rom --hz 1000
    chip8 dis breakout.rom
    chip8 dump breakout.rom 5000
"#;

/// Roughly how long a terminal key press is held down for.
const KEY_HOLD_SECS: f64 = 0.1;

fn run_interactive(filepath: &str, hz: Hz) -> Result<(), AppError> {
    let bytecode = fs::read(filepath)?;

    let mut vm = Chip8Vm::new(Chip8Conf {
        clock_frequency: Some(hz),
        ..Chip8Conf::default()
    });
    vm.load_bytecode(&bytecode)?;

    let hold_polls = (hz.0 as f64 * KEY_HOLD_SECS) as u32;
    let mut scheduler = Scheduler::new(vm, TermDevices::new(hold_polls)?);

    // Terminal is restored when the scheduler is dropped, before errors are reported.
    scheduler.run()?;

    Ok(())
}

fn run_disassembler(filepath: &str) -> Result<(), AppError> {
    let bytecode = fs::read(filepath)?;
    Disassembler::new(&bytecode).print_bytecode()?;
    Ok(())
}

fn run_dump(filepath: &str, steps: usize) -> Result<(), AppError> {
    let bytecode = fs::read(filepath)?;

    let mut vm = Chip8Vm::new(Chip8Conf {
        clock_frequency: None,
        ..Chip8Conf::default()
    });
    vm.load_bytecode(&bytecode)?;

    let mut scheduler = Scheduler::new(vm, NullDevices);

    let start = Instant::now();
    let result = scheduler.run_simulated(steps);
    info!(
        "time taken: {}ms",
        start.elapsed().as_nanos() as f64 / 1000000.0
    ); // to millis

    println!("{}", scheduler.vm().dump_display()?);

    result?;

    Ok(())
}

fn main() {
    if let Err(err) = simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("logger: {err}");
    }

    let result = match parse_args(env::args().skip(1)) {
        Some(Cmd::Run { filepath, hz }) => run_interactive(&filepath, hz),
        Some(Cmd::Dis { filepath }) => run_disassembler(&filepath),
        Some(Cmd::Dump { filepath, steps }) => run_dump(&filepath, steps),
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            process::exit(64)
        }
    };

    if let Err(err) = result {
        match err.fault() {
            Some(fault) => error!("machine halted: {fault}"),
            None => error!("{err}"),
        }
        process::exit(1)
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Cmd> {
    let cmd = args.next()?;

    // don't format me T.T
    match cmd.as_str() {
        "run" => {
            let filepath = args.next()?;
            let mut hz = Hz(chip8::constants::CLOCK_FREQUENCY);

            while let Some(opt) = args.next() {
                match opt.as_str() {
                    "--hz" => hz = Hz(args.next()?.parse::<u64>().ok().filter(|n| *n > 0)?),
                    _ => return None,
                }
            }

            Some(Cmd::Run { filepath, hz })
        }
        "dis" => Some(Cmd::Dis {
            filepath: args.next()?,
        }),
        "dump" => Some(Cmd::Dump {
            filepath: args.next()?,
            steps: args.next()?.parse::<usize>().ok()?,
        }),
        _ => None,
    }
}

fn print_usage() {
    println!("Chip8 v{IMPL_VERSION}");
    println!("{USAGE}");
}

#[derive(Debug, PartialEq, Eq)]
enum Cmd {
    /// Run file
    Run { filepath: String, hz: Hz },
    /// Disassemble
    Dis { filepath: String },
    /// Headless run
    Dump { filepath: String, steps: usize },
}
