mod clock;
pub mod constants;
mod cpu;
mod devices;
mod disasm;
mod display;
mod error;
mod font;
mod keymap;
mod keypad;
mod memory;
mod op;
mod registers;
mod scheduler;
mod stack;
mod timers;
mod vm;

pub use self::{
    constants::{Address, DisplayBuffer},
    cpu::Chip8Cpu,
    devices::{Devices, NullDevices},
    disasm::{Disassembler, Instr},
    display::Framebuffer,
    error::{Chip8Error, Chip8Result, Fault},
    font::{glyph, glyph_address, FONTSET},
    keymap::KeyMap,
    keypad::{KeyCode, Keypad},
    memory::Memory,
    op::Op,
    registers::Registers,
    scheduler::Scheduler,
    stack::CallStack,
    timers::Timers,
    vm::{Chip8Conf, Chip8Vm, Flow, Hz},
};

/// Version of the virtual machine implementation.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        cpu::Chip8Cpu,
        devices::{Devices, NullDevices},
        disasm::Disassembler,
        error::{Chip8Error, Chip8Result, Fault},
        keymap::KeyMap,
        keypad::KeyCode,
        scheduler::Scheduler,
        vm::{Chip8Conf, Chip8Vm, Flow, Hz},
    };
}
