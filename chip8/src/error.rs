//! Result and errors.
use std::fmt::{self, Display, Formatter};

use crate::constants::Address;

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chip8Error {
    /// Attempt to load a bytecode program that can't fit in memory.
    LargeProgram { size: usize, capacity: usize },
    /// Memory access past the end of RAM.
    AddressOutOfRange(usize),
    /// Register index outside of `V0`-`VF`.
    InvalidRegister(u8),
    /// Key identifier outside of `0x0`-`0xF`.
    InvalidKeyCode(u8),
    /// Subroutine call with a full call stack.
    StackOverflow,
    /// Subroutine return with an empty call stack.
    StackUnderflow,
    /// Bit pattern that doesn't decode to an instruction.
    UnknownOpcode(u16),
    /// Malformed font data.
    Font(String),
    /// VM error during interpreter loop.
    ///
    /// The machine is halted until a new program is loaded.
    Runtime(Box<Fault>),
    Fmt(fmt::Error),
}

/// Execution error with the location it happened at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Address of the failing instruction.
    pub pc: Address,
    /// Raw instruction that was being executed.
    ///
    /// `None` when the instruction itself couldn't be fetched.
    pub opcode: Option<u16>,
    pub cause: Chip8Error,
}

impl Chip8Error {
    /// The fault that halted the machine, if this is a runtime error.
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Self::Runtime(fault) => Some(&**fault),
            _ => None,
        }
    }
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::LargeProgram { size, capacity } => write!(
                f,
                "program too large for VM memory: {size} bytes, capacity is {capacity} bytes"
            ),
            Self::AddressOutOfRange(addr) => write!(f, "address out of range: 0x{addr:04X}"),
            Self::InvalidRegister(index) => write!(f, "invalid register index: {index}"),
            Self::InvalidKeyCode(key) => {
                write!(f, "keycode must be in range 0 <= keycode < 16, got {key}")
            }
            Self::StackOverflow => write!(f, "call stack overflow"),
            Self::StackUnderflow => write!(f, "call stack underflow"),
            Self::UnknownOpcode(opcode) => write!(f, "unknown opcode: {opcode:04X}"),
            Self::Font(msg) => write!(f, "font error: {}", msg),
            Self::Runtime(fault) => write!(f, "runtime error: {}", fault),
            Self::Fmt(err) => write!(f, "{}", err),
        }
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Some(opcode) => write!(
                f,
                "{} (opcode {:04X} at 0x{:04X})",
                self.cause, opcode, self.pc
            ),
            None => write!(f, "{} (fetch at 0x{:04X})", self.cause, self.pc),
        }
    }
}

impl std::error::Error for Chip8Error {}

impl From<fmt::Error> for Chip8Error {
    fn from(err: fmt::Error) -> Self {
        Chip8Error::Fmt(err)
    }
}

impl From<Fault> for Chip8Error {
    fn from(fault: Fault) -> Self {
        Chip8Error::Runtime(Box::new(fault))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fault_display() {
        let err: Chip8Error = Fault {
            pc: 0x204,
            opcode: Some(0x00EE),
            cause: Chip8Error::StackUnderflow,
        }
        .into();

        assert_eq!(
            err.to_string(),
            "runtime error: call stack underflow (opcode 00EE at 0x0204)"
        );
        assert_eq!(err.fault().map(|f| f.pc), Some(0x204));
    }
}
