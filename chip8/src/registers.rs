//! Register file.
use crate::{
    constants::*,
    error::{Chip8Error, Chip8Result},
};

pub struct Registers {
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    v: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address.
    i: Address,
    /// Program counter pointing to the next instruction to fetch.
    pc: Address,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: MEM_START as Address,
        }
    }
}

impl Registers {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn get(&self, index: u8) -> Chip8Result<u8> {
        self.v
            .get(index as usize)
            .copied()
            .ok_or(Chip8Error::InvalidRegister(index))
    }

    #[inline]
    pub fn set(&mut self, index: u8, value: u8) -> Chip8Result<()> {
        match self.v.get_mut(index as usize) {
            Some(reg) => {
                *reg = value;
                Ok(())
            }
            None => Err(Chip8Error::InvalidRegister(index)),
        }
    }

    /// Write the `VF` flag register as `1` or `0`.
    #[inline(always)]
    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REGISTER] = flag as u8;
    }

    #[inline(always)]
    pub fn flag(&self) -> u8 {
        self.v[FLAG_REGISTER]
    }

    #[inline(always)]
    pub fn index(&self) -> Address {
        self.i
    }

    #[inline(always)]
    pub fn set_index(&mut self, address: Address) {
        self.i = address;
    }

    #[inline(always)]
    pub fn pc(&self) -> Address {
        self.pc
    }

    #[inline(always)]
    pub fn set_pc(&mut self, address: Address) {
        self.pc = address;
    }

    /// Move the program counter past one instruction.
    #[inline(always)]
    pub fn advance_pc(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Skip over the next instruction.
    ///
    /// The program counter already points past the current instruction,
    /// so this is the same two byte advance as [`Registers::advance_pc`].
    #[inline(always)]
    pub fn skip(&mut self) {
        self.advance_pc();
    }

    /// Move the program counter back onto the previous instruction.
    #[inline(always)]
    pub(crate) fn rewind_pc(&mut self) {
        self.pc = self.pc.wrapping_sub(2);
    }

    /// Registers `V0` through `Vx` inclusive.
    pub fn range(&self, x: u8) -> Chip8Result<&[u8]> {
        self.v
            .get(..=x as usize)
            .ok_or(Chip8Error::InvalidRegister(x))
    }

    /// Mutable registers `V0` through `Vx` inclusive.
    pub fn range_mut(&mut self, x: u8) -> Chip8Result<&mut [u8]> {
        self.v
            .get_mut(..=x as usize)
            .ok_or(Chip8Error::InvalidRegister(x))
    }

    pub fn as_slice(&self) -> &[u8; REGISTER_COUNT] {
        &self.v
    }
}
