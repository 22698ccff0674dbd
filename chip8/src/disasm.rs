//! Disassembler.
use std::{
    collections::HashSet,
    fmt::{self, Write as FmtWrite},
};

use crate::{
    constants::{Address, MEM_START},
    op::Op,
};

/// Single decoded instruction from a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instr {
    /// Index in the buffer where the instruction was read from.
    pub index: usize,
    /// Address in memory where the instruction is located.
    pub addr: Address,
    /// The original bytes that were read from the buffer.
    pub bytes: [u8; 2],
    /// `None` when the bytes don't decode to an instruction.
    pub op: Option<Op>,
}

impl Instr {
    /// Original bytes encoded into a `u16`.
    #[inline(always)]
    pub fn bytecode(&self) -> u16 {
        ((self.bytes[0] as u16) << 8) | (self.bytes[1] as u16)
    }
}

pub struct Disassembler<'a> {
    bytecode: &'a [u8],
}

impl<'a> Disassembler<'a> {
    pub fn new(bytecode: &'a [u8]) -> Self {
        Self { bytecode }
    }

    /// Decode every two byte word of the program.
    ///
    /// A trailing odd byte is ignored.
    pub fn instructions(&self) -> impl Iterator<Item = Instr> + 'a {
        self.bytecode
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| {
                let bytes = [pair[0], pair[1]];
                let index = i * 2;
                let instr = ((bytes[0] as u16) << 8) | bytes[1] as u16;
                Instr {
                    index,
                    addr: (MEM_START + index) as Address,
                    bytes,
                    op: Op::decode(instr).ok(),
                }
            })
    }

    /// Addresses loaded into `I`, which usually point at sprite data.
    fn data_addresses(&self) -> HashSet<Address> {
        self.instructions()
            .filter_map(|instr| match instr.op {
                Some(Op::Load_Address { address }) => Some(address),
                _ => None,
            })
            .collect()
    }

    /// Write the whole program to the given writer, one instruction per line.
    pub fn disassemble<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        let data = self.data_addresses();
        let mut in_data = false;

        for instr in self.instructions() {
            // Everything after a referenced address is treated as data, up to
            // the next word that isn't a valid instruction either.
            in_data = data.contains(&instr.addr) || (in_data && instr.op.is_none());

            let [a, b] = instr.bytes;
            match instr.op {
                Some(op) if !in_data => {
                    writeln!(w, "0x{:04X} {:04X} {}", instr.addr, instr.bytecode(), op)?
                }
                _ => writeln!(
                    w,
                    "0x{:04X} {:04X} 0b{a:08b} 0b{b:08b}",
                    instr.addr,
                    instr.bytecode()
                )?,
            }
        }

        Ok(())
    }

    pub fn print_bytecode(&self) -> fmt::Result {
        let mut s = String::new();
        self.disassemble(&mut s)?;
        println!("{}", s);
        Ok(())
    }
}
