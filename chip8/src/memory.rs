//! Main memory.
use crate::{
    constants::*,
    error::{Chip8Error, Chip8Result},
    font::FONTSET,
};

/// Flat 4KiB of byte addressable RAM.
///
/// The font lives at [`FONTSET_START`] and programs are loaded at [`MEM_START`].
pub struct Memory {
    ram: Box<[u8; MEM_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        let mut memory = Self {
            ram: Box::new([0; MEM_SIZE]),
        };
        memory.write_font();
        memory
    }
}

impl Memory {
    /// Creates memory with the built-in font already in place.
    pub fn new() -> Self {
        Default::default()
    }

    fn write_font(&mut self) {
        let start = FONTSET_START as usize;
        self.ram[start..start + FONTSET_DATA_LENGTH].copy_from_slice(&FONTSET);
    }

    /// Replace the font with custom glyph data.
    pub fn load_font(&mut self, fontset: &[u8]) -> Chip8Result<()> {
        if fontset.len() != FONTSET_DATA_LENGTH {
            return Err(Chip8Error::Font(format!(
                "fontset data must be {FONTSET_DATA_LENGTH} bytes, got {}",
                fontset.len()
            )));
        }

        let start = FONTSET_START as usize;
        self.ram[start..start + FONTSET_DATA_LENGTH].copy_from_slice(fontset);

        Ok(())
    }

    /// Copy program bytecode into the program region.
    ///
    /// Memory outside of the copied range is left untouched.
    pub fn load(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if bytecode.len() > PROGRAM_CAPACITY {
            return Err(Chip8Error::LargeProgram {
                size: bytecode.len(),
                capacity: PROGRAM_CAPACITY,
            });
        }

        self.ram[MEM_START..MEM_START + bytecode.len()].copy_from_slice(bytecode);

        Ok(())
    }

    #[inline]
    pub fn read_byte(&self, addr: usize) -> Chip8Result<u8> {
        self.ram
            .get(addr)
            .copied()
            .ok_or(Chip8Error::AddressOutOfRange(addr))
    }

    #[inline]
    pub fn write_byte(&mut self, addr: usize, value: u8) -> Chip8Result<()> {
        match self.ram.get_mut(addr) {
            Some(byte) => {
                *byte = value;
                Ok(())
            }
            None => Err(Chip8Error::AddressOutOfRange(addr)),
        }
    }

    /// Borrow `len` bytes starting at `addr`.
    ///
    /// Fails with the first address that lies outside of memory.
    pub fn read_slice(&self, addr: usize, len: usize) -> Chip8Result<&[u8]> {
        if addr + len > MEM_SIZE {
            return Err(Chip8Error::AddressOutOfRange(addr.max(MEM_SIZE)));
        }
        Ok(&self.ram[addr..addr + len])
    }

    /// Copy `data` into memory starting at `addr`.
    ///
    /// Nothing is written if any part of the range lies outside of memory.
    pub fn write_slice(&mut self, addr: usize, data: &[u8]) -> Chip8Result<()> {
        if addr + data.len() > MEM_SIZE {
            return Err(Chip8Error::AddressOutOfRange(addr.max(MEM_SIZE)));
        }
        self.ram[addr..addr + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Read the big-endian instruction word at `addr`.
    #[inline]
    pub fn read_word(&self, addr: usize) -> Chip8Result<u16> {
        let hi = self.read_byte(addr)?;
        let lo = self.read_byte(addr + 1)?;
        Ok(((hi as u16) << 8) | lo as u16)
    }

    /// Entire memory contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.ram[..]
    }

    /// Zero all memory and restore the built-in font.
    pub fn clear(&mut self) {
        self.ram.fill(0);
        self.write_font();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    #[derive(Debug, Clone)]
    struct ProgramFixture {
        bytes: Vec<u8>,
    }

    impl Arbitrary for ProgramFixture {
        fn arbitrary(g: &mut Gen) -> Self {
            let len = usize::arbitrary(g) % (PROGRAM_CAPACITY + 1);
            let bytes = (0..len).map(|_| u8::arbitrary(g)).collect();
            Self { bytes }
        }
    }

    #[quickcheck]
    fn test_load_roundtrip(program: ProgramFixture, fill: u8) -> bool {
        let mut memory = Memory::new();
        for addr in MEM_START..MEM_SIZE {
            memory.write_byte(addr, fill).unwrap();
        }
        let before = memory.as_slice().to_vec();

        memory.load(&program.bytes).unwrap();

        let end = MEM_START + program.bytes.len();
        let loaded = &memory.as_slice()[MEM_START..end] == program.bytes.as_slice();
        let below = memory.as_slice()[..MEM_START] == before[..MEM_START];
        let above = memory.as_slice()[end..] == before[end..];

        loaded && below && above
    }

    #[test]
    fn test_program_too_large() {
        let mut memory = Memory::new();
        let program = vec![0xAA; PROGRAM_CAPACITY + 1];

        assert_eq!(
            memory.load(&program),
            Err(Chip8Error::LargeProgram {
                size: PROGRAM_CAPACITY + 1,
                capacity: PROGRAM_CAPACITY,
            })
        );
        // Nothing was written.
        assert_eq!(memory.read_byte(MEM_START), Ok(0));

        // Exactly at capacity is fine.
        assert!(memory.load(&program[1..]).is_ok());
        assert_eq!(memory.read_byte(MEM_SIZE - 1), Ok(0xAA));
    }

    #[test]
    fn test_font_table() {
        let memory = Memory::new();

        for digit in 0..FONTSET_GLYPH_COUNT {
            let addr = FONTSET_START as usize + digit * FONTSET_HEIGHT;
            let glyph = memory.read_slice(addr, FONTSET_HEIGHT).unwrap();
            assert_eq!(glyph, crate::font::glyph(digit as u8), "digit {digit:X}");
        }
    }

    #[test]
    fn test_bounds() {
        let mut memory = Memory::new();

        assert_eq!(memory.read_byte(0xFFF), Ok(0));
        assert_eq!(
            memory.read_byte(0x1000),
            Err(Chip8Error::AddressOutOfRange(0x1000))
        );
        assert_eq!(
            memory.write_byte(0x1000, 1),
            Err(Chip8Error::AddressOutOfRange(0x1000))
        );
        assert_eq!(
            memory.read_word(0xFFF),
            Err(Chip8Error::AddressOutOfRange(0x1000))
        );
        assert!(memory.read_slice(0xFFB, 5).is_ok());
        assert_eq!(
            memory.read_slice(0xFFC, 5),
            Err(Chip8Error::AddressOutOfRange(0x1000))
        );
    }

    #[test]
    fn test_write_slice() {
        let mut memory = Memory::new();

        memory.write_slice(0xFFD, &[1, 2, 3]).unwrap();
        assert_eq!(memory.read_slice(0xFFD, 3), Ok(&[1, 2, 3][..]));

        // Partially out of range writes nothing.
        assert_eq!(
            memory.write_slice(0xFFE, &[9, 9, 9]),
            Err(Chip8Error::AddressOutOfRange(0x1000))
        );
        assert_eq!(memory.read_byte(0xFFE), Ok(2));
    }

    #[test]
    fn test_load_font() {
        let mut memory = Memory::new();

        assert!(matches!(memory.load_font(&[0; 3]), Err(Chip8Error::Font(_))));

        memory.load_font(&[0xFF; FONTSET_DATA_LENGTH]).unwrap();
        assert_eq!(memory.read_byte(FONTSET_START as usize), Ok(0xFF));

        memory.clear();
        assert_eq!(memory.read_byte(FONTSET_START as usize), Ok(0xF0));
    }
}
