//! Call stack.
use crate::{
    constants::*,
    error::{Chip8Error, Chip8Result},
};

/// Stack of return pointers used for jumping when a routine call finishes.
pub struct CallStack {
    frames: [Address; STACK_SIZE],
    /// Stack pointer, indicating the number of frames in use.
    sp: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        Self {
            frames: [0; STACK_SIZE],
            sp: 0,
        }
    }
}

impl CallStack {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, address: Address) -> Chip8Result<()> {
        if self.sp >= STACK_SIZE {
            return Err(Chip8Error::StackOverflow);
        }
        self.frames[self.sp] = address;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Chip8Result<Address> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.frames[self.sp])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sp
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    pub fn clear(&mut self) {
        self.frames.fill(0);
        self.sp = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lifo() {
        let mut stack = CallStack::new();
        stack.push(0x202).unwrap();
        stack.push(0x304).unwrap();
        assert_eq!(stack.len(), 2);

        assert_eq!(stack.pop(), Ok(0x304));
        assert_eq!(stack.pop(), Ok(0x202));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_overflow() {
        let mut stack = CallStack::new();
        for i in 0..STACK_SIZE {
            stack.push(i as Address).unwrap();
        }
        assert_eq!(stack.push(0xFFF), Err(Chip8Error::StackOverflow));
        // The failed push doesn't clobber the top frame.
        assert_eq!(stack.pop(), Ok(STACK_SIZE as Address - 1));
    }

    #[test]
    fn test_underflow() {
        let mut stack = CallStack::new();
        assert_eq!(stack.pop(), Err(Chip8Error::StackUnderflow));

        stack.push(0x200).unwrap();
        stack.clear();
        assert_eq!(stack.pop(), Err(Chip8Error::StackUnderflow));
    }
}
