//! CPU and memory state.
use crate::{
    display::Framebuffer, keypad::Keypad, memory::Memory, registers::Registers,
    stack::CallStack, timers::Timers,
};

/// Core state for a chip8 interpreter.
#[derive(Default)]
pub struct Chip8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    pub(crate) registers: Registers,
    pub(crate) timers: Timers,
    /// Switch tracking whether the buzzer was last reported on or off.
    pub(crate) buzzer_state: bool,
    /// Set while the machine is stalled on `Fx0A` (`LD Vx, K`).
    pub(crate) key_wait: Option<KeyWait>,
    pub(crate) keypad: Keypad,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory storage space.
    pub(crate) ram: Memory,
    /// Stack of return pointers used for jumping when a routine call finishes.
    pub(crate) stack: CallStack,
    /// Screen buffer that is drawn to.
    pub(crate) display: Framebuffer,
}

/// Pending `Fx0A` (`LD Vx, K`) instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KeyWait {
    /// Register that receives the key.
    pub(crate) vx: u8,
    /// Keys that were already down, and don't count as a new press.
    pub(crate) held: u16,
}

impl KeyWait {
    /// Check the keypad for a key that went down since the last poll.
    ///
    /// Releasing a held key forgets it, so pressing it again resumes the machine.
    pub(crate) fn poll(&mut self, state: u16) -> Option<u8> {
        let pressed = state & !self.held;
        self.held &= state;
        crate::keypad::first_key(pressed)
    }
}

impl Chip8Cpu {
    pub fn new() -> Self {
        Default::default()
    }

    /// Return every component except main memory to its power-on state.
    pub(crate) fn reset(&mut self) {
        self.registers = Registers::new();
        self.timers = Timers::new();
        self.buzzer_state = false;
        self.key_wait = None;
        self.keypad.clear();
        self.stack.clear();
        self.display = Framebuffer::new();
    }

    #[inline]
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    #[inline]
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    #[inline]
    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    #[inline]
    pub fn memory(&self) -> &Memory {
        &self.ram
    }

    #[inline]
    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    #[inline]
    pub fn display(&self) -> &Framebuffer {
        &self.display
    }

    /// Indicates that the machine is waiting for a keypress.
    #[inline]
    pub fn is_key_wait(&self) -> bool {
        self.key_wait.is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_wait_poll() {
        // Key 3 was held when the wait started.
        let mut wait = KeyWait { vx: 0, held: 0b1000 };

        assert_eq!(wait.poll(0b1000), None);
        // A second key goes down.
        assert_eq!(wait.poll(0b1000_1000), Some(7));
    }

    #[test]
    fn test_key_wait_repress() {
        let mut wait = KeyWait { vx: 0, held: 0b1000 };

        // Release, then press the same key again.
        assert_eq!(wait.poll(0), None);
        assert_eq!(wait.held, 0);
        assert_eq!(wait.poll(0b1000), Some(3));
    }
}
