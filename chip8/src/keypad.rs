//! Hexadecimal keypad.
use crate::{
    constants::*,
    error::{Chip8Error, Chip8Result},
};

/// Keyboard input state. Pressed is a 1 bit, released is a 0 bit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad {
    state: u16,
}

impl Keypad {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_pressed(&mut self, key_id: u8, pressed: bool) -> Chip8Result<()> {
        if key_id >= KEY_COUNT {
            return Err(Chip8Error::InvalidKeyCode(key_id));
        }

        if pressed {
            self.state |= 1 << key_id;
        } else {
            self.state &= !(1 << key_id);
        }

        Ok(())
    }

    pub fn is_pressed(&self, key_id: u8) -> Chip8Result<bool> {
        if key_id >= KEY_COUNT {
            return Err(Chip8Error::InvalidKeyCode(key_id));
        }
        Ok(self.state & (1 << key_id) != 0)
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any(&self) -> bool {
        self.state != 0
    }

    /// Retrieve the value of the first key that is pressed down.
    #[inline]
    pub fn first_pressed(&self) -> Option<u8> {
        first_key(self.state)
    }

    /// Bitset of all keys, key `0x0` in the lowest bit.
    #[inline(always)]
    pub fn state(&self) -> u16 {
        self.state
    }

    /// Overwrite the whole keypad with a host reported bitset.
    #[inline(always)]
    pub fn set_state(&mut self, state: u16) {
        self.state = state;
    }

    /// Clear the keyboard input state, setting all keys to up.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.state = 0;
    }
}

/// Lowest key id set in a keypad bitset.
#[inline]
pub(crate) fn first_key(state: u16) -> Option<u8> {
    if state == 0 {
        None
    } else {
        Some(state.trailing_zeros() as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyCode {
    Key0 = 0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF = 0xF,
}

impl KeyCode {
    pub const ALL: [KeyCode; KEY_COUNT as usize] = [
        Self::Key0,
        Self::Key1,
        Self::Key2,
        Self::Key3,
        Self::Key4,
        Self::Key5,
        Self::Key6,
        Self::Key7,
        Self::Key8,
        Self::Key9,
        Self::KeyA,
        Self::KeyB,
        Self::KeyC,
        Self::KeyD,
        Self::KeyE,
        Self::KeyF,
    ];

    #[inline(always)]
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Single bit mask of this key in a keypad bitset.
    #[inline(always)]
    pub fn mask(&self) -> u16 {
        1 << self.as_u8()
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let key_id = self.as_u8();
        write!(f, "k{key_id:x}")
    }
}

impl From<KeyCode> for u8 {
    fn from(keycode: KeyCode) -> Self {
        keycode.as_u8()
    }
}

impl TryFrom<u8> for KeyCode {
    type Error = Chip8Error;

    fn try_from(key_id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(key_id as usize)
            .copied()
            .ok_or(Chip8Error::InvalidKeyCode(key_id))
    }
}
