//! Mapping of host keys to the Chip-8 keypad.
use crate::keypad::KeyCode;

/// Conventional layout on the left-hand side of a QWERTY keyboard.
///
/// ```text
/// 1 2 3 4        1 2 3 C
/// Q W E R   ->   4 5 6 D
/// A S D F        7 8 9 E
/// Z X C V        A 0 B F
/// ```
const QWERTY_LAYOUT: [(char, KeyCode); 16] = [
    ('1', KeyCode::Key1),
    ('2', KeyCode::Key2),
    ('3', KeyCode::Key3),
    ('4', KeyCode::KeyC),
    ('q', KeyCode::Key4),
    ('w', KeyCode::Key5),
    ('e', KeyCode::Key6),
    ('r', KeyCode::KeyD),
    ('a', KeyCode::Key7),
    ('s', KeyCode::Key8),
    ('d', KeyCode::Key9),
    ('f', KeyCode::KeyE),
    ('z', KeyCode::KeyA),
    ('x', KeyCode::Key0),
    ('c', KeyCode::KeyB),
    ('v', KeyCode::KeyF),
];

/// Immutable lookup from a host specific key type to [`KeyCode`]s.
///
/// Built once at startup and handed to whatever collects input,
/// so the VM itself never sees host key codes.
#[derive(Debug, Clone)]
pub struct KeyMap<K> {
    keys: Box<[(K, KeyCode)]>,
}

impl<K: PartialEq + Copy> KeyMap<K> {
    pub fn new(pairs: impl IntoIterator<Item = (K, KeyCode)>) -> Self {
        Self {
            keys: pairs.into_iter().collect(),
        }
    }

    /// Given a host key, map it to the Chip-8 key.
    pub fn map_key(&self, key: K) -> Option<KeyCode> {
        self.keys
            .iter()
            .find(|(host_key, _)| *host_key == key)
            .map(|(_, keycode)| *keycode)
    }

    /// Collect a keypad bitset from the currently held host keys.
    pub fn to_state(&self, held: impl IntoIterator<Item = K>) -> u16 {
        held.into_iter()
            .filter_map(|key| self.map_key(key))
            .fold(0, |state, keycode| state | keycode.mask())
    }
}

impl KeyMap<char> {
    /// The canonical 4x4 layout on a QWERTY keyboard.
    ///
    /// Lookups are case insensitive.
    pub fn qwerty() -> Self {
        Self::new(QWERTY_LAYOUT.iter().flat_map(|(c, keycode)| {
            [(*c, *keycode), (c.to_ascii_uppercase(), *keycode)]
        }))
    }
}
