// Movement keys and the pressed-key bitmask

use winit::keyboard::KeyCode;

/// Keys a character reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Right,
    Left,
    Up,
    Down,
    Space,
}

impl Key {
    /// Every key, in the order edges are reported
    pub const ALL: [Key; 5] = [Key::Right, Key::Left, Key::Up, Key::Space, Key::Down];

    /// Bit of this key inside a `KeyMask`
    pub const fn bit(self) -> u8 {
        match self {
            Key::Right => 0b0000_0001,
            Key::Left => 0b0000_0010,
            Key::Up => 0b0000_0100,
            Key::Down => 0b0000_1000,
            Key::Space => 0b0001_0000,
        }
    }
}

/// Set of keys held during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyMask(u8);

impl KeyMask {
    pub const NONE: KeyMask = KeyMask(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Mask holding exactly the given keys
    pub fn of(keys: &[Key]) -> Self {
        keys.iter().fold(Self::NONE, |mask, key| mask.with(*key))
    }

    pub fn contains(self, key: Key) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn with(self, key: Key) -> Self {
        Self(self.0 | key.bit())
    }

    pub fn without(self, key: Key) -> Self {
        Self(self.0 & !key.bit())
    }

    pub fn insert(&mut self, key: Key) {
        *self = self.with(key);
    }

    pub fn remove(&mut self, key: Key) {
        *self = self.without(key);
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Keys set here but not in `previous`
    pub fn pressed_since(self, previous: KeyMask) -> Self {
        Self(self.0 & !previous.0)
    }

    /// Keys set in `previous` but not here
    pub fn released_since(self, previous: KeyMask) -> Self {
        Self(previous.0 & !self.0)
    }

    pub fn keys(self) -> impl Iterator<Item = Key> {
        Key::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

/// Default keyboard bindings (arrows and WASD, space to jump)
pub fn default_bindings() -> Vec<(KeyCode, Key)> {
    vec![
        (KeyCode::ArrowRight, Key::Right),
        (KeyCode::ArrowLeft, Key::Left),
        (KeyCode::ArrowUp, Key::Up),
        (KeyCode::ArrowDown, Key::Down),
        (KeyCode::KeyD, Key::Right),
        (KeyCode::KeyA, Key::Left),
        (KeyCode::KeyW, Key::Up),
        (KeyCode::KeyS, Key::Down),
        (KeyCode::Space, Key::Space),
    ]
}
