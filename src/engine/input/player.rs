// Per-character key state and edge detection

use super::action::{Key, KeyMask};

/// A change in a key between two ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Pressed(Key),
    Released(Key),
}

/// Previous and current pressed-key masks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    previous: KeyMask,
    current: KeyMask,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift in the mask for a new tick
    pub fn advance(&mut self, mask: KeyMask) {
        self.previous = self.current;
        self.current = mask;
    }

    pub fn current(&self) -> KeyMask {
        self.current
    }

    pub fn previous(&self) -> KeyMask {
        self.previous
    }

    /// Check if a key is held this tick
    pub fn is_held(&self, key: Key) -> bool {
        self.current.contains(key)
    }

    /// Check if a key went down this tick
    pub fn just_pressed(&self, key: Key) -> bool {
        self.current.pressed_since(self.previous).contains(key)
    }

    /// Check if a key went up this tick
    pub fn just_released(&self, key: Key) -> bool {
        self.current.released_since(self.previous).contains(key)
    }

    /// Releases first, then presses, each in `Key::ALL` order
    pub fn edges(&self) -> Vec<KeyEdge> {
        let released = self
            .current
            .released_since(self.previous)
            .keys()
            .map(KeyEdge::Released);
        let pressed = self
            .current
            .pressed_since(self.previous)
            .keys()
            .map(KeyEdge::Pressed);
        released.chain(pressed).collect()
    }
}
