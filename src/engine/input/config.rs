// Input configuration and remapping system

use super::action::{Key, KeyMask};
use std::collections::HashMap;
use winit::keyboard::KeyCode;

/// Maps physical keys to the movement keys characters understand
#[derive(Debug, Clone)]
pub struct InputConfig {
    bindings: HashMap<KeyCode, Key>,
}

impl InputConfig {
    /// Create a configuration without any binding
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create a configuration from a list of bindings
    pub fn from_bindings(bindings: Vec<(KeyCode, Key)>) -> Self {
        let mut config = Self::new();
        for (code, key) in bindings {
            config.bind(code, key);
        }
        config
    }

    /// Bind a physical key, replacing any previous binding for it
    pub fn bind(&mut self, code: KeyCode, key: Key) {
        self.bindings.insert(code, key);
    }

    pub fn unbind(&mut self, code: KeyCode) {
        self.bindings.remove(&code);
    }

    /// Unbind every physical key mapped to `key`
    pub fn unbind_key(&mut self, key: Key) {
        self.bindings.retain(|_, bound| *bound != key);
    }

    pub fn get_key(&self, code: KeyCode) -> Option<Key> {
        self.bindings.get(&code).copied()
    }

    /// Physical keys mapped to `key`
    pub fn get_codes(&self, key: Key) -> Vec<KeyCode> {
        self.bindings
            .iter()
            .filter(|(_, bound)| **bound == key)
            .map(|(code, _)| *code)
            .collect()
    }

    /// Build the tick mask from the physical keys currently down
    pub fn mask<I: IntoIterator<Item = KeyCode>>(&self, held: I) -> KeyMask {
        held.into_iter()
            .filter_map(|code| self.get_key(code))
            .fold(KeyMask::NONE, |mask, key| mask.with(key))
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn reset_to_defaults(&mut self) {
        self.clear();
        for (code, key) in super::action::default_bindings() {
            self.bind(code, key);
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::from_bindings(super::action::default_bindings())
    }
}
