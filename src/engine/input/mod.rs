// Input handling system
//
// Characters only see abstract movement keys. The game loop builds a
// `KeyMask` every tick (from `InputConfig` bindings or a script) and each
// character diffs it against the previous tick to find key edges.
//
// - `action`: movement keys, the pressed-key bitmask and default bindings
// - `player`: previous/current mask and edge detection
// - `config`: physical key remapping

pub mod action;
pub mod config;
pub mod player;

// Re-export commonly used types
pub use action::{Key, KeyMask};
pub use config::InputConfig;
pub use player::{KeyEdge, KeyState};
