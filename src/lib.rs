//! Gameplay-entity runtime for a 2D vertical platformer.
//!
//! Drives per-tick character physics, finite-state behavior and sprite
//! animation on top of a sprite-sheet store loaded from a text asset file.

pub mod core;
pub mod engine;
pub mod game;
