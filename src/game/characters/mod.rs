// Character system
//
// This module contains everything related to characters:
// - Character data structure and management
// - Motion constants and character types
// - State machine for character behavior
// - Animation driver over the shared sprite sheets

pub mod animation;
mod behavior;
pub mod character;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use animation::{AnimationPlayer, AnimationTable};
pub use character::{Character, CharacterManager};
pub use state::{
    CharacterState, CharacterStateMachine, Facing, Motion, Transition, TransitionContext, Trigger,
    TriggerOrigin,
};
pub use stats::{CharacterProfile, MotionStats, STANDARD_STATS};
