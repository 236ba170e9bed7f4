// Asset management system
//
// Sprite-sheet data store: frames, animations and the text-format loader
// that builds them. Loaded once per level and shared read-only by every
// character; playback cursors live with the characters.

mod loader;
mod manager;
mod sheet;
mod sprite;

pub use loader::{parse_sprite_sheets, AssetLoader, ParseReport, SpriteSheetLibrary};
pub use manager::AssetManager;
pub use sheet::{Animation, AnimationId, FrameCursor, ObjectId, SpriteSheet};
pub use sprite::{CollisionArea, CollisionAreaKind, SpriteFrame};

/// Asset loading and lookup errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Unknown sprite sheet: {0}")]
    UnknownSpriteSheet(ObjectId),

    #[error("Unknown animation: {0}")]
    UnknownAnimation(AnimationId),

    #[error("Animation {0} has no frames")]
    EmptyAnimation(AnimationId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
