// Central asset management system

use super::loader::SpriteSheetLibrary;
use super::{AssetError, AssetLoader, ObjectId, SpriteSheet};
use anyhow::Result;
use log::info;
use std::path::Path;
use std::sync::Arc;

/// Central asset manager for the game
///
/// Owns the sprite-sheet library for the current level. Sheets are handed
/// out as shared read-only handles and live until the manager is dropped.
pub struct AssetManager {
    /// Asset loader
    loader: AssetLoader,

    /// Library loaded from the last asset file
    library: SpriteSheetLibrary,
}

impl AssetManager {
    /// Create a new asset manager with nothing loaded
    pub fn new<P: AsRef<Path>>(asset_path: P) -> Self {
        Self {
            loader: AssetLoader::new(asset_path),
            library: SpriteSheetLibrary::default(),
        }
    }

    /// Create a manager around an already parsed library
    pub fn with_library<P: AsRef<Path>>(asset_path: P, library: SpriteSheetLibrary) -> Self {
        Self {
            loader: AssetLoader::new(asset_path),
            library,
        }
    }

    /// Load a sprite-sheet file, replacing whatever was loaded before
    pub fn load(&mut self, name: &str) -> Result<()> {
        self.library = self.loader.load_sprite_sheets(name)?;
        info!(
            "Asset file {} ready: {} sprite sheets",
            name,
            self.library.sheet_count()
        );
        Ok(())
    }

    /// Get a sprite sheet by object id
    pub fn sprite_sheet(&self, id: ObjectId) -> Result<Arc<SpriteSheet>, AssetError> {
        self.library.sheet(id)
    }

    /// Texture atlas referenced by the loaded file
    pub fn texture_filename(&self) -> Option<&str> {
        self.library.texture_filename()
    }

    /// Get statistics about loaded assets
    pub fn stats(&self) -> AssetStats {
        let report = self.library.report();
        AssetStats {
            sheet_count: self.library.sheet_count(),
            frame_count: report.frames,
            skipped_lines: report.skipped_lines,
        }
    }

    /// Get the asset loader
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }
}

/// Statistics about loaded assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetStats {
    pub sheet_count: usize,
    pub frame_count: usize,
    pub skipped_lines: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::parse_sprite_sheets;

    #[test]
    fn test_empty_manager() {
        let manager = AssetManager::new("assets");
        assert_eq!(manager.stats().sheet_count, 0);
        assert!(matches!(
            manager.sprite_sheet(1),
            Err(AssetError::UnknownSpriteSheet(1))
        ));
    }

    #[test]
    fn test_sheets_are_shared() {
        let library = parse_sprite_sheets("###a.png\n##4\n#0\n8 8 0 0 1 1 1 0 0 8 8\n");
        let manager = AssetManager::with_library("assets", library);

        let a = manager.sprite_sheet(4).unwrap();
        let b = manager.sprite_sheet(4).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.texture_filename(), Some("a.png"));
        assert_eq!(manager.stats().frame_count, 1);
    }

    #[test]
    fn test_load_missing_file() {
        let mut manager = AssetManager::new("/definitely/not/here");
        assert!(manager.load("sprites.dat").is_err());
    }
}
