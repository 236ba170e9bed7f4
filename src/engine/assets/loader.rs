// Asset loading functionality
//
// Line-oriented sprite-sheet format:
//
//   ###<texture>                       texture atlas filename
//   ##<id>                             begin an object sprite sheet
//   #<id>                              begin an animation in the current sheet
//   <w> <h> <u1> <v1> <u2> <v2> <dur> <lbx> <lby> <ubx> <uby>
//                                      one frame (exactly 11 tokens)
//   _<id> <solid|simple> <x1 y1 ...>   collision polygon of the last frame
//   // ...                             comment until end of line
//
// Malformed lines are skipped; loading never fails because of content.

use super::sheet::{AnimationId, ObjectId, SpriteSheet};
use super::sprite::{CollisionArea, CollisionAreaKind, SpriteFrame};
use super::AssetError;
use crate::core::Rect;
use anyhow::Result;
use glam::Vec2;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FRAME_TOKEN_COUNT: usize = 11;

/// Counters describing what the parser kept and dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub sheets: usize,
    pub animations: usize,
    pub frames: usize,
    pub collision_areas: usize,
    pub skipped_lines: usize,
}

/// Everything loaded from one asset file
#[derive(Debug, Clone, Default)]
pub struct SpriteSheetLibrary {
    texture_filename: Option<String>,
    sheets: HashMap<ObjectId, Arc<SpriteSheet>>,
    report: ParseReport,
}

impl SpriteSheetLibrary {
    /// Texture atlas named by the `###` line, if any
    pub fn texture_filename(&self) -> Option<&str> {
        self.texture_filename.as_deref()
    }

    /// Shared handle to a sheet
    pub fn sheet(&self, id: ObjectId) -> Result<Arc<SpriteSheet>, AssetError> {
        self.sheets
            .get(&id)
            .cloned()
            .ok_or(AssetError::UnknownSpriteSheet(id))
    }

    pub fn sheet_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.sheets.keys().copied()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn report(&self) -> ParseReport {
        self.report
    }
}

/// Case-insensitive prefix match
fn starts_with_sigil(token: &str, sigil: &str) -> bool {
    token
        .get(..sigil.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(sigil))
}

/// Value glued to a sigil (`##12`) or carried by the next token (`## 12`)
fn sigil_value<'a>(token: &'a str, sigil: &str, rest: &[&'a str]) -> Option<&'a str> {
    let glued = &token[sigil.len()..];
    if glued.is_empty() {
        rest.first().copied()
    } else {
        Some(glued)
    }
}

fn parse_frame(tokens: &[&str]) -> Option<SpriteFrame> {
    if tokens.len() != FRAME_TOKEN_COUNT {
        return None;
    }

    let width = tokens[0].parse().ok()?;
    let height = tokens[1].parse().ok()?;
    let u1 = tokens[2].parse().ok()?;
    let v1 = tokens[3].parse().ok()?;
    let u2 = tokens[4].parse().ok()?;
    let v2 = tokens[5].parse().ok()?;
    let duration_ticks = tokens[6].parse().ok()?;
    let bounds: Vec<f32> = tokens[7..]
        .iter()
        .map(|t| t.parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;

    Some(
        SpriteFrame::new(width, height, duration_ticks)
            .with_uvs(u1, v1, u2, v2)
            .with_bounds(Rect::from_coords(bounds[0], bounds[1], bounds[2], bounds[3])),
    )
}

fn parse_collision_area(id_token: &str, rest: &[&str]) -> Option<CollisionArea> {
    let id = id_token.parse().ok()?;
    let kind = CollisionAreaKind::from_token(rest.first()?)?;
    let values: Vec<f32> = rest[1..]
        .iter()
        .map(|t| t.parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;

    // An odd trailing coordinate has no partner and is dropped
    let polygon = values
        .chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect();

    Some(CollisionArea::new(id, kind, polygon))
}

/// Parse the sprite-sheet text format
pub fn parse_sprite_sheets(source: &str) -> SpriteSheetLibrary {
    let mut texture_filename = None;
    let mut sheets: Vec<SpriteSheet> = Vec::new();
    let mut current_animation: Option<AnimationId> = None;
    let mut report = ParseReport::default();

    for (line_number, line) in source.lines().enumerate() {
        let line_number = line_number + 1;
        let tokens: Vec<&str> = line
            .split_whitespace()
            .take_while(|t| !t.starts_with("//"))
            .collect();

        let Some((&head, rest)) = tokens.split_first() else {
            continue;
        };

        if starts_with_sigil(head, "###") {
            match sigil_value(head, "###", rest) {
                Some(name) => texture_filename = Some(name.to_string()),
                None => report.skipped_lines += 1,
            }
        } else if starts_with_sigil(head, "##") {
            match sigil_value(head, "##", rest).and_then(|v| v.parse::<ObjectId>().ok()) {
                Some(id) => {
                    sheets.retain(|s| s.id != id);
                    sheets.push(SpriteSheet::new(id));
                    current_animation = None;
                    report.sheets += 1;
                }
                None => {
                    warn!("Line {}: invalid sprite sheet id '{}'", line_number, line.trim());
                    report.skipped_lines += 1;
                }
            }
        } else if starts_with_sigil(head, "#") {
            let id = sigil_value(head, "#", rest).and_then(|v| v.parse::<AnimationId>().ok());
            match (id, sheets.last_mut()) {
                (Some(id), Some(sheet)) => {
                    sheet.add_animation(id);
                    current_animation = Some(id);
                    report.animations += 1;
                }
                _ => {
                    warn!("Line {}: animation outside of a sprite sheet", line_number);
                    report.skipped_lines += 1;
                }
            }
        } else if let Some(id_token) = head.strip_prefix('_') {
            let frame = sheets.last_mut().and_then(|sheet| {
                current_animation
                    .and_then(|id| sheet.animation_mut(id))
                    .and_then(|animation| animation.last_frame_mut())
            });
            match (parse_collision_area(id_token, rest), frame) {
                (Some(area), Some(frame)) => {
                    frame.collision_areas.push(area);
                    report.collision_areas += 1;
                }
                _ => {
                    debug!("Line {}: collision area dropped", line_number);
                    report.skipped_lines += 1;
                }
            }
        } else {
            let frame = parse_frame(&tokens);
            match (frame, sheets.last_mut(), current_animation) {
                (Some(frame), Some(sheet), Some(animation_id)) => {
                    sheet.add_frame(animation_id, frame);
                    report.frames += 1;
                }
                _ => {
                    warn!(
                        "Line {}: skipping malformed frame ({} tokens)",
                        line_number,
                        tokens.len()
                    );
                    report.skipped_lines += 1;
                }
            }
        }
    }

    info!(
        "Parsed {} sprite sheets, {} animations, {} frames ({} lines skipped)",
        report.sheets, report.animations, report.frames, report.skipped_lines
    );

    SpriteSheetLibrary {
        texture_filename,
        sheets: sheets.into_iter().map(|s| (s.id, Arc::new(s))).collect(),
        report,
    }
}

/// Asset loader responsible for finding and reading asset files
pub struct AssetLoader {
    base_path: PathBuf,
}

impl AssetLoader {
    /// Create a new asset loader with the given base path
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for an asset
    pub fn resolve_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Check if an asset exists
    pub fn exists(&self, name: &str) -> bool {
        self.resolve_path(name).exists()
    }

    /// Read and parse a sprite-sheet file
    pub fn load_sprite_sheets(&self, name: &str) -> Result<SpriteSheetLibrary> {
        let path = self.resolve_path(name);

        if !path.exists() {
            return Err(AssetError::NotFound(path.to_string_lossy().to_string()).into());
        }

        let source = std::fs::read_to_string(&path).map_err(AssetError::from)?;
        info!("Loading sprite sheets from {}", path.display());
        Ok(parse_sprite_sheets(&source))
    }

    /// Get the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
