// Sprite frame data as loaded from the asset file

use glam::Vec2;

use crate::core::Rect;

/// How a collision area interacts with characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionAreaKind {
    /// Blocks movement from every side
    Solid,
    /// Only supports from above (one-way platform)
    Simple,
}

impl CollisionAreaKind {
    /// Parse the asset-file token; unknown tokens yield None
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "solid" => Some(Self::Solid),
            "simple" => Some(Self::Simple),
            _ => None,
        }
    }
}

/// A polygon attached to a sprite frame, in local pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionArea {
    pub id: u16,
    pub kind: CollisionAreaKind,
    pub polygon: Vec<Vec2>,
}

impl CollisionArea {
    pub fn new(id: u16, kind: CollisionAreaKind, polygon: Vec<Vec2>) -> Self {
        Self { id, kind, polygon }
    }

    /// Bounding rectangle of the polygon (None if the polygon has no points)
    pub fn bounds(&self) -> Option<Rect> {
        Rect::from_points(&self.polygon)
    }
}

/// One frame of a sprite-sheet animation. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFrame {
    /// Size in pixels
    pub width: u32,
    pub height: u32,

    /// Texture atlas rectangle, normalized (0.0 to 1.0)
    pub u1: f32,
    pub v1: f32,
    pub u2: f32,
    pub v2: f32,

    /// How many ticks the frame stays on screen
    pub duration_ticks: u32,

    /// Collision bounds relative to the sprite origin
    pub bounds: Rect,

    /// Polygons used by other entities to collide against this frame
    pub collision_areas: Vec<CollisionArea>,
}

impl SpriteFrame {
    /// Frame whose collision bounds cover the whole sprite
    pub fn new(width: u32, height: u32, duration_ticks: u32) -> Self {
        Self {
            width,
            height,
            u1: 0.0,
            v1: 0.0,
            u2: 1.0,
            v2: 1.0,
            duration_ticks,
            bounds: Rect::from_coords(0.0, 0.0, width as f32, height as f32),
            collision_areas: Vec::new(),
        }
    }

    pub fn with_uvs(mut self, u1: f32, v1: f32, u2: f32, v2: f32) -> Self {
        self.u1 = u1;
        self.v1 = v1;
        self.u2 = u2;
        self.v2 = v2;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_collision_area(mut self, area: CollisionArea) -> Self {
        self.collision_areas.push(area);
        self
    }

    pub fn solid_areas(&self) -> impl Iterator<Item = &CollisionArea> {
        self.collision_areas
            .iter()
            .filter(|a| a.kind == CollisionAreaKind::Solid)
    }

    pub fn simple_areas(&self) -> impl Iterator<Item = &CollisionArea> {
        self.collision_areas
            .iter()
            .filter(|a| a.kind == CollisionAreaKind::Simple)
    }
}
