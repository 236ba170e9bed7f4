// Collision query contract between characters and the level

use glam::Vec2;

use crate::core::Rect;
use crate::engine::assets::CollisionAreaKind;

/// Identifier of anything that owns collision areas
pub type EntityId = u32;

/// What a supporting surface does to a character standing on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceType {
    /// Regular floor
    #[default]
    Simple,
    /// Ice: releasing the run key makes the character slip
    Sliding,
    /// Moving platform: carries the character along
    Mobile,
}

/// One collision area overlapping the queried region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectCollision {
    /// Entity owning the area
    pub owner: EntityId,
    /// Area id from the asset file
    pub area_id: u16,
    pub kind: CollisionAreaKind,
    pub surface: SurfaceType,
    /// Area bounds in world space
    pub bounds: Rect,
    /// How far the owner moved during the current tick
    pub displacement: Vec2,
}

impl ObjectCollision {
    pub fn is_solid(&self) -> bool {
        self.kind == CollisionAreaKind::Solid
    }

    /// Whether a body whose previous bottom was `previous_bottom` lands on this area
    pub fn supports_from(&self, previous_bottom: f32) -> bool {
        previous_bottom >= self.bounds.top() - crate::core::math::EDGE_EPSILON
    }
}

/// Spatial index consumed by characters.
///
/// `bounds` is the queried body at its destination, `movement` the
/// displacement that brought it there. Implementations return every area
/// touching the swept region, skipping areas owned by `exclude`.
pub trait CollisionQuery {
    fn query(&self, bounds: &Rect, movement: Vec2, exclude: Option<EntityId>) -> Vec<ObjectCollision>;
}

/// Queries against nothing always come back empty
impl CollisionQuery for () {
    fn query(&self, _bounds: &Rect, _movement: Vec2, _exclude: Option<EntityId>) -> Vec<ObjectCollision> {
        Vec::new()
    }
}
