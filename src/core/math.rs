// Math utilities and helper functions

use glam::Vec2;
use parry2d::bounding_volume::Aabb;
use parry2d::na::Point2;

/// Tolerance used when comparing pixel edges
pub const EDGE_EPSILON: f32 = 0.01;

/// Axis-aligned rectangle in y-up pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Create a rectangle from two corners (order is normalized)
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a rectangle from raw corner coordinates
    pub fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    /// Smallest rectangle containing every point, or None for an empty set
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn bottom(&self) -> f32 {
        self.min.y
    }

    pub fn top(&self) -> f32 {
        self.max.y
    }

    /// Rectangle shifted by an offset
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Strict overlap: rectangles that merely share an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x - EDGE_EPSILON
            && other.min.x < self.max.x - EDGE_EPSILON
            && self.min.y < other.max.y - EDGE_EPSILON
            && other.min.y < self.max.y - EDGE_EPSILON
    }

    /// Horizontal spans overlap (strictly)
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.min.x < other.max.x - EDGE_EPSILON && other.min.x < self.max.x - EDGE_EPSILON
    }

    /// Convert to a parry2d bounding box for intersection queries
    pub fn to_aabb(&self) -> Aabb {
        Aabb::new(
            Point2::new(self.min.x, self.min.y),
            Point2::new(self.max.x, self.max.y),
        )
    }
}
