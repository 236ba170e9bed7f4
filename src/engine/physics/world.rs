// Reference collision world: a flat list of level objects

use glam::Vec2;
use log::debug;
use parry2d::bounding_volume::BoundingVolume;

use super::collision::{CollisionQuery, EntityId, ObjectCollision, SurfaceType};
use crate::core::Rect;
use crate::engine::assets::{CollisionArea, CollisionAreaKind, SpriteFrame};

/// A level object with collision areas
#[derive(Debug, Clone)]
pub struct CollisionObject {
    pub owner: EntityId,
    pub surface: SurfaceType,
    /// Origin of the object's areas in world space
    pub position: Vec2,
    /// Areas in local space
    areas: Vec<CollisionArea>,
    /// Movement during the current tick
    displacement: Vec2,
}

impl CollisionObject {
    /// World-space bounds of every area that has points
    fn world_areas(&self) -> impl Iterator<Item = (&CollisionArea, Rect)> + '_ {
        self.areas.iter().filter_map(move |area| {
            area.bounds()
                .map(|bounds| (area, bounds.translated(self.position)))
        })
    }
}

/// Level geometry that characters collide against.
///
/// A flat list tested area by area; big levels would want a broad phase,
/// but the query contract stays the same.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    objects: Vec<CollisionObject>,
}

impl CollisionWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object whose areas come from a sprite frame.
    ///
    /// Solid areas are stored ahead of simple ones and areas without points
    /// are dropped. Frames left with no area collide with their whole bounds.
    pub fn add_frame_object(
        &mut self,
        owner: EntityId,
        position: Vec2,
        frame: &SpriteFrame,
        surface: SurfaceType,
    ) {
        let mut areas: Vec<CollisionArea> = frame
            .solid_areas()
            .chain(frame.simple_areas())
            .filter(|area| area.bounds().is_some())
            .cloned()
            .collect();
        if areas.is_empty() {
            areas.push(rect_area(0, CollisionAreaKind::Solid, frame.bounds));
        }
        self.push(owner, position, areas, surface);
    }

    /// Add a solid block
    pub fn add_block(&mut self, owner: EntityId, bounds: Rect, surface: SurfaceType) {
        let area = rect_area(0, CollisionAreaKind::Solid, bounds.translated(-bounds.min));
        self.push(owner, bounds.min, vec![area], surface);
    }

    /// Add a one-way platform that only supports from above
    pub fn add_platform(&mut self, owner: EntityId, bounds: Rect, surface: SurfaceType) {
        let area = rect_area(0, CollisionAreaKind::Simple, bounds.translated(-bounds.min));
        self.push(owner, bounds.min, vec![area], surface);
    }

    fn push(&mut self, owner: EntityId, position: Vec2, areas: Vec<CollisionArea>, surface: SurfaceType) {
        debug!("Collision object {} added with {} areas", owner, areas.len());
        self.objects.push(CollisionObject {
            owner,
            surface,
            position,
            areas,
            displacement: Vec2::ZERO,
        });
    }

    /// Move every object owned by `owner`, recording the displacement for this tick
    pub fn move_object(&mut self, owner: EntityId, delta: Vec2) {
        for object in self.objects.iter_mut().filter(|o| o.owner == owner) {
            object.position += delta;
            object.displacement += delta;
        }
    }

    /// Forget last tick's displacements (call once per tick before moving objects)
    pub fn begin_tick(&mut self) {
        for object in &mut self.objects {
            object.displacement = Vec2::ZERO;
        }
    }

    /// Remove every object owned by `owner`
    pub fn remove(&mut self, owner: EntityId) {
        self.objects.retain(|o| o.owner != owner);
    }

    pub fn objects(&self) -> &[CollisionObject] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl CollisionQuery for CollisionWorld {
    fn query(&self, bounds: &Rect, movement: Vec2, exclude: Option<EntityId>) -> Vec<ObjectCollision> {
        let swept_aabb = bounds.union(&bounds.translated(-movement)).to_aabb();
        let swept = &swept_aabb;

        self.objects
            .iter()
            .filter(|object| Some(object.owner) != exclude)
            .flat_map(|object| {
                object
                    .world_areas()
                    .filter(move |(_, area_bounds)| swept.intersects(&area_bounds.to_aabb()))
                    .map(move |(area, area_bounds)| ObjectCollision {
                        owner: object.owner,
                        area_id: area.id,
                        kind: area.kind,
                        surface: object.surface,
                        bounds: area_bounds,
                        displacement: object.displacement,
                    })
            })
            .collect()
    }
}

fn rect_area(id: u16, kind: CollisionAreaKind, rect: Rect) -> CollisionArea {
    CollisionArea::new(
        id,
        kind,
        vec![
            rect.min,
            Vec2::new(rect.max.x, rect.min.y),
            rect.max,
            Vec2::new(rect.min.x, rect.max.y),
        ],
    )
}
