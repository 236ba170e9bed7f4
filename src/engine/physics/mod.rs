// Physics: collision queries against the level and character kinematics

mod collision;
pub mod kinematics;
mod world;

pub use collision::{CollisionQuery, EntityId, ObjectCollision, SurfaceType};
pub use kinematics::Trajectory;
pub use world::{CollisionObject, CollisionWorld};
