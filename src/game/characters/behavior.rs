// Per-state behavior: entry actions and per-tick updates
//
// Updates move the character and queue physics triggers; they never
// change state themselves. Entry actions set up the kinematic state for
// the state just entered.

use glam::Vec2;
use log::info;

use crate::core::math::EDGE_EPSILON;
use crate::core::Rect;
use crate::engine::physics::kinematics::{accelerate, decelerate, run_speed, slip_position};
use crate::engine::physics::{CollisionQuery, ObjectCollision, SurfaceType, Trajectory};

use super::character::Character;
use super::state::{Facing, Motion, Transition, Trigger};

impl Character {
    /// Per-tick update of the current state
    pub(super) fn update_state(&mut self, world: &dyn CollisionQuery) {
        match self.state().motion {
            Motion::Idle | Motion::Hit => {
                self.check_support(world);
            }
            Motion::Run => self.update_run(world),
            Motion::JumpIdle | Motion::JumpRun => self.update_arc(world, true),
            Motion::FallIdle | Motion::FallRun | Motion::FallJumpRun => self.update_arc(world, false),
            Motion::Slip => self.update_slip(world),
        }
    }

    /// Entry action of the state a transition led to
    pub(super) fn enter_state(&mut self, transition: Transition) {
        let Transition { from, to, trigger } = transition;
        let gravity = self.stats.gravity;

        match to.motion {
            Motion::Idle | Motion::Hit => {
                self.momentum = 0;
            }
            Motion::Run => {
                if from.motion != Motion::Run || from.facing != to.facing {
                    self.momentum = 0;
                }
                self.blocked_right = false;
                self.blocked_left = false;
            }
            Motion::JumpIdle | Motion::JumpRun if from.motion.is_jumping() => {
                // Turned around at the apex: same height, opposite horizontal speed
                self.trajectory = self
                    .trajectory
                    .rebased(self.elapsed, gravity, -self.trajectory.h_speed);
                self.elapsed = 0.0;
            }
            Motion::JumpIdle | Motion::JumpRun => {
                let h_speed = if to.motion == Motion::JumpRun {
                    self.stats.jump_h_speed * to.facing.sign()
                } else {
                    0.0
                };
                self.trajectory = Trajectory::jump(self.position, h_speed, self.stats.jump_v_speed);
                self.elapsed = 0.0;
                self.apex_reached = false;
                self.launch_y = self.position.y;
                self.support = None;
            }
            Motion::FallIdle | Motion::FallRun | Motion::FallJumpRun => {
                let (h_speed, v_speed) = match trigger {
                    Trigger::TopCollisionDuringJump => (self.trajectory.h_speed, 0.0),
                    Trigger::LateralCollisionDuringJump => {
                        (0.0, self.trajectory.vertical_velocity(self.elapsed, gravity))
                    }
                    _ if from.motion.is_airborne() => (
                        self.trajectory.h_speed,
                        self.trajectory.vertical_velocity(self.elapsed, gravity),
                    ),
                    _ if from.motion == Motion::Run => {
                        let speed = run_speed(
                            self.momentum,
                            self.stats.run_base_speed,
                            self.stats.momentum_gain,
                        );
                        (self.stats.run_speed_per_arc_time(speed) * from.facing.sign(), 0.0)
                    }
                    _ => (0.0, 0.0),
                };
                self.trajectory = Trajectory::fall(self.position, h_speed, v_speed);
                self.elapsed = 0.0;
                self.support = None;
            }
            Motion::Slip => {
                self.slip_origin_x = self.position.x;
                self.slip_elapsed = 0.0;
                self.slip_momentum = self.momentum;
                self.momentum = 0;
            }
        }

        if matches!(trigger, Trigger::JumpLanding | Trigger::FallLanding) {
            self.record_altitude();
        }
        self.play_state_animation();
    }

    /// Mobile surfaces drag the character by their horizontal displacement.
    /// Vertical platform motion is absorbed by snapping onto the support.
    pub(super) fn apply_surface_carry(&mut self) {
        if !self.state().motion.is_grounded() {
            return;
        }
        if let Some(support) = self.support {
            if support.surface == SurfaceType::Mobile {
                self.position.x += support.displacement.x;
            }
        }
    }

    /// Keep the collision bounds within [0, screen_width]
    pub(super) fn clamp_to_screen(&mut self) {
        let local = self.local_bounds();
        let min_x = -local.min.x;
        let max_x = (self.stats.screen_width - local.max.x).max(min_x);
        self.position.x = self.position.x.clamp(min_x, max_x);
    }

    fn record_altitude(&mut self) {
        let altitude = self.position.y;
        if altitude > self.highest_altitude + EDGE_EPSILON {
            self.highest_altitude = altitude;
            self.altitude_records += 1;
            self.new_altitude = true;
            info!("{} reached a new altitude: {:.1}", self.name, altitude);
        }
    }

    /// Highest surface whose top is within the probe depth of the feet.
    /// Among surfaces at the same height the one most under the body wins.
    fn find_support(&self, world: &dyn CollisionQuery) -> Option<ObjectCollision> {
        let body = self.bounds();
        let depth = self.stats.support_probe;
        let probe = Rect::from_coords(
            body.min.x,
            body.bottom() - depth,
            body.max.x,
            body.bottom() + depth,
        );
        let overlap = |hit: &ObjectCollision| {
            hit.bounds.max.x.min(body.max.x) - hit.bounds.min.x.max(body.min.x)
        };

        world
            .query(&probe, Vec2::ZERO, Some(self.id))
            .into_iter()
            .filter(|hit| hit.bounds.overlaps_horizontally(&body))
            .filter(|hit| (hit.bounds.top() - body.bottom()).abs() <= depth)
            .max_by(|a, b| {
                if (a.bounds.top() - b.bounds.top()).abs() <= EDGE_EPSILON {
                    overlap(a).total_cmp(&overlap(b))
                } else {
                    a.bounds.top().total_cmp(&b.bounds.top())
                }
            })
    }

    /// Refresh the support, standing exactly on it, or queue a fall
    fn check_support(&mut self, world: &dyn CollisionQuery) -> Option<SurfaceType> {
        match self.find_support(world) {
            Some(support) => {
                self.position.y += support.bounds.top() - self.bounds().bottom();
                self.support = Some(support);
                Some(support.surface)
            }
            None => {
                self.support = None;
                self.queue_trigger(Trigger::SuspendedInTheAir);
                None
            }
        }
    }

    /// Closest solid area a horizontal move of `dx` runs into
    fn blocking_wall(&self, world: &dyn CollisionQuery, dx: f32) -> Option<ObjectCollision> {
        if dx == 0.0 {
            return None;
        }
        let body = self.bounds();
        let moved = body.translated(Vec2::new(dx, 0.0));

        world
            .query(&moved, Vec2::new(dx, 0.0), Some(self.id))
            .into_iter()
            .filter(|hit| hit.is_solid())
            .filter(|hit| {
                hit.bounds.min.y < body.max.y - EDGE_EPSILON
                    && body.min.y < hit.bounds.max.y - EDGE_EPSILON
            })
            .filter(|hit| {
                if dx > 0.0 {
                    hit.bounds.min.x >= body.max.x - EDGE_EPSILON && hit.bounds.min.x < moved.max.x
                } else {
                    hit.bounds.max.x <= body.min.x + EDGE_EPSILON && hit.bounds.max.x > moved.min.x
                }
            })
            .min_by(|a, b| {
                let gap = |hit: &ObjectCollision| {
                    if dx > 0.0 {
                        hit.bounds.min.x - body.max.x
                    } else {
                        body.min.x - hit.bounds.max.x
                    }
                };
                gap(a).total_cmp(&gap(b))
            })
    }

    /// Horizontal move that stops flush against walls. Returns true if blocked.
    fn move_horizontally(&mut self, world: &dyn CollisionQuery, dx: f32) -> bool {
        match self.blocking_wall(world, dx) {
            Some(wall) => {
                let body = self.bounds();
                self.position.x += if dx > 0.0 {
                    (wall.bounds.min.x - body.max.x).max(0.0)
                } else {
                    (wall.bounds.max.x - body.min.x).min(0.0)
                };
                true
            }
            None => {
                self.position.x += dx;
                false
            }
        }
    }

    fn update_run(&mut self, world: &dyn CollisionQuery) {
        let facing = self.facing();
        if self.keys.is_held(facing.key()) {
            self.momentum = accelerate(self.momentum, self.stats.momentum_step, self.stats.max_momentum);
        }

        let dx = run_speed(self.momentum, self.stats.run_base_speed, self.stats.momentum_gain)
            * facing.sign();
        let blocked = self.move_horizontally(world, dx);
        if blocked {
            self.momentum = 0;
        }
        self.blocked_right = blocked && facing == Facing::Right;
        self.blocked_left = blocked && facing == Facing::Left;

        self.check_support(world);
    }

    fn update_slip(&mut self, world: &dyn CollisionQuery) {
        self.slip_elapsed += self.stats.time_step;
        let target_x = slip_position(
            self.slip_origin_x,
            self.stats.slip_speed * self.facing().sign(),
            self.slip_elapsed,
        );
        let blocked = self.move_horizontally(world, target_x - self.position.x);
        self.slip_momentum = decelerate(self.slip_momentum, self.stats.slip_decay);

        let surface = self.check_support(world);
        let off_ice = surface.is_some_and(|s| s != SurfaceType::Sliding);
        if blocked || off_ice || self.slip_momentum == 0 {
            self.queue_trigger(Trigger::StopSlipping);
        }
    }

    /// One step along the jump or fall arc
    fn update_arc(&mut self, world: &dyn CollisionQuery, jumping: bool) {
        let gravity = self.stats.gravity;
        let previous_t = self.elapsed;
        let t = previous_t + self.stats.time_step;
        self.elapsed = t;

        let body = self.bounds();
        let local = self.local_bounds();
        let target = self.trajectory.position(t, gravity);
        let moved = local.translated(target);
        let hits = world.query(&moved, target - self.position, Some(self.id));
        let v_speed = self.trajectory.vertical_velocity(t, gravity);

        if v_speed <= 0.0 {
            let floor = hits
                .iter()
                .filter(|hit| hit.bounds.overlaps_horizontally(&moved))
                .filter(|hit| hit.supports_from(body.bottom()) && moved.bottom() <= hit.bounds.top())
                .max_by(|a, b| a.bounds.top().total_cmp(&b.bounds.top()));
            if let Some(floor) = floor {
                self.position = Vec2::new(target.x, floor.bounds.top() - local.min.y);
                self.support = Some(*floor);
                self.queue_trigger(if jumping {
                    Trigger::JumpLanding
                } else {
                    Trigger::FallLanding
                });
                return;
            }
        } else {
            let ceiling = hits
                .iter()
                .filter(|hit| hit.is_solid() && hit.bounds.overlaps_horizontally(&moved))
                .filter(|hit| {
                    body.top() <= hit.bounds.bottom() + EDGE_EPSILON
                        && moved.top() > hit.bounds.bottom()
                })
                .min_by(|a, b| a.bounds.bottom().total_cmp(&b.bounds.bottom()));
            if let Some(ceiling) = ceiling {
                self.position = Vec2::new(target.x, ceiling.bounds.bottom() - local.max.y);
                if jumping {
                    self.queue_trigger(Trigger::TopCollisionDuringJump);
                } else {
                    self.restart_fall(self.trajectory.h_speed, 0.0);
                }
                return;
            }
        }

        // Walls: solid areas entered from the side
        let wall = hits.iter().any(|hit| {
            hit.is_solid() && hit.bounds.overlaps(&moved) && !hit.bounds.overlaps_horizontally(&body)
        });
        if wall {
            self.position = Vec2::new(self.position.x, target.y);
            if jumping {
                self.queue_trigger(Trigger::LateralCollisionDuringJump);
            } else {
                self.restart_fall(0.0, v_speed);
            }
            return;
        }

        self.position = target;
        if !jumping {
            return;
        }

        if !self.apex_reached && self.trajectory.crosses_apex(previous_t, t, gravity) {
            self.apex_reached = true;
            let opposite = self.facing().opposite();
            if self.keys.is_held(opposite.key()) {
                self.queue_trigger(match opposite {
                    Facing::Right => Trigger::RightKeyPressedAtJumpApex,
                    Facing::Left => Trigger::LeftKeyPressedAtJumpApex,
                });
            }
        }
        if self.position.y < self.launch_y {
            self.queue_trigger(Trigger::SuspendedInTheAir);
        }
    }

    /// Continue falling from the current position with new speeds
    fn restart_fall(&mut self, h_speed: f32, v_speed: f32) {
        self.trajectory = Trajectory::fall(self.position, h_speed, v_speed);
        self.elapsed = 0.0;
    }
}
