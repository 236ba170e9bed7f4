// Closed-form character kinematics
//
// Everything here is a pure function of its arguments: the character keeps
// the trajectory parameters and the elapsed time, these functions only
// evaluate them.

use glam::Vec2;

/// Parameters of a ballistic arc (jump or fall)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Trajectory {
    /// Position at t = 0
    pub origin: Vec2,
    /// Constant horizontal speed
    pub h_speed: f32,
    /// Vertical speed at t = 0 (positive is up)
    pub v_speed: f32,
}

impl Trajectory {
    /// Upward launch
    pub fn jump(origin: Vec2, h_speed: f32, v_speed: f32) -> Self {
        Self {
            origin,
            h_speed,
            v_speed,
        }
    }

    /// Free fall, optionally keeping a vertical speed inherited from a jump
    pub fn fall(origin: Vec2, h_speed: f32, v_speed: f32) -> Self {
        Self {
            origin,
            h_speed,
            v_speed,
        }
    }

    /// `x0 + h*t`, `y0 + v*t - g*t²/2`
    pub fn position(&self, t: f32, gravity: f32) -> Vec2 {
        Vec2::new(
            self.origin.x + self.h_speed * t,
            self.origin.y + self.v_speed * t - 0.5 * gravity * t * t,
        )
    }

    pub fn vertical_velocity(&self, t: f32, gravity: f32) -> f32 {
        self.v_speed - gravity * t
    }

    pub fn velocity(&self, t: f32, gravity: f32) -> Vec2 {
        Vec2::new(self.h_speed, self.vertical_velocity(t, gravity))
    }

    /// Time at which vertical velocity reaches zero, if the arc goes up at all
    pub fn apex_time(&self, gravity: f32) -> Option<f32> {
        (self.v_speed > 0.0 && gravity > 0.0).then(|| self.v_speed / gravity)
    }

    /// Whether the apex lies in `(previous_t, t]`.
    ///
    /// Stepping t monotonically, this is true for exactly one step.
    pub fn crosses_apex(&self, previous_t: f32, t: f32, gravity: f32) -> bool {
        self.apex_time(gravity)
            .is_some_and(|apex| previous_t < apex && apex <= t)
    }

    /// New arc starting where this one is at `t`, with the same vertical
    /// velocity and a replacement horizontal speed
    pub fn rebased(&self, t: f32, gravity: f32, h_speed: f32) -> Self {
        Self {
            origin: self.position(t, gravity),
            h_speed,
            v_speed: self.vertical_velocity(t, gravity),
        }
    }
}

/// Run momentum after one tick with the direction key held
pub fn accelerate(momentum: u16, step: u16, max_momentum: u16) -> u16 {
    momentum.saturating_add(step).min(max_momentum)
}

/// Momentum after one tick of slipping
pub fn decelerate(momentum: u16, step: u16) -> u16 {
    momentum.saturating_sub(step)
}

/// Horizontal run speed (pixels per tick) for a momentum value
pub fn run_speed(momentum: u16, base_speed: f32, momentum_gain: f32) -> f32 {
    base_speed + momentum as f32 * momentum_gain
}

/// Horizontal position while sliding at a constant speed
pub fn slip_position(origin_x: f32, slide_speed: f32, t: f32) -> f32 {
    origin_x + slide_speed * t
}
