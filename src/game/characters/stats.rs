// Character motion constants and character types
// Every character runs on the same motion constants; the profile decides
// which sprite sheet and which states it has.

use crate::engine::assets::ObjectId;

use super::animation::AnimationTable;

/// Motion constants shared by every character
#[derive(Debug, Clone, PartialEq)]
pub struct MotionStats {
    // Arcs
    /// Gravity applied to jump and fall arcs (pixels per arc-time unit²)
    pub gravity: f32,
    /// Arc time elapsed per tick
    pub time_step: f32,
    /// Vertical launch speed of a jump (pixels per arc-time unit)
    pub jump_v_speed: f32,
    /// Horizontal speed of a running jump (pixels per arc-time unit)
    pub jump_h_speed: f32,

    // Running
    /// Run speed at zero momentum (pixels per tick)
    pub run_base_speed: f32,
    /// Extra run speed per momentum point (pixels per tick)
    pub momentum_gain: f32,
    /// Momentum gained per tick with the direction key held
    pub momentum_step: u16,
    pub max_momentum: u16,

    // Slipping
    /// Slide speed on a sliding surface (pixels per arc-time unit)
    pub slip_speed: f32,
    /// Slip momentum lost per tick
    pub slip_decay: u16,

    // World
    /// Characters are kept within [0, screen_width]
    pub screen_width: f32,
    /// Characters whose top falls below this altitude are removed
    pub kill_plane_y: f32,
    /// Body size used when no sprite frame is available
    pub fallback_width: f32,
    pub fallback_height: f32,
    /// Depth of the strip under the feet searched for support
    pub support_probe: f32,
}

/// The motion constants used by every character
pub const STANDARD_STATS: MotionStats = MotionStats {
    gravity: 9.81,
    time_step: 0.1,
    // Peaks about 81 px above the launch point after 41 ticks
    jump_v_speed: 40.0,
    jump_h_speed: 12.0,

    run_base_speed: 1.0,
    momentum_gain: 0.1,
    momentum_step: 1,
    max_momentum: 15,

    slip_speed: 15.0,
    slip_decay: 1,

    screen_width: 256.0,
    kill_plane_y: -64.0,
    fallback_width: 16.0,
    fallback_height: 24.0,
    support_probe: 2.0,
};

impl Default for MotionStats {
    fn default() -> Self {
        STANDARD_STATS
    }
}

impl MotionStats {
    /// Get the standard motion constants
    pub fn standard() -> Self {
        STANDARD_STATS
    }

    /// Run speed converted to arc-time units, for arcs leaving a run
    pub fn run_speed_per_arc_time(&self, run_speed: f32) -> f32 {
        if self.time_step > 0.0 {
            run_speed / self.time_step
        } else {
            0.0
        }
    }
}

/// Character type: player or scripted
#[derive(Debug, Clone)]
pub struct CharacterProfile {
    /// Sprite sheet holding the character's animations
    pub sheet_id: ObjectId,
    /// Whether the character has Slip states
    pub can_slip: bool,
    pub animations: AnimationTable,
}

impl CharacterProfile {
    pub const PLAYER_SHEET: ObjectId = 1;
    pub const SCRIPTED_SHEET: ObjectId = 2;

    /// Player-controlled character: all 18 states
    pub fn player() -> Self {
        Self {
            sheet_id: Self::PLAYER_SHEET,
            can_slip: true,
            animations: AnimationTable::standard(true),
        }
    }

    /// Scripted character: 16 states, no Slip
    pub fn scripted() -> Self {
        Self {
            sheet_id: Self::SCRIPTED_SHEET,
            can_slip: false,
            animations: AnimationTable::standard(false),
        }
    }

    /// Use another sprite sheet
    pub fn with_sheet(mut self, sheet_id: ObjectId) -> Self {
        self.sheet_id = sheet_id;
        self
    }

    pub fn state_count(&self) -> usize {
        self.animations.len()
    }
}
