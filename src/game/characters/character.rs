// Character entity and management

use std::sync::Arc;

use glam::Vec2;
use log::{debug, info};

use crate::core::Rect;
use crate::engine::assets::{AnimationId, SpriteFrame, SpriteSheet};
use crate::engine::input::{Key, KeyEdge, KeyMask, KeyState};
use crate::engine::physics::{CollisionQuery, EntityId, ObjectCollision, SurfaceType, Trajectory};

use super::animation::AnimationPlayer;
use super::state::{CharacterState, CharacterStateMachine, Facing, Motion, TransitionContext, Trigger};
use super::stats::{CharacterProfile, MotionStats};

/// A player-controlled or scripted character
#[derive(Debug)]
pub struct Character {
    /// Unique identifier, also used to skip the character's own collision areas
    pub id: EntityId,
    /// Character name (for logs)
    pub name: String,

    // Type and shared data
    pub(super) profile: CharacterProfile,
    pub(super) stats: MotionStats,
    pub(super) sheet: Option<Arc<SpriteSheet>>,

    // Behavior
    pub(super) state_machine: CharacterStateMachine,
    pub(super) animation: AnimationPlayer,
    pub(super) keys: KeyState,

    // Kinematic state
    /// Origin of the sprite (lower-left corner) in world space
    pub(super) position: Vec2,
    pub(super) momentum: u16,
    /// Arc followed while jumping or falling
    pub(super) trajectory: Trajectory,
    /// Arc time elapsed since `trajectory` started
    pub(super) elapsed: f32,
    pub(super) apex_reached: bool,
    /// Altitude the current jump was launched from
    pub(super) launch_y: f32,
    pub(super) slip_origin_x: f32,
    pub(super) slip_elapsed: f32,
    pub(super) slip_momentum: u16,

    // Surroundings
    /// Surface under the feet, refreshed every grounded tick
    pub(super) support: Option<ObjectCollision>,
    pub(super) blocked_right: bool,
    pub(super) blocked_left: bool,

    // Progress
    pub(super) highest_altitude: f32,
    pub(super) altitude_records: u32,
    pub(super) new_altitude: bool,
    pub(super) active: bool,
}

impl Character {
    /// Create a character standing (or about to fall) at `spawn`
    pub fn new(
        id: EntityId,
        name: &str,
        profile: CharacterProfile,
        stats: MotionStats,
        sheet: Option<Arc<SpriteSheet>>,
        spawn: Vec2,
    ) -> Self {
        let mut character = Self {
            id,
            name: name.to_string(),
            profile,
            stats,
            sheet,
            state_machine: CharacterStateMachine::default(),
            animation: AnimationPlayer::new(),
            keys: KeyState::new(),
            position: spawn,
            momentum: 0,
            trajectory: Trajectory::default(),
            elapsed: 0.0,
            apex_reached: false,
            launch_y: spawn.y,
            slip_origin_x: spawn.x,
            slip_elapsed: 0.0,
            slip_momentum: 0,
            support: None,
            blocked_right: false,
            blocked_left: false,
            highest_altitude: spawn.y,
            altitude_records: 0,
            new_altitude: false,
            active: true,
        };
        character.play_state_animation();
        character
    }

    /// Run one tick with the keys held this tick.
    ///
    /// Returns false once the character has left the level.
    pub fn update(&mut self, keys: KeyMask, world: &dyn CollisionQuery) -> bool {
        if !self.active {
            return false;
        }
        self.new_altitude = false;

        self.keys.advance(keys);
        for edge in self.keys.edges() {
            match edge {
                KeyEdge::Pressed(key) => self.key_pressed(key),
                KeyEdge::Released(key) => self.key_released(key),
            }
        }

        self.state_machine.tick();
        self.update_state(world);

        let ctx = self.transition_context();
        for transition in self.state_machine.resolve(&ctx) {
            self.enter_state(transition);
        }

        self.apply_surface_carry();
        self.clamp_to_screen();
        self.advance_animation();

        if self.bounds().top() < self.stats.kill_plane_y {
            info!("{} fell out of the level at {:?}", self.name, self.position);
            self.active = false;
        }
        self.active
    }

    // Input triggers

    pub fn right_key_pressed(&mut self) {
        self.queue_trigger(Trigger::RightKeyPressed);
    }

    /// Releasing the run key on a sliding surface starts a slip
    pub fn right_key_released(&mut self) {
        let trigger = if self.slips_on_release(Facing::Right) {
            Trigger::StopRunningOnSlidingSurface
        } else {
            Trigger::RightKeyReleased
        };
        self.queue_trigger(trigger);
    }

    pub fn left_key_pressed(&mut self) {
        self.queue_trigger(Trigger::LeftKeyPressed);
    }

    pub fn left_key_released(&mut self) {
        let trigger = if self.slips_on_release(Facing::Left) {
            Trigger::StopRunningOnSlidingSurface
        } else {
            Trigger::LeftKeyReleased
        };
        self.queue_trigger(trigger);
    }

    pub fn up_key_pressed(&mut self) {
        self.queue_trigger(Trigger::UpKeyPressed);
    }

    pub fn space_key_pressed(&mut self) {
        self.queue_trigger(Trigger::SpaceKeyPressed);
    }

    pub fn down_key_pressed(&mut self) {
        self.queue_trigger(Trigger::DownKeyPressed);
    }

    /// Queue any trigger for the next tick's resolution
    pub fn queue_trigger(&mut self, trigger: Trigger) {
        self.state_machine.queue(trigger);
    }

    fn key_pressed(&mut self, key: Key) {
        match key {
            Key::Right => self.right_key_pressed(),
            Key::Left => self.left_key_pressed(),
            Key::Up => self.up_key_pressed(),
            Key::Space => self.space_key_pressed(),
            Key::Down => self.down_key_pressed(),
        }
    }

    fn key_released(&mut self, key: Key) {
        match key {
            Key::Right => self.right_key_released(),
            Key::Left => self.left_key_released(),
            _ => {}
        }
    }

    fn slips_on_release(&self, facing: Facing) -> bool {
        self.state() == CharacterState::new(Motion::Run, facing)
            && self.underlying_surface() == Some(SurfaceType::Sliding)
    }

    pub(super) fn transition_context(&self) -> TransitionContext {
        TransitionContext {
            held: self.keys.current(),
            can_slip: self.profile.can_slip,
        }
    }

    // Animation

    /// Start the animation of the current state from its first frame
    pub(super) fn play_state_animation(&mut self) {
        let state = self.state();
        let Some(sheet) = self.sheet.as_deref() else {
            return;
        };
        match self.profile.animations.animation_for(state) {
            Some(animation_id) => {
                let one_shot = self.profile.animations.is_one_shot(state);
                if let Err(err) = self.animation.play(sheet, animation_id, one_shot) {
                    debug!("{}: no animation for {}: {}", self.name, state, err);
                }
            }
            None => {
                debug!("{}: {} has no animation", self.name, state);
                self.animation.stop();
            }
        }
    }

    fn advance_animation(&mut self) {
        let state = self.state();
        let loop_ended = match self.sheet.as_deref() {
            Some(sheet) if self.animation.is_playing() => self.animation.update(sheet),
            // Nothing to wait for: a one-shot state without frames ends right away
            _ => self.profile.animations.is_one_shot(state),
        };
        if !loop_ended {
            return;
        }

        let ctx = self.transition_context();
        if let Some(transition) = self.state_machine.fire(Trigger::AnimationLoopEnded, &ctx) {
            self.enter_state(transition);
        }
    }

    /// Whether the current animation went back to its first frame
    pub fn should_begin_animation_loop_again(&self) -> bool {
        self.animation.should_begin_animation_loop_again()
    }

    pub fn animation_id(&self) -> Option<AnimationId> {
        self.animation.current_animation()
    }

    /// Frame currently displayed, if the character has one
    pub fn current_frame(&self) -> Option<&SpriteFrame> {
        let sheet = self.sheet.as_deref()?;
        self.animation.current_frame(sheet)
    }

    // Geometry

    /// Collision bounds relative to the sprite origin
    pub fn local_bounds(&self) -> Rect {
        self.current_frame()
            .map(|frame| frame.bounds)
            .unwrap_or_else(|| {
                Rect::from_coords(0.0, 0.0, self.stats.fallback_width, self.stats.fallback_height)
            })
    }

    /// Collision bounds in world space
    pub fn bounds(&self) -> Rect {
        self.local_bounds().translated(self.position)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Teleport, dropping any arc in progress
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.trajectory = Trajectory::default();
        self.elapsed = 0.0;
        self.support = None;
    }

    // State queries

    pub fn state(&self) -> CharacterState {
        self.state_machine.state()
    }

    pub fn previous_state(&self) -> CharacterState {
        self.state_machine.previous_state()
    }

    pub fn facing(&self) -> Facing {
        self.state().facing
    }

    pub fn momentum(&self) -> u16 {
        self.momentum
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn is_blocked_right(&self) -> bool {
        self.blocked_right
    }

    pub fn is_blocked_left(&self) -> bool {
        self.blocked_left
    }

    /// Surface type under the character, if standing on something
    pub fn underlying_surface(&self) -> Option<SurfaceType> {
        self.support.map(|support| support.surface)
    }

    /// Highest altitude the character has landed on
    pub fn highest_altitude(&self) -> f32 {
        self.highest_altitude
    }

    /// Number of times a new highest altitude was reached
    pub fn altitude_records(&self) -> u32 {
        self.altitude_records
    }

    /// Whether the last tick set a new altitude record
    pub fn reached_new_altitude(&self) -> bool {
        self.new_altitude
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn profile(&self) -> &CharacterProfile {
        &self.profile
    }

    pub fn stats(&self) -> &MotionStats {
        &self.stats
    }
}

/// Manages all characters in the level
#[derive(Debug, Default)]
pub struct CharacterManager {
    characters: Vec<Character>,
    next_id: EntityId,
}

impl CharacterManager {
    /// Character ids start here so they stay clear of level objects
    pub const FIRST_ID: EntityId = 1000;

    pub fn new() -> Self {
        Self::with_first_id(Self::FIRST_ID)
    }

    pub fn with_first_id(first_id: EntityId) -> Self {
        Self {
            characters: Vec::new(),
            next_id: first_id,
        }
    }

    /// Spawn a new character
    pub fn spawn_character(
        &mut self,
        name: &str,
        profile: CharacterProfile,
        stats: MotionStats,
        sheet: Option<Arc<SpriteSheet>>,
        spawn: Vec2,
    ) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;

        info!("Spawned {} (id {}) at {:?}", name, id, spawn);
        self.characters
            .push(Character::new(id, name, profile, stats, sheet, spawn));
        id
    }

    /// Get a character by ID
    pub fn get(&self, id: EntityId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Get a mutable character by ID
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Get all characters
    pub fn all(&self) -> &[Character] {
        &self.characters
    }

    /// Update every character once, then drop the ones that left the level.
    ///
    /// Returns the ids of the removed characters.
    pub fn update<F>(&mut self, world: &dyn CollisionQuery, mut keys_for: F) -> Vec<EntityId>
    where
        F: FnMut(&Character) -> KeyMask,
    {
        for character in &mut self.characters {
            let keys = keys_for(character);
            character.update(keys, world);
        }

        let removed: Vec<EntityId> = self
            .characters
            .iter()
            .filter(|c| !c.is_active())
            .map(|c| c.id)
            .collect();
        if !removed.is_empty() {
            debug!("Removing characters {:?}", removed);
            self.characters.retain(|c| c.is_active());
        }
        removed
    }

    /// Remove a character by ID
    pub fn remove(&mut self, id: EntityId) -> Option<Character> {
        let pos = self.characters.iter().position(|c| c.id == id)?;
        Some(self.characters.remove(pos))
    }

    /// Get the number of characters
    pub fn count(&self) -> usize {
        self.characters.len()
    }

    /// Check if there are no characters left
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::CollisionWorld;
    use approx::assert_abs_diff_eq;

    const FLOOR: EntityId = 1;

    fn floor(surface: SurfaceType) -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_block(FLOOR, Rect::from_coords(0.0, 0.0, 256.0, 16.0), surface);
        world
    }

    fn player_at(x: f32, y: f32) -> Character {
        Character::new(
            1000,
            "player",
            CharacterProfile::player(),
            MotionStats::standard(),
            None,
            Vec2::new(x, y),
        )
    }

    fn state(motion: Motion, facing: Facing) -> CharacterState {
        CharacterState::new(motion, facing)
    }

    fn keys(keys: &[Key]) -> KeyMask {
        KeyMask::of(keys)
    }

    /// Tick until `done` holds, failing after `limit` ticks
    fn run_until(
        character: &mut Character,
        world: &dyn CollisionQuery,
        mask: KeyMask,
        limit: usize,
        done: impl Fn(&Character) -> bool,
    ) -> usize {
        for tick in 1..=limit {
            character.update(mask, world);
            if done(character) {
                return tick;
            }
        }
        panic!("condition not reached after {} ticks, state {}", limit, character.state());
    }

    #[test]
    fn test_idle_on_floor() {
        let world = floor(SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);
        for _ in 0..10 {
            assert!(player.update(KeyMask::NONE, &world));
        }
        assert_eq!(player.state(), state(Motion::Idle, Facing::Right));
        assert_abs_diff_eq!(player.position().y, 16.0);
        assert_eq!(player.underlying_surface(), Some(SurfaceType::Simple));
    }

    #[test]
    fn test_run_momentum_saturates_and_resets() {
        let world = floor(SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);

        player.update(keys(&[Key::Right]), &world);
        assert_eq!(player.state(), state(Motion::Run, Facing::Right));
        assert_eq!(player.momentum(), 0);

        for _ in 0..30 {
            player.update(keys(&[Key::Right]), &world);
            assert!(player.momentum() <= 15);
        }
        assert_eq!(player.momentum(), 15);
        assert!(player.position().x > 130.0);

        player.update(KeyMask::NONE, &world);
        assert_eq!(player.state(), state(Motion::Idle, Facing::Right));
        assert_eq!(player.momentum(), 0);
    }

    #[test]
    fn test_run_jump_head_bump() {
        let world = floor(SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);

        player.update(keys(&[Key::Right]), &world);
        assert_eq!(player.state(), state(Motion::Run, Facing::Right));

        player.update(keys(&[Key::Right, Key::Up]), &world);
        assert_eq!(player.state(), state(Motion::JumpRun, Facing::Right));

        player.queue_trigger(Trigger::TopCollisionDuringJump);
        player.update(keys(&[Key::Right]), &world);
        assert_eq!(player.state(), state(Motion::FallRun, Facing::Right));
        assert_eq!(player.trajectory().v_speed, 0.0);
        assert!(player.trajectory().h_speed > 0.0);
    }

    #[test]
    fn test_ceiling_stops_jump() {
        let mut world = floor(SurfaceType::Simple);
        world.add_block(2, Rect::from_coords(0.0, 50.0, 256.0, 60.0), SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);

        player.update(keys(&[Key::Right]), &world);
        player.update(keys(&[Key::Right, Key::Up]), &world);
        run_until(&mut player, &world, keys(&[Key::Right]), 10, |c| {
            c.state() == state(Motion::FallRun, Facing::Right)
        });
        assert_abs_diff_eq!(player.bounds().top(), 50.0, epsilon = 1e-4);

        // Back on the floor with the key still held
        run_until(&mut player, &world, keys(&[Key::Right]), 100, |c| {
            c.state().motion.is_grounded()
        });
        assert_eq!(player.state(), state(Motion::Run, Facing::Right));
        assert_abs_diff_eq!(player.position().y, 16.0, epsilon = 1e-4);
    }

    #[test]
    fn test_jump_lands_where_it_started() {
        let world = floor(SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);

        player.update(keys(&[Key::Up]), &world);
        assert_eq!(player.state(), state(Motion::JumpIdle, Facing::Right));

        let ticks = run_until(&mut player, &world, KeyMask::NONE, 120, |c| {
            c.state().motion.is_grounded()
        });
        assert_eq!(ticks, 82);
        assert_eq!(player.state(), state(Motion::Idle, Facing::Right));
        assert_eq!(player.previous_state(), state(Motion::JumpIdle, Facing::Right));
        assert_abs_diff_eq!(player.position().x, 100.0);
        assert_abs_diff_eq!(player.position().y, 16.0, epsilon = 1e-4);
        assert_eq!(player.altitude_records(), 0);
    }

    #[test]
    fn test_turn_at_apex() {
        let world = floor(SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);

        player.update(keys(&[Key::Right]), &world);
        player.update(keys(&[Key::Right, Key::Up]), &world);

        // Pressing left on the way up does nothing
        for _ in 0..30 {
            player.update(keys(&[Key::Left]), &world);
            assert_eq!(player.state(), state(Motion::JumpRun, Facing::Right));
        }

        run_until(&mut player, &world, keys(&[Key::Left]), 20, |c| {
            c.facing() == Facing::Left
        });
        assert_eq!(player.state(), state(Motion::JumpRun, Facing::Left));
        assert!(player.trajectory().h_speed < 0.0);

        run_until(&mut player, &world, keys(&[Key::Left]), 100, |c| {
            c.state().motion.is_grounded()
        });
        assert_eq!(player.state(), state(Motion::Run, Facing::Left));
    }

    #[test]
    fn test_support_loss_beats_key_press() {
        let world = floor(SurfaceType::Simple);
        let mut player = player_at(100.0, 20.0);

        player.update(keys(&[Key::Right]), &world);
        assert_eq!(player.state(), state(Motion::FallIdle, Facing::Right));

        run_until(&mut player, &world, keys(&[Key::Right]), 30, |c| {
            c.state().motion.is_grounded()
        });
        assert_eq!(player.state(), state(Motion::Run, Facing::Right));
        assert_abs_diff_eq!(player.position().y, 16.0, epsilon = 1e-4);
    }

    #[test]
    fn test_wall_blocks_run() {
        let mut world = floor(SurfaceType::Simple);
        world.add_block(2, Rect::from_coords(130.0, 16.0, 146.0, 48.0), SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);

        for _ in 0..40 {
            player.update(keys(&[Key::Right]), &world);
        }
        assert_eq!(player.state(), state(Motion::Run, Facing::Right));
        assert!(player.is_blocked_right());
        assert!(!player.is_blocked_left());
        assert_abs_diff_eq!(player.bounds().max.x, 130.0, epsilon = 1e-4);
    }

    #[test]
    fn test_wall_during_jump() {
        let mut world = floor(SurfaceType::Simple);
        world.add_block(2, Rect::from_coords(130.0, 16.0, 146.0, 200.0), SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);

        player.update(keys(&[Key::Right]), &world);
        player.update(keys(&[Key::Right, Key::Up]), &world);
        run_until(&mut player, &world, KeyMask::NONE, 40, |c| {
            c.state() == state(Motion::FallJumpRun, Facing::Right)
        });
        assert_eq!(player.trajectory().h_speed, 0.0);
        assert!(player.bounds().max.x <= 130.0);

        run_until(&mut player, &world, KeyMask::NONE, 150, |c| {
            c.state().motion.is_grounded()
        });
        assert_eq!(player.state(), state(Motion::Idle, Facing::Right));
        assert!(player.bounds().max.x <= 130.0);
    }

    #[test]
    fn test_slip_on_ice() {
        let world = floor(SurfaceType::Sliding);
        let mut player = player_at(100.0, 16.0);

        for _ in 0..10 {
            player.update(keys(&[Key::Right]), &world);
        }
        let released_at = player.position().x;

        player.update(KeyMask::NONE, &world);
        assert_eq!(player.state(), state(Motion::Slip, Facing::Right));
        assert_eq!(player.momentum(), 0);

        run_until(&mut player, &world, KeyMask::NONE, 30, |c| {
            c.state().motion == Motion::Idle
        });
        assert_eq!(player.state(), state(Motion::Idle, Facing::Right));
        assert!(player.position().x > released_at + 5.0);
    }

    /// Run right for ten ticks, then release to start slipping
    fn start_slip(player: &mut Character, world: &dyn CollisionQuery) {
        for _ in 0..10 {
            player.update(keys(&[Key::Right]), world);
        }
        player.update(KeyMask::NONE, world);
        assert_eq!(player.state(), state(Motion::Slip, Facing::Right));
    }

    #[test]
    fn test_slip_ends_where_ice_ends() {
        let mut world = CollisionWorld::new();
        world.add_block(1, Rect::from_coords(0.0, 0.0, 88.0, 16.0), SurfaceType::Sliding);
        world.add_block(2, Rect::from_coords(88.0, 0.0, 256.0, 16.0), SurfaceType::Simple);
        let mut player = player_at(60.0, 16.0);
        start_slip(&mut player, &world);

        run_until(&mut player, &world, KeyMask::NONE, 20, |c| {
            c.state().motion != Motion::Slip
        });
        assert_eq!(player.state(), state(Motion::Idle, Facing::Right));
        assert_eq!(player.previous_state(), state(Motion::Slip, Facing::Right));
        assert_eq!(player.underlying_surface(), Some(SurfaceType::Simple));
        // Stopped by the surface, not by running out of momentum
        assert!(player.slip_momentum > 0);
        assert!(player.position().x < 84.0);
    }

    #[test]
    fn test_slip_stops_at_wall() {
        let mut world = floor(SurfaceType::Sliding);
        world.add_block(2, Rect::from_coords(130.0, 16.0, 146.0, 48.0), SurfaceType::Simple);
        let mut player = player_at(90.0, 16.0);
        start_slip(&mut player, &world);

        run_until(&mut player, &world, KeyMask::NONE, 20, |c| {
            c.state().motion != Motion::Slip
        });
        assert_eq!(player.state(), state(Motion::Idle, Facing::Right));
        assert_eq!(player.previous_state(), state(Motion::Slip, Facing::Right));
        assert!(player.slip_momentum > 0);
        assert_abs_diff_eq!(player.bounds().max.x, 130.0, epsilon = 1e-3);
    }

    #[test]
    fn test_slip_off_ledge_falls() {
        let mut world = CollisionWorld::new();
        world.add_block(FLOOR, Rect::from_coords(0.0, 0.0, 120.0, 16.0), SurfaceType::Sliding);
        let mut player = player_at(100.0, 16.0);
        start_slip(&mut player, &world);

        run_until(&mut player, &world, KeyMask::NONE, 20, |c| {
            c.state().motion != Motion::Slip
        });
        assert_eq!(player.state(), state(Motion::FallIdle, Facing::Right));
        assert_eq!(player.previous_state(), state(Motion::Slip, Facing::Right));
        assert!(player.bounds().min.x >= 120.0);
        assert_eq!(player.underlying_surface(), None);
    }

    #[test]
    fn test_hit_while_slipping() {
        let world = floor(SurfaceType::Sliding);
        let mut player = player_at(100.0, 16.0);
        start_slip(&mut player, &world);

        player.update(keys(&[Key::Down]), &world);
        assert_eq!(player.state(), state(Motion::Hit, Facing::Right));
        assert_eq!(player.momentum(), 0);
    }

    #[test]
    fn test_support_prefers_surface_under_most_of_body() {
        let mut world = CollisionWorld::new();
        world.add_block(1, Rect::from_coords(0.0, 0.0, 90.0, 16.0), SurfaceType::Sliding);
        world.add_block(2, Rect::from_coords(90.0, 0.0, 256.0, 16.0), SurfaceType::Simple);

        let mut mostly_on_ice = player_at(80.0, 16.0);
        mostly_on_ice.update(KeyMask::NONE, &world);
        assert_eq!(mostly_on_ice.underlying_surface(), Some(SurfaceType::Sliding));

        let mut mostly_on_brick = player_at(86.0, 16.0);
        mostly_on_brick.update(KeyMask::NONE, &world);
        assert_eq!(mostly_on_brick.underlying_surface(), Some(SurfaceType::Simple));
    }

    #[test]
    fn test_scripted_character_does_not_slip() {
        let world = floor(SurfaceType::Sliding);
        let mut walker = Character::new(
            7,
            "walker",
            CharacterProfile::scripted(),
            MotionStats::standard(),
            None,
            Vec2::new(100.0, 16.0),
        );

        for _ in 0..10 {
            walker.update(keys(&[Key::Left]), &world);
        }
        walker.update(KeyMask::NONE, &world);
        assert_eq!(walker.state(), state(Motion::Idle, Facing::Left));
    }

    #[test]
    fn test_mobile_platform_carries() {
        let mut world = CollisionWorld::new();
        world.add_block(5, Rect::from_coords(80.0, 0.0, 150.0, 16.0), SurfaceType::Mobile);
        let mut player = player_at(100.0, 16.0);

        for _ in 0..10 {
            world.begin_tick();
            world.move_object(5, Vec2::new(1.0, 0.0));
            player.update(KeyMask::NONE, &world);
        }
        assert_eq!(player.state(), state(Motion::Idle, Facing::Right));
        assert_eq!(player.underlying_surface(), Some(SurfaceType::Mobile));
        assert_abs_diff_eq!(player.position().x, 110.0, epsilon = 1e-4);
    }

    #[test]
    fn test_screen_edge_clamp() {
        let world = floor(SurfaceType::Simple);
        let mut player = player_at(230.0, 16.0);

        for _ in 0..30 {
            player.update(keys(&[Key::Right]), &world);
            assert!(player.bounds().max.x <= 256.0);
        }
        assert_abs_diff_eq!(player.bounds().max.x, 256.0, epsilon = 1e-4);

        for _ in 0..200 {
            player.update(keys(&[Key::Left]), &world);
        }
        assert_abs_diff_eq!(player.bounds().min.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_falls_out_of_level() {
        let mut player = player_at(100.0, 0.0);
        let ticks = run_until(&mut player, &(), KeyMask::NONE, 200, |c| !c.is_active());
        assert!(ticks > 1);
        assert!(player.bounds().top() < MotionStats::standard().kill_plane_y);
        assert!(!player.update(KeyMask::NONE, &()));
    }

    #[test]
    fn test_new_altitude_record() {
        let mut world = floor(SurfaceType::Simple);
        // One-way platform the jump passes through from below
        world.add_platform(2, Rect::from_coords(90.0, 40.0, 200.0, 48.0), SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);

        player.update(keys(&[Key::Up]), &world);
        run_until(&mut player, &world, KeyMask::NONE, 120, |c| {
            c.state().motion.is_grounded()
        });

        assert!(player.reached_new_altitude());
        assert_eq!(player.altitude_records(), 1);
        assert_abs_diff_eq!(player.highest_altitude(), 48.0, epsilon = 1e-4);
        assert_abs_diff_eq!(player.position().y, 48.0, epsilon = 1e-4);

        player.update(KeyMask::NONE, &world);
        assert!(!player.reached_new_altitude());
    }

    fn hit_sheet() -> Arc<SpriteSheet> {
        let mut sheet = SpriteSheet::new(1);
        let idle = state(Motion::Idle, Facing::Right).index() as AnimationId;
        let hit = state(Motion::Hit, Facing::Right).index() as AnimationId;
        sheet.add_frame(idle, SpriteFrame::new(16, 24, 10));
        sheet.add_frame(hit, SpriteFrame::new(24, 24, 3));
        sheet.add_frame(hit, SpriteFrame::new(24, 24, 3));
        Arc::new(sheet)
    }

    #[test]
    fn test_hit_ends_with_its_animation() {
        let world = floor(SurfaceType::Simple);
        let mut player = Character::new(
            1000,
            "player",
            CharacterProfile::player(),
            MotionStats::standard(),
            Some(hit_sheet()),
            Vec2::new(100.0, 16.0),
        );
        assert_eq!(player.animation_id(), Some(0));

        player.update(keys(&[Key::Down]), &world);
        assert_eq!(player.state(), state(Motion::Hit, Facing::Right));
        assert_abs_diff_eq!(player.bounds().width(), 24.0);

        for _ in 0..3 {
            player.update(keys(&[Key::Down]), &world);
            assert_eq!(player.state(), state(Motion::Hit, Facing::Right));
        }

        run_until(&mut player, &world, keys(&[Key::Down]), 5, |c| {
            c.state().motion == Motion::Idle
        });
        assert_eq!(player.animation_id(), Some(0));
    }

    #[test]
    fn test_missing_animation_uses_fallback_bounds() {
        let world = floor(SurfaceType::Simple);
        let mut player = Character::new(
            1000,
            "player",
            CharacterProfile::player(),
            MotionStats::standard(),
            Some(hit_sheet()),
            Vec2::new(100.0, 16.0),
        );

        // Run_Right has no frames in this sheet
        player.update(keys(&[Key::Right]), &world);
        assert_eq!(player.animation_id(), None);
        assert_abs_diff_eq!(player.bounds().width(), 16.0);
        assert_abs_diff_eq!(player.bounds().height(), 24.0);
    }

    #[test]
    fn test_hit_without_sprites_ends() {
        let world = floor(SurfaceType::Simple);
        let mut player = player_at(100.0, 16.0);

        player.update(keys(&[Key::Down]), &world);
        assert_eq!(player.state().motion, Motion::Idle);
        assert_eq!(player.previous_state().motion, Motion::Hit);
    }

    #[test]
    fn test_manager_removes_fallen_characters() {
        let mut world = CollisionWorld::new();
        world.add_block(FLOOR, Rect::from_coords(0.0, 0.0, 64.0, 16.0), SurfaceType::Simple);

        let mut manager = CharacterManager::new();
        let standing = manager.spawn_character(
            "standing",
            CharacterProfile::player(),
            MotionStats::standard(),
            None,
            Vec2::new(20.0, 16.0),
        );
        let falling = manager.spawn_character(
            "falling",
            CharacterProfile::scripted(),
            MotionStats::standard(),
            None,
            Vec2::new(200.0, 16.0),
        );
        assert_eq!(manager.count(), 2);
        assert!(standing >= CharacterManager::FIRST_ID);

        let mut removed = Vec::new();
        for _ in 0..100 {
            removed.extend(manager.update(&world, |_| KeyMask::NONE));
        }

        assert_eq!(removed, vec![falling]);
        assert_eq!(manager.count(), 1);
        assert!(manager.get(standing).is_some());
        assert!(manager.get(falling).is_none());
        assert!(manager.remove(standing).is_some());
        assert!(manager.is_empty());
    }
}
