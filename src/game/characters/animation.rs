// Character animation system

use std::collections::{HashMap, HashSet};

use crate::engine::assets::{AnimationId, AssetError, FrameCursor, SpriteFrame, SpriteSheet};

use super::state::{CharacterState, Motion};

/// Which animation of the sprite sheet plays in each state
#[derive(Debug, Clone, Default)]
pub struct AnimationTable {
    animations: HashMap<CharacterState, AnimationId>,
    /// Motions whose animation plays once and then ends the state
    one_shot: HashSet<Motion>,
}

impl AnimationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animation ids numbered like the states (Idle_Right = 0, Idle_Left = 1, ...).
    ///
    /// Hit plays once. Without slip the two Slip states are left out.
    pub fn standard(with_slip: bool) -> Self {
        let mut table = Self::new().with_one_shot(Motion::Hit);
        for state in CharacterState::all() {
            if state.motion == Motion::Slip && !with_slip {
                continue;
            }
            table = table.with_animation(state, state.index() as AnimationId);
        }
        table
    }

    pub fn with_animation(mut self, state: CharacterState, animation: AnimationId) -> Self {
        self.animations.insert(state, animation);
        self
    }

    pub fn with_one_shot(mut self, motion: Motion) -> Self {
        self.one_shot.insert(motion);
        self
    }

    pub fn animation_for(&self, state: CharacterState) -> Option<AnimationId> {
        self.animations.get(&state).copied()
    }

    pub fn is_one_shot(&self, state: CharacterState) -> bool {
        self.one_shot.contains(&state.motion)
    }

    /// Number of states with an animation
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

/// Plays one animation of a shared sprite sheet for one character
#[derive(Debug, Clone, Default)]
pub struct AnimationPlayer {
    /// Currently playing animation, if it could be started
    current_animation: Option<AnimationId>,
    cursor: FrameCursor,
    /// Index of the frame on screen
    current_frame: usize,
    /// Ticks left before the next frame
    ticks_remaining: u32,
    only_one_sprite: bool,
    one_shot: bool,
    /// Set when the animation wrapped back to its first frame
    loop_completed: bool,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an animation from its first frame.
    ///
    /// On error nothing plays until the next successful call.
    pub fn play(
        &mut self,
        sheet: &SpriteSheet,
        animation_id: AnimationId,
        one_shot: bool,
    ) -> Result<(), AssetError> {
        self.stop();
        sheet.reset_to_first_frame(animation_id, &mut self.cursor)?;
        let frame = sheet.next_frame(animation_id, &mut self.cursor)?;

        self.current_animation = Some(animation_id);
        self.current_frame = 0;
        self.ticks_remaining = frame.duration_ticks.max(1);
        self.only_one_sprite = sheet
            .animation(animation_id)
            .is_some_and(|animation| animation.frame_count() == 1);
        self.one_shot = one_shot;
        Ok(())
    }

    /// Stop playing; `current_frame` returns `None` afterwards
    pub fn stop(&mut self) {
        self.current_animation = None;
        self.current_frame = 0;
        self.ticks_remaining = 0;
        self.only_one_sprite = false;
        self.one_shot = false;
        self.loop_completed = false;
    }

    /// Advance by one tick.
    ///
    /// Returns true on the tick a one-shot animation finishes its loop.
    pub fn update(&mut self, sheet: &SpriteSheet) -> bool {
        let Some(animation_id) = self.current_animation else {
            return false;
        };
        // A single looping sprite never changes
        if self.only_one_sprite && !self.one_shot {
            return false;
        }

        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        if self.ticks_remaining > 0 {
            return false;
        }

        let wrapped = self.only_one_sprite || self.cursor.index() == 0;
        let index = self.cursor.index();
        match sheet.next_frame(animation_id, &mut self.cursor) {
            Ok(frame) => {
                self.current_frame = index;
                self.ticks_remaining = frame.duration_ticks.max(1);
            }
            // The sheet lost the animation: keep showing the last frame
            Err(_) => return false,
        }

        if wrapped {
            self.loop_completed = true;
        }
        wrapped && self.one_shot
    }

    /// Whether the animation has gone back to its first frame since `play`
    pub fn should_begin_animation_loop_again(&self) -> bool {
        self.loop_completed
    }

    pub fn current_animation(&self) -> Option<AnimationId> {
        self.current_animation
    }

    /// Index of the frame on screen
    pub fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    pub fn is_playing(&self) -> bool {
        self.current_animation.is_some()
    }

    pub fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    /// Frame on screen, looked up in the sheet it was started from
    pub fn current_frame<'a>(&self, sheet: &'a SpriteSheet) -> Option<&'a SpriteFrame> {
        let animation = sheet.animation(self.current_animation?)?;
        animation.frame(self.current_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::characters::state::Facing;

    fn sheet() -> SpriteSheet {
        let mut sheet = SpriteSheet::new(1);
        // 3 frames of 2 ticks each
        for width in [10, 11, 12] {
            sheet.add_frame(5, SpriteFrame::new(width, 16, 2));
        }
        sheet.add_frame(6, SpriteFrame::new(20, 16, 1));
        sheet
    }

    #[test]
    fn test_standard_table() {
        let table = AnimationTable::standard(true);
        assert_eq!(table.len(), 18);
        assert_eq!(
            table.animation_for(CharacterState::new(Motion::Idle, Facing::Right)),
            Some(0)
        );
        assert_eq!(
            table.animation_for(CharacterState::new(Motion::Slip, Facing::Left)),
            Some(17)
        );
        assert!(table.is_one_shot(CharacterState::new(Motion::Hit, Facing::Left)));
        assert!(!table.is_one_shot(CharacterState::new(Motion::Run, Facing::Left)));

        let no_slip = AnimationTable::standard(false);
        assert_eq!(no_slip.len(), 16);
        assert_eq!(
            no_slip.animation_for(CharacterState::new(Motion::Slip, Facing::Right)),
            None
        );
    }

    #[test]
    fn test_play_starts_on_first_frame() {
        let sheet = sheet();
        let mut player = AnimationPlayer::new();
        player.play(&sheet, 5, false).unwrap();

        assert!(player.is_playing());
        assert_eq!(player.current_frame_index(), 0);
        assert_eq!(player.current_frame(&sheet).unwrap().width, 10);
    }

    #[test]
    fn test_frames_advance_on_duration() {
        let sheet = sheet();
        let mut player = AnimationPlayer::new();
        player.play(&sheet, 5, false).unwrap();

        player.update(&sheet);
        assert_eq!(player.current_frame_index(), 0);
        player.update(&sheet);
        assert_eq!(player.current_frame_index(), 1);
        player.update(&sheet);
        player.update(&sheet);
        assert_eq!(player.current_frame_index(), 2);
        assert!(!player.should_begin_animation_loop_again());

        player.update(&sheet);
        // Looping animations never report completion to the caller
        assert!(!player.update(&sheet));
        assert_eq!(player.current_frame_index(), 0);
        assert!(player.should_begin_animation_loop_again());
    }

    #[test]
    fn test_one_shot_reports_loop_end() {
        let sheet = sheet();
        let mut player = AnimationPlayer::new();
        player.play(&sheet, 5, true).unwrap();

        let ended: Vec<bool> = (0..6).map(|_| player.update(&sheet)).collect();
        assert_eq!(ended, vec![false, false, false, false, false, true]);
    }

    #[test]
    fn test_single_sprite_never_advances() {
        let sheet = sheet();
        let mut player = AnimationPlayer::new();
        player.play(&sheet, 6, false).unwrap();

        for _ in 0..50 {
            assert!(!player.update(&sheet));
        }
        assert_eq!(player.current_frame_index(), 0);
        assert!(!player.should_begin_animation_loop_again());
    }

    #[test]
    fn test_single_sprite_one_shot_still_ends() {
        let sheet = sheet();
        let mut player = AnimationPlayer::new();
        player.play(&sheet, 6, true).unwrap();
        assert!(player.update(&sheet));
    }

    #[test]
    fn test_unknown_animation_is_noop() {
        let sheet = sheet();
        let mut player = AnimationPlayer::new();
        player.play(&sheet, 5, false).unwrap();

        assert!(matches!(
            player.play(&sheet, 99, false),
            Err(AssetError::UnknownAnimation(99))
        ));
        assert!(!player.is_playing());
        assert!(player.current_frame(&sheet).is_none());
        assert!(!player.update(&sheet));
    }

    #[test]
    fn test_replay_restarts() {
        let sheet = sheet();
        let mut player = AnimationPlayer::new();
        player.play(&sheet, 5, false).unwrap();
        for _ in 0..3 {
            player.update(&sheet);
        }
        player.play(&sheet, 5, false).unwrap();
        assert_eq!(player.current_frame_index(), 0);
        player.update(&sheet);
        player.update(&sheet);
        assert_eq!(player.current_frame_index(), 1);
    }
}
