// Sprite frame store: animations grouped by object sprite sheet

use std::collections::HashMap;

use super::sprite::SpriteFrame;
use super::AssetError;

/// Identifier of an object's sprite sheet (`##<id>` in the asset file)
pub type ObjectId = u16;

/// Identifier of an animation within a sheet (`#<id>` in the asset file)
pub type AnimationId = u16;

/// An ordered sequence of frames
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub id: AnimationId,
    frames: Vec<SpriteFrame>,
}

impl Animation {
    pub fn new(id: AnimationId) -> Self {
        Self {
            id,
            frames: Vec::new(),
        }
    }

    pub fn add_frame(&mut self, frame: SpriteFrame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[SpriteFrame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&SpriteFrame> {
        self.frames.get(index)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub(crate) fn last_frame_mut(&mut self) -> Option<&mut SpriteFrame> {
        self.frames.last_mut()
    }
}

/// Playback position inside an animation.
///
/// Owned by whoever plays the animation, so a single sheet can be shared
/// by many characters without any of them disturbing the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCursor {
    animation: Option<AnimationId>,
    index: usize,
}

impl FrameCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animation this cursor was last used with
    pub fn animation(&self) -> Option<AnimationId> {
        self.animation
    }

    /// Index of the frame the next call to `advance` will return
    pub fn index(&self) -> usize {
        self.index
    }

    /// Rewind to the first frame of `animation`
    pub fn reset(&mut self, animation: AnimationId) {
        self.animation = Some(animation);
        self.index = 0;
    }

    /// Return the frame under the cursor and advance, wrapping after the last
    pub fn advance<'a>(&mut self, animation: &'a Animation) -> Option<&'a SpriteFrame> {
        if animation.is_empty() {
            return None;
        }
        if self.animation != Some(animation.id) {
            self.reset(animation.id);
        }

        let index = self.index % animation.frame_count();
        self.index = (index + 1) % animation.frame_count();
        animation.frame(index)
    }
}

/// All animations of one object
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pub id: ObjectId,
    animations: Vec<Animation>,
    index: HashMap<AnimationId, usize>,
}

impl SpriteSheet {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            animations: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register an empty animation; an existing one with the same id is kept
    pub fn add_animation(&mut self, id: AnimationId) -> &mut Animation {
        let slot = match self.index.get(&id) {
            Some(&slot) => slot,
            None => {
                self.animations.push(Animation::new(id));
                let slot = self.animations.len() - 1;
                self.index.insert(id, slot);
                slot
            }
        };
        &mut self.animations[slot]
    }

    /// Append a frame to an animation, creating the animation if needed
    pub fn add_frame(&mut self, animation_id: AnimationId, frame: SpriteFrame) {
        self.add_animation(animation_id).add_frame(frame);
    }

    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.index.get(&id).map(|&slot| &self.animations[slot])
    }

    pub(crate) fn animation_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        match self.index.get(&id) {
            Some(&slot) => Some(&mut self.animations[slot]),
            None => None,
        }
    }

    /// Animations in the order they were added
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    pub fn contains(&self, id: AnimationId) -> bool {
        self.index.contains_key(&id)
    }

    /// Frame under `cursor` for `animation_id`, advancing the cursor cyclically
    pub fn next_frame(
        &self,
        animation_id: AnimationId,
        cursor: &mut FrameCursor,
    ) -> Result<&SpriteFrame, AssetError> {
        let animation = self
            .animation(animation_id)
            .ok_or(AssetError::UnknownAnimation(animation_id))?;
        cursor
            .advance(animation)
            .ok_or(AssetError::EmptyAnimation(animation_id))
    }

    /// Rewind `cursor` to the first frame of `animation_id`
    pub fn reset_to_first_frame(
        &self,
        animation_id: AnimationId,
        cursor: &mut FrameCursor,
    ) -> Result<(), AssetError> {
        let animation = self
            .animation(animation_id)
            .ok_or(AssetError::UnknownAnimation(animation_id))?;
        if animation.is_empty() {
            return Err(AssetError::EmptyAnimation(animation_id));
        }
        cursor.reset(animation_id);
        Ok(())
    }
}
