// Character state machine

use std::fmt;

use log::{debug, trace};

use crate::engine::input::{Key, KeyMask};

/// Direction a character faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    pub fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
        }
    }

    /// +1 for right, -1 for left
    pub fn sign(self) -> f32 {
        match self {
            Self::Right => 1.0,
            Self::Left => -1.0,
        }
    }

    /// Movement key pointing this way
    pub fn key(self) -> Key {
        match self {
            Self::Right => Key::Right,
            Self::Left => Key::Left,
        }
    }
}

/// Movement mode, independent of facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// Standing still on a surface
    Idle,
    /// Running along a surface
    Run,
    /// Jump launched while standing
    JumpIdle,
    /// Jump launched while running
    JumpRun,
    /// Falling straight down
    FallIdle,
    /// Falling with the run or jump horizontal speed
    FallRun,
    /// Falling after a running jump lost its support or hit a wall
    FallJumpRun,
    /// Swinging the hammer
    Hit,
    /// Sliding on ice after releasing the run key
    Slip,
}

impl Motion {
    pub const ALL: [Motion; 9] = [
        Motion::Idle,
        Motion::Run,
        Motion::JumpIdle,
        Motion::JumpRun,
        Motion::FallIdle,
        Motion::FallRun,
        Motion::FallJumpRun,
        Motion::Hit,
        Motion::Slip,
    ];

    /// Check if the motion keeps the character on a surface
    pub fn is_grounded(self) -> bool {
        matches!(self, Self::Idle | Self::Run | Self::Hit | Self::Slip)
    }

    pub fn is_jumping(self) -> bool {
        matches!(self, Self::JumpIdle | Self::JumpRun)
    }

    pub fn is_falling(self) -> bool {
        matches!(self, Self::FallIdle | Self::FallRun | Self::FallJumpRun)
    }

    pub fn is_airborne(self) -> bool {
        self.is_jumping() || self.is_falling()
    }

    fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Run => "Run",
            Self::JumpIdle => "Jump_Idle",
            Self::JumpRun => "Jump_Run",
            Self::FallIdle => "Fall_Idle",
            Self::FallRun => "Fall_Run",
            Self::FallJumpRun => "Fall_Jump_Run",
            Self::Hit => "Hit",
            Self::Slip => "Slip",
        }
    }
}

/// Logical state: a motion split by facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacterState {
    pub motion: Motion,
    pub facing: Facing,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self::new(Motion::Idle, Facing::Right)
    }
}

impl fmt::Display for CharacterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let facing = match self.facing {
            Facing::Right => "Right",
            Facing::Left => "Left",
        };
        write!(f, "{}_{}", self.motion.name(), facing)
    }
}

impl CharacterState {
    pub const fn new(motion: Motion, facing: Facing) -> Self {
        Self { motion, facing }
    }

    /// Every state, Right before Left for each motion
    pub fn all() -> impl Iterator<Item = CharacterState> {
        Motion::ALL.into_iter().flat_map(|motion| {
            [Facing::Right, Facing::Left]
                .into_iter()
                .map(move |facing| CharacterState::new(motion, facing))
        })
    }

    /// Position of the state in `all()`
    pub fn index(self) -> usize {
        let motion = Motion::ALL
            .iter()
            .position(|m| *m == self.motion)
            .unwrap_or_default();
        motion * 2 + usize::from(self.facing == Facing::Left)
    }

    fn with_motion(self, motion: Motion) -> Self {
        Self::new(motion, self.facing)
    }

    fn with_facing(self, facing: Facing) -> Self {
        Self::new(self.motion, facing)
    }

    /// Back on a surface: run if a direction key is held, idle otherwise
    fn landed(self, held: KeyMask) -> Self {
        if held.contains(self.facing.key()) {
            Self::new(Motion::Run, self.facing)
        } else if held.contains(self.facing.opposite().key()) {
            Self::new(Motion::Run, self.facing.opposite())
        } else {
            Self::new(Motion::Idle, self.facing)
        }
    }

    /// Transition table. `None` means the trigger has no effect in this state.
    pub fn on_trigger(self, trigger: Trigger, ctx: &TransitionContext) -> Option<CharacterState> {
        use Motion::*;
        use Trigger::*;

        let facing = self.facing;
        let next = match (self.motion, trigger) {
            (Idle, RightKeyPressed) => Self::new(Run, Facing::Right),
            (Idle, LeftKeyPressed) => Self::new(Run, Facing::Left),
            (Run, RightKeyPressed) if facing == Facing::Left => Self::new(Run, Facing::Right),
            (Run, LeftKeyPressed) if facing == Facing::Right => Self::new(Run, Facing::Left),
            (Run, RightKeyReleased) if facing == Facing::Right => self.with_motion(Idle).landed(ctx.held),
            (Run, LeftKeyReleased) if facing == Facing::Left => self.with_motion(Idle).landed(ctx.held),
            (Run, StopRunningOnSlidingSurface) if ctx.can_slip => self.with_motion(Slip),
            (Run, StopRunningOnSlidingSurface) => self.with_motion(Idle),

            (Idle | Slip, UpKeyPressed | SpaceKeyPressed) => self.with_motion(JumpIdle),
            (Run, UpKeyPressed | SpaceKeyPressed) => self.with_motion(JumpRun),
            (Idle | Run | Slip, DownKeyPressed) => self.with_motion(Hit),

            (Idle | Hit | Slip, SuspendedInTheAir) => self.with_motion(FallIdle),
            (Run, SuspendedInTheAir) => self.with_motion(FallRun),
            (JumpIdle, SuspendedInTheAir) => self.with_motion(FallIdle),
            (JumpRun, SuspendedInTheAir) => self.with_motion(FallJumpRun),

            (JumpIdle, TopCollisionDuringJump) => self.with_motion(FallIdle),
            (JumpRun, TopCollisionDuringJump) => self.with_motion(FallRun),
            (JumpIdle, LateralCollisionDuringJump) => self.with_motion(FallIdle),
            (JumpRun, LateralCollisionDuringJump) => self.with_motion(FallJumpRun),

            (JumpIdle | JumpRun, RightKeyPressedAtJumpApex) if facing == Facing::Left => {
                self.with_facing(Facing::Right)
            }
            (JumpIdle | JumpRun, LeftKeyPressedAtJumpApex) if facing == Facing::Right => {
                self.with_facing(Facing::Left)
            }

            (JumpIdle | JumpRun, JumpLanding) => self.landed(ctx.held),
            (FallIdle | FallRun | FallJumpRun, FallLanding) => self.landed(ctx.held),

            (Hit, AnimationLoopEnded) => self.with_motion(Idle),
            (Slip, StopSlipping) => self.with_motion(Idle),

            _ => return None,
        };
        Some(next)
    }
}

/// Events that may move a character to another state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    RightKeyPressed,
    RightKeyReleased,
    LeftKeyPressed,
    LeftKeyReleased,
    UpKeyPressed,
    SpaceKeyPressed,
    DownKeyPressed,
    /// Run key released while standing on a sliding surface
    StopRunningOnSlidingSurface,
    JumpLanding,
    FallLanding,
    TopCollisionDuringJump,
    LateralCollisionDuringJump,
    RightKeyPressedAtJumpApex,
    LeftKeyPressedAtJumpApex,
    SuspendedInTheAir,
    StopSlipping,
    /// A one-shot animation played its last frame
    AnimationLoopEnded,
}

/// Where a trigger came from; physics wins over input within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOrigin {
    Input,
    Physics,
}

impl Trigger {
    pub fn origin(self) -> TriggerOrigin {
        match self {
            Self::RightKeyPressed
            | Self::RightKeyReleased
            | Self::LeftKeyPressed
            | Self::LeftKeyReleased
            | Self::UpKeyPressed
            | Self::SpaceKeyPressed
            | Self::DownKeyPressed
            | Self::StopRunningOnSlidingSurface => TriggerOrigin::Input,
            _ => TriggerOrigin::Physics,
        }
    }

    /// Input trigger for a key edge, if the key means anything on its own
    pub fn for_key(key: Key, pressed: bool) -> Option<Self> {
        let trigger = match (key, pressed) {
            (Key::Right, true) => Self::RightKeyPressed,
            (Key::Right, false) => Self::RightKeyReleased,
            (Key::Left, true) => Self::LeftKeyPressed,
            (Key::Left, false) => Self::LeftKeyReleased,
            (Key::Up, true) => Self::UpKeyPressed,
            (Key::Space, true) => Self::SpaceKeyPressed,
            (Key::Down, true) => Self::DownKeyPressed,
            _ => return None,
        };
        Some(trigger)
    }
}

/// Facts the transition table needs besides the state and trigger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionContext {
    /// Keys held this tick
    pub held: KeyMask,
    /// Whether the character type has Slip states
    pub can_slip: bool,
}

/// An applied state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: CharacterState,
    pub to: CharacterState,
    pub trigger: Trigger,
}

/// State machine that handles character state transitions
#[derive(Debug)]
pub struct CharacterStateMachine {
    current_state: CharacterState,
    previous_state: CharacterState,
    state_ticks: u32,
    pending: Vec<Trigger>,
}

impl Default for CharacterStateMachine {
    fn default() -> Self {
        Self::new(CharacterState::default())
    }
}

impl CharacterStateMachine {
    pub fn new(initial: CharacterState) -> Self {
        Self {
            current_state: initial,
            previous_state: initial,
            state_ticks: 0,
            pending: Vec::with_capacity(8),
        }
    }

    /// Get the current state
    pub fn state(&self) -> CharacterState {
        self.current_state
    }

    /// Get the previous state
    pub fn previous_state(&self) -> CharacterState {
        self.previous_state
    }

    /// Ticks spent in the current state
    pub fn state_ticks(&self) -> u32 {
        self.state_ticks
    }

    /// Check if the state changed since the last tick began
    pub fn state_just_changed(&self) -> bool {
        self.state_ticks == 0
    }

    /// Count one tick in the current state
    pub fn tick(&mut self) {
        self.state_ticks = self.state_ticks.saturating_add(1);
    }

    /// Queue a trigger for the next `resolve`
    pub fn queue(&mut self, trigger: Trigger) {
        self.pending.push(trigger);
    }

    pub fn pending(&self) -> &[Trigger] {
        &self.pending
    }

    /// Apply a trigger right away
    pub fn fire(&mut self, trigger: Trigger, ctx: &TransitionContext) -> Option<Transition> {
        let Some(next) = self.current_state.on_trigger(trigger, ctx) else {
            trace!("{:?} ignored in {}", trigger, self.current_state);
            return None;
        };

        let transition = Transition {
            from: self.current_state,
            to: next,
            trigger,
        };
        debug!("{} --{:?}--> {}", transition.from, trigger, transition.to);

        self.previous_state = self.current_state;
        self.current_state = next;
        self.state_ticks = 0;
        Some(transition)
    }

    /// Apply every pending trigger.
    ///
    /// The first physics trigger that changes state wins and discards any
    /// pending input. Otherwise input triggers are applied in queue order,
    /// each against the state left by the previous one.
    pub fn resolve(&mut self, ctx: &TransitionContext) -> Vec<Transition> {
        let pending = std::mem::take(&mut self.pending);

        for trigger in pending.iter().filter(|t| t.origin() == TriggerOrigin::Physics) {
            if let Some(transition) = self.fire(*trigger, ctx) {
                let dropped = pending
                    .iter()
                    .filter(|t| t.origin() == TriggerOrigin::Input)
                    .count();
                if dropped > 0 {
                    trace!("{} stale input triggers dropped", dropped);
                }
                return vec![transition];
            }
        }

        pending
            .iter()
            .filter(|t| t.origin() == TriggerOrigin::Input)
            .filter_map(|trigger| self.fire(*trigger, ctx))
            .collect()
    }

    /// Jump to a state without a trigger (spawning, respawning)
    pub fn force(&mut self, state: CharacterState) {
        self.previous_state = self.current_state;
        self.current_state = state;
        self.state_ticks = 0;
        self.pending.clear();
    }
}
