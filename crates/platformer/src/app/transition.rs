use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::math::{lerp, Aabb, Vec2};

pub const DEFAULT_FADE_SECONDS: f32 = 1.0;

/// Level change in flight: where to go and where to place the character
/// on arrival. Owned by whoever orchestrates level changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionContext {
    target_level: Option<String>,
    pending_spawn: Option<Vec2>,
}

impl TransitionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a transition, replacing any earlier unconsumed one.
    pub fn begin(&mut self, target_level: impl Into<String>, spawn: Option<Vec2>) {
        let target_level = target_level.into();
        info!(target_level = %target_level, spawn = ?spawn, "transition_begun");
        self.target_level = Some(target_level);
        self.pending_spawn = spawn;
    }

    pub fn is_active(&self) -> bool {
        self.target_level.is_some()
    }

    pub fn target_level(&self) -> Option<&str> {
        self.target_level.as_deref()
    }

    pub fn pending_spawn(&self) -> Option<Vec2> {
        self.pending_spawn
    }

    /// Level-entry hook. Clears the context; the spawn is handed out once.
    pub fn take_spawn(&mut self) -> Option<Vec2> {
        self.target_level = None;
        self.pending_spawn.take()
    }
}

/// A level keeps its own placement unless a transition supplied one.
pub fn resolve_spawn(pending: Option<Vec2>, level_default: Vec2) -> Vec2 {
    pending.unwrap_or(level_default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    FadingOut,
    Load,
    FadingIn,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FadeEvent {
    LoadRequested(String),
    Completed,
    Canceled,
}

/// Fade to black, load, fade back in. Driven by `tick`; the screen is
/// fully black for exactly one tick before the load request.
#[derive(Debug, Clone)]
pub struct FadeTransition {
    target_level: String,
    fade_seconds: f32,
    phase: FadePhase,
    elapsed: f32,
    alpha: f32,
    cancel_requested: bool,
    canceled: bool,
}

impl FadeTransition {
    pub fn new(target_level: impl Into<String>, fade_seconds: f32) -> Self {
        Self {
            target_level: target_level.into(),
            fade_seconds: fade_seconds.max(0.0),
            phase: FadePhase::FadingOut,
            elapsed: 0.0,
            alpha: 0.0,
            cancel_requested: false,
            canceled: false,
        }
    }

    pub fn target_level(&self) -> &str {
        &self.target_level
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    /// Overlay opacity, 0 clear and 1 black.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_finished(&self) -> bool {
        self.phase == FadePhase::Finished
    }

    pub fn was_canceled(&self) -> bool {
        self.canceled
    }

    /// Takes effect on the next tick.
    pub fn cancel(&mut self) {
        self.cancel_requested = true;
    }

    pub fn tick(&mut self, dt_seconds: f32) -> Option<FadeEvent> {
        if self.phase == FadePhase::Finished {
            return None;
        }
        if self.cancel_requested {
            self.phase = FadePhase::Finished;
            self.alpha = 0.0;
            self.canceled = true;
            debug!(target_level = %self.target_level, "fade_canceled");
            return Some(FadeEvent::Canceled);
        }

        match self.phase {
            FadePhase::FadingOut => {
                if self.advance(dt_seconds, 0.0, 1.0) {
                    self.phase = FadePhase::Load;
                }
                None
            }
            FadePhase::Load => {
                self.phase = FadePhase::FadingIn;
                self.elapsed = 0.0;
                Some(FadeEvent::LoadRequested(self.target_level.clone()))
            }
            FadePhase::FadingIn => {
                if self.advance(dt_seconds, 1.0, 0.0) {
                    self.phase = FadePhase::Finished;
                    info!(target_level = %self.target_level, "transition_finished");
                    return Some(FadeEvent::Completed);
                }
                None
            }
            FadePhase::Finished => None,
        }
    }

    fn advance(&mut self, dt_seconds: f32, from: f32, to: f32) -> bool {
        self.elapsed += dt_seconds.max(0.0);
        if self.elapsed >= self.fade_seconds {
            self.alpha = to;
            self.elapsed = 0.0;
            return true;
        }
        self.alpha = lerp(from, to, self.elapsed / self.fade_seconds);
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeleportTrigger {
    pub name: String,
    pub bounds: Aabb,
    pub target_level: String,
    #[serde(default)]
    pub spawn: Option<Vec2>,
}

impl TeleportTrigger {
    /// Records the spawn and starts the fade toward the target level.
    pub fn fire(&self, context: &mut TransitionContext, fade_seconds: f32) -> FadeTransition {
        debug!(trigger = %self.name, target_level = %self.target_level, "teleport_triggered");
        context.begin(self.target_level.clone(), self.spawn);
        FadeTransition::new(self.target_level.clone(), fade_seconds)
    }
}

/// Enter-edge detection for a level's triggers: a trigger fires when the
/// character starts overlapping it, not while it stays inside.
#[derive(Debug, Clone, Default)]
pub struct TriggerSet {
    triggers: Vec<TeleportTrigger>,
    inside: Vec<bool>,
}

impl TriggerSet {
    pub fn new(triggers: Vec<TeleportTrigger>) -> Self {
        let inside = vec![false; triggers.len()];
        Self { triggers, inside }
    }

    pub fn triggers(&self) -> &[TeleportTrigger] {
        &self.triggers
    }

    pub fn poll(&mut self, character_bounds: Option<Aabb>) -> Option<&TeleportTrigger> {
        let mut entered = None;
        for (index, trigger) in self.triggers.iter().enumerate() {
            let overlapping =
                character_bounds.is_some_and(|bounds| bounds.overlaps(&trigger.bounds));
            if overlapping && !self.inside[index] && entered.is_none() {
                entered = Some(index);
            }
            self.inside[index] = overlapping;
        }
        entered.map(|index| &self.triggers[index])
    }
}
