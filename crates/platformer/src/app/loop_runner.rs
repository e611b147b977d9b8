use std::time::Duration;

use tracing::{info, warn};

use crate::app::InputSnapshot;
use crate::control::Character;
use crate::physics::{SpatialQuery, StepContacts};

/// Upper bound for the simulation speed multiplier.
pub const MAX_TIME_SCALE: f32 = 16.0;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    /// Multiplies every frame delta; 0 pauses the simulation.
    pub time_scale: f32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 50,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            time_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub ticks_to_run: u32,
    pub remaining_accumulator: Duration,
    pub dropped_backlog: Duration,
}

/// Accumulator for the physics phase. Rendered frames feed it variable
/// deltas; it hands back how many fixed ticks to run.
#[derive(Debug, Clone)]
pub struct FixedStepLoop {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    time_scale: f32,
    accumulator: Duration,
}

impl FixedStepLoop {
    pub fn new(config: &LoopConfig) -> Self {
        let target_tps = config.target_tps.max(1);
        let fixed_dt = Duration::from_nanos(1_000_000_000 / u64::from(target_tps));
        let max_frame_delta =
            normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
        let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
        let time_scale = normalize_time_scale(config.time_scale);

        info!(
            target_tps,
            max_frame_delta_ms = max_frame_delta.as_millis() as u64,
            max_ticks_per_frame,
            time_scale,
            "loop_config"
        );

        Self {
            fixed_dt,
            max_frame_delta,
            max_ticks_per_frame,
            time_scale,
            accumulator: Duration::ZERO,
        }
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = normalize_time_scale(time_scale);
    }

    /// Frame delta after the spike clamp and the time scale.
    pub fn scaled_delta(&self, frame_dt: Duration) -> Duration {
        let clamped = clamp_frame_delta(frame_dt, self.max_frame_delta);
        if self.time_scale == 1.0 {
            return clamped;
        }
        clamped.mul_f64(f64::from(self.time_scale))
    }

    pub fn advance(&mut self, frame_dt: Duration) -> StepPlan {
        self.accumulator = self.accumulator.saturating_add(self.scaled_delta(frame_dt));

        let step_plan = plan_sim_steps(self.accumulator, self.fixed_dt, self.max_ticks_per_frame);
        self.accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame = self.max_ticks_per_frame,
                "sim_clamp_triggered"
            );
        }
        step_plan
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    pub fn interpolation_alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.fixed_dt.as_secs_f32()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks_run: u32,
    pub dropped_backlog: Duration,
    pub contacts: StepContacts,
}

/// One character driven by the decoupled loop: a logic phase per rendered
/// frame, then zero or more fixed physics ticks.
#[derive(Debug)]
pub struct Simulation {
    character: Character,
    stepper: FixedStepLoop,
    frames: u64,
    ticks: u64,
}

impl Simulation {
    pub fn new(character: Character, config: &LoopConfig) -> Self {
        Self {
            character,
            stepper: FixedStepLoop::new(config),
            frames: 0,
            ticks: 0,
        }
    }

    pub fn advance_frame(
        &mut self,
        frame_dt: Duration,
        input: &InputSnapshot,
        world: &dyn SpatialQuery,
    ) -> FrameReport {
        let logic_dt = self.stepper.scaled_delta(frame_dt);
        self.character.frame(input, world, logic_dt.as_secs_f32());

        let step_plan = self.stepper.advance(frame_dt);
        let fixed_dt_seconds = self.stepper.fixed_dt().as_secs_f32();
        let mut contacts = StepContacts::default();
        for _ in 0..step_plan.ticks_to_run {
            let tick = self.character.fixed_step(world, fixed_dt_seconds);
            contacts.hit_wall |= tick.hit_wall;
            contacts.hit_floor |= tick.hit_floor;
            contacts.hit_ceiling |= tick.hit_ceiling;
        }

        self.frames += 1;
        self.ticks += u64::from(step_plan.ticks_to_run);
        FrameReport {
            ticks_run: step_plan.ticks_to_run,
            dropped_backlog: step_plan.dropped_backlog,
            contacts,
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    pub fn stepper(&self) -> &FixedStepLoop {
        &self.stepper
    }

    pub fn stepper_mut(&mut self) -> &mut FixedStepLoop {
        &mut self.stepper
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

pub fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

pub fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_time_scale(time_scale: f32) -> f32 {
    if !time_scale.is_finite() || time_scale < 0.0 {
        warn!(time_scale, "invalid_time_scale");
        return 1.0;
    }
    time_scale.min(MAX_TIME_SCALE)
}
