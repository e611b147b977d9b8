mod input;
mod loop_runner;
mod transition;
mod typewriter;

pub use input::{InputAction, InputCollector, InputSnapshot, DEFAULT_AXIS_SENSITIVITY};
pub use loop_runner::{
    clamp_frame_delta, plan_sim_steps, FixedStepLoop, FrameReport, LoopConfig, Simulation,
    StepPlan, MAX_TIME_SCALE,
};
pub use transition::{
    resolve_spawn, FadeEvent, FadePhase, FadeTransition, TeleportTrigger, TransitionContext,
    TriggerSet, DEFAULT_FADE_SECONDS,
};
pub use typewriter::Typewriter;
