pub mod app;
pub mod config;
pub mod control;
pub mod math;
pub mod physics;

pub use app::{
    FadeEvent, FadePhase, FadeTransition, FixedStepLoop, FrameReport, InputAction, InputCollector,
    InputSnapshot, LoopConfig, Simulation, StepPlan, TeleportTrigger, TransitionContext,
    TriggerSet, Typewriter,
};
pub use config::{load_tuning_file, parse_tuning_json, CharacterTuning, ConfigError};
pub use control::{
    BodyCollider, BodyState, Character, ControllerEvent, DashConfig, DashPhase, DashVisuals,
    Facing, GravityConfig, GroundQueryResult, GroundSensorConfig, JumpConfig, JumpPhase,
    MovementConfig,
};
pub use math::{Aabb, Vec2};
pub use physics::{Collider, LayerMask, SpatialQuery, StaticWorld, StepContacts};
