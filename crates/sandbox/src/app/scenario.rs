use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use platformer::{
    BodyCollider, CharacterTuning, Collider, ConfigError, InputAction, LoopConfig,
    TeleportTrigger, Vec2,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    #[error("read scenario '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse scenario json at {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("scenario has no levels")]
    NoLevels,
    #[error("level '{0}' is defined more than once")]
    DuplicateLevel(String),
    #[error("start level '{0}' is not defined")]
    UnknownStartLevel(String),
    #[error("trigger '{trigger}' targets undefined level '{target}'")]
    UnknownTransitionTarget { trigger: String, target: String },
    #[error("invalid scenario value {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    #[error(transparent)]
    Tuning(#[from] ConfigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) tuning: CharacterTuning,
    #[serde(default, rename = "loop")]
    pub(crate) loop_settings: LoopSettings,
    /// Seconds between rendered frames.
    #[serde(default = "default_frame_dt")]
    pub(crate) frame_dt: f32,
    /// Seconds of simulated time to run.
    pub(crate) duration: f32,
    #[serde(default = "default_fade_seconds")]
    pub(crate) fade_seconds: f32,
    #[serde(default = "default_axis_sensitivity")]
    pub(crate) axis_sensitivity: f32,
    /// `null` runs the character without a collider.
    #[serde(default = "default_body")]
    pub(crate) body: Option<BodySpec>,
    #[serde(default)]
    pub(crate) intro: Option<IntroSpec>,
    pub(crate) start_level: String,
    pub(crate) levels: Vec<LevelSpec>,
    #[serde(default)]
    pub(crate) input: Vec<InputEventSpec>,
    #[serde(default)]
    pub(crate) axis: Vec<AxisSegmentSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LoopSettings {
    pub(crate) target_tps: u32,
    pub(crate) max_frame_delta_ms: u64,
    pub(crate) max_ticks_per_frame: u32,
    pub(crate) time_scale: f32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        let defaults = LoopConfig::default();
        Self {
            target_tps: defaults.target_tps,
            max_frame_delta_ms: defaults.max_frame_delta.as_millis() as u64,
            max_ticks_per_frame: defaults.max_ticks_per_frame,
            time_scale: defaults.time_scale,
        }
    }
}

impl LoopSettings {
    pub(crate) fn to_loop_config(&self) -> LoopConfig {
        LoopConfig {
            target_tps: self.target_tps,
            max_frame_delta: Duration::from_millis(self.max_frame_delta_ms),
            max_ticks_per_frame: self.max_ticks_per_frame,
            time_scale: self.time_scale,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct BodySpec {
    pub(crate) size: Vec2,
    #[serde(default)]
    pub(crate) offset: Vec2,
}

impl BodySpec {
    pub(crate) fn to_collider(self) -> BodyCollider {
        BodyCollider {
            size: self.size,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct IntroSpec {
    pub(crate) text: String,
    #[serde(default = "default_char_interval")]
    pub(crate) char_interval: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LevelSpec {
    pub(crate) name: String,
    pub(crate) spawn: Vec2,
    #[serde(default)]
    pub(crate) colliders: Vec<Collider>,
    #[serde(default)]
    pub(crate) triggers: Vec<TeleportTrigger>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct InputEventSpec {
    pub(crate) at: f32,
    pub(crate) action: InputAction,
    pub(crate) down: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct AxisSegmentSpec {
    pub(crate) from: f32,
    pub(crate) to: f32,
    pub(crate) value: f32,
}

impl Scenario {
    pub(crate) fn level(&self, name: &str) -> Option<&LevelSpec> {
        self.levels.iter().find(|level| level.name == name)
    }

    pub(crate) fn body_collider(&self) -> Option<BodyCollider> {
        self.body.map(BodySpec::to_collider)
    }

    /// Analog override active at `time`, if any segment covers it.
    pub(crate) fn axis_at(&self, time: f32) -> Option<f32> {
        self.axis
            .iter()
            .find(|segment| time >= segment.from && time < segment.to)
            .map(|segment| segment.value)
    }

    pub(crate) fn validate(&self) -> Result<(), ScenarioError> {
        self.tuning.validate()?;

        if !(self.frame_dt.is_finite() && self.frame_dt > 0.0) {
            return Err(invalid("frame_dt", "must be a positive finite number"));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(invalid("duration", "must be a non-negative finite number"));
        }
        if !(self.fade_seconds.is_finite() && self.fade_seconds >= 0.0) {
            return Err(invalid(
                "fade_seconds",
                "must be a non-negative finite number",
            ));
        }
        if let Some(body) = &self.body {
            if !(body.size.x > 0.0 && body.size.y > 0.0) {
                return Err(invalid("body.size", "must be positive on both axes"));
            }
        }
        if self.input.iter().any(|event| !event.at.is_finite()) {
            return Err(invalid("input.at", "must be finite"));
        }

        if self.levels.is_empty() {
            return Err(ScenarioError::NoLevels);
        }
        let mut names = HashSet::new();
        for level in &self.levels {
            if !names.insert(level.name.as_str()) {
                return Err(ScenarioError::DuplicateLevel(level.name.clone()));
            }
        }
        if !names.contains(self.start_level.as_str()) {
            return Err(ScenarioError::UnknownStartLevel(self.start_level.clone()));
        }
        for trigger in self.levels.iter().flat_map(|level| &level.triggers) {
            if !names.contains(trigger.target_level.as_str()) {
                return Err(ScenarioError::UnknownTransitionTarget {
                    trigger: trigger.name.clone(),
                    target: trigger.target_level.clone(),
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn parse_scenario_json(raw: &str) -> Result<Scenario, ScenarioError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let scenario: Scenario =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let location = error.path().to_string();
            ScenarioError::Parse {
                location,
                source: error.into_inner(),
            }
        })?;
    scenario.validate()?;
    Ok(scenario)
}

pub(crate) fn load_scenario_file(path: &Path) -> Result<Scenario, ScenarioError> {
    let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scenario_json(&raw)
}

fn invalid(field: &'static str, reason: &'static str) -> ScenarioError {
    ScenarioError::Invalid { field, reason }
}

fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

fn default_fade_seconds() -> f32 {
    platformer::app::DEFAULT_FADE_SECONDS
}

fn default_axis_sensitivity() -> f32 {
    platformer::app::DEFAULT_AXIS_SENSITIVITY
}

fn default_body() -> Option<BodySpec> {
    Some(BodySpec {
        size: Vec2::new(1.0, 1.0),
        offset: Vec2::ZERO,
    })
}

fn default_char_interval() -> f32 {
    0.05
}
