use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::{DashConfig, GravityConfig, GroundSensorConfig, JumpConfig, MovementConfig};

/// Every tunable of one character, as loaded from JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterTuning {
    pub movement: MovementConfig,
    pub jump: JumpConfig,
    pub gravity: GravityConfig,
    pub dash: DashConfig,
    pub sensor: GroundSensorConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning json: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid tuning value {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl CharacterTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let movement = &self.movement;
        non_negative("movement.move_speed", movement.move_speed)?;
        non_negative("movement.acceleration", movement.acceleration)?;
        non_negative("movement.deceleration", movement.deceleration)?;
        unit_ratio("movement.dead_zone", movement.dead_zone)?;

        let jump = &self.jump;
        non_negative("jump.jump_force", jump.jump_force)?;
        non_negative("jump.jump_time", jump.jump_time)?;
        non_negative("jump.coyote_time", jump.coyote_time)?;
        non_negative("jump.jump_buffer_time", jump.jump_buffer_time)?;
        unit_ratio("jump.sustain_ratio", jump.sustain_ratio)?;
        unit_ratio("jump.release_cut_ratio", jump.release_cut_ratio)?;
        non_negative(
            "jump.landing_velocity_threshold",
            jump.landing_velocity_threshold,
        )?;

        let gravity = &self.gravity;
        finite("gravity.base_gravity", gravity.base_gravity)?;
        non_negative("gravity.gravity_scale", gravity.gravity_scale)?;
        non_negative(
            "gravity.fall_gravity_multiplier",
            gravity.fall_gravity_multiplier,
        )?;
        if !(gravity.terminal_fall_speed.is_finite() && gravity.terminal_fall_speed > 0.0) {
            return Err(ConfigError::Invalid {
                field: "gravity.terminal_fall_speed",
                reason: "must be a positive finite number",
            });
        }

        let dash = &self.dash;
        non_negative("dash.dash_speed", dash.dash_speed)?;
        non_negative("dash.dash_duration", dash.dash_duration)?;
        non_negative("dash.dash_cooldown", dash.dash_cooldown)?;
        non_negative("dash.double_tap_time", dash.double_tap_time)?;
        unit_ratio("dash.momentum_carry_ratio", dash.momentum_carry_ratio)?;

        let sensor = &self.sensor;
        non_negative("sensor.ground_check_distance", sensor.ground_check_distance)?;
        non_negative("sensor.ceiling_check_distance", sensor.ceiling_check_distance)?;
        unit_ratio("sensor.probe_width_ratio", sensor.probe_width_ratio)?;

        Ok(())
    }
}

/// Missing fields keep their defaults. The result is validated.
pub fn parse_tuning_json(raw: &str) -> Result<CharacterTuning, ConfigError> {
    let tuning: CharacterTuning = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
    tuning.validate()?;
    Ok(tuning)
}

pub fn load_tuning_file(path: &Path) -> Result<CharacterTuning, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tuning_json(&raw)
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be finite",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be a non-negative finite number",
        })
    }
}

fn unit_ratio(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be within [0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn defaults_validate() {
        CharacterTuning::default()
            .validate()
            .expect("default tuning");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let tuning = parse_tuning_json(r#"{ "jump": { "jump_force": 18.0 }, "dash": {} }"#)
            .expect("parse tuning");

        assert_eq!(tuning.jump.jump_force, 18.0);
        assert_eq!(tuning.jump.jump_time, 0.3);
        assert_eq!(tuning.dash, DashConfig::default());
        assert_eq!(tuning.movement.move_speed, 8.0);
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let error = parse_tuning_json(r#"{ "jump": { "sustain_ratio": 1.5 } }"#)
            .expect_err("ratio above one");

        match error {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "jump.sustain_ratio"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut tuning = CharacterTuning::default();
        tuning.dash.dash_cooldown = -0.5;

        let error = tuning.validate().expect_err("negative cooldown");

        assert!(error.to_string().contains("dash.dash_cooldown"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let error = parse_tuning_json("{ not json").expect_err("malformed");

        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn load_tuning_file_reads_from_disk() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("tuning.json");
        fs::write(&path, r#"{ "movement": { "move_speed": 10.0 } }"#).expect("write");

        let tuning = load_tuning_file(&path).expect("load");

        assert_eq!(tuning.movement.move_speed, 10.0);
    }

    #[test]
    fn missing_file_reports_path() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("absent.json");

        let error = load_tuning_file(&path).expect_err("missing file");

        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().contains("absent.json"));
    }
}
