use std::env;
use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::paths::{resolve_scenario_path, StartupError};

pub(crate) const TIME_SCALE_ENV_VAR: &str = "PLATFORMER_TIME_SCALE";

pub(crate) struct AppWiring {
    pub(crate) scenario_path: PathBuf,
    pub(crate) time_scale_override: Option<f32>,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!("=== Platformer Sandbox Startup ===");

    let scenario_path = resolve_scenario_path(env::args().nth(1))?;
    let time_scale_override = parse_time_scale(env::var(TIME_SCALE_ENV_VAR).ok().as_deref());
    info!(
        scenario = %scenario_path.display(),
        time_scale_override = ?time_scale_override,
        "startup"
    );

    Ok(AppWiring {
        scenario_path,
        time_scale_override,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Invalid values fall back to the scenario's own time scale.
fn parse_time_scale(raw: Option<&str>) -> Option<f32> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f32>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => {
            warn!(
                env_var = TIME_SCALE_ENV_VAR,
                value = raw,
                "invalid time-scale env var value; falling back to scenario"
            );
            None
        }
    }
}
