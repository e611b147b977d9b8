use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub(crate) const ROOT_ENV_VAR: &str = "PLATFORMER_ROOT";
pub(crate) const SCENARIO_ENV_VAR: &str = "PLATFORMER_SCENARIO";
const DEFAULT_SCENARIO: &str = "demo.json";

#[derive(Debug, Error)]
pub(crate) enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "{env_var} is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and assets/scenarios/."
    )]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Pass a scenario path as the first argument, or set {env_var}."
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Scenario path in priority order: first CLI argument, the scenario env
/// var, then the bundled demo under the project root.
pub(crate) fn resolve_scenario_path(cli_arg: Option<String>) -> Result<PathBuf, StartupError> {
    if let Some(arg) = cli_arg.filter(|arg| !arg.trim().is_empty()) {
        return Ok(PathBuf::from(arg));
    }
    match env::var(SCENARIO_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => return Ok(PathBuf::from(value)),
        Ok(_) | Err(env::VarError::NotPresent) => {}
        Err(source) => {
            return Err(StartupError::EnvVar {
                var: SCENARIO_ENV_VAR,
                source,
            })
        }
    }

    let root = resolve_root()?;
    Ok(scenarios_dir(&root).join(DEFAULT_SCENARIO))
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    env_var: ROOT_ENV_VAR,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn scenarios_dir(root: &Path) -> PathBuf {
    root.join("assets").join("scenarios")
}

fn is_repo_marker(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && scenarios_dir(path).is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
