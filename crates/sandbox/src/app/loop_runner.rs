use std::process::ExitCode;

use tracing::error;

use super::bootstrap::AppWiring;
use super::runner::run_scenario;
use super::scenario::load_scenario_file;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let scenario = match load_scenario_file(&app.scenario_path) {
        Ok(scenario) => scenario,
        Err(err) => {
            error!(error = %err, "scenario_load_failed");
            return ExitCode::FAILURE;
        }
    };

    let time_scale = app
        .time_scale_override
        .unwrap_or(scenario.loop_settings.time_scale);
    let summary = run_scenario(&scenario, time_scale);

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            error!(error = %err, "summary_encode_failed");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
