mod bootstrap;
mod loop_runner;
mod paths;
mod runner;
mod scenario;

use std::process::ExitCode;

use tracing::error;

pub(crate) fn main() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
