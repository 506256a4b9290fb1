use std::process::ExitCode;

use lighting_shaders::{logging, DemoConfig};

fn main() -> ExitCode {
    logging::init();

    match lighting_shaders::run(DemoConfig::basic()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
