use std::process::ExitCode;

use lumitree::config::SceneConfig;
use lumitree::RunError;

fn main() -> ExitCode {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SceneConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded scene config from {}", path);
                config
            }
            Err(e) => return report(RunError::from(e)),
        },
        None => SceneConfig::default(),
    };

    match lumitree::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

fn report(error: RunError) -> ExitCode {
    log::error!("{}", error);
    eprintln!("lumitree: {}", error);
    ExitCode::FAILURE
}
