use mesi_search::{config::Config, server, setup};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    setup::init();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    match server::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
