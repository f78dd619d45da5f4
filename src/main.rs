use log::{error, warn};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use updown::{Config, config, logging};

/// Exit status of a process terminated by SIGINT.
const INTERRUPTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = config::load_dotenv() {
        eprintln!("Failed to load .env file: {e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = logging::init(&config::log_file()) {
        eprintln!("Failed to set up logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let token = CancellationToken::new();
    tokio::spawn(cancel_on_interrupt(token.clone()));

    if let Err(e) = updown::monitor_websites(&config, token.clone()).await {
        error!("Failed to start monitoring: {e}");
        return ExitCode::FAILURE;
    }

    if token.is_cancelled() {
        ExitCode::from(INTERRUPTED)
    } else {
        ExitCode::SUCCESS
    }
}

async fn cancel_on_interrupt(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for interrupt signal: {e}");
        return;
    }
    warn!("Interrupt received, exiting");
    token.cancel();
}
