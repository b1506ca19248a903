//! Chrome Native Messaging Host for tubegate
//!
//! Runs as a standalone native messaging host for the video-blocking extension.
//! It communicates via stdin/stdout using Chrome's native messaging protocol,
//! so all logging goes to stderr.

use log::{error, info};
use std::process::ExitCode;
use tubegate_lib::{config, config::CoordinatorConfig, Service};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = match CoordinatorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Initialization error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let db_path = match config::db_path() {
        Ok(path) => path,
        Err(e) => {
            error!("Initialization error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut service = match Service::start(&db_path, &config) {
        Ok(service) => service,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // Serve until the browser closes the connection
    let result = service.host.run();
    service.shutdown();

    match result {
        // EOF is expected when Chrome closes the connection
        Err(e) if e.kind() != std::io::ErrorKind::UnexpectedEof => {
            error!("Native host error: {e}");
            ExitCode::FAILURE
        }
        Ok(()) | Err(_) => {
            info!("Connection closed");
            ExitCode::SUCCESS
        }
    }
}
