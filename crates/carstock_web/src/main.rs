//! Web entry point.
//!
//! Reads the same `CARSTOCK_*` settings as the terminal menu, plus
//! `CARSTOCK_WEB_ADDR` for the listen address.

use carstock_core::{init_logging_from, open_repository, AppConfig, CarService};
use carstock_web::{serve, ADDR_ENV, DEFAULT_ADDR};
use log::error;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging_from(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let service = Arc::new(CarService::new(open_repository(&config)));
    println!("carstock-web ({} backend) listening on http://{addr}", config.backend);

    match serve(service, &addr).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=web_exit module=web status=error addr={addr} error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
