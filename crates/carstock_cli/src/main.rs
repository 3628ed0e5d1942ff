//! Terminal entry point for the car inventory.
//!
//! # Responsibility
//! - Resolve configuration from the environment and command-line flags.
//! - Start logging, pick a backend and hand control to the menu.

mod menu;
mod prompt;
mod render;

use carstock_core::config::BACKEND_ENV;
use carstock_core::{
    init_logging_from, open_repository, AppConfig, Backend, CarService, ConfigError,
};
use clap::Parser;
use log::{error, info};
use menu::{choose_backend, Menu};
use prompt::TermPrompt;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "carstock", version, about = "Manage a car inventory from the terminal")]
struct Cli {
    /// Storage backend: csv or sqlite. Asked interactively when unset.
    #[arg(long)]
    backend: Option<Backend>,

    /// CSV file used by the csv backend.
    #[arg(long)]
    csv_path: Option<PathBuf>,

    /// Database file used by the sqlite backend.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[arg(long)]
    log_level: Option<String>,

    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let backend_preset = cli.backend.is_some() || std::env::var_os(BACKEND_ENV).is_some();
    if let Err(err) = apply_flags(&mut config, cli) {
        eprintln!("invalid configuration: {err}");
        return ExitCode::FAILURE;
    }

    if let Err(err) = init_logging_from(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(config, backend_preset) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn apply_flags(config: &mut AppConfig, cli: Cli) -> Result<(), ConfigError> {
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(path) = cli.csv_path {
        config.csv_path = path;
    }
    if let Some(path) = cli.db_path {
        config.db_path = path;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir {
        config.set_log_dir(dir)?;
    }
    Ok(())
}

fn run(mut config: AppConfig, backend_preset: bool) -> io::Result<()> {
    let mut prompt = TermPrompt::new();
    let mut out = io::stdout();

    if !backend_preset {
        match choose_backend(&mut prompt, &mut out)? {
            Some(backend) => config.backend = backend,
            None => {
                println!("Goodbye!");
                return Ok(());
            }
        }
    }

    info!(
        "event=cli_start module=cli status=ok backend={} csv_path={} db_path={}",
        config.backend,
        config.csv_path.display(),
        config.db_path.display()
    );
    let service = CarService::new(open_repository(&config));
    Menu::new(&service, &mut prompt, &mut out).run()
}
