//! The `globe` binary: resolve directories, load config, initialise logging
//! and run one blocking session.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use globe_app::Session;
use globe_app::platform::PlatformDirs;
use globe_config::{CliArgs, Config};
use globe_log::init_logging;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::resolve() {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to resolve platform directories: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to create platform directories: {e}");
    }

    let config_dir = args.config.clone().unwrap_or_else(|| dirs.config_dir.clone());
    let loaded = Config::load_with_source(&config_dir);
    let mut config = match &loaded {
        Ok((config, _)) => config.clone(),
        Err(_) => Config::default(),
    };
    config.apply_cli_overrides(&args);

    init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    match loaded {
        Ok((_, source)) => info!("{source}"),
        Err(e) => warn!("Using default configuration: {e}"),
    }
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    let content_dir = args.content_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    match Session::new(config).start(&content_dir) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                fallbacks = summary.fallback_events.len(),
                "Goodbye"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Session failed: {e}");
            ExitCode::FAILURE
        }
    }
}
