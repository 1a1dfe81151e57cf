//! Command-line argument parsing for the globe viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Globe viewer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "globe", about = "Interactive textured planet viewer")]
pub struct CliArgs {
    /// Directory holding the planet, galaxy and cloud images.
    pub content_dir: Option<PathBuf>,

    /// Window width. Disables fitting the window to the monitor.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height. Disables fitting the window to the monitor.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Start with planet lighting switched off.
    #[arg(long)]
    pub no_lighting: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
            self.window.fit_to_monitor = false;
        }
        if let Some(h) = args.height {
            self.window.height = h;
            self.window.fit_to_monitor = false;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if args.no_lighting {
            self.scene.lighting_enabled = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
