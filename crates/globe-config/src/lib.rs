//! Configuration for the globe viewer.
//!
//! Settings persist to disk as RON, can be overridden from the command line
//! via clap, and are validated before a session starts.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, CameraConfig, Config, ConfigSource, DebugConfig, MAX_STARS, RenderConfig,
    SceneConfig, WindowConfig,
};
pub use error::ConfigError;
