//! Configuration structs with sensible defaults and RON persistence.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Orbit camera and projection settings.
    pub camera: CameraConfig,
    /// Scene content: radii, seeds, counts, animation rates.
    pub scene: SceneConfig,
    /// Optional asset file names inside the content directory.
    pub assets: AssetConfig,
    /// Frame loop settings.
    pub render: RenderConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels when not fitted to the monitor.
    pub width: u32,
    /// Window height in logical pixels when not fitted to the monitor.
    pub height: u32,
    /// Size the window to the primary monitor minus `monitor_margin`.
    pub fit_to_monitor: bool,
    /// Pixels subtracted from each monitor dimension when fitting.
    pub monitor_margin: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Allow the user to resize the window.
    pub resizable: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Orbit camera and projection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Distance from the eye to the planet centre.
    pub distance: f32,
    /// Smallest allowed zoom scale.
    pub min_zoom: f32,
    /// Largest allowed zoom scale.
    pub max_zoom: f32,
    /// Degrees of rotation per pixel of pointer drag.
    pub drag_degrees_per_pixel: f32,
    /// Degrees of rotation per arrow-key press.
    pub key_step_degrees: f32,
    /// Zoom multiplier for one wheel step towards the planet.
    pub zoom_in_factor: f32,
    /// Zoom multiplier for one wheel step away from the planet.
    pub zoom_out_factor: f32,
}

/// Scene content configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub planet_radius: f32,
    pub backdrop_radius: f32,
    /// Brightness multiplier applied to the backdrop texture.
    pub backdrop_dim: f32,
    pub star_count: u32,
    pub star_seed: u64,
    pub star_radius: f32,
    pub bright_star_count: u32,
    pub bright_star_radius: f32,
    pub nebula_count: u32,
    pub nebula_seed: u64,
    pub nebula_inner_radius: f32,
    pub nebula_outer_radius: f32,
    pub cloud_seed: u64,
    pub cloud_candidates: u32,
    /// Fraction of cloud candidates kept, in `[0, 1]`.
    pub cloud_keep_fraction: f32,
    pub galaxy_seed: u64,
    /// Atmosphere shell radius as a multiple of the planet radius.
    pub atmosphere_scale: f32,
    /// Procedural cloud radius as a multiple of the planet radius.
    pub cloud_geometry_scale: f32,
    /// Textured cloud sphere radius as a multiple of the planet radius.
    pub cloud_texture_scale: f32,
    /// Angular rate of procedural clouds in radians per second.
    pub cloud_geometry_rate: f32,
    /// Angular rate of the textured cloud sphere in radians per second.
    pub cloud_texture_rate: f32,
    /// Whether planet lighting is on when the session starts.
    pub lighting_enabled: bool,
    pub planet_fallback_size: u32,
    pub galaxy_fallback_size: u32,
    pub sphere_slices: u32,
    pub sphere_stacks: u32,
}

/// Asset file names, resolved against the content directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub planet_texture: String,
    pub galaxy_texture: String,
    pub cloud_texture: String,
}

/// Frame loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Sleep between frames in milliseconds. A throttle, not a governor.
    pub frame_interval_ms: u64,
    /// Clear color (linear RGBA).
    pub clear_color: [f64; 4],
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fit_to_monitor: true,
            monitor_margin: 100,
            fullscreen: false,
            resizable: true,
            vsync: true,
            title: "Continental Quest".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 40.0,
            near: 0.1,
            far: 100.0,
            distance: 6.0,
            min_zoom: 0.3,
            max_zoom: 2.0,
            drag_degrees_per_pixel: 1.0,
            key_step_degrees: 1.0,
            zoom_in_factor: 1.05,
            zoom_out_factor: 0.95,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            planet_radius: 2.5,
            backdrop_radius: 30.0,
            backdrop_dim: 0.55,
            star_count: 2000,
            star_seed: 42,
            star_radius: 50.0,
            bright_star_count: 50,
            bright_star_radius: 55.0,
            nebula_count: 20,
            nebula_seed: 7,
            nebula_inner_radius: 35.0,
            nebula_outer_radius: 40.0,
            cloud_seed: 11,
            cloud_candidates: 200,
            cloud_keep_fraction: 0.3,
            galaxy_seed: 1337,
            atmosphere_scale: 1.05,
            cloud_geometry_scale: 1.02,
            cloud_texture_scale: 1.01,
            cloud_geometry_rate: 0.05,
            cloud_texture_rate: 0.02,
            lighting_enabled: true,
            planet_fallback_size: 256,
            galaxy_fallback_size: 512,
            sphere_slices: 100,
            sphere_stacks: 100,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            planet_texture: "world.jpg".to_string(),
            galaxy_texture: "galaxy.jpg".to_string(),
            cloud_texture: "clouds.png".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 10,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

/// Upper bound on `scene.star_count` and `scene.bright_star_count`.
pub const MAX_STARS: u32 = 1_000_000;

/// Where [`Config::load_with_source`] got its config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from an existing file.
    Loaded(PathBuf),
    /// No file existed; defaults were written here.
    Created(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(path) => write!(f, "Loaded config from {}", path.display()),
            Self::Created(path) => write!(f, "Created default config at {}", path.display()),
        }
    }
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let (config, source) = Self::load_with_source(config_dir)?;
        log::info!("{source}");
        Ok(config)
    }

    /// Like [`load_or_create`](Self::load_or_create), but reports where the
    /// config came from instead of logging it. For callers that install
    /// their log subscriber only once the config is known.
    pub fn load_with_source(config_dir: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            Ok((config, ConfigSource::Loaded(config_path)))
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            Ok((config, ConfigSource::Created(config_path)))
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Returns `Some(new_config)` if the file on disk differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values that would break the camera or scene at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.min_zoom > 0.0 && cam.min_zoom <= cam.max_zoom) {
            return Err(invalid(
                "camera.min_zoom",
                format!(
                    "expected 0 < min_zoom <= max_zoom, got {} and {}",
                    cam.min_zoom, cam.max_zoom
                ),
            ));
        }
        if cam.zoom_in_factor <= 1.0 {
            return Err(invalid(
                "camera.zoom_in_factor",
                format!("must be greater than 1, got {}", cam.zoom_in_factor),
            ));
        }
        if !(cam.zoom_out_factor > 0.0 && cam.zoom_out_factor < 1.0) {
            return Err(invalid(
                "camera.zoom_out_factor",
                format!("must be in (0, 1), got {}", cam.zoom_out_factor),
            ));
        }
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(invalid(
                "camera.near",
                format!("expected 0 < near < far, got {} and {}", cam.near, cam.far),
            ));
        }

        let scene = &self.scene;
        for (field, value) in [
            ("scene.planet_radius", scene.planet_radius),
            ("scene.backdrop_radius", scene.backdrop_radius),
            ("scene.star_radius", scene.star_radius),
            ("scene.bright_star_radius", scene.bright_star_radius),
        ] {
            if value <= 0.0 {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        for (field, count) in [
            ("scene.star_count", scene.star_count),
            ("scene.bright_star_count", scene.bright_star_count),
        ] {
            if count > MAX_STARS {
                return Err(invalid(field, format!("at most {MAX_STARS} stars, got {count}")));
            }
        }
        if scene.nebula_inner_radius > scene.nebula_outer_radius {
            return Err(invalid(
                "scene.nebula_inner_radius",
                "inner radius exceeds outer radius".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&scene.cloud_keep_fraction) {
            return Err(invalid(
                "scene.cloud_keep_fraction",
                format!("must be in [0, 1], got {}", scene.cloud_keep_fraction),
            ));
        }
        if scene.sphere_slices < 3 || scene.sphere_stacks < 2 {
            return Err(invalid(
                "scene.sphere_slices",
                "a sphere needs at least 3 slices and 2 stacks".to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("title: \"Continental Quest\""));
        assert!(ron_str.contains("planet_texture: \"world.jpg\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), camera: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.scene, SceneConfig::default());
        assert_eq!(config.assets, AssetConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let ron_str = "(camera: (max_zoom: 3.5))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.camera.max_zoom, 3.5);
        assert_eq!(config.camera.min_zoom, 0.3);
        assert_eq!(config.camera.fov_y_degrees, 40.0);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_original_viewer_defaults() {
        let config = Config::default();
        assert_eq!(config.camera.fov_y_degrees, 40.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.camera.far, 100.0);
        assert_eq!(config.camera.distance, 6.0);
        assert_eq!(config.scene.planet_radius, 2.5);
        assert_eq!(config.scene.backdrop_radius, 30.0);
        assert_eq!(config.camera.zoom_in_factor, 1.05);
        assert_eq!(config.camera.zoom_out_factor, 0.95);
        assert_eq!(config.render.frame_interval_ms, 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.scene.star_seed = 9001;
        config.assets.cloud_texture = "overcast.jpg".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_load_with_source_reports_created_then_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");

        let (_, first) = Config::load_with_source(dir.path()).unwrap();
        assert_eq!(first, ConfigSource::Created(path.clone()));
        assert!(first.to_string().starts_with("Created default config at"));

        let (config, second) = Config::load_with_source(dir.path()).unwrap();
        assert_eq!(second, ConfigSource::Loaded(path));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.camera.max_zoom = 1.5;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.camera.max_zoom), Some(1.5));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_zoom_bounds() {
        let mut config = Config::default();
        config.camera.min_zoom = 3.0;
        config.camera.max_zoom = 1.0;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { field: "camera.min_zoom", .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_validate_rejects_zoom_factor_on_wrong_side() {
        let mut config = Config::default();
        config.camera.zoom_in_factor = 0.9;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.camera.zoom_out_factor = 1.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_star_counts() {
        let mut config = Config::default();
        config.scene.star_count = MAX_STARS;
        config.scene.bright_star_count = MAX_STARS;
        assert!(config.validate().is_ok());

        config.scene.bright_star_count = u32::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "scene.bright_star_count",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_keep_fraction_out_of_range() {
        let mut config = Config::default();
        config.scene.cloud_keep_fraction = 1.5;
        assert!(config.validate().is_err());
    }
}
