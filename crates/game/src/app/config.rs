use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub(crate) const CONFIG_ENV_VAR: &str = "RUNNER_CONFIG";
pub(crate) const DEFAULT_CONFIG_FILE: &str = "runner.json";

/// Tunables for one game session. Every field has a default, so an empty JSON object
/// is a complete configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub game_speed_kmh: f32,
    pub pixels_per_meter: f32,
    pub gravity_px_per_s2: f32,
    pub jump_strength_px_per_s: f32,
    pub animation_speed_ms: f32,
    pub min_spawn_interval_ms: u32,
    pub max_spawn_interval_ms: u32,
    pub background_scroll_ratio: f32,
    pub player_x: f32,
    pub bounds_padding: f32,
    pub max_frame_delta_ms: f32,
    pub debug_bounds: bool,
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_speed_kmh: 70.0,
            pixels_per_meter: 10.0,
            gravity_px_per_s2: 1800.0,
            jump_strength_px_per_s: 700.0,
            animation_speed_ms: 150.0,
            min_spawn_interval_ms: 1500,
            max_spawn_interval_ms: 3500,
            background_scroll_ratio: 1.0,
            player_x: 50.0,
            bounds_padding: 5.0,
            max_frame_delta_ms: 250.0,
            debug_bounds: false,
            rng_seed: None,
        }
    }
}

/// Where the active configuration came from, for the startup log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConfigSource {
    EnvVar(PathBuf),
    File(PathBuf),
    Defaults,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("validation failed at {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl GameConfig {
    /// Resolves the config file (env var first, then `<config_dir>/runner.json`) and
    /// falls back to defaults when neither exists.
    pub(crate) fn load(config_dir: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::load_from(env_path, config_dir)
    }

    fn load_from(
        env_path: Option<PathBuf>,
        config_dir: &Path,
    ) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(path) = env_path {
            let config = Self::read_file(&path)?;
            return Ok((config, ConfigSource::EnvVar(path)));
        }

        let default_path = config_dir.join(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            let config = Self::read_file(&default_path)?;
            return Ok((config, ConfigSource::File(default_path)));
        }

        Ok((Self::default(), ConfigSource::Defaults))
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse_json(&raw).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn parse_json(raw: &str) -> Result<Self, String> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config = match serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer) {
            Ok(config) => config,
            Err(error) => {
                let path = error.path().to_string();
                let source = error.into_inner();
                return if path.is_empty() || path == "." {
                    Err(format!("parse config json: {source}"))
                } else {
                    Err(format!("parse config json at {path}: {source}"))
                };
            }
        };
        deserializer
            .end()
            .map_err(|source| format!("parse config json: {source}"))?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        positive("game_speed_kmh", self.game_speed_kmh)?;
        positive("pixels_per_meter", self.pixels_per_meter)?;
        positive("gravity_px_per_s2", self.gravity_px_per_s2)?;
        positive("jump_strength_px_per_s", self.jump_strength_px_per_s)?;
        positive("animation_speed_ms", self.animation_speed_ms)?;
        positive("background_scroll_ratio", self.background_scroll_ratio)?;
        positive("max_frame_delta_ms", self.max_frame_delta_ms)?;
        non_negative("player_x", self.player_x)?;
        non_negative("bounds_padding", self.bounds_padding)?;

        if self.min_spawn_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "min_spawn_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.min_spawn_interval_ms > self.max_spawn_interval_ms {
            return Err(ConfigError::Invalid {
                field: "max_spawn_interval_ms",
                message: format!(
                    "must be >= min_spawn_interval_ms ({} > {})",
                    self.min_spawn_interval_ms, self.max_spawn_interval_ms
                ),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            message: format!("must be a finite number greater than zero, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            message: format!("must be a finite number >= 0, got {value}"),
        })
    }
}
