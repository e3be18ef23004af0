use engine::{resolve_app_paths, Color, LoopConfig, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, ConfigSource, GameConfig};
use super::gameplay::{self, GameSession, SessionError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: GameSession,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("session failed to load: {0}")]
    Session(#[from] SessionError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Runner Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets_dir = %paths.assets_dir.display(),
        "app_paths"
    );

    let (game_config, source) = GameConfig::load(&paths.config_dir)?;
    match &source {
        ConfigSource::EnvVar(path) => {
            info!(source = "env", path = %path.display(), "config_loaded")
        }
        ConfigSource::File(path) => {
            info!(source = "file", path = %path.display(), "config_loaded")
        }
        ConfigSource::Defaults => info!(source = "defaults", "config_loaded"),
    }

    let mut session = GameSession::new(game_config);
    session.load_assets(&paths.assets_dir)?;

    let config = LoopConfig {
        window_title: "Runner".to_string(),
        canvas_width: gameplay::CANVAS_WIDTH,
        canvas_height: gameplay::CANVAS_HEIGHT,
        clear_color: Color::rgb(135, 206, 235),
        ..LoopConfig::default()
    };

    Ok(AppWiring { config, session })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
