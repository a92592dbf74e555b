//! Leaderboard configuration loading, including backend selection and extra point grants.

use std::{env, fs, io::ErrorKind, path::Path, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    dao::ranking_store::DEFAULT_PAGE_SIZE,
    points::{PointGrant, PointsCatalog},
    services::ranking_service::DEFAULT_BOARD_SIZE,
};

/// Default location on disk where the host looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/leaderboard.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LEADERBOARD_CONFIG_PATH";
/// SQLite file used by the persistent backend when none is configured.
const DEFAULT_DATABASE_PATH: &str = "leaderboard/leaderboard.sqlite";

/// Storage backend chosen when the ranking service is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Scores are lost when the process exits.
    InMemory,
    /// Scores live in a SQLite file.
    #[default]
    Persistent,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration handed to the host integration.
pub struct LeaderboardConfig {
    /// Backend built by [`crate::dao::ranking_store::open`].
    pub store: StoreBackend,
    /// Database file for [`StoreBackend::Persistent`].
    pub database_path: PathBuf,
    /// Listing window of the persistent backend, strictly positive.
    pub page_size: usize,
    /// Number of entries in the leaderboard view.
    pub board_size: usize,
    /// Whether the host should display the board to joining players.
    pub show_on_join: bool,
    /// Grants declared in the configuration file, on top of the built-in ones.
    pub points: PointsCatalog,
}

impl LeaderboardConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path())
    }

    /// Load the configuration from `path`, falling back to built-in defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        store = ?config.store,
                        points = config.points.len(),
                        "loaded leaderboard config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::default(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            page_size: DEFAULT_PAGE_SIZE,
            board_size: DEFAULT_BOARD_SIZE,
            show_on_join: false,
            points: PointsCatalog::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    store: StoreBackend,
    database_path: Option<PathBuf>,
    page_size: usize,
    board_size: usize,
    show_on_join: bool,
    points: Vec<RawPoints>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::default(),
            database_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            board_size: DEFAULT_BOARD_SIZE,
            show_on_join: false,
            points: Vec::new(),
        }
    }
}

impl From<RawConfig> for LeaderboardConfig {
    fn from(value: RawConfig) -> Self {
        let page_size = if value.page_size == 0 {
            warn!(
                default = DEFAULT_PAGE_SIZE,
                "page_size must be strictly positive; using default"
            );
            DEFAULT_PAGE_SIZE
        } else {
            value.page_size
        };

        let points = value
            .points
            .into_iter()
            .filter_map(|raw| {
                let name = raw.name.clone();
                match PointGrant::try_from(raw) {
                    Ok(grant) => Some(grant),
                    Err(err) => {
                        warn!(%name, error = %err, "skipping invalid point grant");
                        None
                    }
                }
            })
            .collect();

        Self {
            store: value.store,
            database_path: value
                .database_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            page_size,
            board_size: value.board_size,
            show_on_join: value.show_on_join,
            points,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single grant inside the configuration file.
struct RawPoints {
    name: String,
    #[serde(default)]
    description: String,
    points: i64,
    #[serde(default)]
    silent: bool,
}

impl TryFrom<RawPoints> for PointGrant {
    type Error = validator::ValidationErrors;

    fn try_from(value: RawPoints) -> Result<Self, Self::Error> {
        PointGrant::new(value.name, value.description, value.points, value.silent)
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
