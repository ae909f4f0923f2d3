//! User settings persisted as TOML.
//!
//! The default file lives in the platform config directory:
//! - Linux: ~/.config/trialsexplorer/settings.toml
//! - macOS: ~/Library/Application Support/org.trials-explorer.Trials-Explorer/settings.toml
//! - Windows: %APPDATA%/trials-explorer/Trials Explorer/config/settings.toml

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cte_client::DEFAULT_BASE_URL;
use cte_outcomes::{Heuristics, HeuristicsError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "trials-explorer";
const APP_NAME: &str = "Trials Explorer";
const CONFIG_FILENAME: &str = "settings.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub search: SearchSettings,
    pub heuristics: HeuristicsSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the explorer's REST API.
    pub base_url: String,
    /// Request timeout; unset means no timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub page_size: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsSettings {
    /// TOML file replacing the built-in keyword tables.
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Load from `explicit` when given, otherwise from the default location.
    pub fn load(explicit: Option<&Path>) -> Self {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match settings_path() {
                Some(path) => Self::load_from(&path),
                None => {
                    warn!("Could not determine settings path, using defaults");
                    Self::default()
                }
            },
        }
    }

    /// Load from a file. A missing or unreadable file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings file {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Failed to read settings file {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write to `path`, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    /// Page size used for searches, never zero.
    pub fn page_size(&self) -> u64 {
        self.search.page_size.max(1)
    }

    /// The configured heuristic tables, or the built-in ones.
    pub fn heuristics(&self) -> Result<Heuristics, HeuristicsError> {
        match &self.heuristics.path {
            Some(path) => Heuristics::load_from(path),
            None => Ok(Heuristics::default()),
        }
    }
}

/// Default settings file, if the platform has a config directory.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}
