use std::{fs, path::PathBuf};

use common::access::DEFAULT_GRANT_DAYS;
use common::gateway::DEFAULT_GATEWAY_URL;
use common::mirror::User;
use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "pinshare";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the pinning gateway API
    #[serde(default = "default_gateway_url")]
    pub gateway_url: Url,
    /// Gateway credentials. Flags and environment variables take precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    /// Expiry applied to grants made without an explicit one
    #[serde(default = "default_grant_days")]
    pub default_grant_days: u32,
    /// Identity the session runs as
    #[serde(default)]
    pub user: User,
}

fn default_gateway_url() -> Url {
    Url::parse(DEFAULT_GATEWAY_URL).expect("hardcoded URL must parse")
}

fn default_grant_days() -> u32 {
    DEFAULT_GRANT_DAYS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            api_key: None,
            api_secret: None,
            default_grant_days: default_grant_days(),
            user: User::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the pinshare directory (~/.pinshare)
    pub pinshare_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the pinshare directory path (custom or default ~/.pinshare)
    pub fn pinshare_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new pinshare state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let pinshare_dir = Self::pinshare_dir(custom_path)?;
        let config_path = pinshare_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&pinshare_dir)?;

        let config = config.unwrap_or_default();
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            pinshare_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the pinshare directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let pinshare_dir = Self::pinshare_dir(custom_path)?;
        let config_path = pinshare_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            pinshare_dir,
            config_path,
            config,
        })
    }

    /// Load existing state, or fall back to defaults if `init` was never run.
    pub fn load_or_default(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        match Self::load(custom_path.clone()) {
            Err(StateError::NotInitialized) => {
                let pinshare_dir = Self::pinshare_dir(custom_path)?;
                tracing::debug!(dir = ?pinshare_dir, "no config found, using defaults");
                Ok(Self {
                    config_path: pinshare_dir.join(CONFIG_FILE_NAME),
                    pinshare_dir,
                    config: AppConfig::default(),
                })
            }
            other => other,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("pinshare directory not initialized. Run 'pinshare init' first")]
    NotInitialized,

    #[error("pinshare directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
