/*
 * Application-level settings of the workspace layer that live outside any
 * workspace, currently the name of the workspace that was current when the
 * application last ran. Persisted as a small JSON file in the local config
 * directory.
 *
 * Callers go through `ConfigManagerOperations` so tests and hosts can swap
 * the storage.
 */
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

const APP_CONFIG_FILENAME: &str = "workspace_settings.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("configuration file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub last_workspace: Option<String>,
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_app_config(&self) -> Result<AppConfig>;
    fn save_app_config(&self, config: &AppConfig) -> Result<()>;
}

pub struct CoreConfigManager {
    config_dir: PathBuf,
}

impl CoreConfigManager {
    pub fn new(config_dir: PathBuf) -> Self {
        CoreConfigManager { config_dir }
    }

    fn config_file(&self) -> PathBuf {
        self.config_dir.join(APP_CONFIG_FILENAME)
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    /*
     * A missing or empty file yields the default configuration. A file that
     * exists but does not parse is an error; the caller decides whether to
     * carry on with defaults.
     */
    fn load_app_config(&self) -> Result<AppConfig> {
        let file_path = self.config_file();
        log::trace!("CoreConfigManager: Loading app config from {file_path:?}");
        if !file_path.exists() {
            log::debug!("CoreConfigManager: Config file {file_path:?} does not exist.");
            return Ok(AppConfig::default());
        }
        let contents = fs::read_to_string(&file_path)?;
        if contents.trim().is_empty() {
            log::debug!("CoreConfigManager: Config file {file_path:?} is empty.");
            return Ok(AppConfig::default());
        }
        let config: AppConfig = serde_json::from_str(&contents)?;
        log::debug!(
            "CoreConfigManager: Loaded last workspace {:?} from {file_path:?}.",
            config.last_workspace
        );
        Ok(config)
    }

    fn save_app_config(&self, config: &AppConfig) -> Result<()> {
        path_utils::ensure_dir(&self.config_dir)?;
        let file_path = self.config_file();
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&file_path, json)?;
        log::debug!(
            "CoreConfigManager: Saved last workspace {:?} to {file_path:?}.",
            config.last_workspace
        );
        Ok(())
    }
}
