use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    files::{write_atomic, BackupFolder},
    Config, ConfigError,
};

const CONFIG_FILE: &str = "config.json";

/// Saved preferences at one path, with snapshots in a sibling folder.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups: BackupFolder,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups: BackupFolder::new(backups_dir, "config_", "%Y%m%d_%H%M%S"),
        }
    }

    /// Lays out `<base>/config/config.json` and `<base>/config/backups/`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        let manager = Self::new(config_dir.join(CONFIG_FILE), config_dir.join("backups"));
        manager.backups.ensure()?;
        Ok(manager)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the saved config, or the defaults when nothing was saved yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no saved config, using defaults");
            return Ok(Config::default());
        }
        read_config(&self.config_path)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        write_atomic(&self.config_path, &to_json(config)?)?;
        debug!(path = %self.config_path.display(), "config saved");
        Ok(())
    }

    /// Snapshots `config` and returns the backup's file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let path = self.backups.next_path(note);
        write_atomic(&path, &to_json(config)?)?;
        let name = file_name(&path);
        info!(backup = %name, "config backup created");
        Ok(name)
    }

    /// Loads a backup and makes it the saved config.
    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self
            .backups
            .locate(backup_name)
            .ok_or_else(|| ConfigError::BackupNotFound(backup_name.to_string()))?;
        let config = read_config(&path)?;
        self.save(&config)?;
        info!(backup = %backup_name, "config restored");
        Ok(config)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        Ok(self.backups.list()?.iter().map(|path| file_name(path)).collect())
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
}

fn to_json(config: &Config) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(config).map_err(|err| ConfigError::Serde(err.to_string()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
