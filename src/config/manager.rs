//! Configuration manager for loading and saving application configuration
//!
//! This module provides functionality to load and save configuration to
//! %APPDATA%\talukscope\config.json with atomic writes to prevent corruption.

use crate::config::models::AppConfig;
use crate::error::{AnalyzerError, Result, StringError};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Directory holding config and logs: %APPDATA%\talukscope
    ///
    /// Falls back to the working directory when APPDATA is unset.
    pub fn get_app_dir() -> PathBuf {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("talukscope")
    }

    /// Get the path to the configuration file
    ///
    /// Returns: %APPDATA%\talukscope\config.json
    pub fn get_config_path() -> PathBuf {
        Self::get_app_dir().join("config.json")
    }

    /// Load configuration from the default location
    pub fn load() -> Result<AppConfig> {
        Self::load_from(&Self::get_config_path())
    }

    /// Load configuration, writing the defaults on first run so there is a
    /// file to edit
    pub fn load_or_init() -> Result<AppConfig> {
        let config_path = Self::get_config_path();
        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        let config = AppConfig::default();
        if let Err(e) = Self::save_to(&config, &config_path) {
            warn!("Failed to write default configuration: {}", e);
        }
        Ok(config)
    }

    /// Load configuration from `config_path`
    ///
    /// If the file doesn't exist or is corrupt, returns default configuration.
    pub fn load_from(config_path: &Path) -> Result<AppConfig> {
        if !config_path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let json = std::fs::read_to_string(config_path)?;

        match serde_json::from_str(&json) {
            Ok(config) => {
                info!("Configuration loaded from {}", config_path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(AppConfig::default())
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(config: &AppConfig) -> Result<()> {
        Self::save_to(config, &Self::get_config_path())
    }

    /// Save configuration to `config_path` with an atomic write
    ///
    /// Uses a temporary file and rename to ensure atomic write operation.
    pub fn save_to(config: &AppConfig, config_path: &Path) -> Result<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| AnalyzerError::ConfigError(StringError::new("Invalid config path")))?;
        std::fs::create_dir_all(config_dir)?;

        // Atomic write: write to temp file, then rename
        let temp_path = config_dir.join("config.json.tmp");
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&temp_path, json)?;
        std::fs::rename(temp_path, config_path)?;

        info!("Configuration saved successfully");
        Ok(())
    }
}
