// Standard library
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fs};

// 3rd party crates
use config::{Config, ConfigError, File};
use log::{error, info, LevelFilter};
use serde_json::Value;
use tokio::sync::{RwLock, RwLockReadGuard};

// Project imports
use crate::resources::functions::{normalize_kind, validate_masters};
use crate::utility::reverse_dns::validate_cidr;

// Current module imports
use super::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV, DEFAULT_CONFIG};
use super::errors::ValidationError;
use super::types::{ConfigManager, Settings, ValidatedSettings};

fn check_cidr(field: &'static str, cidr: &str) -> Result<(), ValidationError> {
    validate_cidr(&Value::String(cidr.to_string()), field).map_err(|errors| {
        ValidationError::InvalidCidr {
            field,
            reason: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        }
    })
}

impl Settings {
    pub fn get_log_level(&self) -> String {
        self.log.level.to_lowercase()
    }

    pub fn get_reconcile_interval(&self) -> u64 {
        self.reconcile.interval
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        // Validate log level
        match self.log.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(ValidationError::InvalidLogLevel(self.log.level.clone())),
        }

        self.powerdns.validate()?;

        for zone in &self.zones {
            let kind = normalize_kind(&zone.kind)?;
            validate_masters(&kind, &zone.masters)?;
        }

        for reverse_zone in &self.reverse_zones {
            check_cidr("reverse_zones.cidr", &reverse_zone.cidr)?;
            normalize_kind(&reverse_zone.kind)?;
        }

        for cidr in &self.lookups.reverse_zones {
            check_cidr("lookups.reverse_zones", cidr)?;
        }

        for record in &self.records {
            if record.records.is_empty() {
                return Err(ValidationError::EmptyRecords {
                    name: record.name.clone(),
                    record_type: record.r#type.clone(),
                });
            }
        }

        Ok(())
    }
}

impl ConfigManager {
    /// Creates a new `ConfigManager` from the default location, writing an
    /// example configuration there if none exists.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path: PathBuf = Self::get_config_path()?;
        Self::from_path(config_path).await
    }

    /// Creates a new `ConfigManager` by loading and validating the given file.
    pub async fn from_path(config_path: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        Self::ensure_config_file_exists(&config_path)?;

        let settings: Settings = Self::load_settings(&config_path)?;

        // Validate settings before proceeding
        let validated_settings = ValidatedSettings::new(settings).map_err(|e| {
            error!("Configuration validation failed: {}", e);
            e
        })?;

        let manager = ConfigManager {
            settings: Arc::new(RwLock::new(validated_settings.into_inner())),
            config_path,
        };

        manager.adjust_logging_level().await;

        Ok(manager)
    }

    /// Determines the configuration file path.
    fn get_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            Ok(PathBuf::from(path))
        } else if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        } else {
            let msg: &str = "Could not determine the configuration directory";
            error!("{}", msg);
            Err(ConfigError::Message(msg.into()))
        }
    }

    /// Ensures that the configuration file exists, creating it if necessary.
    fn ensure_config_file_exists(config_path: &Path) -> Result<(), ConfigError> {
        if !config_path.exists() {
            if let Some(parent_dir) = config_path.parent() {
                fs::create_dir_all(parent_dir).map_err(|e| {
                    let msg: String = format!("Failed to create configuration directory: {}", e);
                    error!("{}", msg);
                    ConfigError::Message(msg)
                })?;
            }
            fs::write(config_path, DEFAULT_CONFIG).map_err(|e| {
                let msg: String = format!("Failed to create default configuration file: {}", e);
                error!("{}", msg);
                ConfigError::Message(msg)
            })?;
            info!("Default configuration file created at: {:?}", config_path);
        }
        Ok(())
    }

    /// Loads the settings from the configuration file, then fills unset
    /// PowerDNS connection values from the `PDNS_*` environment variables.
    fn load_settings(config_path: &Path) -> Result<Settings, ConfigError> {
        let config_file: &str = config_path.to_str().ok_or_else(|| {
            let msg: &str = "Configuration file path contains invalid UTF-8 characters";
            error!("{}", msg);
            ConfigError::Message(msg.into())
        })?;

        let settings: Config = Config::builder()
            .add_source(File::with_name(config_file))
            .build()?;

        let mut settings: Settings = settings.try_deserialize()?;
        settings.powerdns.apply_env_fallback();
        Ok(settings)
    }

    /// Reloads the configuration from the file. The running settings are
    /// kept when the new file fails to load or validate.
    pub async fn reload(&self) -> Result<(), Box<dyn std::error::Error>> {
        let new_settings: Settings = Self::load_settings(&self.config_path)?;

        let validated_settings = ValidatedSettings::new(new_settings).map_err(|e| {
            error!("Configuration validation failed during reload: {}", e);
            e
        })?;

        *self.settings.write().await = validated_settings.into_inner();
        self.adjust_logging_level().await;
        info!("Configuration reloaded from {:?}", self.config_path);
        Ok(())
    }

    /// Adjusts the logging level based on the configuration.
    async fn adjust_logging_level(&self) {
        let level: String = self.get_log_level().await;
        let level_filter: LevelFilter = match level.as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        };
        log::set_max_level(level_filter);
    }

    /// Provides a read-locked reference to the current settings.
    pub async fn get_settings(&self) -> RwLockReadGuard<'_, Settings> {
        self.settings.read().await
    }

    /// Clones the current settings so no lock is held across a reconcile pass.
    pub async fn snapshot(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn get_log_level(&self) -> String {
        self.settings.read().await.get_log_level()
    }

    pub async fn get_reconcile_interval(&self) -> u64 {
        self.settings.read().await.get_reconcile_interval()
    }
}

impl ValidatedSettings {
    pub fn new(settings: Settings) -> Result<Self, ValidationError> {
        settings.validate()?;
        Ok(ValidatedSettings(settings))
    }

    pub fn into_inner(self) -> Settings {
        self.0
    }
}

impl std::ops::Deref for ValidatedSettings {
    type Target = Settings;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
