//! Service configuration.
//!
//! Settings come from a TOML file (every key optional) and are then
//! overridden from the environment, with `.env` loaded first. A missing
//! file means defaults.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::analysis::classify::{DEFAULT_UNHEALTHY_THRESHOLD, HealthThreshold};
use crate::ingest::dataset::LevelScale;
use crate::logging::LogLevel;
use crate::model::AnalyticsError;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "battery_health.toml";

pub const ENV_DATA_PATH: &str = "BATTERY_DATA_PATH";
pub const ENV_UNHEALTHY_THRESHOLD: &str = "BATTERY_UNHEALTHY_THRESHOLD";
pub const ENV_LEVEL_SCALE: &str = "BATTERY_LEVEL_SCALE";
pub const ENV_LOG_LEVEL: &str = "BATTERY_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "BATTERY_LOG_FILE";
pub const ENV_LOG_TIMESTAMPS: &str = "BATTERY_LOG_TIMESTAMPS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path of the JSON reading dataset.
    pub data_path: String,
    /// Daily usage rate above which a device is unhealthy.
    pub unhealthy_threshold: f64,
    pub level_scale: LevelScale,
    pub log_level: String,
    pub log_file: Option<String>,
    /// Prefix console log lines with a timestamp.
    pub log_timestamps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_path: "data/battery.json".into(),
            unhealthy_threshold: DEFAULT_UNHEALTHY_THRESHOLD,
            level_scale: LevelScale::Percent,
            log_level: "info".into(),
            log_file: None,
            log_timestamps: true,
        }
    }
}

impl Config {
    /// Loads `path` if it exists, otherwise starts from defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, AnalyticsError> {
        let p = path.as_ref();
        let cfg = if p.exists() {
            let s = fs::read_to_string(p).map_err(|e| {
                AnalyticsError::Config(format!("cannot read {}: {}", p.display(), e))
            })?;
            Self::from_toml_str(&s)?
        } else {
            Config::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, AnalyticsError> {
        let cfg: Config = toml::from_str(s).map_err(|e| AnalyticsError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads `.env`, the config file, then applies `BATTERY_*` environment
    /// overrides.
    pub fn from_env<P: AsRef<Path>>(path: P) -> Result<Self, AnalyticsError> {
        dotenv::dotenv().ok();
        let mut cfg = Self::load_from(path)?;
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), AnalyticsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATA_PATH) {
            self.data_path = path;
        }
        if let Some(raw) = lookup(ENV_UNHEALTHY_THRESHOLD) {
            self.unhealthy_threshold = raw.trim().parse().map_err(|_| {
                AnalyticsError::Config(format!("{} is not a number: {:?}", ENV_UNHEALTHY_THRESHOLD, raw))
            })?;
        }
        if let Some(raw) = lookup(ENV_LEVEL_SCALE) {
            self.level_scale = LevelScale::parse(&raw).ok_or_else(|| {
                AnalyticsError::Config(format!("{} must be percent or fraction, got {:?}", ENV_LEVEL_SCALE, raw))
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.log_file = if file.trim().is_empty() { None } else { Some(file) };
        }
        if let Some(raw) = lookup(ENV_LOG_TIMESTAMPS) {
            self.log_timestamps = parse_flag(&raw).ok_or_else(|| {
                AnalyticsError::Config(format!("{} must be true or false, got {:?}", ENV_LOG_TIMESTAMPS, raw))
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.data_path.trim().is_empty() {
            return Err(AnalyticsError::Config("data_path cannot be empty".into()));
        }
        HealthThreshold::new(self.unhealthy_threshold)?;
        self.log_level()?;
        Ok(())
    }

    pub fn threshold(&self) -> Result<HealthThreshold, AnalyticsError> {
        HealthThreshold::new(self.unhealthy_threshold)
    }

    pub fn log_level(&self) -> Result<LogLevel, AnalyticsError> {
        LogLevel::parse(&self.log_level).ok_or_else(|| {
            AnalyticsError::Config(format!("unknown log_level {:?}", self.log_level))
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
