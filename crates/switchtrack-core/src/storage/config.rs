//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Metric thresholds (deep work, refocus cost, alert limits)
//! - Live display refresh period and history length
//! - Log level
//!
//! Configuration is stored at `~/.config/switchtrack/config.toml`.
//! Session state itself is never written to disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::metrics::MetricsPolicy;

/// Upper bound for minute-valued metric settings: one day.
const MAX_METRIC_MINUTES: u64 = 24 * 60;

/// Metric thresholds, in the units users think in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_deep_work_threshold_min")]
    pub deep_work_threshold_min: u64,
    #[serde(default = "default_refocus_cost_min")]
    pub refocus_cost_min: u64,
    #[serde(default = "default_alert_switch_count")]
    pub alert_switch_count: u32,
    #[serde(default = "default_alert_loss_percentage")]
    pub alert_loss_percentage: f64,
}

/// Live display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Most recent records shown by `history`; 0 shows all.
    #[serde(default)]
    pub history_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when SWITCHTRACK_LOG is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/switchtrack/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_deep_work_threshold_min() -> u64 {
    25
}
fn default_refocus_cost_min() -> u64 {
    23
}
fn default_alert_switch_count() -> u32 {
    5
}
fn default_alert_loss_percentage() -> f64 {
    30.0
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            deep_work_threshold_min: default_deep_work_threshold_min(),
            refocus_cost_min: default_refocus_cost_min(),
            alert_switch_count: default_alert_switch_count(),
            alert_loss_percentage: default_alert_loss_percentage(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            history_limit: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(n) if n.is_f64() => value
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("cannot replace a whole section".into()).into());
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown().into())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if no file exists.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.display.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "display.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            }
            .into());
        }
        for (key, minutes) in [
            (
                "metrics.deep_work_threshold_min",
                self.metrics.deep_work_threshold_min,
            ),
            ("metrics.refocus_cost_min", self.metrics.refocus_cost_min),
        ] {
            if minutes > MAX_METRIC_MINUTES {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("must be at most {MAX_METRIC_MINUTES} minutes"),
                }
                .into());
            }
        }
        if !self.metrics.alert_loss_percentage.is_finite()
            || self.metrics.alert_loss_percentage < 0.0
        {
            return Err(ConfigError::InvalidValue {
                key: "metrics.alert_loss_percentage".into(),
                message: "must be a non-negative number".into(),
            }
            .into());
        }
        Ok(())
    }

    pub fn metrics_policy(&self) -> MetricsPolicy {
        MetricsPolicy {
            deep_work_threshold_ms: self.metrics.deep_work_threshold_min.saturating_mul(60_000),
            refocus_cost_minutes_per_switch: self.metrics.refocus_cost_min,
            alert_switch_count: self.metrics.alert_switch_count,
            alert_loss_percentage: self.metrics.alert_loss_percentage,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.display.tick_interval_ms.max(1))
    }
}
