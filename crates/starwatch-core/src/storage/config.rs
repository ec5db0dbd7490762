//! TOML-based application configuration.
//!
//! Stores:
//! - Notification defaults (global switch, default offset, offset choices)
//! - Scheduler intervals
//! - The fixed UTC offset of the reference clock
//! - An optional catalog file path
//!
//! Configuration is stored at `~/.config/starwatch/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Upper bound for the scheduler intervals, in seconds.
pub const MAX_INTERVAL_SECS: u64 = 60;

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Offset used until the user picks one.
    #[serde(default = "default_offset_minutes")]
    pub default_offset_minutes: u32,
    #[serde(default = "default_offset_choices")]
    pub offset_choices: Vec<u32>,
}

/// Scheduler loop intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_idle_tick_secs")]
    pub idle_tick_secs: u64,
    /// Sleep after a notification fired.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClockConfig {
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Catalog file to load instead of the built-in one.
    #[serde(default)]
    pub path: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/starwatch/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

fn default_true() -> bool {
    true
}
fn default_offset_minutes() -> u32 {
    10
}
fn default_offset_choices() -> Vec<u32> {
    vec![5, 10, 15, 20, 30]
}
fn default_idle_tick_secs() -> u64 {
    1
}
fn default_cooldown_secs() -> u64 {
    60
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_offset_minutes: default_offset_minutes(),
            offset_choices: default_offset_choices(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            idle_tick_secs: default_idle_tick_secs(),
            cooldown_secs: default_cooldown_secs(),
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

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as integer")));
                        }
                    }
                    serde_json::Value::Array(_) => serde_json::from_str(value)
                        .map_err(|e| invalid(format!("expected a JSON array: {e}")))?,
                    serde_json::Value::Object(_) => return Err(unknown()),
                    // Optional strings serialize as null.
                    serde_json::Value::Null | serde_json::Value::String(_) => {
                        if value.is_empty() {
                            serde_json::Value::Null
                        } else {
                            serde_json::Value::String(value.into())
                        }
                    }
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Like [`Config::load`], against an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
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

    /// Update a value in memory by key, without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not parse as
    /// the existing type, or the result fails validation.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Every leaf value as `(dot.path, value)` pairs, in section order.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = &self.notifications;
        if n.offset_choices.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "notifications.offset_choices".into(),
                message: "at least one offset choice is required".into(),
            });
        }
        if !n.offset_choices.contains(&n.default_offset_minutes) {
            return Err(ConfigError::InvalidValue {
                key: "notifications.default_offset_minutes".into(),
                message: format!(
                    "{} is not one of the offset choices {:?}",
                    n.default_offset_minutes, n.offset_choices
                ),
            });
        }
        // Both intervals must fit inside one trigger minute.
        if !(1..=MAX_INTERVAL_SECS).contains(&self.scheduler.idle_tick_secs) {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.idle_tick_secs".into(),
                message: format!("must be between 1 and {MAX_INTERVAL_SECS}"),
            });
        }
        if !(1..=MAX_INTERVAL_SECS).contains(&self.scheduler.cooldown_secs) {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.cooldown_secs".into(),
                message: format!("must be between 1 and {MAX_INTERVAL_SECS}"),
            });
        }
        if self.clock.utc_offset_minutes.abs() > 24 * 60 {
            return Err(ConfigError::InvalidValue {
                key: "clock.utc_offset_minutes".into(),
                message: "must be within one day".into(),
            });
        }
        Ok(())
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.path.as_ref().map(PathBuf::from)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert!(cfg.notifications.enabled);
        assert_eq!(cfg.notifications.default_offset_minutes, 10);
        assert_eq!(cfg.notifications.offset_choices, vec![5, 10, 15, 20, 30]);
        assert_eq!(cfg.scheduler.idle_tick_secs, 1);
        assert_eq!(cfg.scheduler.cooldown_secs, 60);
        assert_eq!(cfg.clock.utc_offset_minutes, 0);
        assert!(cfg.catalog.path.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[scheduler]\ncooldown_secs = 5\n").unwrap();
        assert_eq!(cfg.scheduler.cooldown_secs, 5);
        assert_eq!(cfg.scheduler.idle_tick_secs, 1);
        assert_eq!(cfg.notifications.default_offset_minutes, 10);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("scheduler.cooldown_secs").as_deref(), Some("60"));
        assert!(cfg.get("scheduler.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("notifications.enabled", "false").unwrap();
        cfg.apply("clock.utc_offset_minutes", "-300").unwrap();
        cfg.apply("catalog.path", "/tmp/catalog.toml").unwrap();
        assert!(!cfg.notifications.enabled);
        assert_eq!(cfg.clock.utc_offset_minutes, -300);
        assert_eq!(cfg.catalog_path(), Some(PathBuf::from("/tmp/catalog.toml")));
    }

    #[test]
    fn apply_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("scheduler.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.apply("notifications.enabled", "not_a_bool"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn apply_rejects_offset_outside_choices() {
        let mut cfg = Config::default();
        let err = cfg
            .apply("notifications.default_offset_minutes", "7")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(cfg.notifications.default_offset_minutes, 10);
    }

    #[test]
    fn scheduler_intervals_stay_within_a_minute() {
        let mut cfg = Config::default();
        for (key, value) in [
            ("scheduler.idle_tick_secs", "0"),
            ("scheduler.idle_tick_secs", "300"),
            ("scheduler.cooldown_secs", "0"),
            ("scheduler.cooldown_secs", "61"),
        ] {
            assert!(
                matches!(cfg.apply(key, value), Err(ConfigError::InvalidValue { .. })),
                "{key} = {value} accepted"
            );
        }
        assert_eq!(cfg, Config::default());

        cfg.apply("scheduler.idle_tick_secs", "60").unwrap();
        cfg.apply("scheduler.cooldown_secs", "1").unwrap();
        assert_eq!(cfg.scheduler.idle_tick_secs, 60);
    }

    #[test]
    fn load_from_writes_defaults_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.apply("scheduler.cooldown_secs", "30").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().scheduler.cooldown_secs, 30);
    }

    #[test]
    fn entries_flatten_every_leaf() {
        let entries = Config::default().entries();
        assert!(entries
            .iter()
            .any(|(k, v)| k == "notifications.default_offset_minutes" && v == "10"));
        assert!(entries.iter().any(|(k, _)| k == "catalog.path"));
    }
}
