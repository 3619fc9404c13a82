//! TOML-based application configuration.
//!
//! Holds the tunables of the recommendation engine:
//! - Slot model (epoch, slot size, modeled days, look-ahead, recent window)
//! - Tag set with keywords and the fallback tag
//! - Storage file name and retry budget
//!
//! Configuration is stored at `~/.config/slotcast/config.toml`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::slot::SlotClock;
use crate::tagger::KeywordTagger;

/// Slot model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Origin of slot 0.
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDateTime,
    #[serde(default = "default_days_modeled")]
    pub days_modeled: u32,
    #[serde(default = "default_slots_per_day")]
    pub slots_per_day: u32,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
    /// Search window length when no `before` bound is given.
    #[serde(default = "default_lookahead_slots")]
    pub lookahead_slots: u32,
    /// Number of remembered suggestion slots (three per suggestion).
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,
}

/// One tag and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Keyword tagger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggerConfig {
    #[serde(default = "default_fallback_tag")]
    pub fallback_tag: String,
    /// Characters removed before keyword matching.
    #[serde(default = "default_strip_chars")]
    pub strip_chars: String,
    #[serde(default = "default_tags")]
    pub tags: Vec<TagConfig>,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_file")]
    pub database_file: String,
    /// Retries for transient storage failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/slotcast/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub tagger: TaggerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

// Default functions
fn default_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 6, 6)
        .and_then(|d| d.and_hms_opt(7, 0, 0))
        .unwrap_or_default()
}
fn default_days_modeled() -> u32 {
    30
}
fn default_slots_per_day() -> u32 {
    288
}
fn default_slot_minutes() -> u32 {
    5
}
fn default_lookahead_slots() -> u32 {
    2016
}
fn default_recent_window() -> usize {
    9
}
fn default_duration_minutes() -> u32 {
    30
}
fn default_fallback_tag() -> String {
    "task".into()
}
fn default_strip_chars() -> String {
    "-".into()
}
fn default_database_file() -> String {
    "slotcast.db".into()
}
fn default_max_retries() -> u32 {
    3
}

fn tag(name: &str, keywords: &[&str]) -> TagConfig {
    TagConfig {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

// Order matters: equal keyword counts resolve to the earlier tag.
fn default_tags() -> Vec<TagConfig> {
    vec![
        tag(
            "school",
            &["study", "essay", "test", "quiz", "evaluation", "exam", "learn", "school"],
        ),
        tag("work", &["meeting", "supervise", "report", "coworker"]),
        tag("leisure", &["play", "fun", "enjoy", "relax", "day off"]),
        tag("task", &[]),
    ]
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            epoch: default_epoch(),
            days_modeled: default_days_modeled(),
            slots_per_day: default_slots_per_day(),
            slot_minutes: default_slot_minutes(),
            lookahead_slots: default_lookahead_slots(),
            recent_window: default_recent_window(),
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

impl ModelConfig {
    /// Total number of slots in the modeled range.
    pub fn slot_count(&self) -> usize {
        self.days_modeled as usize * self.slots_per_day as usize
    }

    pub fn clock(&self) -> SlotClock {
        SlotClock::new(self.epoch, self.slot_minutes)
    }
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            fallback_tag: default_fallback_tag(),
            strip_chars: default_strip_chars(),
            tags: default_tags(),
        }
    }
}

impl TaggerConfig {
    /// Configured tag names in order.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    pub fn build(&self) -> KeywordTagger {
        KeywordTagger::new(
            self.tags
                .iter()
                .map(|t| (t.name.clone(), t.keywords.clone()))
                .collect(),
            self.fallback_tag.clone(),
            self.strip_chars.chars().collect(),
        )
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            max_retries: default_max_retries(),
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
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".to_string(),
        };
        let unparsable = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| unparsable(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(unparsable(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| unparsable(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file in the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Path of the state database in the data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(data_dir()?.join(&self.storage.database_file))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
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
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };

        if self.model.slot_minutes == 0 {
            return invalid("model.slot_minutes", "must be greater than zero");
        }
        if self.model.slot_count() == 0 {
            return invalid("model.days_modeled", "modeled range has no slots");
        }
        if self.model.recent_window == 0 || self.model.recent_window % 3 != 0 {
            return invalid("model.recent_window", "must be a non-zero multiple of 3");
        }
        if self.tagger.tags.is_empty() {
            return invalid("tagger.tags", "at least one tag is required");
        }
        if !self.tagger.has_tag(&self.tagger.fallback_tag) {
            return invalid("tagger.fallback_tag", "must name a configured tag");
        }
        let mut names = self.tagger.tag_names();
        names.sort();
        names.dedup();
        if names.len() != self.tagger.tags.len() {
            return invalid("tagger.tags", "tag names must be unique");
        }
        Ok(())
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
        assert_eq!(parsed.model.slot_count(), 8640);
        assert_eq!(parsed.model.epoch, cfg.model.epoch);
        assert_eq!(parsed.tagger.tags, cfg.tagger.tags);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[model]\ndays_modeled = 7\n").unwrap();
        assert_eq!(parsed.model.days_modeled, 7);
        assert_eq!(parsed.model.slots_per_day, 288);
        assert_eq!(parsed.tagger.fallback_tag, "task");
        assert_eq!(parsed.storage.max_retries, 3);
    }

    #[test]
    fn default_tag_set() {
        let cfg = Config::default();
        let mut names = cfg.tagger.tag_names();
        names.sort();
        assert_eq!(names, vec!["leisure", "school", "task", "work"]);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("model.slot_minutes").as_deref(), Some("5"));
        assert_eq!(cfg.get("tagger.fallback_tag").as_deref(), Some("task"));
        assert_eq!(cfg.get("model.epoch").as_deref(), Some("2026-06-06T07:00:00"));
        assert!(cfg.get("model.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("model.lookahead_slots", "288").unwrap();
        assert_eq!(cfg.model.lookahead_slots, 288);
    }

    #[test]
    fn set_updates_epoch_string() {
        let mut cfg = Config::default();
        cfg.set("model.epoch", "2027-01-01T00:00:00").unwrap();
        assert_eq!(cfg.get("model.epoch").as_deref(), Some("2027-01-01T00:00:00"));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.set("model.nonexistent_key", "1").is_err());
        assert!(cfg.set("", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("model.days_modeled", "thirty").is_err());
        assert!(cfg.set("model.epoch", "not a date").is_err());
    }

    #[test]
    fn set_rejects_values_failing_validation() {
        let mut cfg = Config::default();
        assert!(cfg.set("model.recent_window", "10").is_err());
        assert!(cfg.set("tagger.fallback_tag", "chores").is_err());
        assert_eq!(cfg.model.recent_window, 9);
        assert_eq!(cfg.tagger.fallback_tag, "task");
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.model.days_modeled, 30);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.tagger.tags, cfg.tagger.tags);
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\nslot_minutes = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn unparsable_file_is_a_load_error() {
        use crate::error::CoreError;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model\nslot_minutes = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Config(ConfigError::LoadFailed { path: p, .. }) if p == path
        ));
        // The broken file is left for the user to fix
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[model\nslot_minutes = "
        );
    }
}
