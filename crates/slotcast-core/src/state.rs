//! The per-user aggregate persisted as one document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError, Result};
use crate::field::FieldStore;
use crate::inference::RecentWindow;
use crate::schedule::Schedule;
use crate::storage::Config;

/// Everything learned and committed for the user.
///
/// Always loaded and saved whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub schedule: Schedule,
    pub fields: FieldStore,
    /// Average activity length per tag, in minutes.
    pub average_durations: BTreeMap<String, u32>,
    pub recent: RecentWindow,
}

impl UserState {
    /// Fresh state: neutral fields, default durations, empty schedule.
    pub fn new(config: &Config) -> Self {
        let slot_count = config.model.slot_count();
        let tags = config.tagger.tag_names();
        Self {
            schedule: Schedule::new(slot_count),
            fields: FieldStore::new(tags.iter().cloned(), slot_count),
            average_durations: tags
                .into_iter()
                .map(|t| (t, config.model.default_duration_minutes))
                .collect(),
            recent: RecentWindow::new(config.model.recent_window),
        }
    }

    /// Bring a loaded document in line with `config`.
    ///
    /// Tags added to the configuration start out neutral and tags removed
    /// from it lose what was learned about them. A document
    /// modeling a different number of slots cannot be reused and needs a
    /// reset.
    pub fn conform(mut self, config: &Config) -> Result<Self> {
        let slot_count = config.model.slot_count();
        if self.fields.slot_count() != slot_count || self.schedule.slot_count() != slot_count {
            return Err(ConfigError::InvalidValue {
                key: "model".to_string(),
                message: format!(
                    "stored state models {} slots but the configuration models {}; reset required",
                    self.fields.slot_count(),
                    slot_count
                ),
            }
            .into());
        }

        let stale: Vec<String> = self
            .fields
            .tags()
            .filter(|t| !config.tagger.has_tag(t))
            .map(str::to_string)
            .collect();
        for tag in stale {
            self.fields.remove_tag(&tag);
            tracing::info!(tag = %tag, "dropped field for removed tag");
        }
        self.average_durations
            .retain(|tag, _| config.tagger.has_tag(tag));

        for tag in config.tagger.tag_names() {
            if self.fields.add_tag(&tag) {
                tracing::info!(tag = %tag, "added neutral field for new tag");
            }
            self.average_durations
                .entry(tag)
                .or_insert(config.model.default_duration_minutes);
        }
        if self.recent.len() != config.model.recent_window {
            self.recent = RecentWindow::new(config.model.recent_window);
        }
        Ok(self)
    }

    pub fn average_duration(&self, tag: &str) -> Result<u32> {
        self.average_durations
            .get(tag)
            .copied()
            .ok_or_else(|| CoreError::UnknownTag(tag.to_string()))
    }

    /// Move the tag's average halfway toward `minutes`.
    pub fn record_duration(&mut self, tag: &str, minutes: u32) -> Result<u32> {
        let avg = self
            .average_durations
            .get_mut(tag)
            .ok_or_else(|| CoreError::UnknownTag(tag.to_string()))?;
        *avg = ((u64::from(*avg) + u64::from(minutes)) / 2) as u32;
        Ok(*avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::TagConfig;

    #[test]
    fn fresh_state_has_defaults() {
        let state = UserState::new(&Config::default());
        assert!(state.schedule.is_empty());
        assert_eq!(state.recent.len(), 9);
        assert_eq!(state.average_duration("work").unwrap(), 30);
        assert!(state.fields.read("leisure").unwrap().is_uniform());
    }

    #[test]
    fn record_duration_averages() {
        let mut state = UserState::new(&Config::default());
        assert_eq!(state.record_duration("school", 60).unwrap(), 45);
        assert_eq!(state.record_duration("school", 15).unwrap(), 30);
        assert_eq!(state.average_duration("work").unwrap(), 30);
    }

    #[test]
    fn unknown_tag_duration() {
        let mut state = UserState::new(&Config::default());
        assert!(matches!(state.average_duration("x"), Err(CoreError::UnknownTag(_))));
        assert!(state.record_duration("x", 5).is_err());
    }

    #[test]
    fn conform_adds_new_tags() {
        let state = UserState::new(&Config::default());
        let mut config = Config::default();
        config.tagger.tags.push(TagConfig {
            name: "chores".to_string(),
            keywords: vec!["laundry".to_string()],
        });
        let state = state.conform(&config).unwrap();
        assert!(state.fields.read("chores").unwrap().is_uniform());
        assert_eq!(state.average_duration("chores").unwrap(), 30);
    }

    #[test]
    fn conform_drops_removed_tags() {
        let mut config = Config::default();
        config.tagger.tags.push(TagConfig {
            name: "chores".to_string(),
            keywords: vec!["laundry".to_string()],
        });
        let state = UserState::new(&config);
        assert!(state.fields.contains("chores"));

        let state = state.conform(&Config::default()).unwrap();
        assert!(!state.fields.contains("chores"));
        assert!(matches!(state.average_duration("chores"), Err(CoreError::UnknownTag(_))));
        assert_eq!(state.fields.tags().count(), 4);
    }

    #[test]
    fn conform_rejects_slot_count_change() {
        let state = UserState::new(&Config::default());
        let mut config = Config::default();
        config.model.days_modeled = 7;
        assert!(state.conform(&config).is_err());
    }

    #[test]
    fn json_round_trip() {
        let state = UserState::new(&Config::default());
        let json = serde_json::to_string(&state).unwrap();
        let back: UserState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
