//! Committed events over the modeled slot range.
//!
//! An event is stored once and every slot it occupies points at it by id,
//! so an event can never be listed twice because it spans several slots.
//!
//! Commits do not check for conflicts: a later commit takes over whatever
//! slots it covers. That policy lives only in [`Schedule::commit_overwriting`];
//! events that lose their last slot are dropped.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::slot::SlotClock;

/// Identifier of a committed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A committed activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub action: String,
    pub tag: String,
    pub start: NaiveDateTime,
    /// Length in slots.
    pub duration_slots: u32,
    pub repeat_rule: String,
}

/// Sparse slot → event mapping plus the events themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    slot_count: usize,
    events: BTreeMap<EventId, ScheduledEvent>,
    slots: BTreeMap<usize, EventId>,
}

impl Schedule {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            events: BTreeMap::new(),
            slots: BTreeMap::new(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Store `event` at `[start_slot, start_slot + duration_slots]`, inclusive,
    /// taking over any slots already in use.
    ///
    /// The range is clipped to the modeled slots. A range that misses the
    /// modeled slots entirely is rejected.
    pub fn commit_overwriting(&mut self, event: ScheduledEvent, start_slot: i64) -> Result<EventId> {
        let last_slot = start_slot + i64::from(event.duration_slots);
        if self.slot_count == 0 || start_slot >= self.slot_count as i64 || last_slot < 0 {
            return Err(CoreError::malformed(
                "start_date",
                format!("{} is outside the modeled range", event.start),
            ));
        }

        let first = start_slot.max(0) as usize;
        let last = (last_slot as usize).min(self.slot_count - 1);

        let id = EventId::new();
        let mut displaced = HashSet::new();
        for slot in first..=last {
            if let Some(previous) = self.slots.insert(slot, id) {
                displaced.insert(previous);
            }
        }

        for previous in displaced {
            if !self.slots.values().any(|&s| s == previous) {
                if let Some(dropped) = self.events.remove(&previous) {
                    tracing::debug!(action = %dropped.action, "event fully overwritten");
                }
            }
        }

        tracing::debug!(action = %event.action, first, last, "event committed");
        self.events.insert(id, event);
        Ok(id)
    }

    pub fn event_at(&self, slot: usize) -> Option<&ScheduledEvent> {
        self.slots.get(&slot).and_then(|id| self.events.get(id))
    }

    /// Number of slots currently pointing at `id`.
    pub fn occupied_slots(&self, id: EventId) -> usize {
        self.slots.values().filter(|&&s| s == id).count()
    }

    /// Timestamp of a slot cell; occupied and empty cells both report the slot start.
    pub fn cell_time(&self, slot: usize, clock: &SlotClock) -> NaiveDateTime {
        clock.to_timestamp(slot as i64)
    }

    /// Events in slot order, one per distinct action name.
    ///
    /// The first event seen for an action represents it.
    pub fn list(&self) -> Vec<&ScheduledEvent> {
        let mut seen_ids = HashSet::new();
        let mut seen_actions = HashSet::new();
        let mut listed = Vec::new();
        for id in self.slots.values() {
            if !seen_ids.insert(*id) {
                continue;
            }
            if let Some(event) = self.events.get(id) {
                if seen_actions.insert(event.action.as_str()) {
                    listed.push(event);
                }
            }
        }
        listed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn clock() -> SlotClock {
        let epoch = NaiveDate::from_ymd_opt(2026, 6, 6)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        SlotClock::new(epoch, 5)
    }

    fn event(action: &str, slot: i64, duration_slots: u32) -> (ScheduledEvent, i64) {
        let e = ScheduledEvent {
            action: action.to_string(),
            tag: "work".to_string(),
            start: clock().to_timestamp(slot),
            duration_slots,
            repeat_rule: "none".to_string(),
        };
        (e, slot)
    }

    fn commit(schedule: &mut Schedule, action: &str, slot: i64, duration: u32) -> EventId {
        let (e, s) = event(action, slot, duration);
        schedule.commit_overwriting(e, s).unwrap()
    }

    #[test]
    fn commit_occupies_inclusive_range() {
        let mut s = Schedule::new(100);
        let id = commit(&mut s, "standup", 10, 3);
        assert_eq!(s.occupied_slots(id), 4);
        assert!(s.event_at(9).is_none());
        assert_eq!(s.event_at(10).unwrap().action, "standup");
        assert_eq!(s.event_at(13).unwrap().action, "standup");
        assert!(s.event_at(14).is_none());
    }

    #[test]
    fn listing_returns_one_record_per_event() {
        let mut s = Schedule::new(100);
        commit(&mut s, "standup", 10, 3);
        commit(&mut s, "gym", 40, 12);
        let listed: Vec<_> = s.list().iter().map(|e| e.action.clone()).collect();
        assert_eq!(listed, vec!["standup", "gym"]);
    }

    #[test]
    fn listing_groups_by_action_name() {
        let mut s = Schedule::new(100);
        commit(&mut s, "read", 50, 1);
        commit(&mut s, "read", 5, 1);
        let listed = s.list();
        assert_eq!(listed.len(), 1);
        // slot order decides the representative
        assert_eq!(listed[0].start, clock().to_timestamp(5));
    }

    #[test]
    fn later_commit_overwrites_overlap() {
        let mut s = Schedule::new(100);
        let first = commit(&mut s, "essay", 10, 5);
        commit(&mut s, "meeting", 12, 1);
        assert_eq!(s.event_at(11).unwrap().action, "essay");
        assert_eq!(s.event_at(12).unwrap().action, "meeting");
        assert_eq!(s.event_at(14).unwrap().action, "essay");
        assert_eq!(s.occupied_slots(first), 4);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn fully_covered_event_is_dropped() {
        let mut s = Schedule::new(100);
        commit(&mut s, "nap", 20, 1);
        commit(&mut s, "exam", 18, 6);
        assert_eq!(s.len(), 1);
        let listed: Vec<_> = s.list().iter().map(|e| e.action.clone()).collect();
        assert_eq!(listed, vec!["exam"]);
    }

    #[test]
    fn range_is_clipped_to_model() {
        let mut s = Schedule::new(100);
        let tail = commit(&mut s, "late", 98, 10);
        assert_eq!(s.occupied_slots(tail), 2);
        let head = commit(&mut s, "early", -2, 3);
        assert_eq!(s.occupied_slots(head), 2);
    }

    #[test]
    fn range_outside_model_is_rejected() {
        let mut s = Schedule::new(100);
        let (e, slot) = event("never", 100, 2);
        assert!(matches!(
            s.commit_overwriting(e, slot),
            Err(CoreError::MalformedInput { .. })
        ));
        let (e, slot) = event("never", -10, 2);
        assert!(s.commit_overwriting(e, slot).is_err());
        assert!(s.is_empty());
    }

    #[test]
    fn cell_time_is_slot_start() {
        let mut s = Schedule::new(100);
        commit(&mut s, "standup", 10, 3);
        let c = clock();
        assert_eq!(s.cell_time(12, &c), c.to_timestamp(12));
        assert_eq!(s.cell_time(50, &c), c.to_timestamp(50));
    }

    #[test]
    fn survives_json_round_trip() {
        let mut s = Schedule::new(100);
        commit(&mut s, "standup", 10, 3);
        let json = serde_json::to_string(&s).unwrap();
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
