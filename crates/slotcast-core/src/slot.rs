//! Fixed-resolution time model.
//!
//! Calendar time is divided into equal slots counted from a configured
//! epoch. Slot 0 starts at the epoch; timestamps before the epoch map to
//! negative slots and callers clamp them when indexing.

use chrono::{Duration, NaiveDateTime};

/// Bidirectional mapping between naive timestamps and slot indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClock {
    epoch: NaiveDateTime,
    slot_minutes: i64,
}

impl SlotClock {
    /// `slot_minutes` of zero is treated as one minute.
    pub fn new(epoch: NaiveDateTime, slot_minutes: u32) -> Self {
        Self {
            epoch,
            slot_minutes: i64::from(slot_minutes.max(1)),
        }
    }

    pub fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    pub fn slot_minutes(&self) -> i64 {
        self.slot_minutes
    }

    /// Slot containing `time`, rounding toward the earlier slot.
    pub fn to_slot(&self, time: NaiveDateTime) -> i64 {
        let seconds = (time - self.epoch).num_seconds();
        seconds.div_euclid(self.slot_minutes * 60)
    }

    /// Start of `slot`.
    pub fn to_timestamp(&self, slot: i64) -> NaiveDateTime {
        self.epoch + Duration::minutes(slot * self.slot_minutes)
    }

    /// Number of whole slots covering `minutes`.
    pub fn minutes_to_slots(&self, minutes: u32) -> u32 {
        (i64::from(minutes) / self.slot_minutes) as u32
    }

    pub fn slots_to_minutes(&self, slots: u32) -> u32 {
        (i64::from(slots) * self.slot_minutes) as u32
    }
}

/// Clamp a possibly negative slot into `[0, len)`.
pub fn clamp_slot(slot: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    slot.clamp(0, len as i64 - 1) as usize
}
