//! Response payloads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A recommended start for an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub tag: String,
    pub start: NaiveDateTime,
    pub length_minutes: u32,
    pub repeat_rule: String,
}

/// Outcome of a write request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    pub error: String,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: String::new(),
        }
    }

    pub fn err(error: impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            error: error.to_string(),
        }
    }
}

impl<T> From<&Result<T>> for Ack {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Ack::ok(),
            Err(e) => Ack::err(e),
        }
    }
}

/// One listed schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListing {
    pub action: String,
    pub tag: String,
    pub start: NaiveDateTime,
    pub length_minutes: u32,
    pub repeat_rule: String,
}

/// Schedule listing wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Events {
    pub events: Vec<EventListing>,
}
