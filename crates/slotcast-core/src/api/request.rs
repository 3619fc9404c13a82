//! Typed requests built from raw string parameters.
//!
//! The serving layer hands over whatever parameters it received; presence
//! and parse failures come back as `MissingParameter` / `MalformedInput`
//! naming the parameter or the offending value.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime};

use crate::error::{CoreError, Result};

/// Raw name → value parameters of one request.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    values: HashMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` when `value` is present.
    pub fn with(mut self, name: &str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.values.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn required(&self, name: &str) -> Result<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| CoreError::MissingParameter(name.to_string()))
    }

    /// Present and non-empty value.
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn timestamp(&self, name: &str) -> Result<NaiveDateTime> {
        parse_timestamp(name, self.required(name)?)
    }

    pub fn optional_timestamp(&self, name: &str) -> Result<Option<NaiveDateTime>> {
        self.optional(name)
            .map(|v| parse_timestamp(name, v))
            .transpose()
    }

    /// Non-negative whole minutes.
    pub fn minutes(&self, name: &str) -> Result<u32> {
        let raw = self.required(name)?;
        raw.trim()
            .parse::<u32>()
            .map_err(|_| CoreError::malformed(name, raw))
    }

    pub fn flag(&self, name: &str) -> Result<bool> {
        let raw = self.required(name)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(CoreError::malformed(name, raw)),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse an ISO-8601 date-time. Offsets are accepted and dropped.
pub fn parse_timestamp(name: &str, raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    trimmed
        .parse::<NaiveDateTime>()
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.naive_local()))
        .map_err(|_| CoreError::malformed(name, raw))
}

/// Ask for a start time for an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestRequest {
    pub action: String,
    /// Latest acceptable start.
    pub by: Option<NaiveDateTime>,
    /// Earliest acceptable start.
    pub after: Option<NaiveDateTime>,
}

impl SuggestRequest {
    pub fn from_params(params: &RequestParams) -> Result<Self> {
        Ok(Self {
            action: params.required("action")?.to_string(),
            by: params.optional_timestamp("by")?,
            after: params.optional_timestamp("after")?,
        })
    }
}

/// Accept/reject feedback on a suggested slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub tag: String,
    pub start: NaiveDateTime,
    pub length_minutes: u32,
    pub accepted: bool,
}

impl FeedbackRequest {
    pub fn from_params(params: &RequestParams) -> Result<Self> {
        Ok(Self {
            tag: params.required("tag")?.to_string(),
            start: params.timestamp("start_date")?,
            length_minutes: params.minutes("length")?,
            accepted: params.flag("accepted")?,
        })
    }
}

/// Put an activity on the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub action: String,
    pub tag: String,
    pub start: NaiveDateTime,
    pub length_minutes: u32,
    pub repeat_rule: String,
}

impl CommitRequest {
    pub fn from_params(params: &RequestParams) -> Result<Self> {
        Ok(Self {
            action: params.required("action")?.to_string(),
            tag: params.required("tag")?.to_string(),
            start: params.timestamp("start_date")?,
            length_minutes: params.minutes("length")?,
            repeat_rule: params.required("repeats")?.to_string(),
        })
    }
}
