//! Per-tag probability fields.
//!
//! A field holds one value in `[0.0, 1.0]` per slot of the modeled range:
//! how good that slot is for the tag's activities. Fresh fields are
//! uniformly `0.5`, meaning nothing has been learned yet.

mod reshape;

pub use reshape::{adjust, MAX_STEP};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Value of a slot nothing has been learned about.
pub const NEUTRAL: f64 = 0.5;

/// Probability values for every slot of the modeled range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbabilityField(Vec<f64>);

impl ProbabilityField {
    /// Neutral field of `len` slots.
    pub fn uniform(len: usize) -> Self {
        Self(vec![NEUTRAL; len])
    }

    /// Build from raw values, clamping each into `[0, 1]`.
    pub fn from_values(values: Vec<f64>) -> Self {
        let mut field = Self(values);
        field.clamp_all();
        field
    }

    /// Flatten a per-day layout into one field.
    pub fn from_days(days: Vec<Vec<f64>>) -> Self {
        Self::from_values(days.into_iter().flatten().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_values(self) -> Vec<f64> {
        self.0
    }

    pub fn get(&self, slot: usize) -> Option<f64> {
        self.0.get(slot).copied()
    }

    /// Per-day view, `slots_per_day` values each.
    pub fn days(&self, slots_per_day: usize) -> impl Iterator<Item = &[f64]> {
        self.0.chunks(slots_per_day.max(1))
    }

    /// True while every slot is still exactly neutral.
    pub fn is_uniform(&self) -> bool {
        self.0.iter().all(|&p| p == NEUTRAL)
    }

    fn clamp_all(&mut self) {
        for p in &mut self.0 {
            *p = if p.is_nan() { NEUTRAL } else { p.clamp(0.0, 1.0) };
        }
    }
}

/// Tag-keyed probability fields of one user.
///
/// Unknown tags are an error, never silently created. A replace swaps the
/// whole field for a tag or leaves it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStore {
    slot_count: usize,
    fields: BTreeMap<String, ProbabilityField>,
}

impl FieldStore {
    /// Neutral fields for every tag.
    pub fn new<I, S>(tags: I, slot_count: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = tags
            .into_iter()
            .map(|t| (t.into(), ProbabilityField::uniform(slot_count)))
            .collect();
        Self { slot_count, fields }
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.fields.contains_key(tag)
    }

    /// Add a neutral field for `tag`; false if it already had one.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.fields.contains_key(tag) {
            return false;
        }
        self.fields
            .insert(tag.to_string(), ProbabilityField::uniform(self.slot_count));
        true
    }

    /// Drop the tag's field; false if it had none.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.fields.remove(tag).is_some()
    }

    /// Copy of the tag's field, clamped into `[0, 1]`.
    pub fn read(&self, tag: &str) -> Result<ProbabilityField> {
        let field = self
            .fields
            .get(tag)
            .ok_or_else(|| CoreError::UnknownTag(tag.to_string()))?;
        Ok(ProbabilityField::from_values(field.as_slice().to_vec()))
    }

    /// Replace the tag's whole field.
    pub fn replace(&mut self, tag: &str, field: ProbabilityField) -> Result<()> {
        if field.len() != self.slot_count {
            return Err(CoreError::malformed(
                "field",
                format!("expected {} slots, got {}", self.slot_count, field.len()),
            ));
        }
        let slot = self
            .fields
            .get_mut(tag)
            .ok_or_else(|| CoreError::UnknownTag(tag.to_string()))?;
        *slot = ProbabilityField::from_values(field.into_values());
        Ok(())
    }
}
