//! Recommendation engine.
//!
//! Owns the configuration, the tagger and an injected [`StateStore`]. Every
//! operation runs as one transaction over the user state: load (or start
//! fresh), change a working copy, save the whole document. Writers are
//! serialized; a failed operation leaves the stored state untouched.

use std::sync::{Mutex, PoisonError};

use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

use crate::api::{CommitRequest, EventListing, FeedbackRequest, SuggestRequest, Suggestion};
use crate::error::{CoreError, Result};
use crate::field::{adjust, ProbabilityField};
use crate::inference::{choose_slot, SearchWindow};
use crate::schedule::{EventId, ScheduledEvent};
use crate::slot::{clamp_slot, SlotClock};
use crate::state::UserState;
use crate::storage::{Config, StateStore};
use crate::tagger::KeywordTagger;

/// Repeat rule reported with suggestions.
pub const NO_REPEAT: &str = "none";

/// Suggestion and learning engine over one user's state.
pub struct Engine<S: StateStore> {
    config: Config,
    clock: SlotClock,
    tagger: KeywordTagger,
    store: S,
    write_lock: Mutex<()>,
    rng: Mutex<Mcg128Xsl64>,
}

impl<S: StateStore> Engine<S> {
    /// Engine with an entropy-seeded generator for the untrained fallback.
    pub fn new(config: Config, store: S) -> Self {
        Self::with_rng(config, store, Mcg128Xsl64::from_entropy())
    }

    /// Engine with a fixed seed, for reproducible suggestions.
    pub fn with_seed(config: Config, store: S, seed: u64) -> Self {
        Self::with_rng(config, store, Mcg128Xsl64::seed_from_u64(seed))
    }

    fn with_rng(config: Config, store: S, rng: Mcg128Xsl64) -> Self {
        Self {
            clock: config.model.clock(),
            tagger: config.tagger.build(),
            config,
            store,
            write_lock: Mutex::new(()),
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &SlotClock {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tag for a free-text activity description.
    pub fn infer_tag(&self, action: &str) -> String {
        self.tagger.infer_tag(action)
    }

    /// Recommend a start time and length for `request.action`.
    ///
    /// The length is the tag's average duration cut to whole slots, the same
    /// length a commit of the suggestion would list.
    pub fn suggest(&self, request: &SuggestRequest) -> Result<Suggestion> {
        let tag = self.infer_tag(&request.action);
        let before = request.by.map(|t| self.clock.to_slot(t));
        let after = request.after.map(|t| self.clock.to_slot(t));

        let (start, length_minutes) = self.transact("suggest", |state| {
            let start = self.infer_start_in(state, &tag, before, after)?;
            let average = state.average_duration(&tag)?;
            Ok((start, self.clock.slots_to_minutes(self.clock.minutes_to_slots(average))))
        })?;

        tracing::info!(action = %request.action, tag = %tag, %start, "suggested start");
        Ok(Suggestion {
            tag,
            start,
            length_minutes,
            repeat_rule: NO_REPEAT.to_string(),
        })
    }

    /// Best start for `tag` between the `after` and `before` slots.
    ///
    /// Records the choice in the recent-suggestion window.
    pub fn infer_start(
        &self,
        tag: &str,
        before: Option<i64>,
        after: Option<i64>,
    ) -> Result<NaiveDateTime> {
        self.transact("infer_start", |state| {
            self.infer_start_in(state, tag, before, after)
        })
    }

    fn infer_start_in(
        &self,
        state: &mut UserState,
        tag: &str,
        before: Option<i64>,
        after: Option<i64>,
    ) -> Result<NaiveDateTime> {
        self.require_tag(tag)?;
        let field = state.fields.read(tag)?;
        let window = SearchWindow::resolve(
            before,
            after,
            self.config.model.lookahead_slots,
            field.len(),
        );
        let chosen = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            choose_slot(&field, window, &state.recent, &mut *rng)
        };
        state.recent.record(chosen);
        tracing::debug!(tag, lo = window.lo, hi = window.hi, chosen, "start slot chosen");
        Ok(state.schedule.cell_time(chosen, &self.clock))
    }

    /// Reshape the tag's field around `request.start` and fold the length
    /// into the tag's average duration.
    pub fn feedback(&self, request: &FeedbackRequest) -> Result<()> {
        self.require_tag(&request.tag)?;
        let index = self.clock.to_slot(request.start);
        self.transact("feedback", |state| {
            let field = state.fields.read(&request.tag)?;
            let updated = adjust(&field, index, request.accepted);
            state.fields.replace(&request.tag, updated)?;
            let avg = state.record_duration(&request.tag, request.length_minutes)?;
            tracing::info!(
                tag = %request.tag,
                slot = index,
                accepted = request.accepted,
                average_minutes = avg,
                "feedback applied"
            );
            Ok(())
        })
    }

    /// Put an event on the schedule, overwriting whatever it overlaps.
    pub fn commit(&self, request: &CommitRequest) -> Result<EventId> {
        self.require_tag(&request.tag)?;
        let start_slot = self.clock.to_slot(request.start);
        let event = ScheduledEvent {
            action: request.action.clone(),
            tag: request.tag.clone(),
            start: request.start,
            duration_slots: self.clock.minutes_to_slots(request.length_minutes),
            repeat_rule: request.repeat_rule.clone(),
        };
        let id = self.transact("commit", |state| {
            state.schedule.commit_overwriting(event, start_slot)
        })?;
        tracing::info!(action = %request.action, slot = start_slot, "event committed");
        Ok(id)
    }

    /// Committed events, one per action, in slot order.
    pub fn list_schedule(&self) -> Result<Vec<EventListing>> {
        let state = self.snapshot()?;
        Ok(state
            .schedule
            .list()
            .into_iter()
            .map(|e| EventListing {
                action: e.action.clone(),
                tag: e.tag.clone(),
                start: e.start,
                length_minutes: self.clock.slots_to_minutes(e.duration_slots),
                repeat_rule: e.repeat_rule.clone(),
            })
            .collect())
    }

    /// Copy of the tag's current field.
    pub fn field(&self, tag: &str) -> Result<ProbabilityField> {
        self.snapshot()?.fields.read(tag)
    }

    /// Learned probability at the slot containing `time`.
    pub fn probability_at(&self, tag: &str, time: NaiveDateTime) -> Result<f64> {
        let field = self.field(tag)?;
        let slot = clamp_slot(self.clock.to_slot(time), field.len());
        Ok(field.get(slot).unwrap_or_default())
    }

    /// Current state without taking the write lock.
    pub fn snapshot(&self) -> Result<UserState> {
        self.with_retry("snapshot", || self.store.load_or_default(&self.config))
    }

    /// Drop all stored state.
    ///
    /// # Errors
    /// `ResetFailed` when there was nothing to remove.
    pub fn reset(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = self.with_retry("reset", || self.store.reset())?;
        if removed == 0 {
            tracing::warn!("reset found no stored state");
            return Err(CoreError::ResetFailed);
        }
        tracing::info!(removed, "user state reset");
        Ok(removed)
    }

    /// Tags outside the configured set are rejected before any state is touched.
    fn require_tag(&self, tag: &str) -> Result<()> {
        if self.config.tagger.has_tag(tag) {
            Ok(())
        } else {
            Err(CoreError::UnknownTag(tag.to_string()))
        }
    }

    /// Run `op` as one read-modify-write over the user state.
    fn transact<T>(&self, name: &str, op: impl FnOnce(&mut UserState) -> Result<T>) -> Result<T> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.with_retry(name, || self.store.load_or_default(&self.config))?;
        let out = op(&mut state)?;
        self.with_retry(name, || self.store.save(&state))?;
        Ok(out)
    }

    /// Retry transient storage failures up to the configured budget.
    fn with_retry<T>(&self, name: &str, mut call: impl FnMut() -> Result<T>) -> Result<T> {
        let max_retries = self.config.storage.max_retries;
        let mut attempt = 0;
        loop {
            match call() {
                Err(e) if e.is_transient() && attempt < max_retries => {
                    attempt += 1;
                    tracing::warn!(operation = name, attempt, error = %e, "retrying storage call");
                }
                other => return other,
            }
        }
    }
}
