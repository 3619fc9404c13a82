//! # slotcast Core Library
//!
//! Recommends a time slot for a user's next activity and learns from
//! accept/reject feedback. The CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Slot model**: the modeled month is cut into fixed 5-minute slots
//!   counted from a configured epoch
//! - **Tagger**: keyword scoring maps free text to an activity tag
//! - **Probability fields**: one value per slot and tag, reshaped by feedback
//! - **Inference**: picks a high-probability slot that was not suggested
//!   moments ago
//! - **Storage**: the whole user state is one JSON document in SQLite,
//!   configuration lives in TOML
//!
//! ## Key Components
//!
//! - [`Engine`]: transactional entry point for every operation
//! - [`StateStore`]: persistence contract, with [`SqliteStateStore`] and
//!   [`MemoryStateStore`]
//! - [`Config`]: application configuration management

pub mod api;
pub mod engine;
pub mod error;
pub mod field;
pub mod inference;
pub mod schedule;
pub mod slot;
pub mod state;
pub mod storage;
pub mod tagger;

pub use api::{Ack, CommitRequest, EventListing, Events, FeedbackRequest, RequestParams, SuggestRequest, Suggestion};
pub use engine::Engine;
pub use error::{ConfigError, CoreError, DatabaseError, Result};
pub use field::{adjust, FieldStore, ProbabilityField};
pub use inference::{RecentWindow, SearchWindow};
pub use schedule::{EventId, Schedule, ScheduledEvent};
pub use slot::SlotClock;
pub use state::UserState;
pub use storage::{Config, MemoryStateStore, SqliteStateStore, StateStore};
pub use tagger::KeywordTagger;
