//! Persistence contract for the user state document.

use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::state::UserState;
use crate::storage::Config;

/// Storage for the single user state aggregate.
///
/// Implementations replace the whole document on `save`; a reader never
/// sees half of a write.
pub trait StateStore: Send + Sync {
    /// Stored document, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<UserState>>;

    /// Replace the stored document.
    fn save(&self, state: &UserState) -> Result<()>;

    /// Remove the stored document, returning how many were removed.
    fn reset(&self) -> Result<usize>;

    /// Stored document conformed to `config`, or a fresh one if none exists.
    ///
    /// Storage errors are propagated, never replaced by a default.
    fn load_or_default(&self, config: &Config) -> Result<UserState> {
        match self.load()? {
            Some(state) => state.conform(config),
            None => {
                tracing::debug!("no stored user state, starting fresh");
                Ok(UserState::new(config))
            }
        }
    }
}

/// Process-local store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    document: Mutex<Option<UserState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<UserState>> {
        Ok(self
            .document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, state: &UserState) -> Result<()> {
        *self.document.lock().unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
        Ok(())
    }

    fn reset(&self) -> Result<usize> {
        let removed = self
            .document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(usize::from(removed.is_some()))
    }
}

impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<UserState>> {
        (**self).load()
    }

    fn save(&self, state: &UserState) -> Result<()> {
        (**self).save(state)
    }

    fn reset(&self) -> Result<usize> {
        (**self).reset()
    }
}
