pub mod config;
pub mod migrations;
pub mod state_db;
pub mod state_store;

pub use config::Config;
pub use state_db::SqliteStateStore;
pub use state_store::{MemoryStateStore, StateStore};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the slotcast data directory, creating it if needed.
///
/// `SLOTCAST_DATA_DIR` overrides the location. Otherwise this is
/// `~/.config/slotcast[-dev]/`, with SLOTCAST_ENV=dev selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("SLOTCAST_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("SLOTCAST_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("slotcast-dev")
            } else {
                base_dir.join("slotcast")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
