pub mod config;
pub mod feedback;
pub mod reset;
pub mod schedule;
pub mod suggest;
pub mod tag;

use serde::Serialize;
use slotcast_core::{Config, Engine, SqliteStateStore};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Engine over the on-disk config and state database.
pub fn open_engine() -> Result<Engine<SqliteStateStore>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = SqliteStateStore::open(&config)?;
    Ok(Engine::new(config, store))
}

pub fn print_json<T: Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
