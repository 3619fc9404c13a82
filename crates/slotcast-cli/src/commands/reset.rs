use slotcast_core::Ack;

use super::{open_engine, print_json, CommandResult};

pub fn run() -> CommandResult {
    open_engine()?.reset()?;
    print_json(&Ack::ok())
}
