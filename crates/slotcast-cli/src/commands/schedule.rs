use clap::Subcommand;
use slotcast_core::{Ack, CommitRequest, Events, RequestParams};

use super::{open_engine, print_json, CommandResult};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Commit an activity, overwriting anything it overlaps
    Add {
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Start (ISO-8601)
        #[arg(long)]
        start: Option<String>,
        /// Length in minutes
        #[arg(long)]
        length: Option<String>,
        /// Repeat rule, stored as given
        #[arg(long)]
        repeats: Option<String>,
    },
    /// Show committed activities
    List,
}

pub fn run(action: ScheduleAction) -> CommandResult {
    match action {
        ScheduleAction::Add {
            action,
            tag,
            start,
            length,
            repeats,
        } => {
            let params = RequestParams::new()
                .with("action", action)
                .with("tag", tag)
                .with("start_date", start)
                .with("length", length)
                .with("repeats", repeats);
            let request = CommitRequest::from_params(&params)?;
            open_engine()?.commit(&request)?;
            print_json(&Ack::ok())
        }
        ScheduleAction::List => {
            let events = open_engine()?.list_schedule()?;
            print_json(&Events { events })
        }
    }
}
