use clap::Args;
use slotcast_core::{Ack, FeedbackRequest, RequestParams};

use super::{open_engine, print_json, CommandResult};

#[derive(Args)]
pub struct FeedbackArgs {
    /// Tag the suggestion was made for
    #[arg(long)]
    tag: Option<String>,
    /// Suggested start (ISO-8601)
    #[arg(long)]
    start: Option<String>,
    /// Length in minutes
    #[arg(long)]
    length: Option<String>,
    /// "true" if the user took the slot, "false" otherwise
    #[arg(long)]
    accepted: Option<String>,
}

pub fn run(args: FeedbackArgs) -> CommandResult {
    let params = RequestParams::new()
        .with("tag", args.tag)
        .with("start_date", args.start)
        .with("length", args.length)
        .with("accepted", args.accepted);
    let request = FeedbackRequest::from_params(&params)?;

    open_engine()?.feedback(&request)?;
    print_json(&Ack::ok())
}
