use clap::Args;
use slotcast_core::{RequestParams, SuggestRequest};

use super::{open_engine, print_json, CommandResult};

#[derive(Args)]
pub struct SuggestArgs {
    /// Free-text description of the activity
    #[arg(long)]
    action: Option<String>,
    /// Latest acceptable start (ISO-8601)
    #[arg(long)]
    by: Option<String>,
    /// Earliest acceptable start (ISO-8601)
    #[arg(long)]
    after: Option<String>,
}

pub fn run(args: SuggestArgs) -> CommandResult {
    let params = RequestParams::new()
        .with("action", args.action)
        .with("by", args.by)
        .with("after", args.after);
    let request = SuggestRequest::from_params(&params)?;

    let engine = open_engine()?;
    let suggestion = engine.suggest(&request)?;
    print_json(&suggestion)
}
