use clap::{Parser, Subcommand};
use slotcast_core::Ack;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "slotcast", version, about = "Time-slot suggestions that learn from feedback")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest a start time for an activity
    Suggest(commands::suggest::SuggestArgs),
    /// Accept or reject a suggested slot
    Feedback(commands::feedback::FeedbackArgs),
    /// Schedule management
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Delete all learned state and scheduled events
    Reset,
    /// Print the tag inferred for a description
    Tag {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SLOTCAST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Suggest(args) => commands::suggest::run(args),
        Commands::Feedback(args) => commands::feedback::run(args),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Reset => commands::reset::run(),
        Commands::Tag { text } => commands::tag::run(&text),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        match serde_json::to_string_pretty(&Ack::err(&e)) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
