//! Triggerkit CLI - inspect captured trigger envelopes and payloads.

use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod error;
mod input;
mod output;

use commands::{decode, delta, normalize};

/// Log filter variable; defaults to `warn`.
const LOG_ENV: &str = "TRIGGERKIT_LOG";

#[derive(Parser)]
#[command(name = "triggerkit")]
#[command(about = "Normalize trigger envelopes and decode their payloads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Provider {
    /// Document-store triggers
    Document,
    /// Hierarchical-store triggers
    Database,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EventKind {
    /// Created
    Create,
    /// Changed
    Update,
    /// Deleted
    Delete,
    /// Any write
    Write,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw envelope into (data, context)
    Normalize {
        /// Envelope JSON file (or stdin if not provided)
        input: Option<String>,
        /// Provider the trigger belongs to
        #[arg(long, value_enum)]
        provider: Provider,
        /// Event the trigger listens to
        #[arg(long, value_enum, default_value = "write")]
        event: EventKind,
        /// Resource path template, e.g. users/{uid}
        #[arg(long)]
        path: String,
        /// Project id (overrides the environment)
        #[arg(long)]
        project: Option<String>,
        /// Database URL (overrides the environment)
        #[arg(long)]
        database_url: Option<String>,
        /// Print trigger metadata instead of the event
        #[arg(long)]
        metadata: bool,
    },
    /// Decode an encoded document payload
    Decode {
        /// Document JSON file (or stdin if not provided)
        input: Option<String>,
        /// Name to use when the payload carries none
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Evaluate a delta snapshot from {"data", "delta"} JSON
    Delta {
        /// Delta JSON file (or stdin if not provided)
        input: Option<String>,
        /// Child path to inspect
        #[arg(long, default_value = "")]
        child: String,
        /// Show the state before the delta
        #[arg(long)]
        previous: bool,
        /// Comma-separated dotted paths that are sparse in "data"
        #[arg(long)]
        field_mask: Option<String>,
    },
}

fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Normalize {
            input,
            provider,
            event,
            path,
            project,
            database_url,
            metadata,
        } => normalize::run(normalize::Options {
            input,
            provider,
            event,
            path,
            project,
            database_url,
            metadata,
        }),
        Commands::Decode { input, name } => decode::run(input, name),
        Commands::Delta {
            input,
            child,
            previous,
            field_mask,
        } => delta::run(input, child, previous, field_mask),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
