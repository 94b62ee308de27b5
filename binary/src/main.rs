use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use episode_mining::{
    derive_process_executions, discover_serial_episodes, discover_serial_episodes_per_trace,
    EpisodeMiningOptions, EpisodeRecord, EventStream, FlatEvent, Importable,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "emma",
    about = "Discover frequent serial episodes in flat event streams",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine serial episodes from an event stream (.json or .json.gz).
    Mine {
        /// Path to the event stream.
        #[arg(short, long)]
        input: PathBuf,

        /// Minimum support (distinct entities, or occurrences if events have no entity).
        #[arg(long, default_value_t = EpisodeMiningOptions::default().min_support)]
        min_support: usize,

        /// Maximum window (in time slots) an episode may span.
        #[arg(long, default_value_t = EpisodeMiningOptions::default().max_window)]
        max_window: usize,

        /// Mine every entity separately and aggregate episodes across entities.
        #[arg(long)]
        per_trace: bool,

        /// Replace entities by process executions derived from shared objects.
        #[arg(long)]
        derive_executions: bool,

        /// Write the episodes to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the JSON schemas of input events and output episode records.
    Schema,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Mine {
            input,
            min_support,
            max_window,
            per_trace,
            derive_executions,
            output,
            pretty,
        } => {
            let options = EpisodeMiningOptions::new(min_support, max_window);
            options.validate()?;

            let now = Instant::now();
            let stream = EventStream::import_from_path(&input)
                .with_context(|| format!("Failed to import event stream {}", input.display()))?;
            info!(
                events = stream.len(),
                elapsed = ?now.elapsed(),
                "imported event stream"
            );

            let events = if derive_executions {
                derive_process_executions(&stream.events)
            } else {
                stream.events
            };

            let now = Instant::now();
            let episodes = if per_trace {
                discover_serial_episodes_per_trace(&events, &options)?
            } else {
                discover_serial_episodes(&events, &options)?
            };
            info!(
                episodes = episodes.len(),
                elapsed = ?now.elapsed(),
                "mined serial episodes"
            );

            write_episodes(&episodes, output.as_deref(), pretty)?;
        }
        Commands::Schema => {
            let schemas = serde_json::json!({
                "event": schemars::schema_for!(FlatEvent),
                "episode": schemars::schema_for!(EpisodeRecord),
            });
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
    }
    Ok(())
}

fn write_episodes(
    episodes: &[EpisodeRecord],
    output: Option<&Path>,
    pretty: bool,
) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    if pretty {
        serde_json::to_writer_pretty(&mut writer, episodes)?;
    } else {
        serde_json::to_writer(&mut writer, episodes)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
