use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "starwatch-cli", version, about = "Starwatch CLI")]
struct Cli {
    /// Catalog file to use instead of the configured or built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single tick and print the notification, if any
    Tick(commands::tick::TickArgs),
    /// Run the notification loop until interrupted
    Run,
    /// Show projected occurrences
    Timetable(commands::timetable::TimetableArgs),
    /// Show the ongoing or next festival
    Festival(commands::festival::FestivalArgs),
    /// Show the slot rotation for a date
    Rotation(commands::rotation::RotationArgs),
    /// Notify state management
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Notify offset management
    Offset {
        #[command(subcommand)]
        action: commands::offset::OffsetAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("starwatch_core=info,starwatch_cli=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let catalog = cli.catalog.as_deref();
    let result = match cli.command {
        Commands::Tick(args) => commands::tick::run(args, catalog),
        Commands::Run => commands::run::run(catalog),
        Commands::Timetable(args) => commands::timetable::run(args, catalog),
        Commands::Festival(args) => commands::festival::run(args, catalog),
        Commands::Rotation(args) => commands::rotation::run(args, catalog),
        Commands::Notify { action } => commands::notify::run(action, catalog),
        Commands::Offset { action } => commands::offset::run(action, catalog),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
