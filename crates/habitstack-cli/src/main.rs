use clap::{Parser, Subcommand};
use habitstack_core::{CalendarDate, Clock, Config, FileStore, SystemClock, Tracker};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::CliClock;

#[derive(Parser)]
#[command(name = "habitstack", version, about = "Daily todos and habit stacks")]
struct Cli {
    /// Pretend today is this day (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<CalendarDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    #[command(flatten)]
    Tracked(TrackedCommand),
}

/// Commands that act on persisted todo and habit state.
#[derive(Subcommand)]
enum TrackedCommand {
    /// One-off tasks
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Recurring habit stacks
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Day rollover and calendar helpers
    Day {
        #[command(subcommand)]
        action: commands::day::DayAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("HABITSTACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Tracked(command) => run_tracked(command, cli.today).await,
    }
}

/// Rehydrate, roll the day over, run the command, then flush.
async fn run_tracked(
    command: TrackedCommand,
    today: Option<CalendarDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = FileStore::new(habitstack_core::storage::data_dir()?);
    let clock = CliClock::new(today.unwrap_or_else(|| SystemClock.today()));
    let mut tracker = Tracker::load(&store, clock, &config).await;
    let rollover = tracker.reconcile_day();

    let result = match command {
        TrackedCommand::Task { action } => commands::task::run(action, &mut tracker),
        TrackedCommand::Habit { action } => commands::habit::run(action, &mut tracker),
        TrackedCommand::Day { action } => commands::day::run(action, &mut tracker, rollover),
    };

    // Persist whatever was applied, even if the command itself failed.
    if let Err(e) = tracker.flush(&store).await {
        tracing::warn!(error = %e, "could not persist state");
        eprintln!("warning: changes not saved: {e}");
    }
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
