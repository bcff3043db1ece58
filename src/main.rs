use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{ConfigCommand, CursorCommand, ShowCommand, SortCommand, SyncCommand};
use mealcache::config::Config;

#[derive(Parser)]
#[command(name = "mealcache")]
#[command(version)]
#[command(about = "Local cache of the cafeteria's weekly menus", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch new weeks from the upstream site
    Sync(SyncCommand),

    /// Show cached meals
    Show(ShowCommand),

    /// Inspect or move the page cursor
    Cursor(CursorCommand),

    /// Repair the store's date order
    Sort(SortCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "mealcache=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Sync(cmd)) => cmd.run(&config).await?,
        Some(Commands::Show(cmd)) => cmd.run(&config)?,
        Some(Commands::Cursor(cmd)) => cmd.run(&config)?,
        Some(Commands::Sort(cmd)) => cmd.run(&config)?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
