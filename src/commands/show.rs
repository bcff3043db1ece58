use clap::Args;

use mealcache::config::Config;
use mealcache::server::resolve_since;

use super::{clock, open_store, CommandError, OutputFormat};

/// Show cached meals
#[derive(Args)]
pub struct ShowCommand {
    /// Only days on or after this date (YYYY-MM-DD or "today")
    #[arg(long)]
    since: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ShowCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        let clock = clock(config);
        let store = open_store(config, clock.clone())?;

        let snapshot = match &self.since {
            Some(since) => store.range_from(resolve_since(since, clock.as_ref())),
            None => store.snapshot(),
        };

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            OutputFormat::Text => {
                if snapshot.is_empty() {
                    println!("No meals cached.");
                } else {
                    print!("{}", snapshot);
                }
            }
        }

        Ok(())
    }
}
