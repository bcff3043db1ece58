use clap::{Args, Subcommand};

use mealcache::config::Config;

use super::{data_lock, load_cursor, CommandError};

#[derive(Args)]
pub struct CursorCommand {
    #[command(subcommand)]
    pub command: CursorSubcommand,
}

#[derive(Subcommand)]
pub enum CursorSubcommand {
    /// Show the last page number that had data
    Show,

    /// Overwrite the cursor; the next sync starts at VALUE + 1
    Set {
        /// New page number
        value: u64,
    },
}

impl CursorCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        match &self.command {
            CursorSubcommand::Show => {
                let cursor = load_cursor(config)?;
                println!("{}", cursor.value());
                println!("  file: {}", cursor.path().display());
            }
            CursorSubcommand::Set { value } => {
                let mut lock = data_lock(config)?;
                let _guard = lock.try_acquire()?;

                let mut cursor = load_cursor(config)?;
                let previous = cursor.value();
                cursor.set(*value)?;
                println!("Cursor moved from {} to {}", previous, value);
            }
        }

        Ok(())
    }
}
