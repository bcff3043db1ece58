use clap::{Args, Subcommand};
use std::fmt::Display;

use mealcache::config::{Config, ConfigValue};

use super::{CommandError, OutputFormat};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        print_value("data_dir", &config.data_dir.value.display(), &config.data_dir);
                        print_value("source_url", &config.source_url.value, &config.source_url);
                        print_value(
                            "retention_days",
                            &config.retention_days.value,
                            &config.retention_days,
                        );
                        print_value("initial_page", &config.initial_page.value, &config.initial_page);
                        print_value("port", &config.port.value, &config.port);
                        print_value(
                            "sync_interval_secs",
                            &config.sync_interval_secs.value,
                            &config.sync_interval_secs,
                        );
                        print_value(
                            "request_timeout_secs",
                            &config.request_timeout_secs.value,
                            &config.request_timeout_secs,
                        );
                        print_value(
                            "utc_offset_hours",
                            &config.utc_offset_hours.value,
                            &config.utc_offset_hours,
                        );
                        print_value(
                            "rollback_on_fetch_error",
                            &config.rollback_on_fetch_error.value,
                            &config.rollback_on_fetch_error,
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

fn print_value<T>(name: &str, shown: &dyn Display, value: &ConfigValue<T>) {
    println!("{}: {}", name, shown);
    println!("  source: {}", value.source);
    println!();
}
