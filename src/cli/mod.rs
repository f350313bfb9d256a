//! CLI interface and argument parsing
//!
//! This module provides the `strata` command-line interface using clap.

pub mod commands;

use crate::config::{load_settings, Settings};
use crate::domain::Result;
use clap::{Parser, Subcommand};

/// Strata - layered configuration inspector
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML settings file (defaults and STRATA_* variables otherwise)
    #[arg(short, long, env = "STRATA_SETTINGS")]
    pub settings: Option<String>,

    /// Bootstrap configuration file, overriding the loader source path
    #[arg(short, long)]
    pub bootstrap: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "STRATA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the value at a path of the merged configuration
    Get(commands::get::GetArgs),

    /// Print the whole merged configuration
    Dump(commands::dump::DumpArgs),

    /// List the registered sources in merge order
    Sources(commands::sources::SourcesArgs),

    /// Reload periodically and print changes until interrupted
    Watch(commands::watch::WatchArgs),
}

impl Cli {
    /// Settings from `--settings` (or the environment), with `--bootstrap`
    /// applied
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be loaded or the result
    /// is invalid.
    pub fn resolve_settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => load_settings(path)?,
            None => Settings::from_env()?,
        };
        if let Some(bootstrap) = &self.bootstrap {
            settings.loader.source_path = bootstrap.clone();
            settings.loader.active = true;
        }
        Ok(settings)
    }
}
