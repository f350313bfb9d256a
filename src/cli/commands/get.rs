//! Get command implementation

use super::{open, OutputFormat};
use crate::config::Settings;
use crate::domain::Lookup;
use clap::Args;

/// Arguments for the get command
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Path to resolve, e.g. `server.port`
    pub path: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

impl GetArgs {
    /// Execute the get command
    pub async fn execute(&self, settings: &Settings) -> anyhow::Result<i32> {
        tracing::info!(path = %self.path, "Resolving configuration path");

        let loader = match open(settings).await {
            Ok(l) => l,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let value = match loader.manager().get(&self.path) {
            Ok(v) => v,
            Err(e) if e.is_not_found() => {
                println!("❌ {e}");
                return Ok(3); // Path not found exit code
            }
            Err(e) => return Err(e.into()),
        };

        println!("{}", self.output.render(&value)?);
        loader.manager().close()?;
        Ok(0)
    }
}
