//! Dump command implementation

use super::{open, OutputFormat};
use crate::config::Settings;
use clap::Args;

/// Arguments for the dump command
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

impl DumpArgs {
    /// Execute the dump command
    pub async fn execute(&self, settings: &Settings) -> anyhow::Result<i32> {
        let loader = match open(settings).await {
            Ok(l) => l,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let snapshot = loader.manager().snapshot();
        tracing::debug!(keys = snapshot.len(), "Dumping merged configuration");
        println!("{}", self.output.render(&snapshot)?);

        loader.manager().close()?;
        Ok(0)
    }
}
