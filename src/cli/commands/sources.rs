//! Sources command implementation

use super::open;
use crate::config::Settings;
use clap::Args;

/// Arguments for the sources command
#[derive(Args, Debug)]
pub struct SourcesArgs {}

impl SourcesArgs {
    /// Execute the sources command
    pub async fn execute(&self, settings: &Settings) -> anyhow::Result<i32> {
        let loader = match open(settings).await {
            Ok(l) => l,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let sources = loader.manager().sources();
        if sources.is_empty() {
            println!("No sources registered.");
            return Ok(0);
        }

        println!("📚 Sources (lowest priority first)");
        println!();
        println!("{:<12} {:<11} ID", "PRIORITY", "OBSERVABLE");
        for info in &sources {
            let observable = if info.observable { "yes" } else { "no" };
            println!("{:<12} {:<11} {}", info.priority, observable, info.id);
        }

        loader.manager().close()?;
        Ok(0)
    }
}
