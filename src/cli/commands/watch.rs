//! Watch command implementation
//!
//! Keeps the configuration loaded, reloads observable sources periodically
//! and prints every change of the watched path until a shutdown signal.

use super::open;
use crate::config::Settings;
use crate::domain::StrataError;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Path to watch (the whole configuration when omitted)
    pub path: Option<String>,

    /// Reload period in seconds, used when the settings disable reloading
    #[arg(short, long, default_value_t = 5)]
    pub interval: u64,
}

impl WatchArgs {
    /// Execute the watch command
    pub async fn execute(
        &self,
        settings: &Settings,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut settings = settings.clone();
        if settings.observe_frequency_secs == 0 {
            settings.observe_frequency_secs = self.interval.max(1);
        }

        let loader = match open(&settings).await {
            Ok(l) => l,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if settings.loader.active {
            match loader.watch() {
                Ok(()) => {}
                Err(StrataError::PathNotFound(path)) => {
                    tracing::debug!(path = %path, "No source list to watch");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let path = self.path.clone().unwrap_or_default();
        let label = if path.is_empty() { "<root>".to_string() } else { path.clone() };
        let printed = label.clone();
        match loader.manager().add_observer(&path, move |old, new| {
            println!("🔄 {printed}: {old} -> {new}");
        }) {
            Ok(()) => {}
            Err(StrataError::PathNotFound(path)) => {
                println!("❌ Path not found: {path}");
                return Ok(3);
            }
            Err(e) => return Err(e.into()),
        }

        println!(
            "👀 Watching {label} every {}s, press Ctrl+C to stop",
            settings.observe_frequency_secs
        );

        while !*shutdown_signal.borrow() {
            if shutdown_signal.changed().await.is_err() {
                break;
            }
        }

        tracing::info!("Shutdown requested, closing sources");
        if let Err(e) = loader.manager().close() {
            crate::log_error_with_context!(&e, "Failed to close sources");
            println!("⚠️  Some sources failed to close: {e}");
            return Ok(5);
        }

        println!("✅ Stopped watching {label}");
        Ok(0)
    }
}
