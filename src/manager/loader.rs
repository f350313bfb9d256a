//! Bootstrap loader
//!
//! The loader registers a bootstrap file with the manager, then reads a list
//! of source descriptions out of the merged configuration and registers one
//! source per entry:
//!
//! ```yaml
//! configs:
//!   - type: file
//!     path: config/base.yaml
//!   - id: overrides
//!     priority: 10
//!     type: env
//!     mappings:
//!       APP_PORT: server.port
//! ```
//!
//! Entries without `id` are named `"{config_path}[{index}]"` and entries
//! without `priority` get their index. Running the loader again re-creates
//! every listed source and removes the ones it registered before that are no
//! longer listed.

use super::Manager;
use crate::config::LoaderSettings;
use crate::domain::{Lookup, Partial, Result, StrataError, Value};
use crate::source::{SourceArgs, SourceFactory};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Mutex;

/// Registry id of the bootstrap file source
pub const LOADER_SOURCE_ID: &str = "_loader";

/// Registers the sources listed in the configuration
pub struct Loader {
    manager: Arc<Manager>,
    factory: Arc<SourceFactory>,
    settings: LoaderSettings,
    loaded: Mutex<Vec<String>>,
}

impl Loader {
    pub fn new(manager: Arc<Manager>, factory: Arc<SourceFactory>, settings: LoaderSettings) -> Self {
        Self {
            manager,
            factory,
            settings,
            loaded: Mutex::new(Vec::new()),
        }
    }

    /// Manager the sources are registered with
    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }

    /// Ids registered by the last load, in list order
    pub async fn loaded_ids(&self) -> Vec<String> {
        self.loaded.lock().await.clone()
    }

    /// Register the bootstrap file and every listed source
    ///
    /// Loads are serialized. A missing list registers nothing.
    ///
    /// # Errors
    ///
    /// Stops at the first entry that is not a tree, has an invalid `id` or
    /// `priority`, or fails to build; entries processed before it stay
    /// registered.
    pub async fn load(&self) -> Result<()> {
        let mut loaded = self.loaded.lock().await;

        if !self.settings.source_path.is_empty() && !self.manager.has_source(LOADER_SOURCE_ID) {
            let source = self
                .factory
                .create(SourceArgs::ObservableFile {
                    path: PathBuf::from(&self.settings.source_path),
                    format: self.settings.source_format.clone(),
                })
                .await?;
            self.manager.add_source(LOADER_SOURCE_ID, i32::MIN, source)?;
            tracing::info!(path = %self.settings.source_path, "Bootstrap source registered");
        }

        let config_path = &self.settings.config_path;
        let entries = self.manager.list_or(config_path, Vec::new())?;
        let mut listed = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let cfg = match entry {
                Value::Tree(cfg) => cfg,
                _ => {
                    return Err(StrataError::Conversion {
                        path: format!("{config_path}[{index}]"),
                        expected: "partial",
                    })
                }
            };
            let (id, priority) = entry_identity(cfg, config_path, index)?;
            let source = self.factory.create_from_config(cfg).await?;

            if let Some(position) = loaded.iter().position(|l| *l == id) {
                loaded.remove(position);
                if let Err(e) = self.manager.remove_source(&id) {
                    tracing::warn!(source_id = %id, error = %e, "Failed to release replaced source");
                }
            }
            self.manager.add_source(id.clone(), priority, source)?;
            loaded.push(id.clone());
            listed.push(id);
        }

        let stale: Vec<String> = loaded.iter().filter(|id| !listed.contains(id)).cloned().collect();
        for id in &stale {
            if let Err(e) = self.manager.remove_source(id) {
                tracing::warn!(source_id = %id, error = %e, "Failed to remove unlisted source");
            }
        }
        *loaded = listed;

        tracing::info!(sources = loaded.len(), removed = stale.len(), "Configured sources loaded");
        Ok(())
    }

    /// Re-run [`load`](Self::load) whenever the source list changes
    ///
    /// The reload is spawned on the current tokio runtime; the observer never
    /// calls back into the manager itself.
    ///
    /// # Errors
    ///
    /// Returns an error outside a tokio runtime or when the list is not
    /// present in the configuration.
    pub fn watch(self: &Arc<Self>) -> Result<()> {
        let handle = Handle::try_current()
            .map_err(|e| StrataError::Trigger(format!("no tokio runtime available: {e}")))?;
        let weak = Arc::downgrade(self);

        self.manager
            .add_observer(&self.settings.config_path, move |_, _| {
                let Some(loader) = weak.upgrade() else {
                    return;
                };
                handle.spawn(async move {
                    if let Err(e) = loader.load().await {
                        tracing::warn!(error = %e, "Reloading configured sources failed");
                    }
                });
            })
    }
}

/// `id` and `priority` of a list entry, with index based defaults
fn entry_identity(cfg: &Partial, config_path: &str, index: usize) -> Result<(String, i32)> {
    let id = cfg.string_or("id", &format!("{config_path}[{index}]"))?;
    let priority = cfg.int_or("priority", index as i64)?;
    let priority = i32::try_from(priority).map_err(|_| StrataError::InvalidField {
        field: "priority",
        reason: format!("{priority} is out of range"),
    })?;
    Ok((id, priority))
}
