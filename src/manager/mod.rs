//! Configuration manager
//!
//! The [`Manager`] owns a priority-ordered registry of sources and the tree
//! obtained by merging them. Every registry change rebuilds that tree from
//! scratch: sources are merged in ascending priority, so the highest priority
//! wins conflicting keys. Observers registered on a path are told about value
//! changes after each rebuild.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strata::config::Settings;
//! use strata::domain::{Lookup, Partial};
//! use strata::manager::Manager;
//! use strata::source::MemorySource;
//!
//! # fn example() -> strata::domain::Result<()> {
//! let manager = Manager::new(&Settings::default())?;
//!
//! let mut defaults = Partial::new();
//! defaults.insert("port", 8080);
//! manager.add_source("defaults", 0, Arc::new(MemorySource::new(defaults, ".")))?;
//!
//! manager.add_observer("port", |old, new| println!("port: {old} -> {new}"))?;
//! assert_eq!(manager.int("port")?, 8080);
//! # Ok(())
//! # }
//! ```
//!
//! Registry mutations and rebuilds are serialized by one mutex. Callbacks run
//! after that mutex is released, on a thread that rebuilt, so they may read
//! from or register with the manager again. Each observer still receives its
//! changes one at a time and in rebuild order.

pub mod loader;
pub mod observer;
pub mod trigger;

use crate::config::Settings;
use crate::domain::{Lookup, Partial, Result, StrataError, Value};
use crate::source::Source;
use observer::{Notification, ObserverRef};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

pub use loader::{Loader, LOADER_SOURCE_ID};
pub use observer::Callback;
pub use trigger::Trigger;

/// Registered source with its id and priority
struct SourceRef {
    id: String,
    priority: i32,
    source: Arc<dyn Source>,
}

/// Public view of one registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Registry id
    pub id: String,
    /// Merge priority (higher wins)
    pub priority: i32,
    /// Whether the source is polled on reload
    pub observable: bool,
}

#[derive(Default)]
struct State {
    sources: Vec<SourceRef>,
    partial: Partial,
    observers: Vec<ObserverRef>,
}

impl State {
    fn position(&self, id: &str) -> Option<usize> {
        self.sources.iter().position(|s| s.id == id)
    }

    fn sort(&mut self) {
        // Vec::sort_by_key is stable, so equal priorities keep insertion order
        self.sources.sort_by_key(|s| s.priority);
    }

    /// Merge every source into a fresh tree and diff the observers
    fn rebuild(&mut self, separator: &str) -> Vec<Notification> {
        let mut partial = Partial::new();
        for entry in &self.sources {
            partial.merge(&entry.source.snapshot());
        }
        self.partial = partial;

        let notifications: Vec<_> = self
            .observers
            .iter_mut()
            .filter_map(|observer| {
                let resolved = self.partial.value_at(&observer.path, separator);
                observer.observe(resolved)
            })
            .collect();

        tracing::debug!(
            sources = self.sources.len(),
            keys = self.partial.len(),
            notifications = notifications.len(),
            "Configuration rebuilt"
        );
        notifications
    }
}

fn notify(notifications: Vec<Notification>) {
    for notification in notifications {
        notification.fire();
    }
}

/// State shared between the manager and its reload trigger
struct ManagerInner {
    state: Mutex<State>,
    separator: String,
}

impl ManagerInner {
    fn rebuild(&self) {
        let notifications = {
            let mut state = self.state.lock();
            state.rebuild(&self.separator)
        };
        notify(notifications);
    }

    async fn reload(&self) -> bool {
        let sources: Vec<(String, Arc<dyn Source>)> = {
            let state = self.state.lock();
            state
                .sources
                .iter()
                .map(|s| (s.id.clone(), Arc::clone(&s.source)))
                .collect()
        };

        let mut changed = false;
        for (id, source) in &sources {
            let Some(observable) = source.as_observable() else {
                continue;
            };
            match observable.reload().await {
                Ok(true) => {
                    tracing::debug!(source_id = %id, "Source reported changes");
                    changed = true;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(source_id = %id, error = %e, "Source reload failed");
                }
            }
        }

        if changed {
            self.rebuild();
        }
        changed
    }
}

/// Merges prioritized sources into one configuration tree
///
/// Dropping the manager drops its [`Trigger`], which stops periodic reload.
pub struct Manager {
    inner: Arc<ManagerInner>,
    trigger: Mutex<Option<Trigger>>,
}

impl Manager {
    /// Create an empty manager
    ///
    /// When `settings.observe_frequency_secs` is non-zero a [`Trigger`]
    /// reloads the observable sources at that period.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Trigger`] when periodic reload is requested
    /// outside a tokio runtime.
    pub fn new(settings: &Settings) -> Result<Self> {
        let inner = Arc::new(ManagerInner {
            state: Mutex::new(State::default()),
            separator: settings.path_separator.clone(),
        });

        let trigger = match settings.observe_frequency() {
            Some(period) => Some(Self::start_trigger(&inner, period)?),
            None => None,
        };

        Ok(Self {
            inner,
            trigger: Mutex::new(trigger),
        })
    }

    fn start_trigger(inner: &Arc<ManagerInner>, period: std::time::Duration) -> Result<Trigger> {
        let weak: Weak<ManagerInner> = Arc::downgrade(inner);
        Trigger::start(period, move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.reload().await;
                }
            }
        })
    }

    /// Path separator used by the typed accessors
    pub fn separator(&self) -> &str {
        &self.inner.separator
    }

    /// Register `source` under `id` and rebuild
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::DuplicateSource`] if `id` is taken; the registry
    /// is left unchanged.
    pub fn add_source(
        &self,
        id: impl Into<String>,
        priority: i32,
        source: Arc<dyn Source>,
    ) -> Result<()> {
        let id = id.into();
        let notifications = {
            let mut state = self.inner.state.lock();
            if state.position(&id).is_some() {
                return Err(StrataError::DuplicateSource(id));
            }
            state.sources.push(SourceRef {
                id: id.clone(),
                priority,
                source,
            });
            state.sort();
            state.rebuild(&self.inner.separator)
        };

        tracing::info!(source_id = %id, priority, "Source added");
        notify(notifications);
        Ok(())
    }

    /// Unregister and close the source `id`, then rebuild
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::SourceNotFound`] for an unknown id, or the
    /// close error of the source once the rebuild is done.
    pub fn remove_source(&self, id: &str) -> Result<()> {
        let (removed, notifications) = {
            let mut state = self.inner.state.lock();
            let index = state
                .position(id)
                .ok_or_else(|| StrataError::SourceNotFound(id.to_string()))?;
            let removed = state.sources.remove(index);
            (removed, state.rebuild(&self.inner.separator))
        };

        tracing::info!(source_id = %id, "Source removed");
        notify(notifications);
        removed.source.close()
    }

    /// Unregister and close every source, then rebuild
    ///
    /// # Errors
    ///
    /// Every source is closed even when some fail; the failures are returned
    /// together.
    pub fn remove_all_sources(&self) -> Result<()> {
        let (removed, notifications) = {
            let mut state = self.inner.state.lock();
            let removed = std::mem::take(&mut state.sources);
            (removed, state.rebuild(&self.inner.separator))
        };

        tracing::info!(count = removed.len(), "All sources removed");
        notify(notifications);
        close_all(&removed)
    }

    /// Change the priority of source `id`, then rebuild
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::SourceNotFound`] for an unknown id
    pub fn source_priority(&self, id: &str, priority: i32) -> Result<()> {
        let notifications = {
            let mut state = self.inner.state.lock();
            let index = state
                .position(id)
                .ok_or_else(|| StrataError::SourceNotFound(id.to_string()))?;
            state.sources[index].priority = priority;
            state.sort();
            state.rebuild(&self.inner.separator)
        };

        tracing::info!(source_id = %id, priority, "Source priority changed");
        notify(notifications);
        Ok(())
    }

    /// Whether a source is registered under `id`
    pub fn has_source(&self, id: &str) -> bool {
        self.inner.state.lock().position(id).is_some()
    }

    /// Registered ids in merge order
    pub fn source_ids(&self) -> Vec<String> {
        self.inner
            .state
            .lock()
            .sources
            .iter()
            .map(|s| s.id.clone())
            .collect()
    }

    /// Registry entries in merge order
    pub fn sources(&self) -> Vec<SourceInfo> {
        self.inner
            .state
            .lock()
            .sources
            .iter()
            .map(|s| SourceInfo {
                id: s.id.clone(),
                priority: s.priority,
                observable: s.source.as_observable().is_some(),
            })
            .collect()
    }

    /// Source registered under `id`
    pub fn source(&self, id: &str) -> Option<Arc<dyn Source>> {
        let state = self.inner.state.lock();
        state
            .position(id)
            .map(|index| Arc::clone(&state.sources[index].source))
    }

    /// Re-merge every source and notify observers of changed values
    pub fn rebuild(&self) {
        self.inner.rebuild();
    }

    /// Call `callback` with `(old, new)` whenever the value at `path` changes
    ///
    /// Several observers may watch the same path. A path that stops resolving
    /// does not trigger the callback; the last seen value is kept.
    ///
    /// Calls to one callback never overlap and follow rebuild order, even when
    /// several threads rebuild at once: a `(1, 2)` change is always delivered
    /// before `(2, 3)`. A rebuild triggered from inside the callback is
    /// delivered after the callback returns.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::PathNotFound`] if `path` does not resolve now.
    pub fn add_observer<F>(&self, path: &str, callback: F) -> Result<()>
    where
        F: Fn(&Value, &Value) + Send + Sync + 'static,
    {
        let mut state = self.inner.state.lock();
        let current = state
            .partial
            .value_at(path, &self.inner.separator)
            .ok_or_else(|| StrataError::PathNotFound(path.to_string()))?;
        state
            .observers
            .push(ObserverRef::new(path, current, Arc::new(callback)));

        tracing::debug!(path, "Observer added");
        Ok(())
    }

    /// Drop every observer registered on `path`, returning how many there were
    pub fn remove_observer(&self, path: &str) -> usize {
        let mut state = self.inner.state.lock();
        let before = state.observers.len();
        state.observers.retain(|o| o.path != path);
        before - state.observers.len()
    }

    /// Owned copy of the merged tree
    pub fn snapshot(&self) -> Partial {
        self.inner.state.lock().partial.clone()
    }

    /// Poll every observable source and rebuild once if any changed
    ///
    /// Source failures are logged and skipped. Returns whether a rebuild
    /// happened.
    pub async fn reload(&self) -> bool {
        self.inner.reload().await
    }

    /// Whether periodic reload is running
    pub fn is_observing(&self) -> bool {
        self.trigger
            .lock()
            .as_ref()
            .is_some_and(Trigger::is_running)
    }

    /// Stop periodic reload and close every source
    ///
    /// Sources stay registered. All sources are closed even when some fail.
    ///
    /// # Errors
    ///
    /// Returns the close failures, aggregated when there are several.
    pub fn close(&self) -> Result<()> {
        if let Some(trigger) = self.trigger.lock().take() {
            trigger.stop();
        }

        let sources: Vec<Arc<dyn Source>> = {
            let state = self.inner.state.lock();
            state.sources.iter().map(|s| Arc::clone(&s.source)).collect()
        };

        tracing::info!(sources = sources.len(), "Closing configuration manager");
        StrataError::from_many(sources.iter().filter_map(|s| s.close().err()).collect())
    }
}

fn close_all(sources: &[SourceRef]) -> Result<()> {
    let errors = sources
        .iter()
        .filter_map(|entry| {
            entry.source.close().err().map(|e| {
                tracing::warn!(source_id = %entry.id, error = %e, "Failed to close source");
                e
            })
        })
        .collect();
    StrataError::from_many(errors)
}

impl Lookup for Manager {
    fn lookup(&self, path: &str) -> Option<Value> {
        self.inner
            .state
            .lock()
            .partial
            .value_at(path, &self.inner.separator)
    }
}
