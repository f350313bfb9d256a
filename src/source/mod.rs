//! Configuration sources
//!
//! A [`Source`] holds one [`Partial`] populated from a single origin. The
//! manager reads every registered source on each rebuild; sources that can be
//! polled for changes additionally implement [`ObservableSource`] and expose
//! themselves through [`Source::as_observable`].
//!
//! | type | struct | observable |
//! |------|--------|------------|
//! | `file` | [`FileSource`] | no |
//! | `observable-file` | [`ObservableFileSource`] | yes |
//! | `dir` | [`DirSource`] | no |
//! | `remote` | [`RemoteSource`] | no |
//! | `observable-remote` | [`ObservableRemoteSource`] | yes |
//! | `env` | [`EnvSource`] | no |
//!
//! [`MemorySource`] is an in-process source for programmatic overrides.
//!
//! Every source guards its tree with its own lock, so a source can be read by
//! the manager and by a direct caller at the same time. Readers always receive
//! owned copies.

pub mod args;
pub mod dir;
pub mod env;
pub mod factory;
pub mod file;
pub mod memory;
pub mod remote;

use crate::domain::{Lookup, Partial, Result, Value};
use async_trait::async_trait;
use parking_lot::RwLock;

pub use args::SourceArgs;
pub use dir::DirSource;
pub use env::EnvSource;
pub use factory::{SourceContext, SourceFactory, SourceStrategy};
pub use file::{FileSource, ObservableFileSource};
pub use memory::MemorySource;
pub use remote::{ObservableRemoteSource, RemoteSource};

/// Read-only holder of one configuration tree
pub trait Source: Lookup + Send + Sync {
    /// Owned copy of the current tree
    fn snapshot(&self) -> Partial;

    /// Reload capability, for sources that can be polled
    fn as_observable(&self) -> Option<&dyn ObservableSource> {
        None
    }

    /// Release held resources; must be idempotent
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Source that can be polled for changes
#[async_trait]
pub trait ObservableSource: Source {
    /// Refresh the stored tree from the origin.
    ///
    /// Returns `true` only when the stored tree changed.
    async fn reload(&self) -> Result<bool>;
}

/// Lock-guarded tree shared by the concrete sources
pub(crate) struct SourceBase {
    partial: RwLock<Partial>,
    separator: String,
}

impl SourceBase {
    pub(crate) fn new(partial: Partial, separator: &str) -> Self {
        Self {
            partial: RwLock::new(partial),
            separator: separator.to_string(),
        }
    }

    pub(crate) fn snapshot(&self) -> Partial {
        self.partial.read().clone()
    }

    /// Swap in `partial`, reporting whether it differs from the stored tree
    pub(crate) fn replace(&self, partial: Partial) -> bool {
        let mut current = self.partial.write();
        if *current == partial {
            return false;
        }
        *current = partial;
        true
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<Value> {
        self.partial.read().value_at(path, &self.separator)
    }

    pub(crate) fn has(&self, path: &str) -> bool {
        self.partial.read().has_path(path, &self.separator)
    }

    pub(crate) fn separator(&self) -> &str {
        &self.separator
    }
}

/// Implements [`Lookup`] for a source struct with a `base: SourceBase` field
macro_rules! impl_source_lookup {
    ($source:ty) => {
        impl $crate::domain::Lookup for $source {
            fn lookup(&self, path: &str) -> Option<$crate::domain::Value> {
                self.base.lookup(path)
            }

            fn has(&self, path: &str) -> bool {
                self.base.has(path)
            }
        }
    };
}

pub(crate) use impl_source_lookup;
