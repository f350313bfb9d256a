//! In-process source
//!
//! Holds a tree supplied by the embedding program, typically for overrides
//! computed at runtime. Updates are picked up on the manager's next reload
//! poll, or immediately with [`Manager::rebuild`](crate::manager::Manager::rebuild).

use super::{impl_source_lookup, ObservableSource, Source, SourceBase};
use crate::domain::{Partial, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Source backed by an in-memory tree
pub struct MemorySource {
    base: SourceBase,
    dirty: AtomicBool,
}

impl MemorySource {
    /// Source holding `partial`
    pub fn new(partial: Partial, separator: &str) -> Self {
        Self {
            base: SourceBase::new(partial, separator),
            dirty: AtomicBool::new(false),
        }
    }

    /// Replace the tree; the next reload reports a change if it differs
    pub fn update(&self, partial: Partial) {
        if self.base.replace(partial) {
            self.dirty.store(true, Ordering::SeqCst);
        }
    }
}

impl_source_lookup!(MemorySource);

impl Source for MemorySource {
    fn snapshot(&self) -> Partial {
        self.base.snapshot()
    }

    fn as_observable(&self) -> Option<&dyn ObservableSource> {
        Some(self)
    }
}

#[async_trait]
impl ObservableSource for MemorySource {
    async fn reload(&self) -> Result<bool> {
        Ok(self.dirty.swap(false, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Lookup;

    #[tokio::test]
    async fn test_update_is_reported_once() {
        let source = MemorySource::new(Partial::new(), ".");
        assert!(!source.reload().await.unwrap());

        let mut next = Partial::new();
        next.insert("a", 1);
        source.update(next.clone());
        assert_eq!(source.int("a").unwrap(), 1);
        assert!(source.reload().await.unwrap());
        assert!(!source.reload().await.unwrap());

        source.update(next);
        assert!(!source.reload().await.unwrap());
    }
}
