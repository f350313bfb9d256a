//! Environment variable source
//!
//! Maps environment variables onto tree paths. Each variable present at
//! construction time is written to its destination path as a string leaf;
//! the environment is not read again afterwards.

use super::{impl_source_lookup, Source, SourceBase};
use crate::domain::{Partial, Result, Value};

/// Source built from `{variable -> destination path}` mappings
pub struct EnvSource {
    base: SourceBase,
    mappings: Vec<(String, String)>,
}

impl EnvSource {
    /// Read every mapped variable once
    ///
    /// Mappings are applied in order, so a later mapping to the same path
    /// wins when both variables are set.
    ///
    /// # Errors
    ///
    /// Returns an error if a destination path is empty.
    pub fn new(
        mappings: impl IntoIterator<Item = (String, String)>,
        separator: &str,
    ) -> Result<Self> {
        let mappings: Vec<_> = mappings.into_iter().collect();
        let mut partial = Partial::new();
        let mut found = 0usize;

        for (variable, path) in &mappings {
            if let Ok(value) = std::env::var(variable) {
                partial.set_with(path, separator, Value::String(value))?;
                found += 1;
            }
        }

        tracing::debug!(mapped = mappings.len(), found, "Environment source loaded");

        Ok(Self {
            base: SourceBase::new(partial, separator),
            mappings,
        })
    }

    /// Configured mappings
    pub fn mappings(&self) -> &[(String, String)] {
        &self.mappings
    }
}

impl_source_lookup!(EnvSource);

impl Source for EnvSource {
    fn snapshot(&self) -> Partial {
        self.base.snapshot()
    }
}
