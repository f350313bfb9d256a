//! File sources
//!
//! [`FileSource`] decodes a file once at construction. [`ObservableFileSource`]
//! re-reads it on every poll and swaps the tree in when the content changed.

use super::{impl_source_lookup, ObservableSource, Source, SourceBase};
use crate::decoder::DecoderFactory;
use crate::domain::{Partial, Result, StrataError};
use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Open `path` and decode it with `format`
pub(crate) fn decode_file(path: &Path, format: &str, decoders: &DecoderFactory) -> Result<Partial> {
    let file = File::open(path)
        .map_err(|e| StrataError::Io(format!("failed to open {}: {e}", path.display())))?;
    decoders.decode(format, Box::new(BufReader::new(file)))
}

/// Source decoded once from a file
pub struct FileSource {
    base: SourceBase,
    path: PathBuf,
}

impl FileSource {
    /// Decode `path` with `format`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, the format is unknown or
    /// the content does not decode to a mapping.
    pub fn new(
        path: impl AsRef<Path>,
        format: &str,
        decoders: &DecoderFactory,
        separator: &str,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let partial = decode_file(&path, format, decoders)?;

        tracing::debug!(path = %path.display(), format, keys = partial.len(), "File source loaded");

        Ok(Self {
            base: SourceBase::new(partial, separator),
            path,
        })
    }

    /// Path the source was read from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl_source_lookup!(FileSource);

impl Source for FileSource {
    fn snapshot(&self) -> Partial {
        self.base.snapshot()
    }
}

/// File source that re-reads its file on every poll
///
/// A SHA-256 digest of the last decoded content short-circuits polls where
/// the bytes did not change; otherwise the file is decoded and compared with
/// the stored tree.
pub struct ObservableFileSource {
    base: SourceBase,
    path: PathBuf,
    format: String,
    decoders: Arc<DecoderFactory>,
    digest: Mutex<Vec<u8>>,
    closed: AtomicBool,
}

impl ObservableFileSource {
    /// Decode `path` with `format` and remember its digest
    ///
    /// # Errors
    ///
    /// Same as [`FileSource::new`].
    pub fn new(
        path: impl AsRef<Path>,
        format: &str,
        decoders: Arc<DecoderFactory>,
        separator: &str,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = std::fs::read(&path)
            .map_err(|e| StrataError::Io(format!("failed to read {}: {e}", path.display())))?;
        let digest = Sha256::digest(&bytes).to_vec();
        let partial = decoders.decode(format, Box::new(Cursor::new(bytes)))?;

        tracing::debug!(path = %path.display(), format, keys = partial.len(), "Observable file source loaded");

        Ok(Self {
            base: SourceBase::new(partial, separator),
            path,
            format: format.to_string(),
            decoders,
            digest: Mutex::new(digest),
            closed: AtomicBool::new(false),
        })
    }

    /// Path the source is read from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl_source_lookup!(ObservableFileSource);

impl Source for ObservableFileSource {
    fn snapshot(&self) -> Partial {
        self.base.snapshot()
    }

    fn as_observable(&self) -> Option<&dyn ObservableSource> {
        Some(self)
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ObservableSource for ObservableFileSource {
    async fn reload(&self) -> Result<bool> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            StrataError::Io(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let digest = Sha256::digest(&bytes).to_vec();
        if *self.digest.lock() == digest {
            return Ok(false);
        }

        // Only remember the digest once the new content decoded cleanly, so a
        // broken write is retried on the next poll.
        let partial = self
            .decoders
            .decode(&self.format, Box::new(Cursor::new(bytes)))?;
        *self.digest.lock() = digest;

        let changed = self.base.replace(partial);
        if changed {
            tracing::info!(path = %self.path.display(), "File source content changed");
        }
        Ok(changed)
    }
}
