//! Directory source
//!
//! Every regular file below the directory is decoded with the same format and
//! merged into one tree. Files are visited in lexical order (depth first when
//! recursive), so later files win conflicting keys.

use super::file::decode_file;
use super::{impl_source_lookup, Source, SourceBase};
use crate::decoder::DecoderFactory;
use crate::domain::{Partial, Result, StrataError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source merging every file of a directory
pub struct DirSource {
    base: SourceBase,
    path: PathBuf,
    files: Vec<PathBuf>,
}

impl DirSource {
    /// Decode and merge the files under `path`
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a directory or any file fails to
    /// decode; no partial result is kept.
    pub fn new(
        path: impl AsRef<Path>,
        format: &str,
        recursive: bool,
        decoders: &DecoderFactory,
        separator: &str,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(StrataError::Io(format!(
                "not a directory: {}",
                path.display()
            )));
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut partial = Partial::new();
        let mut files = Vec::new();

        for entry in WalkDir::new(&path)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let tree = decode_file(entry.path(), format, decoders)?;
            partial.merge(&tree);
            files.push(entry.into_path());
        }

        tracing::debug!(
            path = %path.display(),
            format,
            recursive,
            files = files.len(),
            "Directory source loaded"
        );

        Ok(Self {
            base: SourceBase::new(partial, separator),
            path,
            files,
        })
    }

    /// Directory the source was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Files merged into the tree, in merge order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl_source_lookup!(DirSource);

impl Source for DirSource {
    fn snapshot(&self) -> Partial {
        self.base.snapshot()
    }
}
