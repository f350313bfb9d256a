//! Typed source arguments and the declarative source description builder

use crate::config::Settings;
use crate::domain::{Partial, Result, StrataError, Value};
use std::path::PathBuf;

/// Type string of [`FileSource`](super::FileSource)
pub const FILE: &str = "file";
/// Type string of [`ObservableFileSource`](super::ObservableFileSource)
pub const OBSERVABLE_FILE: &str = "observable-file";
/// Type string of [`DirSource`](super::DirSource)
pub const DIR: &str = "dir";
/// Type string of [`RemoteSource`](super::RemoteSource)
pub const REMOTE: &str = "remote";
/// Type string of [`ObservableRemoteSource`](super::ObservableRemoteSource)
pub const OBSERVABLE_REMOTE: &str = "observable-remote";
/// Type string of [`EnvSource`](super::EnvSource)
pub const ENV: &str = "env";

/// Arguments for programmatic source creation, one variant per source type
#[derive(Debug, Clone, PartialEq)]
pub enum SourceArgs {
    File {
        path: PathBuf,
        format: String,
    },
    ObservableFile {
        path: PathBuf,
        format: String,
    },
    Dir {
        path: PathBuf,
        format: String,
        recursive: bool,
    },
    Remote {
        uri: String,
        format: String,
        config_path: String,
    },
    ObservableRemote {
        uri: String,
        format: String,
        config_path: String,
        timestamp_path: String,
    },
    Env {
        mappings: Vec<(String, String)>,
    },
}

impl SourceArgs {
    /// Type string the arguments are meant for
    pub fn source_type(&self) -> &'static str {
        match self {
            Self::File { .. } => FILE,
            Self::ObservableFile { .. } => OBSERVABLE_FILE,
            Self::Dir { .. } => DIR,
            Self::Remote { .. } => REMOTE,
            Self::ObservableRemote { .. } => OBSERVABLE_REMOTE,
            Self::Env { .. } => ENV,
        }
    }

    /// Build arguments from a declarative source description
    ///
    /// Fields are read in the order `type`, `path`, `format`, `recursive`,
    /// `uri`, `configPath`, `timestampPath`, `mappings`, skipping the ones the
    /// type does not use. The first problem found is returned. A `null` field
    /// counts as absent. Missing formats fall back to the settings defaults
    /// and a missing `configPath` selects the whole response body.
    ///
    /// # Errors
    ///
    /// - [`StrataError::MissingField`] for an absent required field
    /// - [`StrataError::InvalidField`] for a field of the wrong shape
    /// - [`StrataError::InvalidSourceType`] for an unknown `type`
    pub fn from_config(cfg: &Partial, settings: &Settings) -> Result<Self> {
        let source_type = required_string(cfg, "type")?;

        match source_type.as_str() {
            FILE | OBSERVABLE_FILE => {
                let path = PathBuf::from(required_string(cfg, "path")?);
                let format = string_or(cfg, "format", &settings.default_file_format)?;
                Ok(if source_type == FILE {
                    Self::File { path, format }
                } else {
                    Self::ObservableFile { path, format }
                })
            }
            DIR => {
                let path = PathBuf::from(required_string(cfg, "path")?);
                let format = string_or(cfg, "format", &settings.default_file_format)?;
                let recursive = optional_bool(cfg, "recursive")?.unwrap_or(false);
                Ok(Self::Dir {
                    path,
                    format,
                    recursive,
                })
            }
            REMOTE => {
                let format = string_or(cfg, "format", &settings.default_remote_format)?;
                let uri = required_string(cfg, "uri")?;
                let config_path = optional_string(cfg, "configPath")?.unwrap_or_default();
                Ok(Self::Remote {
                    uri,
                    format,
                    config_path,
                })
            }
            OBSERVABLE_REMOTE => {
                let format = string_or(cfg, "format", &settings.default_remote_format)?;
                let uri = required_string(cfg, "uri")?;
                let config_path = optional_string(cfg, "configPath")?.unwrap_or_default();
                let timestamp_path = required_string(cfg, "timestampPath")?;
                Ok(Self::ObservableRemote {
                    uri,
                    format,
                    config_path,
                    timestamp_path,
                })
            }
            ENV => Ok(Self::Env {
                mappings: mappings(cfg)?,
            }),
            other => Err(StrataError::InvalidSourceType(other.to_string())),
        }
    }
}

/// Value of a top-level field, treating `null` as absent
fn field<'a>(cfg: &'a Partial, name: &str) -> Option<&'a Value> {
    cfg.entry(name).filter(|v| !matches!(v, Value::Null))
}

fn optional_string(cfg: &Partial, name: &'static str) -> Result<Option<String>> {
    match field(cfg, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(StrataError::InvalidField {
            field: name,
            reason: format!("expected a string, found {}", other.type_name()),
        }),
    }
}

fn required_string(cfg: &Partial, name: &'static str) -> Result<String> {
    let value = optional_string(cfg, name)?.ok_or(StrataError::MissingField(name))?;
    if value.is_empty() {
        return Err(StrataError::InvalidField {
            field: name,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

fn string_or(cfg: &Partial, name: &'static str, default: &str) -> Result<String> {
    Ok(optional_string(cfg, name)?.unwrap_or_else(|| default.to_string()))
}

fn optional_bool(cfg: &Partial, name: &'static str) -> Result<Option<bool>> {
    match field(cfg, name) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(StrataError::InvalidField {
            field: name,
            reason: format!("expected a bool, found {}", other.type_name()),
        }),
    }
}

/// `mappings` as ordered `(variable, path)` pairs
fn mappings(cfg: &Partial) -> Result<Vec<(String, String)>> {
    let tree = match field(cfg, "mappings") {
        None => return Err(StrataError::MissingField("mappings")),
        Some(Value::Tree(tree)) => tree,
        Some(other) => {
            return Err(StrataError::InvalidField {
                field: "mappings",
                reason: format!("expected a partial, found {}", other.type_name()),
            })
        }
    };

    tree.iter()
        .map(|(variable, path)| match path {
            Value::String(path) => Ok((variable.to_string(), path.clone())),
            other => Err(StrataError::InvalidField {
                field: "mappings",
                reason: format!(
                    "destination of '{variable}' must be a string, found {}",
                    other.type_name()
                ),
            }),
        })
        .collect()
}
