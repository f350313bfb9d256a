//! Remote HTTP sources
//!
//! A remote source fetches a document with a GET request, decodes it and keeps
//! only the sub-tree found at its configured path. The observable variant
//! also reads an RFC 3339 timestamp from the response and never accepts a
//! response older than the last one it stored, so out-of-order responses can
//! not roll the configuration back.

use super::{impl_source_lookup, ObservableSource, Source, SourceBase};
use crate::decoder::DecoderFactory;
use crate::domain::{Partial, Result, StrataError, Value};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::Client;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// GET `uri` and decode the body with `format`
async fn fetch(
    client: &Client,
    uri: &str,
    format: &str,
    decoders: &DecoderFactory,
) -> Result<Partial> {
    let response = client.get(uri).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(StrataError::Http(format!("GET {uri} returned {status}")));
    }

    let body = response.bytes().await?;
    decoders.decode(format, Box::new(Cursor::new(body.to_vec())))
}

/// Sub-tree of `body` at `config_path`
fn extract(body: &Partial, config_path: &str, separator: &str) -> Result<Partial> {
    match body.value_at(config_path, separator) {
        Some(Value::Tree(tree)) => Ok(tree),
        Some(_) => Err(StrataError::Conversion {
            path: config_path.to_string(),
            expected: "partial",
        }),
        None => Err(StrataError::RemotePathNotFound(config_path.to_string())),
    }
}

/// RFC 3339 timestamp of `body` at `timestamp_path`
fn timestamp(body: &Partial, timestamp_path: &str, separator: &str) -> Result<DateTime<Utc>> {
    let raw = body
        .value_at(timestamp_path, separator)
        .ok_or_else(|| StrataError::RemotePathNotFound(timestamp_path.to_string()))?;
    let text = raw.to_string_value().ok_or_else(|| StrataError::Conversion {
        path: timestamp_path.to_string(),
        expected: "string",
    })?;

    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StrataError::Timestamp {
            path: timestamp_path.to_string(),
            reason: e.to_string(),
        })
}

/// Source fetched once from an HTTP endpoint
pub struct RemoteSource {
    base: SourceBase,
    uri: String,
}

impl RemoteSource {
    /// Fetch `uri` and keep the sub-tree at `config_path`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns a non-success status,
    /// the body does not decode, or `config_path` does not resolve to a tree.
    pub async fn new(
        client: &Client,
        uri: &str,
        format: &str,
        config_path: &str,
        decoders: &DecoderFactory,
        separator: &str,
    ) -> Result<Self> {
        let body = fetch(client, uri, format, decoders).await?;
        let partial = extract(&body, config_path, separator)?;

        tracing::debug!(uri, format, config_path, "Remote source loaded");

        Ok(Self {
            base: SourceBase::new(partial, separator),
            uri: uri.to_string(),
        })
    }

    /// Endpoint the source was fetched from
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl_source_lookup!(RemoteSource);

impl Source for RemoteSource {
    fn snapshot(&self) -> Partial {
        self.base.snapshot()
    }
}

/// Remote source re-fetched on every poll, guarded by a response timestamp
pub struct ObservableRemoteSource {
    base: SourceBase,
    client: Client,
    uri: String,
    format: String,
    config_path: String,
    timestamp_path: String,
    decoders: Arc<DecoderFactory>,
    timestamp: Mutex<DateTime<Utc>>,
    closed: AtomicBool,
}

impl ObservableRemoteSource {
    /// Fetch `uri`, keep the sub-tree at `config_path` and remember the
    /// timestamp found at `timestamp_path`
    ///
    /// # Errors
    ///
    /// Same as [`RemoteSource::new`], plus a missing or malformed timestamp.
    pub async fn new(
        client: Client,
        uri: &str,
        format: &str,
        config_path: &str,
        timestamp_path: &str,
        decoders: Arc<DecoderFactory>,
        separator: &str,
    ) -> Result<Self> {
        let body = fetch(&client, uri, format, &decoders).await?;
        let stamp = timestamp(&body, timestamp_path, separator)?;
        let partial = extract(&body, config_path, separator)?;

        tracing::debug!(uri, format, config_path, timestamp = %stamp, "Observable remote source loaded");

        Ok(Self {
            base: SourceBase::new(partial, separator),
            client,
            uri: uri.to_string(),
            format: format.to_string(),
            config_path: config_path.to_string(),
            timestamp_path: timestamp_path.to_string(),
            decoders,
            timestamp: Mutex::new(stamp),
            closed: AtomicBool::new(false),
        })
    }

    /// Endpoint the source is fetched from
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Timestamp of the last accepted response
    pub fn timestamp(&self) -> DateTime<Utc> {
        *self.timestamp.lock()
    }

    /// Store `partial` if `stamp` is strictly after the stored clock (or the
    /// clock is still the epoch sentinel)
    ///
    /// The clock guard is held across the tree swap: the stored clock and
    /// tree always come from the same response.
    fn accept(&self, stamp: DateTime<Utc>, partial: Partial) -> bool {
        let mut current = self.timestamp.lock();
        if *current != DateTime::<Utc>::UNIX_EPOCH && stamp <= *current {
            tracing::debug!(
                uri = %self.uri,
                received = %stamp,
                stored = %*current,
                "Ignoring stale remote response"
            );
            return false;
        }
        *current = stamp;
        self.base.replace(partial)
    }
}

impl_source_lookup!(ObservableRemoteSource);

impl Source for ObservableRemoteSource {
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
impl ObservableSource for ObservableRemoteSource {
    async fn reload(&self) -> Result<bool> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let separator = self.base.separator();
        let body = fetch(&self.client, &self.uri, &self.format, &self.decoders).await?;
        let stamp = timestamp(&body, &self.timestamp_path, separator)?;
        let partial = extract(&body, &self.config_path, separator)?;

        let changed = self.accept(stamp, partial);
        if changed {
            tracing::info!(uri = %self.uri, timestamp = %stamp, "Remote source content changed");
        }
        Ok(changed)
    }
}
