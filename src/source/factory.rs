//! Source factory
//!
//! Dispatches source creation to an ordered list of [`SourceStrategy`]
//! values, either from typed [`SourceArgs`] or from a declarative source
//! description read out of a configuration tree.

use super::args::{SourceArgs, DIR, ENV, FILE, OBSERVABLE_FILE, OBSERVABLE_REMOTE, REMOTE};
use super::{
    DirSource, EnvSource, FileSource, ObservableFileSource, ObservableRemoteSource, RemoteSource,
    Source,
};
use crate::config::Settings;
use crate::decoder::DecoderFactory;
use crate::domain::{Partial, Result, StrataError, Value};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;

/// Collaborators shared by the built-in strategies
pub struct SourceContext {
    /// Decoders used by file, directory and remote sources
    pub decoders: Arc<DecoderFactory>,
    /// HTTP client used by remote sources
    pub client: Client,
    /// Format defaults and path separator
    pub settings: Settings,
}

impl SourceContext {
    /// Context with the default decoders and an HTTP client honouring
    /// `remote_timeout_secs`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(settings.remote_timeout())
            .build()
            .map_err(|e| StrataError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_parts(
            settings.clone(),
            Arc::new(DecoderFactory::default()),
            client,
        ))
    }

    /// Context from explicit collaborators
    pub fn with_parts(settings: Settings, decoders: Arc<DecoderFactory>, client: Client) -> Self {
        Self {
            decoders,
            client,
            settings,
        }
    }

    fn separator(&self) -> &str {
        &self.settings.path_separator
    }
}

/// Creates sources of the types it accepts
#[async_trait]
pub trait SourceStrategy: Send + Sync {
    /// Whether this strategy creates sources of `source_type`
    fn accept(&self, source_type: &str) -> bool;

    /// Create a source from typed arguments
    async fn create(&self, args: SourceArgs) -> Result<Arc<dyn Source>>;

    /// Whether this strategy handles the source description `cfg`
    fn accept_from_config(&self, cfg: &Partial) -> bool {
        matches!(cfg.entry("type"), Some(Value::String(t)) if self.accept(t))
    }

    /// Create a source from a source description
    async fn create_from_config(&self, cfg: &Partial) -> Result<Arc<dyn Source>>;
}

fn mismatch(expected: &str, args: &SourceArgs) -> StrataError {
    StrataError::InvalidSourceType(format!(
        "{} arguments given to the {expected} strategy",
        args.source_type()
    ))
}

/// Creates [`FileSource`] values
pub struct FileSourceStrategy {
    context: Arc<SourceContext>,
}

impl FileSourceStrategy {
    pub fn new(context: Arc<SourceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SourceStrategy for FileSourceStrategy {
    fn accept(&self, source_type: &str) -> bool {
        source_type == FILE
    }

    async fn create(&self, args: SourceArgs) -> Result<Arc<dyn Source>> {
        match args {
            SourceArgs::File { path, format } => Ok(Arc::new(FileSource::new(
                path,
                &format,
                &self.context.decoders,
                self.context.separator(),
            )?)),
            other => Err(mismatch(FILE, &other)),
        }
    }

    async fn create_from_config(&self, cfg: &Partial) -> Result<Arc<dyn Source>> {
        self.create(SourceArgs::from_config(cfg, &self.context.settings)?)
            .await
    }
}

/// Creates [`ObservableFileSource`] values
pub struct ObservableFileSourceStrategy {
    context: Arc<SourceContext>,
}

impl ObservableFileSourceStrategy {
    pub fn new(context: Arc<SourceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SourceStrategy for ObservableFileSourceStrategy {
    fn accept(&self, source_type: &str) -> bool {
        source_type == OBSERVABLE_FILE
    }

    async fn create(&self, args: SourceArgs) -> Result<Arc<dyn Source>> {
        match args {
            SourceArgs::ObservableFile { path, format } => Ok(Arc::new(ObservableFileSource::new(
                path,
                &format,
                Arc::clone(&self.context.decoders),
                self.context.separator(),
            )?)),
            other => Err(mismatch(OBSERVABLE_FILE, &other)),
        }
    }

    async fn create_from_config(&self, cfg: &Partial) -> Result<Arc<dyn Source>> {
        self.create(SourceArgs::from_config(cfg, &self.context.settings)?)
            .await
    }
}

/// Creates [`DirSource`] values
pub struct DirSourceStrategy {
    context: Arc<SourceContext>,
}

impl DirSourceStrategy {
    pub fn new(context: Arc<SourceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SourceStrategy for DirSourceStrategy {
    fn accept(&self, source_type: &str) -> bool {
        source_type == DIR
    }

    async fn create(&self, args: SourceArgs) -> Result<Arc<dyn Source>> {
        match args {
            SourceArgs::Dir {
                path,
                format,
                recursive,
            } => Ok(Arc::new(DirSource::new(
                path,
                &format,
                recursive,
                &self.context.decoders,
                self.context.separator(),
            )?)),
            other => Err(mismatch(DIR, &other)),
        }
    }

    async fn create_from_config(&self, cfg: &Partial) -> Result<Arc<dyn Source>> {
        self.create(SourceArgs::from_config(cfg, &self.context.settings)?)
            .await
    }
}

/// Creates [`RemoteSource`] values
pub struct RemoteSourceStrategy {
    context: Arc<SourceContext>,
}

impl RemoteSourceStrategy {
    pub fn new(context: Arc<SourceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SourceStrategy for RemoteSourceStrategy {
    fn accept(&self, source_type: &str) -> bool {
        source_type == REMOTE
    }

    async fn create(&self, args: SourceArgs) -> Result<Arc<dyn Source>> {
        match args {
            SourceArgs::Remote {
                uri,
                format,
                config_path,
            } => Ok(Arc::new(
                RemoteSource::new(
                    &self.context.client,
                    &uri,
                    &format,
                    &config_path,
                    &self.context.decoders,
                    self.context.separator(),
                )
                .await?,
            )),
            other => Err(mismatch(REMOTE, &other)),
        }
    }

    async fn create_from_config(&self, cfg: &Partial) -> Result<Arc<dyn Source>> {
        self.create(SourceArgs::from_config(cfg, &self.context.settings)?)
            .await
    }
}

/// Creates [`ObservableRemoteSource`] values
pub struct ObservableRemoteSourceStrategy {
    context: Arc<SourceContext>,
}

impl ObservableRemoteSourceStrategy {
    pub fn new(context: Arc<SourceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SourceStrategy for ObservableRemoteSourceStrategy {
    fn accept(&self, source_type: &str) -> bool {
        source_type == OBSERVABLE_REMOTE
    }

    async fn create(&self, args: SourceArgs) -> Result<Arc<dyn Source>> {
        match args {
            SourceArgs::ObservableRemote {
                uri,
                format,
                config_path,
                timestamp_path,
            } => Ok(Arc::new(
                ObservableRemoteSource::new(
                    self.context.client.clone(),
                    &uri,
                    &format,
                    &config_path,
                    &timestamp_path,
                    Arc::clone(&self.context.decoders),
                    self.context.separator(),
                )
                .await?,
            )),
            other => Err(mismatch(OBSERVABLE_REMOTE, &other)),
        }
    }

    async fn create_from_config(&self, cfg: &Partial) -> Result<Arc<dyn Source>> {
        self.create(SourceArgs::from_config(cfg, &self.context.settings)?)
            .await
    }
}

/// Creates [`EnvSource`] values
pub struct EnvSourceStrategy {
    context: Arc<SourceContext>,
}

impl EnvSourceStrategy {
    pub fn new(context: Arc<SourceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl SourceStrategy for EnvSourceStrategy {
    fn accept(&self, source_type: &str) -> bool {
        source_type == ENV
    }

    async fn create(&self, args: SourceArgs) -> Result<Arc<dyn Source>> {
        match args {
            SourceArgs::Env { mappings } => Ok(Arc::new(EnvSource::new(
                mappings,
                self.context.separator(),
            )?)),
            other => Err(mismatch(ENV, &other)),
        }
    }

    async fn create_from_config(&self, cfg: &Partial) -> Result<Arc<dyn Source>> {
        self.create(SourceArgs::from_config(cfg, &self.context.settings)?)
            .await
    }
}

/// Ordered list of source strategies
///
/// The first strategy accepting the requested type wins, so strategies
/// registered before [`SourceFactory::with_defaults`] ones can shadow them.
pub struct SourceFactory {
    strategies: Vec<Box<dyn SourceStrategy>>,
}

impl SourceFactory {
    /// Factory without any strategy
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Factory holding the six built-in strategies
    pub fn with_defaults(context: Arc<SourceContext>) -> Self {
        let mut factory = Self::new();
        factory.register_defaults(context);
        factory
    }

    /// Factory holding the built-in strategies with a context built from
    /// `settings`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::with_defaults(Arc::new(SourceContext::new(settings)?)))
    }

    /// Append the six built-in strategies
    pub fn register_defaults(&mut self, context: Arc<SourceContext>) {
        self.register(Box::new(FileSourceStrategy::new(Arc::clone(&context))));
        self.register(Box::new(ObservableFileSourceStrategy::new(Arc::clone(
            &context,
        ))));
        self.register(Box::new(DirSourceStrategy::new(Arc::clone(&context))));
        self.register(Box::new(RemoteSourceStrategy::new(Arc::clone(&context))));
        self.register(Box::new(ObservableRemoteSourceStrategy::new(Arc::clone(
            &context,
        ))));
        self.register(Box::new(EnvSourceStrategy::new(context)));
    }

    /// Append a strategy; earlier strategies take precedence
    pub fn register(&mut self, strategy: Box<dyn SourceStrategy>) {
        self.strategies.push(strategy);
    }

    /// Create a source from typed arguments
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidSourceType`] when no strategy accepts
    /// the type, or the construction error of the source.
    pub async fn create(&self, args: SourceArgs) -> Result<Arc<dyn Source>> {
        let source_type = args.source_type();
        let strategy = self
            .strategies
            .iter()
            .find(|s| s.accept(source_type))
            .ok_or_else(|| StrataError::InvalidSourceType(source_type.to_string()))?;

        tracing::debug!(source_type, "Creating source");
        strategy.create(args).await
    }

    /// Create a source from a source description
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::MissingField`] when `type` is absent,
    /// [`StrataError::InvalidSourceType`] when no strategy accepts it, or the
    /// error of the accepting strategy.
    pub async fn create_from_config(&self, cfg: &Partial) -> Result<Arc<dyn Source>> {
        match self.strategies.iter().find(|s| s.accept_from_config(cfg)) {
            Some(strategy) => strategy.create_from_config(cfg).await,
            None => Err(match cfg.entry("type") {
                None | Some(Value::Null) => StrataError::MissingField("type"),
                Some(Value::String(t)) => StrataError::InvalidSourceType(t.clone()),
                Some(other) => StrataError::InvalidField {
                    field: "type",
                    reason: format!("expected a string, found {}", other.type_name()),
                },
            }),
        }
    }
}

impl Default for SourceFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Lookup;
    use crate::source::MemorySource;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn factory() -> SourceFactory {
        SourceFactory::from_settings(&Settings::default()).unwrap()
    }

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn cfg(json: serde_json::Value) -> Partial {
        Partial::from_document(Value::from(json)).unwrap()
    }

    struct FixedStrategy;

    #[async_trait]
    impl SourceStrategy for FixedStrategy {
        fn accept(&self, source_type: &str) -> bool {
            source_type == FILE
        }

        async fn create(&self, _args: SourceArgs) -> Result<Arc<dyn Source>> {
            let mut tree = Partial::new();
            tree.insert("fixed", true);
            Ok(Arc::new(MemorySource::new(tree, ".")))
        }

        async fn create_from_config(&self, _cfg: &Partial) -> Result<Arc<dyn Source>> {
            self.create(SourceArgs::Env { mappings: vec![] }).await
        }
    }

    #[tokio::test]
    async fn test_create_file_source() {
        let file = yaml_file("app:\n  name: demo\n");
        let source = factory()
            .create(SourceArgs::File {
                path: file.path().to_path_buf(),
                format: "yaml".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(source.string("app.name").unwrap(), "demo");
        assert!(source.as_observable().is_none());
    }

    #[tokio::test]
    async fn test_create_observable_from_config() {
        let file = yaml_file("level: warn\n");
        let description = cfg(serde_json::json!({
            "type": "observable-file",
            "path": file.path().to_string_lossy(),
        }));
        let source = factory().create_from_config(&description).await.unwrap();
        assert_eq!(source.string("level").unwrap(), "warn");
        assert!(source.as_observable().is_some());
    }

    #[tokio::test]
    async fn test_create_env_from_config() {
        std::env::set_var("STRATA_FACTORY_TEST_VAR", "42");
        let description = cfg(serde_json::json!({
            "type": "env",
            "mappings": {"STRATA_FACTORY_TEST_VAR": "answer"}
        }));
        let source = factory().create_from_config(&description).await.unwrap();
        assert_eq!(source.int("answer").unwrap(), 42);
        std::env::remove_var("STRATA_FACTORY_TEST_VAR");
    }

    #[tokio::test]
    async fn test_empty_factory_rejects_everything() {
        let result = SourceFactory::new()
            .create(SourceArgs::Env { mappings: vec![] })
            .await;
        assert!(matches!(result, Err(StrataError::InvalidSourceType(ref t)) if t == "env"));
    }

    #[tokio::test]
    async fn test_create_from_config_type_errors() {
        let factory = factory();

        let missing = factory.create_from_config(&Partial::new()).await;
        assert!(matches!(missing, Err(StrataError::MissingField("type"))));

        let unknown = factory
            .create_from_config(&cfg(serde_json::json!({"type": "consul"})))
            .await;
        assert!(matches!(unknown, Err(StrataError::InvalidSourceType(ref t)) if t == "consul"));

        let numeric = factory
            .create_from_config(&cfg(serde_json::json!({"type": 7})))
            .await;
        assert!(matches!(numeric, Err(StrataError::InvalidField { field: "type", .. })));
    }

    #[tokio::test]
    async fn test_strategy_field_errors_surface() {
        let result = factory()
            .create_from_config(&cfg(serde_json::json!({"type": "file"})))
            .await;
        assert!(matches!(result, Err(StrataError::MissingField("path"))));
    }

    #[tokio::test]
    async fn test_earlier_strategy_shadows_default() {
        let mut factory = SourceFactory::new();
        factory.register(Box::new(FixedStrategy));
        factory.register_defaults(Arc::new(SourceContext::new(&Settings::default()).unwrap()));

        let source = factory
            .create(SourceArgs::File {
                path: "/nowhere.yaml".into(),
                format: "yaml".to_string(),
            })
            .await
            .unwrap();
        assert!(source.bool("fixed").unwrap());
    }

    #[tokio::test]
    async fn test_strategy_rejects_foreign_arguments() {
        let context = Arc::new(SourceContext::new(&Settings::default()).unwrap());
        let result = FileSourceStrategy::new(context)
            .create(SourceArgs::Env { mappings: vec![] })
            .await;
        assert!(matches!(result, Err(StrataError::InvalidSourceType(_))));
    }
}
