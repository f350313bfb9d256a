//! CLI command implementations

pub mod dump;
pub mod get;
pub mod sources;
pub mod watch;

use crate::config::Settings;
use crate::domain::Result;
use crate::manager::{Loader, Manager};
use crate::source::SourceFactory;
use clap::ValueEnum;
use serde::Serialize;
use std::sync::Arc;

/// Rendering of printed values
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Render `value` in this format
    pub fn render<T: Serialize>(self, value: &T) -> anyhow::Result<String> {
        Ok(match self {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
        })
    }
}

/// Build a manager from `settings` and run the bootstrap loader
///
/// # Errors
///
/// Returns an error if the manager cannot be created or the bootstrap
/// configuration fails to load.
pub async fn open(settings: &Settings) -> Result<Arc<Loader>> {
    let manager = Arc::new(Manager::new(settings)?);
    let factory = Arc::new(SourceFactory::from_settings(settings)?);
    let loader = Arc::new(Loader::new(manager, factory, settings.loader.clone()));

    if settings.loader.active {
        loader.load().await?;
    }
    Ok(loader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Partial, Value};

    #[test]
    fn test_render_formats() {
        let mut tree = Partial::new();
        tree.insert("port", 8080);

        let json = OutputFormat::Json.render(&tree).unwrap();
        assert!(json.contains("\"port\": 8080"));

        let yaml = OutputFormat::Yaml.render(&tree).unwrap();
        assert_eq!(yaml.trim(), "port: 8080");

        assert_eq!(OutputFormat::Json.render(&Value::from("x")).unwrap(), "\"x\"");
    }

    #[tokio::test]
    async fn test_open_with_inactive_loader() {
        let mut settings = Settings::default();
        settings.loader.active = false;

        let loader = open(&settings).await.unwrap();
        assert!(loader.manager().source_ids().is_empty());
    }
}
