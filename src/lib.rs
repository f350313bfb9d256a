// Strata - Layered configuration runtime
// Copyright (c) 2025 Strata Contributors
// Licensed under the MIT License

//! # Strata - layered configuration
//!
//! Strata assembles one configuration tree out of several prioritized
//! sources (files, directories, HTTP endpoints, environment variables) and
//! keeps it current: observable sources are polled, the tree is rebuilt when
//! one of them changed, and observers registered on a path hear about the
//! new value.
//!
//! ## Architecture
//!
//! - [`domain`] - Tree values, path lookup and errors
//! - [`decoder`] - JSON, YAML and TOML decoders behind a strategy factory
//! - [`source`] - Source types and the source factory
//! - [`manager`] - Merging, observers, periodic reload and the bootstrap loader
//! - [`config`] - Settings for all of the above
//! - [`logging`] - Structured logging
//! - [`cli`] - The `strata` command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strata::config::Settings;
//! use strata::domain::Lookup;
//! use strata::manager::{Loader, Manager};
//! use strata::source::{SourceArgs, SourceFactory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let manager = Arc::new(Manager::new(&settings)?);
//!     let factory = Arc::new(SourceFactory::from_settings(&settings)?);
//!
//!     // Base file at the lowest priority, environment overrides on top
//!     manager.add_source(
//!         "base",
//!         0,
//!         factory
//!             .create(SourceArgs::File {
//!                 path: "config/base.yaml".into(),
//!                 format: "yaml".to_string(),
//!             })
//!             .await?,
//!     )?;
//!     manager.add_source(
//!         "env",
//!         10,
//!         factory
//!             .create(SourceArgs::Env {
//!                 mappings: vec![("APP_PORT".to_string(), "server.port".to_string())],
//!             })
//!             .await?,
//!     )?;
//!
//!     println!("port = {}", manager.int_or("server.port", 8080)?);
//!
//!     // Or let the loader register everything listed under `configs`
//!     let loader = Arc::new(Loader::new(manager.clone(), factory, settings.loader.clone()));
//!     loader.load().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`], whose error is
//! [`domain::StrataError`].

pub mod cli;
pub mod config;
pub mod decoder;
pub mod domain;
pub mod logging;
pub mod manager;
pub mod source;
