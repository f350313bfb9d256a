//! End-to-end tests: sources built by the factory, merged by the manager

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strata::config::{LoaderSettings, Settings};
use strata::domain::{Lookup, Value};
use strata::manager::{Loader, Manager, LOADER_SOURCE_ID};
use strata::source::{SourceArgs, SourceFactory};
use tempfile::TempDir;

fn setup() -> (Manager, SourceFactory) {
    let settings = Settings::default();
    (
        Manager::new(&settings).unwrap(),
        SourceFactory::from_settings(&settings).unwrap(),
    )
}

#[tokio::test]
async fn test_three_sources_merge_by_priority() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("base.yaml");
    fs::write(
        &base,
        "server:\n  host: localhost\n  port: 80\nfeatures:\n  - a\n",
    )
    .unwrap();

    let conf_d = dir.path().join("conf.d");
    fs::create_dir(&conf_d).unwrap();
    fs::write(conf_d.join("10-port.yaml"), "server:\n  port: 8080\n").unwrap();
    fs::write(conf_d.join("20-tls.yaml"), "server:\n  tls: true\n").unwrap();

    std::env::set_var("STRATA_IT_SERVER_HOST", "0.0.0.0");

    let (manager, factory) = setup();

    // Registered out of priority order on purpose
    manager
        .add_source(
            "env",
            20,
            factory
                .create(SourceArgs::Env {
                    mappings: vec![("STRATA_IT_SERVER_HOST".to_string(), "server.host".to_string())],
                })
                .await
                .unwrap(),
        )
        .unwrap();
    manager
        .add_source(
            "base",
            0,
            factory
                .create(SourceArgs::File {
                    path: base.clone(),
                    format: "yaml".to_string(),
                })
                .await
                .unwrap(),
        )
        .unwrap();
    manager
        .add_source(
            "conf.d",
            10,
            factory
                .create(SourceArgs::Dir {
                    path: conf_d.clone(),
                    format: "yaml".to_string(),
                    recursive: false,
                })
                .await
                .unwrap(),
        )
        .unwrap();

    assert_eq!(manager.source_ids(), vec!["base", "conf.d", "env"]);
    assert_eq!(manager.string("server.host").unwrap(), "0.0.0.0");
    assert_eq!(manager.int("server.port").unwrap(), 8080);
    assert!(manager.bool("server.tls").unwrap());
    assert_eq!(manager.list("features").unwrap(), vec![Value::from("a")]);
    assert_eq!(manager.int_or("server.workers", 4).unwrap(), 4);

    std::env::remove_var("STRATA_IT_SERVER_HOST");
}

#[tokio::test]
async fn test_observable_file_drives_observer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("live.json");
    fs::write(&path, r#"{"log": {"level": "info"}, "other": 1}"#).unwrap();

    let (manager, factory) = setup();
    manager
        .add_source(
            "live",
            0,
            factory
                .create(SourceArgs::ObservableFile {
                    path: path.clone(),
                    format: "json".to_string(),
                })
                .await
                .unwrap(),
        )
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    manager
        .add_observer("log.level", move |old, new| {
            assert_eq!(old, &Value::from("info"));
            assert_eq!(new, &Value::from("debug"));
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    // Nothing changed on disk
    assert!(!manager.reload().await);

    // Only an unrelated key changed
    fs::write(&path, r#"{"log": {"level": "info"}, "other": 2}"#).unwrap();
    assert!(manager.reload().await);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    fs::write(&path, r#"{"log": {"level": "debug"}, "other": 2}"#).unwrap();
    assert!(manager.reload().await);
    assert!(!manager.reload().await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(manager.string("log.level").unwrap(), "debug");
}

#[tokio::test]
async fn test_remote_timestamp_never_regresses() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", "/config")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"meta": {"at": "2024-01-02T00:00:00Z"}, "data": {"v": 2}}"#)
        .create_async()
        .await;

    let (manager, factory) = setup();
    let description = strata::domain::Partial::from_document(Value::from(serde_json::json!({
        "type": "observable-remote",
        "uri": format!("{}/config", server.url()),
        "configPath": "data",
        "timestampPath": "meta.at",
    })))
    .unwrap();
    manager
        .add_source("remote", 0, factory.create_from_config(&description).await.unwrap())
        .unwrap();
    assert_eq!(manager.int("v").unwrap(), 2);
    first.remove_async().await;

    // An older response is ignored
    let stale = server
        .mock("GET", "/config")
        .with_status(200)
        .with_body(r#"{"meta": {"at": "2024-01-01T00:00:00Z"}, "data": {"v": 1}}"#)
        .create_async()
        .await;
    assert!(!manager.reload().await);
    assert_eq!(manager.int("v").unwrap(), 2);
    stale.remove_async().await;

    // A newer one is accepted
    let _fresh = server
        .mock("GET", "/config")
        .with_status(200)
        .with_body(r#"{"meta": {"at": "2024-01-03T00:00:00Z"}, "data": {"v": 3}}"#)
        .create_async()
        .await;
    assert!(manager.reload().await);
    assert_eq!(manager.int("v").unwrap(), 3);
}

#[tokio::test]
async fn test_remote_failure_keeps_last_tree() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", "/config")
        .with_status(200)
        .with_body(r#"{"at": "2024-01-02T00:00:00Z", "v": 1}"#)
        .create_async()
        .await;

    let (manager, factory) = setup();
    let source = factory
        .create(SourceArgs::ObservableRemote {
            uri: format!("{}/config", server.url()),
            format: "json".to_string(),
            config_path: String::new(),
            timestamp_path: "at".to_string(),
        })
        .await
        .unwrap();
    manager.add_source("remote", 0, source).unwrap();
    ok.remove_async().await;

    let _down = server
        .mock("GET", "/config")
        .with_status(500)
        .create_async()
        .await;
    assert!(!manager.reload().await);
    assert_eq!(manager.int("v").unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_id_keeps_first_source() {
    let (manager, factory) = setup();
    std::env::set_var("STRATA_IT_DUPLICATE", "first");
    let first = factory
        .create(SourceArgs::Env {
            mappings: vec![("STRATA_IT_DUPLICATE".to_string(), "who".to_string())],
        })
        .await
        .unwrap();
    std::env::set_var("STRATA_IT_DUPLICATE", "second");
    let second = factory
        .create(SourceArgs::Env {
            mappings: vec![("STRATA_IT_DUPLICATE".to_string(), "who".to_string())],
        })
        .await
        .unwrap();

    manager.add_source("dup", 0, first).unwrap();
    assert!(manager.add_source("dup", 10, second).is_err());
    assert_eq!(manager.source_ids(), vec!["dup"]);
    assert_eq!(manager.string("who").unwrap(), "first");
    std::env::remove_var("STRATA_IT_DUPLICATE");
}

#[tokio::test]
async fn test_loader_bootstraps_remote_and_file_sources() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/settings")
        .with_status(200)
        .with_body("service:\n  replicas: 3\n")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let defaults = dir.path().join("defaults.yaml");
    fs::write(&defaults, "service:\n  replicas: 1\n  name: api\n").unwrap();

    let bootstrap = dir.path().join("bootstrap.yaml");
    fs::write(
        &bootstrap,
        format!(
            "configs:\n  - type: file\n    path: {}\n  - id: remote\n    type: remote\n    format: yaml\n    uri: {}/settings\n",
            defaults.display(),
            server.url()
        ),
    )
    .unwrap();

    let settings = Settings {
        loader: LoaderSettings {
            source_path: bootstrap.to_string_lossy().to_string(),
            ..LoaderSettings::default()
        },
        ..Settings::default()
    };
    let manager = Arc::new(Manager::new(&settings).unwrap());
    let factory = Arc::new(SourceFactory::from_settings(&settings).unwrap());
    let loader = Loader::new(Arc::clone(&manager), factory, settings.loader.clone());
    loader.load().await.unwrap();

    assert_eq!(
        manager.source_ids(),
        vec![LOADER_SOURCE_ID, "configs[0]", "remote"]
    );
    assert_eq!(manager.int("service.replicas").unwrap(), 3);
    assert_eq!(manager.string("service.name").unwrap(), "api");

    manager.close().unwrap();
}
