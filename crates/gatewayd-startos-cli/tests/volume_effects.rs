// crates/gatewayd-startos-cli/tests/volume_effects.rs
// ============================================================================
// Module: Volume Effects Tests
// Description: Filesystem-backed effects driven through the procedures.
// Purpose: Ensure saved values and declarations land where the platform reads them.
// Dependencies: gatewayd-startos-cli, gatewayd-startos-config, serde_json, tempfile, tokio
// ============================================================================

//! Volume effects tests for gatewayd-startos-cli.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;

use gatewayd_startos_cli::effects::VolumeEffects;
use gatewayd_startos_cli::effects::VolumeError;
use gatewayd_startos_config::ConfigSnapshot;
use gatewayd_startos_config::Effects;
use gatewayd_startos_config::ProcedureError;
use gatewayd_startos_config::build;
use gatewayd_startos_config::get_config;
use gatewayd_startos_config::set_config;
use serde_json::Value;
use serde_json::json;

/// Defaults with a password and the given lightning backend.
fn submitted(lightning: &str) -> ConfigSnapshot {
    let spec = build().unwrap();
    let mut value = ConfigSnapshot::from_defaults(&spec).into_value();
    value["gatewayd-password"] = json!("correct horse battery");
    value["gatewayd-lightning-backend"]["backend-type"] = json!(lightning);
    ConfigSnapshot::new(value)
}

#[tokio::test]
async fn fresh_volume_reads_as_unconfigured() {
    let dir = tempfile::tempdir().unwrap();
    let effects = VolumeEffects::new(dir.path());
    assert_eq!(effects.read_config().await.unwrap(), None);
    let response = get_config(&effects).await.unwrap();
    assert_eq!(response.config, None);
}

#[tokio::test]
async fn set_config_writes_yaml_and_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let effects = VolumeEffects::new(dir.path());
    let values = submitted("lnd");
    set_config(&effects, values.clone()).await.unwrap();

    let yaml = fs::read_to_string(effects.config_path()).unwrap();
    let stored: Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(&stored, values.as_value());

    let declaration: Value =
        serde_json::from_slice(&fs::read(effects.depends_on_path()).unwrap()).unwrap();
    assert_eq!(declaration, json!({"lnd": ["synced"]}));

    let leftovers: Vec<_> = fs::read_dir(effects.platform_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "staged files left behind: {leftovers:?}");
}

#[tokio::test]
async fn saved_values_round_trip_through_get_config() {
    let dir = tempfile::tempdir().unwrap();
    let effects = VolumeEffects::new(dir.path());
    let values = submitted("ldk");
    set_config(&effects, values.clone()).await.unwrap();

    let response = get_config(&effects).await.unwrap();
    assert_eq!(response.config, Some(values));
    let declaration: Value =
        serde_json::from_slice(&fs::read(effects.depends_on_path()).unwrap()).unwrap();
    assert_eq!(declaration, json!({}));
}

#[tokio::test]
async fn switching_backend_replaces_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let effects = VolumeEffects::new(dir.path());
    set_config(&effects, submitted("lnd")).await.unwrap();
    set_config(&effects, submitted("ldk")).await.unwrap();
    let declaration: Value =
        serde_json::from_slice(&fs::read(effects.depends_on_path()).unwrap()).unwrap();
    assert_eq!(declaration, json!({}));
}

#[tokio::test]
async fn malformed_submission_leaves_volume_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let effects = VolumeEffects::new(dir.path());
    let mut value = submitted("lnd").into_value();
    value["gatewayd-lightning-backend"] = json!({});
    let err = set_config(&effects, ConfigSnapshot::new(value)).await.unwrap_err();
    assert!(matches!(err, ProcedureError::MalformedConfiguration(_)));
    assert!(!effects.platform_dir().exists());
}

#[tokio::test]
async fn corrupt_yaml_is_a_platform_error() {
    let dir = tempfile::tempdir().unwrap();
    let effects = VolumeEffects::new(dir.path());
    fs::create_dir_all(effects.platform_dir()).unwrap();
    fs::write(effects.config_path(), "gatewayd-ldk: [unclosed").unwrap();
    match get_config(&effects).await {
        Err(ProcedureError::Platform(VolumeError::Decode { .. })) => {}
        other => panic!("expected decode failure, got {other:?}"),
    }
}

#[tokio::test]
async fn unwritable_volume_surfaces_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("start9");
    fs::write(&blocker, "not a directory").unwrap();
    let effects = VolumeEffects::new(dir.path());
    match set_config(&effects, submitted("ldk")).await {
        Err(ProcedureError::Platform(VolumeError::Io { .. })) => {}
        other => panic!("expected io failure, got {other:?}"),
    }
}

/// Lists staged files left in the platform directory.
fn staged_leftovers(effects: &VolumeEffects) -> Vec<String> {
    fs::read_dir(effects.platform_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

#[tokio::test]
async fn blocked_declaration_keeps_previous_config() {
    let dir = tempfile::tempdir().unwrap();
    let effects = VolumeEffects::new(dir.path());
    set_config(&effects, submitted("ldk")).await.unwrap();
    let config_before = fs::read(effects.config_path()).unwrap();

    fs::remove_file(effects.depends_on_path()).unwrap();
    fs::create_dir_all(effects.depends_on_path().join("occupied")).unwrap();

    match set_config(&effects, submitted("lnd")).await {
        Err(ProcedureError::Platform(VolumeError::Io { .. })) => {}
        other => panic!("expected io failure, got {other:?}"),
    }
    assert_eq!(fs::read(effects.config_path()).unwrap(), config_before);
    assert!(staged_leftovers(&effects).is_empty());
}

#[tokio::test]
async fn failed_config_rename_restores_previous_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let effects = VolumeEffects::new(dir.path());
    set_config(&effects, submitted("ldk")).await.unwrap();
    let declaration_before = fs::read(effects.depends_on_path()).unwrap();

    fs::remove_file(effects.config_path()).unwrap();
    fs::create_dir_all(effects.config_path().join("occupied")).unwrap();

    match set_config(&effects, submitted("lnd")).await {
        Err(ProcedureError::Platform(VolumeError::Io { path, .. })) => {
            assert!(path.ends_with("config.yaml"), "unexpected failing path {path}");
        }
        other => panic!("expected io failure, got {other:?}"),
    }
    assert_eq!(fs::read(effects.depends_on_path()).unwrap(), declaration_before);
    assert!(effects.config_path().is_dir());
    assert!(staged_leftovers(&effects).is_empty());
}

#[tokio::test]
async fn failed_first_commit_removes_new_declaration() {
    let dir = tempfile::tempdir().unwrap();
    let effects = VolumeEffects::new(dir.path());
    fs::create_dir_all(effects.config_path().join("occupied")).unwrap();

    assert!(set_config(&effects, submitted("lnd")).await.is_err());
    assert!(!effects.depends_on_path().exists());
    assert!(staged_leftovers(&effects).is_empty());
}
