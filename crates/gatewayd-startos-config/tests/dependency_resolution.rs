// crates/gatewayd-startos-config/tests/dependency_resolution.rs
// ============================================================================
// Module: Dependency Resolution Tests
// Description: Backend selection to dependency declaration mapping.
// Purpose: Ensure the resolver emits exact entries and fails closed on bad tags.
// Dependencies: gatewayd-startos-config, serde_json
// ============================================================================

//! Dependency resolution tests for gatewayd-startos-config.

use gatewayd_startos_config::ConfigSnapshot;
use gatewayd_startos_config::MalformedReason;
use gatewayd_startos_config::ReadinessCondition;
use gatewayd_startos_config::build;
use gatewayd_startos_config::resolve;
use serde_json::Value;
use serde_json::json;

type TestResult = Result<(), String>;

/// Defaults with the lightning backend switched to `lightning`.
fn snapshot_with_lightning(lightning: &str) -> Result<ConfigSnapshot, String> {
    let spec = build().map_err(|err| err.to_string())?;
    let mut value = ConfigSnapshot::from_defaults(&spec).into_value();
    let backend = value
        .pointer_mut("/gatewayd-lightning-backend")
        .and_then(Value::as_object_mut)
        .ok_or("lightning backend missing from defaults")?;
    backend.insert("backend-type".to_string(), json!(lightning));
    if lightning == "lnd" {
        backend.insert("tls-cert-path".to_string(), json!("/mnt/lnd/tls.cert"));
        backend.insert("macaroon-path".to_string(), json!("/mnt/lnd/admin.macaroon"));
    }
    Ok(ConfigSnapshot::new(value))
}

// ============================================================================
// SECTION: Variant Mapping
// ============================================================================

#[test]
fn lnd_backend_depends_on_synced_lnd() -> TestResult {
    let snapshot = snapshot_with_lightning("lnd")?;
    let declaration = resolve(&snapshot).map_err(|err| err.to_string())?;
    if declaration.len() != 1 {
        return Err(format!("expected one dependency, got {}", declaration.len()));
    }
    let conditions = declaration.conditions("lnd").ok_or("lnd entry missing")?;
    if conditions.iter().collect::<Vec<_>>() != vec![&ReadinessCondition::synced()] {
        return Err(format!("unexpected lnd conditions {conditions:?}"));
    }
    let wire = serde_json::to_value(&declaration).map_err(|err| err.to_string())?;
    if wire != json!({"lnd": ["synced"]}) {
        return Err(format!("unexpected wire declaration {wire}"));
    }
    Ok(())
}

#[test]
fn ldk_backend_has_no_dependencies() -> TestResult {
    let snapshot = snapshot_with_lightning("ldk")?;
    let declaration = resolve(&snapshot).map_err(|err| err.to_string())?;
    if !declaration.is_empty() {
        return Err(format!("expected empty declaration, got {declaration:?}"));
    }
    Ok(())
}

#[test]
fn bitcoin_backend_choice_adds_no_dependencies() -> TestResult {
    let mut value = snapshot_with_lightning("ldk")?.into_value();
    let backend = value
        .pointer_mut("/gatewayd-bitcoin-backend")
        .and_then(Value::as_object_mut)
        .ok_or("bitcoin backend missing")?;
    backend.insert("backend-type".to_string(), json!("esplora"));
    backend.insert("url".to_string(), json!("https://blockstream.info/api"));
    let declaration = resolve(&ConfigSnapshot::new(value)).map_err(|err| err.to_string())?;
    if !declaration.is_empty() {
        return Err("esplora must not add dependencies".to_string());
    }
    Ok(())
}

#[test]
fn resolve_leaves_snapshot_untouched() -> TestResult {
    let snapshot = snapshot_with_lightning("lnd")?;
    let before = snapshot.clone();
    resolve(&snapshot).map_err(|err| err.to_string())?;
    if snapshot != before {
        return Err("resolve mutated its input".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Malformed Input
// ============================================================================

#[test]
fn missing_tag_is_malformed() -> TestResult {
    let mut value = snapshot_with_lightning("lnd")?.into_value();
    value
        .pointer_mut("/gatewayd-lightning-backend")
        .and_then(Value::as_object_mut)
        .ok_or("lightning backend missing")?
        .remove("backend-type");
    match resolve(&ConfigSnapshot::new(value)) {
        Err(err) if err.reason == MalformedReason::MissingTag => {
            if err.path != "gatewayd-lightning-backend.backend-type" {
                return Err(format!("unexpected path {}", err.path));
            }
            Ok(())
        }
        other => Err(format!("expected missing tag, got {other:?}")),
    }
}

#[test]
fn unknown_variant_is_malformed() -> TestResult {
    let snapshot = snapshot_with_lightning("cln")?;
    match resolve(&snapshot) {
        Err(err) if err.reason == MalformedReason::UnknownVariant("cln".to_string()) => Ok(()),
        other => Err(format!("expected unknown variant, got {other:?}")),
    }
}

#[test]
fn non_string_tag_is_malformed() -> TestResult {
    let mut value = snapshot_with_lightning("ldk")?.into_value();
    value
        .pointer_mut("/gatewayd-lightning-backend")
        .and_then(Value::as_object_mut)
        .ok_or("lightning backend missing")?
        .insert("backend-type".to_string(), json!(1));
    match resolve(&ConfigSnapshot::new(value)) {
        Err(err) if err.reason == MalformedReason::TagNotString => Ok(()),
        other => Err(format!("expected non-string tag, got {other:?}")),
    }
}

#[test]
fn missing_union_is_malformed() -> TestResult {
    let mut value = snapshot_with_lightning("ldk")?.into_value();
    value.as_object_mut().ok_or("snapshot is not an object")?.remove("gatewayd-bitcoin-backend");
    match resolve(&ConfigSnapshot::new(value)) {
        Err(err) if err.reason == MalformedReason::MissingUnion => Ok(()),
        other => Err(format!("expected missing union, got {other:?}")),
    }
}

#[test]
fn non_object_snapshot_is_malformed() -> TestResult {
    match resolve(&ConfigSnapshot::new(json!(["lnd"]))) {
        Err(err) if err.reason == MalformedReason::NotAnObject => Ok(()),
        other => Err(format!("expected non-object failure, got {other:?}")),
    }
}
