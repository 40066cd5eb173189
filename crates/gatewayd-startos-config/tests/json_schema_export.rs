// crates/gatewayd-startos-config/tests/json_schema_export.rs
// ============================================================================
// Module: JSON Schema Export Tests
// Description: Draft 2020-12 export compiled and applied with jsonschema.
// Purpose: Keep the exported schema in agreement with the built-in validator.
// Dependencies: gatewayd-startos-config, jsonschema, serde_json
// ============================================================================

//! JSON Schema export tests for gatewayd-startos-config.

use gatewayd_startos_config::ConfigSnapshot;
use gatewayd_startos_config::build;
use gatewayd_startos_config::json_schema;
use gatewayd_startos_config::validate;
use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use serde_json::json;

type TestResult = Result<(), String>;

/// Compiles the exported gateway schema.
fn compiled() -> Result<Validator, String> {
    let spec = build().map_err(|err| err.to_string())?;
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&json_schema(&spec))
        .map_err(|err| format!("invalid schema: {err}"))
}

/// Defaults plus a valid password.
fn valid_instance() -> Result<Value, String> {
    let spec = build().map_err(|err| err.to_string())?;
    let mut value = ConfigSnapshot::from_defaults(&spec).into_value();
    value
        .as_object_mut()
        .ok_or("defaults are not an object")?
        .insert("gatewayd-password".to_string(), json!("correct horse battery"));
    Ok(value)
}

#[test]
fn exported_schema_declares_draft_and_title() -> TestResult {
    let spec = build().map_err(|err| err.to_string())?;
    let schema = json_schema(&spec);
    if schema.get("$schema").and_then(Value::as_str)
        != Some("https://json-schema.org/draft/2020-12/schema")
    {
        return Err("missing draft 2020-12 marker".to_string());
    }
    let required = schema.get("required").and_then(Value::as_array).ok_or("no required list")?;
    if !required.contains(&json!("gatewayd-password")) {
        return Err("password must be required".to_string());
    }
    let password = schema.pointer("/properties/gatewayd-password").ok_or("no password schema")?;
    if password.get("writeOnly") != Some(&Value::Bool(true)) || password.get("default").is_some() {
        return Err("masked password must be writeOnly without default".to_string());
    }
    Ok(())
}

#[test]
fn defaults_with_password_validate() -> TestResult {
    let validator = compiled()?;
    let instance = valid_instance()?;
    if let Err(err) = validator.validate(&instance) {
        return Err(format!("defaults rejected: {err}"));
    }
    let spec = build().map_err(|err| err.to_string())?;
    validate(&spec, &ConfigSnapshot::new(instance)).map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn lnd_selection_validates() -> TestResult {
    let validator = compiled()?;
    let mut instance = valid_instance()?;
    instance["gatewayd-lightning-backend"] = json!({
        "backend-type": "lnd",
        "tls-cert-path": "/mnt/lnd/tls.cert",
        "macaroon-path": "/mnt/lnd/admin.macaroon",
    });
    if !validator.is_valid(&instance) {
        return Err("lnd selection rejected".to_string());
    }
    Ok(())
}

#[test]
fn missing_tag_fails_both_validators() -> TestResult {
    let validator = compiled()?;
    let mut instance = valid_instance()?;
    instance["gatewayd-lightning-backend"] = json!({});
    if validator.is_valid(&instance) {
        return Err("schema accepted a union without its tag".to_string());
    }
    let spec = build().map_err(|err| err.to_string())?;
    if validate(&spec, &ConfigSnapshot::new(instance)).is_ok() {
        return Err("validator accepted a union without its tag".to_string());
    }
    Ok(())
}

#[test]
fn short_password_and_relative_path_fail() -> TestResult {
    let validator = compiled()?;
    let mut short = valid_instance()?;
    short["gatewayd-password"] = json!("short");
    if validator.is_valid(&short) {
        return Err("schema accepted a short password".to_string());
    }
    let mut relative = valid_instance()?;
    relative["gatewayd-lightning-backend"] = json!({
        "backend-type": "lnd",
        "tls-cert-path": "tls.cert",
        "macaroon-path": "/mnt/lnd/admin.macaroon",
    });
    if validator.is_valid(&relative) {
        return Err("schema accepted a relative certificate path".to_string());
    }
    Ok(())
}
