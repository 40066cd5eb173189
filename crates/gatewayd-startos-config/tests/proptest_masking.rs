// crates/gatewayd-startos-config/tests/proptest_masking.rs
// ============================================================================
// Module: Masking Property-Based Tests
// Description: Property tests for masked value confidentiality.
// Purpose: Ensure passwords never surface in logs, reports, or rendered forms.
// ============================================================================

//! Property-based tests for masked field handling.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use gatewayd_startos_config::ConfigSnapshot;
use gatewayd_startos_config::REDACTED;
use gatewayd_startos_config::build;
use gatewayd_startos_config::resolve;
use gatewayd_startos_config::validate;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

/// Default snapshot carrying `password`.
fn with_password(password: &str) -> ConfigSnapshot {
    let spec = build().unwrap();
    let mut value = ConfigSnapshot::from_defaults(&spec).into_value();
    value["gatewayd-password"] = json!(password);
    ConfigSnapshot::new(value)
}

proptest! {
    #[test]
    fn valid_passwords_never_leak(password in "[a-zA-Z0-9]{16,40}") {
        let spec = build().unwrap();
        let snapshot = with_password(&password);
        prop_assert!(validate(&spec, &snapshot).is_ok());

        let redacted = snapshot.redacted(&spec);
        prop_assert_eq!(redacted["gatewayd-password"].as_str(), Some(REDACTED));
        prop_assert!(!redacted.to_string().contains(&password));
        let snapshot_debug = format!("{snapshot:?}");
        prop_assert!(!snapshot_debug.contains(&password));
        prop_assert!(!serde_json::to_string(&spec).unwrap().contains(&password));
        let resolved_debug = format!("{:?}", resolve(&snapshot));
        prop_assert!(!resolved_debug.contains(&password));
    }

    #[test]
    fn short_passwords_are_reported_without_their_value(password in "[ЀЁЂЃЄЅІЇЈЉ]{1,7}") {
        let spec = build().unwrap();
        let snapshot = with_password(&password);
        let report = validate(&spec, &snapshot).unwrap_err();
        prop_assert_eq!(report.issues.len(), 1);
        prop_assert_eq!(report.issues[0].path.as_str(), "gatewayd-password");
        prop_assert!(!report.to_string().contains(&password));
        let report_debug = format!("{report:?}");
        prop_assert!(!report_debug.contains(&password));
        prop_assert!(!serde_json::to_string(&report).unwrap().contains(&password));
    }

    #[test]
    fn unknown_backend_tags_still_redact(tag in "[a-z]{3,12}", password in "[a-zA-Z0-9]{16,40}") {
        prop_assume!(tag != "ldk" && tag != "lnd");
        let spec = build().unwrap();
        let mut value = with_password(&password).into_value();
        value["gatewayd-lightning-backend"]["backend-type"] = Value::String(tag);
        let redacted = ConfigSnapshot::new(value).redacted(&spec);
        prop_assert!(!redacted.to_string().contains(&password));
    }

    #[test]
    fn substituted_rpc_credentials_never_leak(rpc_password in "[a-zA-Z0-9]{16,40}") {
        let spec = build().unwrap();
        let mut value = with_password("correct horse battery").into_value();
        value["gatewayd-bitcoin-backend"]["user"] = json!("bitcoin");
        value["gatewayd-bitcoin-backend"]["password"] = json!(rpc_password.clone());
        let snapshot = ConfigSnapshot::new(value);
        prop_assert!(validate(&spec, &snapshot).is_ok());

        let redacted = snapshot.redacted(&spec);
        prop_assert_eq!(redacted["gatewayd-bitcoin-backend"]["password"].as_str(), Some(REDACTED));
        prop_assert_eq!(redacted["gatewayd-bitcoin-backend"]["user"].as_str(), Some(REDACTED));
        prop_assert!(!redacted.to_string().contains(&rpc_password));
    }
}

#[test]
fn address_pointers_stay_visible_after_redaction() {
    let spec = build().unwrap();
    let mut value = with_password("correct horse battery").into_value();
    value["gatewayd-lightning-backend"]["backend-type"] = json!("lnd");
    value["gatewayd-lightning-backend"]["rpc-address"] = json!("lnd.embassy:10009");
    let redacted = ConfigSnapshot::new(value).redacted(&spec);
    assert_eq!(redacted["gatewayd-lightning-backend"]["rpc-address"], json!("lnd.embassy:10009"));
    assert_eq!(redacted["gatewayd-bitcoin-backend"]["password"], Value::Null);
}

#[test]
fn unset_password_stays_null_after_redaction() {
    let spec = build().unwrap();
    let snapshot = ConfigSnapshot::from_defaults(&spec);
    let redacted = snapshot.redacted(&spec);
    assert_eq!(redacted["gatewayd-password"], Value::Null);
}
