//! Unit tests for loading settings documents from disk.

use std::fs;

use tenant_comms_governor::models::catalog::ResponseTrigger;
use tenant_comms_governor::models::settings::ResponseSettings;
use tenant_comms_governor::policy::loader::SettingsLoader;
use tenant_comms_governor::AppError;

#[test]
fn path_uses_feature_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert_eq!(
        SettingsLoader::path_for(dir.path(), "tenant-a"),
        dir.path().join("tenant-a.json")
    );
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = SettingsLoader::load(dir.path(), "tenant-a").expect("defaults");
    assert_eq!(settings, ResponseSettings::default());
}

#[test]
fn partial_document_fills_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("tenant-a.json"),
        r#"{"triggers":["payment_inquiries"],"delayMinutes":45}"#,
    )
    .expect("write");

    let settings = SettingsLoader::load(dir.path(), "tenant-a").expect("load");
    assert!(settings.governs(ResponseTrigger::PaymentInquiries));
    assert!(!settings.governs(ResponseTrigger::AfterHours));
    assert_eq!(settings.delay_minutes, 45);
    assert_eq!(settings.max_attempts, 3);
    assert!(settings.escalation_rules.is_empty());
}

#[test]
fn empty_file_is_a_policy_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("tenant-a.json"), "  \n").expect("write");
    let err = SettingsLoader::load(dir.path(), "tenant-a").expect_err("empty");
    assert!(matches!(err, AppError::Policy(_)));
}

#[test]
fn malformed_file_is_a_policy_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("tenant-a.json"), "{ not json").expect("write");
    let err = SettingsLoader::load(dir.path(), "tenant-a").expect_err("malformed");
    assert!(matches!(err, AppError::Policy(_)));
}

#[test]
fn invalid_settings_are_a_validation_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("tenant-a.json"), r#"{"delayMinutes":-5}"#).expect("write");
    let err = SettingsLoader::load(dir.path(), "tenant-a").expect_err("invalid");
    assert!(matches!(err, AppError::Validation(_)));
}
