//! Unit tests for the tone/style preference, its store and the rule catalog.

use std::fs;

use tenant_comms_governor::models::catalog::{
    CommunicationStyle, CommunicationTone, RuleCatalog, ToneStyle, ToneStylePatch,
};
use tenant_comms_governor::policy::tone_style::ToneStyleStore;
use tenant_comms_governor::AppError;

#[test]
fn patch_keeps_absent_fields() {
    let base = ToneStyle {
        custom_instructions: Some("Mention the portal.".into()),
        ..ToneStyle::default()
    };
    let patch = ToneStylePatch {
        style: Some(CommunicationStyle::Empathetic),
        ..ToneStylePatch::default()
    };

    let next = base.apply(&patch);
    assert_eq!(next.tone, CommunicationTone::Friendly);
    assert_eq!(next.style, CommunicationStyle::Empathetic);
    assert_eq!(next.custom_instructions.as_deref(), Some("Mention the portal."));
    assert_eq!(base.style, CommunicationStyle::Detailed);
}

#[test]
fn blank_instructions_clear_them() {
    let base = ToneStyle {
        custom_instructions: Some("Mention the portal.".into()),
        ..ToneStyle::default()
    };
    let patch = ToneStylePatch {
        custom_instructions: Some("   ".into()),
        ..ToneStylePatch::default()
    };
    assert_eq!(base.apply(&patch).custom_instructions, None);
}

#[test]
fn catalog_follows_catalog_order() {
    let catalog = RuleCatalog::build();
    let tones: Vec<&str> = catalog.tones.iter().map(|e| e.value).collect();
    assert_eq!(tones, ["formal", "friendly", "casual"]);
    assert!(catalog
        .conditions
        .iter()
        .all(|e| !e.label.is_empty() && !e.description.is_empty()));
}

#[tokio::test]
async fn missing_document_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = ToneStyleStore::new(dir.path(), "tenant-messages");
    assert_eq!(store.get().await.unwrap(), ToneStyle::default());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn update_persists_for_the_next_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = ToneStyleStore::new(dir.path(), "tenant-messages");
    let patch = ToneStylePatch {
        tone: Some(CommunicationTone::Casual),
        ..ToneStylePatch::default()
    };
    let stored = store.update(&patch).await.unwrap();
    assert_eq!(stored.tone, CommunicationTone::Casual);
    assert!(store.path().starts_with(dir.path().join("tone-style")));

    let reopened = ToneStyleStore::new(dir.path(), "tenant-messages");
    assert_eq!(reopened.get().await.unwrap(), stored);
}

#[tokio::test]
async fn malformed_document_is_a_policy_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = ToneStyleStore::new(dir.path(), "tenant-messages");
    fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    fs::write(store.path(), "{ tone: ").unwrap();

    let err = store.get().await.expect_err("malformed");
    assert!(matches!(err, AppError::Policy(_)));
}
