//! Unit tests for template selection and the rejected-template policy.

use chrono::{Duration, TimeZone, Utc};

use tenant_comms_governor::governance::selection::{
    RejectedTemplatePolicy, TemplateSelection, TemplateSelector,
};
use tenant_comms_governor::models::catalog::ResponseTrigger;
use tenant_comms_governor::models::settings::ResponseSettings;
use tenant_comms_governor::models::template::{CommunicationTemplate, TemplateStatus};

fn template(
    id: &str,
    trigger: ResponseTrigger,
    status: TemplateStatus,
    confidence: f64,
    age_minutes: i64,
) -> CommunicationTemplate {
    let mut t = CommunicationTemplate::draft("title", "content", "general", trigger, confidence)
        .expect("draft");
    t.id = id.to_owned();
    t.status = status;
    t.created_at = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap() - Duration::minutes(age_minutes);
    t
}

fn selected_id(selection: &TemplateSelection) -> Option<&str> {
    match selection {
        TemplateSelection::Use(t) => Some(t.id.as_str()),
        _ => None,
    }
}

#[test]
fn highest_confidence_approved_template_wins() {
    let templates = [
        template("a", ResponseTrigger::AfterHours, TemplateStatus::Approved, 0.6, 10),
        template("b", ResponseTrigger::AfterHours, TemplateStatus::Approved, 0.9, 5),
        template("c", ResponseTrigger::AfterHours, TemplateStatus::Pending, 0.99, 1),
    ];
    let selection = TemplateSelector::default().select(
        ResponseTrigger::AfterHours,
        &ResponseSettings::default(),
        &templates,
    );
    assert_eq!(selected_id(&selection), Some("b"));
}

#[test]
fn confidence_tie_goes_to_oldest() {
    let templates = [
        template("young", ResponseTrigger::AfterHours, TemplateStatus::Approved, 0.8, 1),
        template("old", ResponseTrigger::AfterHours, TemplateStatus::Approved, 0.8, 60),
    ];
    let selection = TemplateSelector::default().select(
        ResponseTrigger::AfterHours,
        &ResponseSettings::default(),
        &templates,
    );
    assert_eq!(selected_id(&selection), Some("old"));
}

#[test]
fn ungoverned_trigger_yields_no_response() {
    let templates = [template(
        "p",
        ResponseTrigger::PaymentInquiries,
        TemplateStatus::Approved,
        0.9,
        1,
    )];
    let selection = TemplateSelector::default().select(
        ResponseTrigger::PaymentInquiries,
        &ResponseSettings::default(),
        &templates,
    );
    assert_eq!(selection, TemplateSelection::NoResponse);
}

#[test]
fn other_trigger_templates_are_ignored() {
    let templates = [template(
        "q",
        ResponseTrigger::CommonQuestions,
        TemplateStatus::Approved,
        0.9,
        1,
    )];
    let selection = TemplateSelector::default().select(
        ResponseTrigger::AfterHours,
        &ResponseSettings::default(),
        &templates,
    );
    assert_eq!(selection, TemplateSelection::NoResponse);
}

#[test]
fn rejected_latest_defaults_to_no_response() {
    let templates = [template("r", ResponseTrigger::AfterHours, TemplateStatus::Rejected, 0.9, 1)];
    let selection = TemplateSelector::default().select(
        ResponseTrigger::AfterHours,
        &ResponseSettings::default(),
        &templates,
    );
    assert_eq!(selection, TemplateSelection::NoResponse);
}

#[test]
fn rejected_latest_can_escalate() {
    let templates = [template("r", ResponseTrigger::AfterHours, TemplateStatus::Rejected, 0.9, 1)];
    let selector = TemplateSelector::new(RejectedTemplatePolicy::Escalate, None);
    let selection = selector.select(ResponseTrigger::AfterHours, &ResponseSettings::default(), &templates);
    assert_eq!(selection, TemplateSelection::Escalate);
}

#[test]
fn rejected_latest_uses_approved_fallback() {
    let templates = [
        template("r", ResponseTrigger::AfterHours, TemplateStatus::Rejected, 0.9, 1),
        template("fb", ResponseTrigger::CommonQuestions, TemplateStatus::Approved, 0.5, 100),
    ];
    let selector = TemplateSelector::new(RejectedTemplatePolicy::FallbackTemplate, Some("fb".into()));
    let selection = selector.select(ResponseTrigger::AfterHours, &ResponseSettings::default(), &templates);
    assert_eq!(selected_id(&selection), Some("fb"));
}

#[test]
fn unapproved_fallback_is_never_used() {
    let templates = [
        template("r", ResponseTrigger::AfterHours, TemplateStatus::Rejected, 0.9, 1),
        template("fb", ResponseTrigger::CommonQuestions, TemplateStatus::Pending, 0.5, 100),
    ];
    let selector = TemplateSelector::new(RejectedTemplatePolicy::FallbackTemplate, Some("fb".into()));
    let selection = selector.select(ResponseTrigger::AfterHours, &ResponseSettings::default(), &templates);
    assert_eq!(selection, TemplateSelection::NoResponse);
}

#[test]
fn policy_only_applies_when_latest_is_rejected() {
    let templates = [
        template("old-rejected", ResponseTrigger::AfterHours, TemplateStatus::Rejected, 0.9, 60),
        template("new-pending", ResponseTrigger::AfterHours, TemplateStatus::Pending, 0.9, 1),
    ];
    let selector = TemplateSelector::new(RejectedTemplatePolicy::Escalate, None);
    let selection = selector.select(ResponseTrigger::AfterHours, &ResponseSettings::default(), &templates);
    assert_eq!(selection, TemplateSelection::NoResponse);
}

#[test]
fn fallback_id_is_exposed_only_for_fallback_policy() {
    let fallback = TemplateSelector::new(
        RejectedTemplatePolicy::FallbackTemplate,
        Some("tpl-generic".into()),
    );
    assert_eq!(fallback.fallback_template_id(), Some("tpl-generic"));

    let escalate = TemplateSelector::new(RejectedTemplatePolicy::Escalate, Some("tpl-generic".into()));
    assert_eq!(escalate.fallback_template_id(), None);
}
