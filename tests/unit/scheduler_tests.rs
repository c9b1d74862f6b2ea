//! Unit tests for `ResponseScheduler`.

use std::collections::BTreeSet;

use tenant_comms_governor::models::catalog::ResponseTrigger;
use tenant_comms_governor::models::conversation::{ConversationState, InboundEvent};
use tenant_comms_governor::models::settings::ResponseSettings;
use tenant_comms_governor::scheduler::{ResponseScheduler, ScheduleDecision};

fn event(trigger: ResponseTrigger) -> InboundEvent {
    InboundEvent {
        conversation_id: "conv-1".into(),
        trigger,
        message: None,
    }
}

fn open_state(attempts_so_far: i64) -> ConversationState {
    ConversationState {
        attempts_so_far,
        is_business_hours: true,
    }
}

#[test]
fn ungoverned_trigger_is_skipped() {
    let settings = ResponseSettings::default();
    let decision = ResponseScheduler::schedule(
        &event(ResponseTrigger::PaymentInquiries),
        &settings,
        &open_state(0),
    );
    assert_eq!(decision, ScheduleDecision::Skip);
}

#[test]
fn closed_office_defers_when_business_hours_only() {
    let settings = ResponseSettings {
        business_hours_only: true,
        ..ResponseSettings::default()
    };
    let state = ConversationState {
        attempts_so_far: 0,
        is_business_hours: false,
    };
    let decision = ResponseScheduler::schedule(&event(ResponseTrigger::AfterHours), &settings, &state);
    assert_eq!(decision, ScheduleDecision::DeferToNextBusinessWindow);
}

#[test]
fn closed_office_ignored_without_business_hours_flag() {
    let settings = ResponseSettings::default();
    let state = ConversationState {
        attempts_so_far: 0,
        is_business_hours: false,
    };
    let decision = ResponseScheduler::schedule(&event(ResponseTrigger::AfterHours), &settings, &state);
    assert_eq!(decision, ScheduleDecision::SendAfter { delay_minutes: 15 });
}

#[test]
fn reaching_max_attempts_stops_sending() {
    let settings = ResponseSettings::default();
    let decision = ResponseScheduler::schedule(
        &event(ResponseTrigger::CommonQuestions),
        &settings,
        &open_state(settings.max_attempts),
    );
    assert_eq!(decision, ScheduleDecision::SkipMaxAttemptsReached);
    assert!(!decision.sends());
}

#[test]
fn trigger_check_precedes_business_hours_check() {
    let settings = ResponseSettings {
        triggers: BTreeSet::new(),
        business_hours_only: true,
        ..ResponseSettings::default()
    };
    let state = ConversationState {
        attempts_so_far: 99,
        is_business_hours: false,
    };
    let decision = ResponseScheduler::schedule(&event(ResponseTrigger::AfterHours), &settings, &state);
    assert_eq!(decision, ScheduleDecision::Skip);
}

#[test]
fn within_policy_sends_after_delay() {
    let settings = ResponseSettings {
        delay_minutes: 0,
        ..ResponseSettings::default()
    };
    let decision = ResponseScheduler::schedule(
        &event(ResponseTrigger::CommonQuestions),
        &settings,
        &open_state(2),
    );
    assert_eq!(decision, ScheduleDecision::SendAfter { delay_minutes: 0 });
    assert!(decision.sends());
}
