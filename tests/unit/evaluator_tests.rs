//! Unit tests for `EscalationEvaluator`.

use std::collections::BTreeSet;

use tenant_comms_governor::models::catalog::{
    EscalationAction, EscalationCondition, EscalationPriority, RuleCondition,
};
use tenant_comms_governor::models::conversation::ConversationFacts;
use tenant_comms_governor::models::settings::EscalationRule;
use tenant_comms_governor::policy::evaluator::EscalationEvaluator;
use tenant_comms_governor::AppError;

fn rule(
    id: &str,
    condition: EscalationCondition,
    threshold: i64,
    action: EscalationAction,
    priority: EscalationPriority,
) -> EscalationRule {
    EscalationRule::new(id, condition, threshold, action, priority)
}

#[test]
fn no_rules_means_no_escalation() {
    let outcome = EscalationEvaluator::evaluate(&[], &ConversationFacts::default());
    assert!(!outcome.fired());
    assert!(outcome.configuration_error().is_none());
}

#[test]
fn time_rule_fires_at_threshold() {
    let rules = [rule(
        "r-time",
        EscalationCondition::NoResponseAfterTime,
        30,
        EscalationAction::EscalateToHuman,
        EscalationPriority::Medium,
    )];

    let below = ConversationFacts {
        elapsed_minutes_since_last_agent_reply: 29,
        ..ConversationFacts::default()
    };
    assert!(!EscalationEvaluator::evaluate(&rules, &below).fired());

    let at = ConversationFacts {
        elapsed_minutes_since_last_agent_reply: 30,
        ..ConversationFacts::default()
    };
    let decision = EscalationEvaluator::evaluate(&rules, &at).escalation.expect("fires");
    assert_eq!(decision.rule_id, "r-time");
    assert_eq!(decision.action, EscalationAction::EscalateToHuman);
}

#[test]
fn negative_sentiment_uses_inverted_score() {
    let rules = [rule(
        "r-sent",
        EscalationCondition::NegativeSentiment,
        70,
        EscalationAction::NotifyManager,
        EscalationPriority::High,
    )];

    let angry = ConversationFacts {
        sentiment_score: 25,
        ..ConversationFacts::default()
    };
    assert!(EscalationEvaluator::evaluate(&rules, &angry).fired());

    let calm = ConversationFacts {
        sentiment_score: 31,
        ..ConversationFacts::default()
    };
    assert!(!EscalationEvaluator::evaluate(&rules, &calm).fired());
}

#[test]
fn complex_request_respects_score_cutoff() {
    let rules = [rule(
        "r-complex",
        EscalationCondition::ComplexRequest,
        60,
        EscalationAction::CreateTicket,
        EscalationPriority::Medium,
    )];

    let flagged_without_score = ConversationFacts {
        is_complex_request: true,
        ..ConversationFacts::default()
    };
    assert!(EscalationEvaluator::evaluate(&rules, &flagged_without_score).fired());

    let low_score = ConversationFacts {
        is_complex_request: true,
        complexity_score: Some(40),
        ..ConversationFacts::default()
    };
    assert!(!EscalationEvaluator::evaluate(&rules, &low_score).fired());

    let not_flagged = ConversationFacts {
        complexity_score: Some(95),
        ..ConversationFacts::default()
    };
    assert!(!EscalationEvaluator::evaluate(&rules, &not_flagged).fired());
}

#[test]
fn keywords_fire_when_any_matched() {
    let rules = [rule(
        "r-kw",
        EscalationCondition::SpecificKeywords,
        0,
        EscalationAction::EscalateToHuman,
        EscalationPriority::High,
    )];
    let facts = ConversationFacts {
        matched_keywords: BTreeSet::from(["gas leak".to_owned()]),
        ..ConversationFacts::default()
    };
    assert!(EscalationEvaluator::evaluate(&rules, &facts).fired());
    assert!(!EscalationEvaluator::evaluate(&rules, &ConversationFacts::default()).fired());
}

#[test]
fn multiple_attempts_counts_attempts() {
    let rules = [rule(
        "r-att",
        EscalationCondition::MultipleAttempts,
        3,
        EscalationAction::NotifyManager,
        EscalationPriority::Low,
    )];
    let facts = ConversationFacts {
        attempt_count: 3,
        ..ConversationFacts::default()
    };
    assert!(EscalationEvaluator::evaluate(&rules, &facts).fired());
}

#[test]
fn disabled_rules_never_fire() {
    let mut disabled = rule(
        "r-off",
        EscalationCondition::MultipleAttempts,
        0,
        EscalationAction::NotifyManager,
        EscalationPriority::High,
    );
    disabled.enabled = false;
    let outcome = EscalationEvaluator::evaluate(&[disabled], &ConversationFacts::default());
    assert!(!outcome.fired());
}

#[test]
fn earlier_rule_wins_priority_tie() {
    let rules = [
        rule(
            "first",
            EscalationCondition::MultipleAttempts,
            0,
            EscalationAction::NotifyManager,
            EscalationPriority::Medium,
        ),
        rule(
            "second",
            EscalationCondition::NoResponseAfterTime,
            0,
            EscalationAction::CreateTicket,
            EscalationPriority::Medium,
        ),
    ];
    let decision = EscalationEvaluator::evaluate(&rules, &ConversationFacts::default())
        .escalation
        .expect("fires");
    assert_eq!(decision.rule_id, "first");
}

#[test]
fn unrecognized_condition_is_reported_and_others_still_evaluate() {
    let mut odd = rule(
        "r-odd",
        EscalationCondition::MultipleAttempts,
        0,
        EscalationAction::EscalateToHuman,
        EscalationPriority::High,
    );
    odd.condition = RuleCondition::Unrecognized("full_moon".into());
    let rules = [
        odd,
        rule(
            "r-time",
            EscalationCondition::NoResponseAfterTime,
            10,
            EscalationAction::NotifyManager,
            EscalationPriority::Low,
        ),
    ];
    let facts = ConversationFacts {
        elapsed_minutes_since_last_agent_reply: 15,
        ..ConversationFacts::default()
    };

    let outcome = EscalationEvaluator::evaluate(&rules, &facts);
    assert_eq!(outcome.misconfigured_rules, vec!["r-odd".to_owned()]);
    assert!(matches!(
        outcome.configuration_error(),
        Some(AppError::Configuration(_))
    ));
    let decision = outcome.escalation.expect("time rule fires");
    assert_eq!(decision.rule_id, "r-time");
    assert_eq!(decision.priority, EscalationPriority::Low);
}
