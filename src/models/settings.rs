//! Automated response policy model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::catalog::{
    EscalationAction, EscalationCondition, EscalationPriority, ResponseTrigger, RuleCondition,
};

/// Condition/threshold/action tuple deciding when a conversation is handed
/// to a human.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EscalationRule {
    /// Unique identifier within the owning settings.
    pub id: String,
    /// Condition evaluated against conversation facts.
    pub condition: RuleCondition,
    /// Minutes for time-based conditions, 0–100 points otherwise.
    pub threshold: i64,
    /// Action taken when the rule fires.
    pub action: EscalationAction,
    /// Priority used to pick between rules firing together.
    pub priority: EscalationPriority,
    /// Disabled rules are never evaluated.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl EscalationRule {
    /// Construct an enabled rule.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        condition: EscalationCondition,
        threshold: i64,
        action: EscalationAction,
        priority: EscalationPriority,
    ) -> Self {
        Self {
            id: id.into(),
            condition: RuleCondition::Known(condition),
            threshold,
            action,
            priority,
            enabled: true,
        }
    }
}

/// Policy governing automated replies for one feature or tenant.
///
/// Values are never mutated in place; see
/// [`ResponsePolicy::update`](crate::policy::settings::ResponsePolicy::update).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSettings {
    /// Message categories the policy governs.
    #[serde(default)]
    pub triggers: BTreeSet<ResponseTrigger>,
    /// Wait before an automated reply is sent.
    #[serde(default)]
    pub delay_minutes: i64,
    /// Ordered escalation rules; earlier rules win priority ties.
    #[serde(default)]
    pub escalation_rules: Vec<EscalationRule>,
    /// Maximum automated replies per conversation.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i64,
    /// Restrict automated replies to business hours.
    #[serde(default)]
    pub business_hours_only: bool,
}

fn default_max_attempts() -> i64 {
    3
}

impl Default for ResponseSettings {
    fn default() -> Self {
        Self {
            triggers: BTreeSet::from([
                ResponseTrigger::AfterHours,
                ResponseTrigger::CommonQuestions,
            ]),
            delay_minutes: 15,
            escalation_rules: vec![EscalationRule::new(
                "rule_default_no_response",
                EscalationCondition::NoResponseAfterTime,
                30,
                EscalationAction::EscalateToHuman,
                EscalationPriority::Medium,
            )],
            max_attempts: default_max_attempts(),
            business_hours_only: false,
        }
    }
}

impl ResponseSettings {
    /// Whether `trigger` is governed by this policy.
    #[must_use]
    pub fn governs(&self, trigger: ResponseTrigger) -> bool {
        self.triggers.contains(&trigger)
    }

    /// Look up a rule by identifier.
    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&EscalationRule> {
        self.escalation_rules.iter().find(|r| r.id == id)
    }
}

/// Partial update merged into [`ResponseSettings`].
///
/// Absent fields keep their current value. `escalation_rules`, when
/// present, replaces the whole list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// Replacement trigger set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<BTreeSet<ResponseTrigger>>,
    /// Replacement delay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_minutes: Option<i64>,
    /// Replacement rule list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_rules: Option<Vec<EscalationRule>>,
    /// Replacement attempt cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<i64>,
    /// Replacement business-hours flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_hours_only: Option<bool>,
}

impl SettingsPatch {
    /// Patch that only replaces the rule list.
    #[must_use]
    pub fn rules(rules: Vec<EscalationRule>) -> Self {
        Self {
            escalation_rules: Some(rules),
            ..Self::default()
        }
    }

    /// Merge onto `base`, producing a new (unvalidated) value.
    #[must_use]
    pub fn apply_to(&self, base: &ResponseSettings) -> ResponseSettings {
        ResponseSettings {
            triggers: self
                .triggers
                .clone()
                .unwrap_or_else(|| base.triggers.clone()),
            delay_minutes: self.delay_minutes.unwrap_or(base.delay_minutes),
            escalation_rules: self
                .escalation_rules
                .clone()
                .unwrap_or_else(|| base.escalation_rules.clone()),
            max_attempts: self.max_attempts.unwrap_or(base.max_attempts),
            business_hours_only: self
                .business_hours_only
                .unwrap_or(base.business_hours_only),
        }
    }
}
