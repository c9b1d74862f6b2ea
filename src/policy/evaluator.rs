//! Escalation evaluator.
//!
//! Decides whether any enabled escalation rule fires for a conversation
//! and, when several fire at once, which one wins. The choice is a total
//! order (priority first, then declaration order) so the same inputs
//! always produce the same escalation.
//!
//! Rules with an unrecognized condition fail closed: they never fire and
//! are reported back as configuration errors alongside the result.

use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::models::catalog::{EscalationAction, EscalationCondition, EscalationPriority};
use crate::models::conversation::ConversationFacts;
use crate::models::settings::EscalationRule;
use crate::AppError;

/// Escalation chosen for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationDecision {
    /// Identifier of the winning rule.
    pub rule_id: String,
    /// Action to deliver.
    pub action: EscalationAction,
    /// Priority of the winning rule.
    pub priority: EscalationPriority,
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationOutcome {
    /// Winning escalation, or `None` when no rule fired.
    pub escalation: Option<EscalationDecision>,
    /// Ids of enabled rules skipped because their condition is unknown.
    pub misconfigured_rules: Vec<String>,
}

impl EscalationOutcome {
    /// Whether any rule fired.
    #[must_use]
    pub fn fired(&self) -> bool {
        self.escalation.is_some()
    }

    /// Configuration error describing skipped rules, if any.
    #[must_use]
    pub fn configuration_error(&self) -> Option<AppError> {
        if self.misconfigured_rules.is_empty() {
            None
        } else {
            Some(AppError::Configuration(format!(
                "unrecognized escalation condition on rule(s): {}",
                self.misconfigured_rules.join(", ")
            )))
        }
    }
}

/// Evaluates escalation rules against conversation facts.
pub struct EscalationEvaluator;

impl EscalationEvaluator {
    /// Evaluate `rules` against `facts`.
    ///
    /// Evaluation order:
    /// 1. Skip disabled rules.
    /// 2. Skip (and record) rules whose condition is unrecognized.
    /// 3. Test each remaining rule's condition.
    /// 4. Among firing rules keep the highest priority; on ties the
    ///    earliest-declared rule wins.
    #[must_use]
    pub fn evaluate(rules: &[EscalationRule], facts: &ConversationFacts) -> EscalationOutcome {
        let _span = info_span!("escalation_evaluate", rules = rules.len()).entered();

        let mut outcome = EscalationOutcome::default();
        let mut winner: Option<&EscalationRule> = None;

        for rule in rules.iter().filter(|r| r.enabled) {
            let Some(condition) = rule.condition.known() else {
                warn!(
                    rule_id = %rule.id,
                    condition = %rule.condition,
                    "unrecognized escalation condition, treating rule as non-firing"
                );
                outcome.misconfigured_rules.push(rule.id.clone());
                continue;
            };

            if !condition_fires(condition, rule.threshold, facts) {
                continue;
            }

            // Strictly greater keeps the earlier rule on equal priority.
            if winner.is_none_or(|w| rule.priority > w.priority) {
                winner = Some(rule);
            }
        }

        if let Some(rule) = winner {
            info!(
                rule_id = %rule.id,
                action = %rule.action,
                priority = %rule.priority,
                "escalation rule fired"
            );
            outcome.escalation = Some(EscalationDecision {
                rule_id: rule.id.clone(),
                action: rule.action,
                priority: rule.priority,
            });
        }

        outcome
    }
}

/// Test a single supported condition.
fn condition_fires(condition: EscalationCondition, threshold: i64, facts: &ConversationFacts) -> bool {
    match condition {
        EscalationCondition::NoResponseAfterTime => {
            facts.elapsed_minutes_since_last_agent_reply >= threshold
        }
        EscalationCondition::NegativeSentiment => {
            let negativity = 100_i64 - i64::from(facts.sentiment_score.min(100));
            negativity >= threshold
        }
        EscalationCondition::ComplexRequest => {
            facts.is_complex_request
                && facts
                    .complexity_score
                    .is_none_or(|score| i64::from(score) >= threshold)
        }
        EscalationCondition::SpecificKeywords => !facts.matched_keywords.is_empty(),
        EscalationCondition::MultipleAttempts => facts.attempt_count >= threshold,
    }
}
