//! Inbound message handling, escalation checks and conversation resolution.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::GovernanceService;
use crate::audit::{AuditEntry, AuditEventType};
use crate::dispatch::EscalationNotice;
use crate::governance::selection::TemplateSelection;
use crate::models::catalog::ResponseTrigger;
use crate::models::conversation::{ConversationFacts, ConversationState, InboundEvent};
use crate::models::settings::ResponseSettings;
use crate::models::template::CommunicationTemplate;
use crate::policy::evaluator::{EscalationEvaluator, EscalationOutcome};
use crate::scheduler::directives::Directive;
use crate::scheduler::{ResponseScheduler, ScheduleDecision};
use crate::Result;

/// What happened to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundOutcome {
    /// Scheduler decision.
    pub decision: ScheduleDecision,
    /// Whether the office was open when the message arrived.
    pub is_business_hours: bool,
    /// Start of the next business window for deferred messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_at: Option<DateTime<Utc>>,
    /// Reply directive registered for the conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<Directive>,
    /// The rejected-template policy asked for a human instead of a reply.
    pub escalate: bool,
    /// Watched keywords found in the message.
    pub matched_keywords: BTreeSet<String>,
}

impl GovernanceService {
    /// Schedule the automated answer to `event`.
    ///
    /// When the scheduler decides `send_after` and an approved template is
    /// available, a reply directive is registered, replacing any pending
    /// one for the conversation. A deferred message gets its directive at
    /// the start of the next business window.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if templates cannot be read, or
    /// `AppError::Dispatch` if the rejected-template policy escalates and
    /// the notice could not be delivered.
    pub async fn process_inbound(
        &self,
        event: &InboundEvent,
        attempts_so_far: i64,
        now: DateTime<Utc>,
    ) -> Result<InboundOutcome> {
        let outcome = {
            let _turn = self.locks.acquire(&event.conversation_id).await;
            self.schedule_reply(event, attempts_so_far, now).await
        };
        self.locks.release_idle(&event.conversation_id);
        outcome
    }

    async fn schedule_reply(
        &self,
        event: &InboundEvent,
        attempts_so_far: i64,
        now: DateTime<Utc>,
    ) -> Result<InboundOutcome> {
        let settings = self.settings().await;
        let state = ConversationState {
            attempts_so_far,
            is_business_hours: self.business_hours.is_open(now),
        };
        let decision = ResponseScheduler::schedule(event, &settings, &state);
        let matched_keywords = event
            .message
            .as_deref()
            .map(|text| self.keywords.detect(text))
            .unwrap_or_default();

        let mut outcome = InboundOutcome {
            decision,
            is_business_hours: state.is_business_hours,
            resume_at: None,
            directive: None,
            escalate: false,
            matched_keywords,
        };

        match decision {
            ScheduleDecision::SendAfter { delay_minutes } => {
                if let Some(template) = self.reply_template(event, &settings, now, &mut outcome).await? {
                    let directive = self
                        .directives
                        .enqueue_after(&event.conversation_id, Some(template.id), delay_minutes, now)
                        .await;
                    outcome.directive = Some(scheduled(directive));
                }
            }
            ScheduleDecision::DeferToNextBusinessWindow => {
                outcome.resume_at = self.business_hours.next_open(now);
                let Some(resume_at) = outcome.resume_at else {
                    warn!(
                        conversation_id = %event.conversation_id,
                        "no business window ahead, deferred message left unanswered"
                    );
                    return Ok(outcome);
                };
                if let Some(template) = self.reply_template(event, &settings, now, &mut outcome).await? {
                    let directive = self
                        .directives
                        .enqueue(&event.conversation_id, Some(template.id), resume_at)
                        .await;
                    outcome.directive = Some(scheduled(directive));
                }
            }
            ScheduleDecision::Skip | ScheduleDecision::SkipMaxAttemptsReached => {}
        }

        Ok(outcome)
    }

    /// Template the reply to `event` uses, applying the rejected-template
    /// policy when no approved template is left.
    async fn reply_template(
        &self,
        event: &InboundEvent,
        settings: &ResponseSettings,
        now: DateTime<Utc>,
        outcome: &mut InboundOutcome,
    ) -> Result<Option<CommunicationTemplate>> {
        let candidates = self.candidates(event.trigger).await?;
        match self.selector.select(event.trigger, settings, &candidates) {
            TemplateSelection::Use(template) => Ok(Some(template)),
            TemplateSelection::Escalate => {
                warn!(
                    conversation_id = %event.conversation_id,
                    trigger = %event.trigger,
                    "latest template rejected, escalating instead of replying"
                );
                outcome.escalate = true;
                let notice = EscalationNotice::rejected_template(&event.conversation_id, now);
                self.escalate(&notice, Some("latest template rejected")).await?;
                Ok(None)
            }
            TemplateSelection::NoResponse => {
                info!(
                    conversation_id = %event.conversation_id,
                    trigger = %event.trigger,
                    "no approved template, no automated reply"
                );
                Ok(None)
            }
        }
    }

    /// Templates answering `trigger`, plus the configured fallback.
    async fn candidates(&self, trigger: ResponseTrigger) -> Result<Vec<CommunicationTemplate>> {
        let mut candidates = self.templates.list_for_trigger(trigger).await?;
        if let Some(fallback_id) = self.selector.fallback_template_id() {
            if !candidates.iter().any(|t| t.id == fallback_id) {
                if let Some(fallback) = self.templates.get_by_id(fallback_id).await? {
                    candidates.push(fallback);
                }
            }
        }
        Ok(candidates)
    }

    /// Audit and deliver one escalation notice.
    async fn escalate(&self, notice: &EscalationNotice, reason: Option<&str>) -> Result<()> {
        let mut entry = AuditEntry::new(AuditEventType::EscalationFired)
            .with_conversation(&notice.conversation_id)
            .with_detail(serde_json::to_value(notice).unwrap_or_default());
        if let Some(reason) = reason {
            entry = entry.with_reason(reason);
        }
        self.record(entry);
        self.sink.deliver(notice).await
    }

    /// Evaluate escalation rules for a conversation and deliver the notice
    /// when one fires.
    ///
    /// Keywords found in `message` are merged into `facts` before
    /// evaluation. Rules with unsupported conditions are reported in the
    /// outcome and audited; they never fire.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Dispatch` if a fired escalation could not be
    /// delivered.
    pub async fn check_escalation(
        &self,
        conversation_id: &str,
        facts: ConversationFacts,
        message: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<EscalationOutcome> {
        let outcome = {
            let _turn = self.locks.acquire(conversation_id).await;
            self.evaluate_conversation(conversation_id, facts, message, now).await
        };
        self.locks.release_idle(conversation_id);
        outcome
    }

    async fn evaluate_conversation(
        &self,
        conversation_id: &str,
        mut facts: ConversationFacts,
        message: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<EscalationOutcome> {
        if let Some(text) = message {
            facts.matched_keywords.extend(self.keywords.detect(text));
        }
        let settings = self.settings().await;
        let outcome = EscalationEvaluator::evaluate(&settings.escalation_rules, &facts);

        if let Some(err) = outcome.configuration_error() {
            self.record(
                AuditEntry::new(AuditEventType::RuleMisconfigured)
                    .with_conversation(conversation_id)
                    .with_reason(err.to_string()),
            );
        }

        if let Some(decision) = &outcome.escalation {
            let notice = EscalationNotice::from_decision(conversation_id, decision, now);
            self.escalate(&notice, None).await?;
        }

        Ok(outcome)
    }

    /// A human answered or the conversation closed: drop its pending reply.
    ///
    /// Waits for in-flight work on the conversation, so a reply scheduled
    /// concurrently is cancelled too. Idempotent; returns the cancelled
    /// directive if one was pending.
    pub async fn conversation_resolved(&self, conversation_id: &str) -> Option<Directive> {
        let turn = self.locks.acquire(conversation_id).await;
        let cancelled = self.directives.cancel(conversation_id).await;
        if let Some(directive) = &cancelled {
            self.record(
                AuditEntry::new(AuditEventType::DirectiveCancelled)
                    .with_conversation(conversation_id)
                    .with_reason("conversation resolved")
                    .with_detail(serde_json::json!({ "directiveId": directive.id })),
            );
        }
        drop(turn);
        self.locks.release_idle(conversation_id);
        cancelled
    }

    /// Resolve a due directive into the template to send.
    ///
    /// Returns `None` when the directive carries no template, or the
    /// template is gone, no longer approved, or its trigger is no longer
    /// governed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the template cannot be read.
    pub async fn directive_fired(&self, directive: &Directive) -> Result<Option<CommunicationTemplate>> {
        let Some(template_id) = directive.template_id.as_deref() else {
            return Ok(None);
        };
        let settings = self.settings().await;
        let template = self
            .templates
            .get_by_id(template_id)
            .await?
            .filter(|t| t.is_dispatchable() && settings.governs(t.trigger));

        if template.is_none() {
            warn!(
                conversation_id = %directive.conversation_id,
                template_id,
                "template no longer dispatchable, reply dropped"
            );
        }
        Ok(template)
    }
}

fn scheduled(directive: Directive) -> Directive {
    info!(
        conversation_id = %directive.conversation_id,
        directive_id = %directive.id,
        fire_at = %directive.fire_at,
        "automated reply scheduled"
    );
    directive
}
