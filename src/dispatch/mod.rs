//! Delivery of escalation notices to the ticketing/notification side.
//!
//! The [`EscalationSink`] trait decouples the governance service from the
//! collaborator that acts on an escalation. [`WebhookSink`] posts notices
//! as JSON; [`LogSink`] only records them in the tracing output.

pub mod webhook;

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::models::catalog::{EscalationAction, EscalationPriority};
use crate::policy::evaluator::EscalationDecision;
use crate::Result;

pub use webhook::WebhookSink;

/// Escalation handed to an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationNotice {
    /// Conversation being escalated.
    pub conversation_id: String,
    /// Rule that fired.
    pub rule_id: String,
    /// Requested action.
    pub action: EscalationAction,
    /// Priority of the firing rule.
    pub priority: EscalationPriority,
    /// When the escalation was decided.
    pub fired_at: DateTime<Utc>,
}

impl EscalationNotice {
    /// Build a notice from an evaluator decision.
    #[must_use]
    pub fn from_decision(
        conversation_id: impl Into<String>,
        decision: &EscalationDecision,
        fired_at: DateTime<Utc>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            rule_id: decision.rule_id.clone(),
            action: decision.action,
            priority: decision.priority,
            fired_at,
        }
    }

    /// Notice raised when the rejected-template policy hands a
    /// conversation to a human instead of replying.
    #[must_use]
    pub fn rejected_template(conversation_id: impl Into<String>, fired_at: DateTime<Utc>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            rule_id: REJECTED_TEMPLATE_RULE_ID.to_owned(),
            action: EscalationAction::EscalateToHuman,
            priority: EscalationPriority::Medium,
            fired_at,
        }
    }
}

/// Rule id carried by notices from the rejected-template policy.
pub const REJECTED_TEMPLATE_RULE_ID: &str = "rejected_template";

/// Receives escalation notices.
pub trait EscalationSink: Send + Sync {
    /// Deliver one notice.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Dispatch`](crate::AppError::Dispatch) if the
    /// collaborator could not be reached or refused the notice.
    fn deliver<'a>(
        &'a self,
        notice: &'a EscalationNotice,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Sink that only logs notices.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EscalationSink for LogSink {
    fn deliver<'a>(
        &'a self,
        notice: &'a EscalationNotice,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            info!(
                conversation_id = %notice.conversation_id,
                rule_id = %notice.rule_id,
                action = %notice.action,
                priority = %notice.priority,
                "escalation notice"
            );
            Ok(())
        })
    }
}
