//! Governance audit trail.
//!
//! Every template review, denied transition, escalation and settings change
//! is recorded as an [`AuditEntry`]. [`JsonlAuditWriter`] appends them as
//! JSON lines to one file per UTC day.

pub mod writer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Actor;

/// Event type classification for audit log entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A drafted template was stored.
    TemplateCreated,
    /// A draft entered review.
    TemplateSubmitted,
    /// A reviewer approved a template.
    TemplateApproved,
    /// A reviewer rejected a template.
    TemplateRejected,
    /// A status change was refused.
    TransitionDenied,
    /// An escalation rule fired for a conversation.
    EscalationFired,
    /// Evaluation met a rule with an unsupported condition.
    RuleMisconfigured,
    /// Response settings were replaced.
    SettingsUpdated,
    /// The tone and style preference changed.
    ToneStyleUpdated,
    /// A pending automated reply was cancelled.
    DirectiveCancelled,
}

/// A structured record of a governance event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    /// Event time (UTC).
    pub timestamp: DateTime<Utc>,
    /// Event classification.
    pub event_type: AuditEventType,
    /// Conversation the event concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Template the event concerns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Acting user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Acting user's role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_role: Option<String>,
    /// Review comment, denial message or cancellation cause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Event-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl AuditEntry {
    /// Construct a minimal audit entry for the given event type.
    #[must_use]
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            conversation_id: None,
            template_id: None,
            actor_id: None,
            actor_role: None,
            reason: None,
            detail: None,
        }
    }

    /// Set the conversation identifier.
    #[must_use]
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Set the template identifier.
    #[must_use]
    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Set the acting user and role.
    #[must_use]
    pub fn with_actor(mut self, actor: &Actor) -> Self {
        self.actor_id = Some(actor.id.clone());
        self.actor_role = Some(actor.role.clone());
        self
    }

    /// Set the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attach an event payload.
    #[must_use]
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Writes structured audit entries to a persistent store.
///
/// Implementations must be [`Send`] and [`Sync`] to allow sharing across
/// async task boundaries via [`std::sync::Arc`].
pub trait AuditLogger: Send + Sync {
    /// Record a single audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write operation fails.
    fn log_entry(&self, entry: AuditEntry) -> crate::Result<()>;
}

pub use writer::JsonlAuditWriter;
