//! Template drafting and review.

use serde::Deserialize;
use tracing::info;

use super::GovernanceService;
use crate::audit::{AuditEntry, AuditEventType};
use crate::governance::TemplateGovernance;
use crate::models::catalog::ResponseTrigger;
use crate::models::template::{CommunicationTemplate, TemplateStatus};
use crate::models::Actor;
use crate::{AppError, Result};

/// Fields of a freshly drafted template.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    /// Short title shown to reviewers.
    pub title: String,
    /// Reply body.
    pub content: String,
    /// Free-form grouping.
    #[serde(default)]
    pub category: String,
    /// Trigger the template answers.
    pub trigger: ResponseTrigger,
    /// Drafting confidence in `0.0..=1.0`.
    pub confidence: f64,
}

impl GovernanceService {
    /// Store a new draft.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for blank text or out-of-range
    /// confidence, or `AppError::Db` if the insert fails.
    pub async fn create_template(&self, draft: NewTemplate, actor: &Actor) -> Result<CommunicationTemplate> {
        let template = CommunicationTemplate::draft(
            draft.title,
            draft.content,
            draft.category,
            draft.trigger,
            draft.confidence,
        )?;
        let stored = self.templates.create(&template).await?;
        self.record(
            AuditEntry::new(AuditEventType::TemplateCreated)
                .with_template(&stored.id)
                .with_actor(actor),
        );
        info!(template_id = %stored.id, trigger = %stored.trigger, "template drafted");
        Ok(stored)
    }

    /// Fetch a template.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id.
    pub async fn template(&self, id: &str) -> Result<CommunicationTemplate> {
        self.templates
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("template {id} not found")))
    }

    /// Templates awaiting review, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn pending_templates(&self) -> Result<Vec<CommunicationTemplate>> {
        self.templates.list_pending().await
    }

    /// Submit a draft for review.
    ///
    /// # Errors
    ///
    /// See [`TemplateGovernance::transition_at`].
    pub async fn submit_template(&self, id: &str, actor: &Actor) -> Result<CommunicationTemplate> {
        self.move_template(id, TemplateStatus::Pending, actor, None).await
    }

    /// Approve a pending template.
    ///
    /// # Errors
    ///
    /// See [`TemplateGovernance::transition_at`].
    pub async fn approve_template(
        &self,
        id: &str,
        actor: &Actor,
        comments: Option<&str>,
    ) -> Result<CommunicationTemplate> {
        self.move_template(id, TemplateStatus::Approved, actor, comments).await
    }

    /// Reject a pending template.
    ///
    /// # Errors
    ///
    /// See [`TemplateGovernance::transition_at`].
    pub async fn reject_template(&self, id: &str, actor: &Actor, reason: &str) -> Result<CommunicationTemplate> {
        self.move_template(id, TemplateStatus::Rejected, actor, Some(reason)).await
    }

    /// Store a corrected draft of a rejected template under a new id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound`, `AppError::InvalidTransition` when the
    /// template is not rejected, or `AppError::Validation` for blank content.
    pub async fn resubmit_template(&self, id: &str, content: &str, actor: &Actor) -> Result<CommunicationTemplate> {
        let rejected = self.template(id).await?;
        let draft = TemplateGovernance::resubmit(&rejected, content)?;
        let stored = self.templates.create(&draft).await?;
        self.record(
            AuditEntry::new(AuditEventType::TemplateCreated)
                .with_template(&stored.id)
                .with_actor(actor)
                .with_detail(serde_json::json!({ "resubmissionOf": rejected.id })),
        );
        Ok(stored)
    }

    /// Review targets `actor` may invoke on template `id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id.
    pub async fn review_actions(&self, id: &str, actor: &Actor) -> Result<Vec<TemplateStatus>> {
        let template = self.template(id).await?;
        Ok(self.governance.review_actions(actor, &template))
    }

    async fn move_template(
        &self,
        id: &str,
        target: TemplateStatus,
        actor: &Actor,
        comments: Option<&str>,
    ) -> Result<CommunicationTemplate> {
        let current = self.template(id).await?;

        let next = match self.governance.transition(&current, target, actor, comments) {
            Ok(next) => next,
            Err(err) => {
                self.record(
                    AuditEntry::new(AuditEventType::TransitionDenied)
                        .with_template(id)
                        .with_actor(actor)
                        .with_reason(err.to_string()),
                );
                return Err(err);
            }
        };

        self.templates.save_transition(current.status, &next).await?;

        let event = match target {
            TemplateStatus::Approved => AuditEventType::TemplateApproved,
            TemplateStatus::Rejected => AuditEventType::TemplateRejected,
            TemplateStatus::Draft | TemplateStatus::Pending => AuditEventType::TemplateSubmitted,
        };
        let mut entry = AuditEntry::new(event).with_template(id).with_actor(actor);
        if let Some(comments) = &next.review_comments {
            entry = entry.with_reason(comments.clone());
        }
        self.record(entry);

        Ok(next)
    }
}
