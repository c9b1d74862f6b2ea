//! Template governance state machine.
//!
//! ```text
//! draft ──submit──▶ pending ──approve──▶ approved
//!                      │
//!                      └──reject───▶ rejected
//! ```
//!
//! `approved` and `rejected` are terminal. Review moves require a role in
//! the approver set; rejection additionally requires non-blank comments.
//! Checks run role first, then transition legality, then reason, so a
//! caller without the role learns nothing about the template's state.
//! A failed transition never touches the input template.

pub mod roles;
pub mod selection;

use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn};

use crate::models::template::{CommunicationTemplate, TemplateStatus};
use crate::models::Actor;
use crate::{AppError, Result};

pub use roles::ApproverRoles;

/// Applies role-gated status transitions to templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateGovernance {
    approvers: ApproverRoles,
}

impl TemplateGovernance {
    /// Create a governance engine with the given approver roles.
    #[must_use]
    pub fn new(approvers: ApproverRoles) -> Self {
        Self { approvers }
    }

    /// Configured approver roles.
    #[must_use]
    pub fn approvers(&self) -> &ApproverRoles {
        &self.approvers
    }

    /// Whether `actor` may review templates at all.
    #[must_use]
    pub fn can_review(&self, actor: &Actor) -> bool {
        self.approvers.allows(&actor.role)
    }

    /// Move `template` to `target`, stamping the review fields with the
    /// current wall-clock time.
    ///
    /// # Errors
    ///
    /// See [`Self::transition_at`].
    pub fn transition(
        &self,
        template: &CommunicationTemplate,
        target: TemplateStatus,
        actor: &Actor,
        comments: Option<&str>,
    ) -> Result<CommunicationTemplate> {
        self.transition_at(template, target, actor, comments, Utc::now())
    }

    /// Move `template` to `target` as of `now`, returning the updated copy.
    ///
    /// # Errors
    ///
    /// - `AppError::Unauthorized` if `target` is a review state and the
    ///   actor's role is not an approver role.
    /// - `AppError::InvalidTransition` for any move other than
    ///   `draft → pending`, `pending → approved`, `pending → rejected`.
    /// - `AppError::MissingReason` when rejecting without comments.
    pub fn transition_at(
        &self,
        template: &CommunicationTemplate,
        target: TemplateStatus,
        actor: &Actor,
        comments: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CommunicationTemplate> {
        let _span = info_span!(
            "template_transition",
            template_id = %template.id,
            from = %template.status,
            to = %target,
            actor_id = %actor.id,
        )
        .entered();

        let is_review = matches!(target, TemplateStatus::Approved | TemplateStatus::Rejected);

        // ── 1. Role gate ─────────────────────────────────────
        if is_review && !self.can_review(actor) {
            warn!(role = %actor.role, "review attempted by non-approver role");
            return Err(AppError::Unauthorized(format!(
                "role '{}' may not review templates",
                actor.role
            )));
        }

        // ── 2. Transition legality ───────────────────────────
        if template.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "template {} is already {} and cannot move to {}",
                template.id, template.status, target
            )));
        }
        let legal = matches!(
            (template.status, target),
            (TemplateStatus::Draft, TemplateStatus::Pending)
                | (
                    TemplateStatus::Pending,
                    TemplateStatus::Approved | TemplateStatus::Rejected
                )
        );
        if !legal {
            return Err(AppError::InvalidTransition(format!(
                "template {} cannot move from {} to {}",
                template.id, template.status, target
            )));
        }

        // ── 3. Mandatory rejection reason ────────────────────
        let comments = comments.map(str::trim).filter(|c| !c.is_empty());
        if target == TemplateStatus::Rejected && comments.is_none() {
            return Err(AppError::MissingReason(format!(
                "rejecting template {} requires review comments",
                template.id
            )));
        }

        let mut next = template.clone();
        next.status = target;
        if is_review {
            next.reviewed_by = Some(actor.id.clone());
            next.reviewed_at = Some(now);
            next.review_comments = comments.map(str::to_owned);
        }

        info!("template status updated");
        Ok(next)
    }

    /// Submit a draft for review.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidTransition` unless the template is a draft.
    pub fn submit(&self, template: &CommunicationTemplate, actor: &Actor) -> Result<CommunicationTemplate> {
        self.transition(template, TemplateStatus::Pending, actor, None)
    }

    /// Approve a pending template.
    ///
    /// # Errors
    ///
    /// See [`Self::transition_at`].
    pub fn approve(
        &self,
        template: &CommunicationTemplate,
        actor: &Actor,
        comments: Option<&str>,
    ) -> Result<CommunicationTemplate> {
        self.transition(template, TemplateStatus::Approved, actor, comments)
    }

    /// Reject a pending template with a mandatory reason.
    ///
    /// # Errors
    ///
    /// See [`Self::transition_at`].
    pub fn reject(
        &self,
        template: &CommunicationTemplate,
        actor: &Actor,
        reason: &str,
    ) -> Result<CommunicationTemplate> {
        self.transition(template, TemplateStatus::Rejected, actor, Some(reason))
    }

    /// Review targets `actor` may invoke on `template`.
    ///
    /// Empty for non-approvers and for templates that are not pending, so
    /// callers render no review affordance in those cases.
    #[must_use]
    pub fn review_actions(&self, actor: &Actor, template: &CommunicationTemplate) -> Vec<TemplateStatus> {
        if !self.can_review(actor) || template.status != TemplateStatus::Pending {
            return Vec::new();
        }
        vec![TemplateStatus::Approved, TemplateStatus::Rejected]
    }

    /// Build a corrected draft from a rejected template.
    ///
    /// Terminal templates are never reopened; the correction gets a new id
    /// and keeps title, category, trigger and confidence.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidTransition` if `rejected` is not rejected,
    /// or `AppError::Validation` if `content` is blank.
    pub fn resubmit(rejected: &CommunicationTemplate, content: &str) -> Result<CommunicationTemplate> {
        if rejected.status != TemplateStatus::Rejected {
            return Err(AppError::InvalidTransition(format!(
                "only rejected templates can be resubmitted, {} is {}",
                rejected.id, rejected.status
            )));
        }
        CommunicationTemplate::draft(
            rejected.title.clone(),
            content,
            rejected.category.clone(),
            rejected.trigger,
            rejected.confidence,
        )
    }
}
