//! AI-drafted communication template model.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::catalog::ResponseTrigger;
use crate::{AppError, Result};

/// Author recorded on templates produced by the drafting process.
pub const AI_AUTHOR: &str = "AI System";

/// Lifecycle status for a communication template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    /// Freshly drafted, not yet submitted.
    Draft,
    /// Awaiting reviewer decision.
    Pending,
    /// Accepted for automated dispatch.
    Approved,
    /// Refused by a reviewer.
    Rejected,
}

impl TemplateStatus {
    /// Wire name (`snake_case`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Terminal states admit no further transition.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl Display for TemplateStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message candidate subject to human approval before dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationTemplate {
    /// Unique record identifier.
    pub id: String,
    /// Short title shown to reviewers.
    pub title: String,
    /// Reply body.
    pub content: String,
    /// Free-form grouping (e.g. "maintenance").
    pub category: String,
    /// Trigger the template answers.
    pub trigger: ResponseTrigger,
    /// Current lifecycle status.
    pub status: TemplateStatus,
    /// Author; [`AI_AUTHOR`] for drafted templates.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Reviewer identifier, set on approval or rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    /// Review timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer comments; mandatory on rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_comments: Option<String>,
    /// Drafting model confidence in `0.0..=1.0`.
    pub confidence: f64,
}

impl CommunicationTemplate {
    /// Construct a new AI-drafted template in [`TemplateStatus::Draft`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `confidence` is outside `0.0..=1.0`
    /// or the title or content is blank.
    pub fn draft(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
        trigger: ResponseTrigger,
        confidence: f64,
    ) -> Result<Self> {
        let title = title.into();
        let content = content.into();

        if !(0.0..=1.0).contains(&confidence) {
            return Err(AppError::Validation(format!(
                "confidence must be within 0..1, got {confidence}"
            )));
        }
        if title.trim().is_empty() {
            return Err(AppError::Validation("template title must not be empty".into()));
        }
        if content.trim().is_empty() {
            return Err(AppError::Validation(
                "template content must not be empty".into(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            category: category.into(),
            trigger,
            status: TemplateStatus::Draft,
            created_by: AI_AUTHOR.to_owned(),
            created_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            review_comments: None,
            confidence,
        })
    }

    /// Whether the template may be used for automated dispatch.
    #[must_use]
    pub fn is_dispatchable(&self) -> bool {
        self.status == TemplateStatus::Approved
    }
}
