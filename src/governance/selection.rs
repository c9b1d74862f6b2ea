//! Choosing the template an automated reply uses.
//!
//! Only approved templates whose trigger is governed by the active settings
//! are eligible. When nothing is eligible and the trigger's most recent
//! template was rejected, the configured [`RejectedTemplatePolicy`] decides.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::catalog::ResponseTrigger;
use crate::models::settings::ResponseSettings;
use crate::models::template::{CommunicationTemplate, TemplateStatus};

/// Behaviour when a trigger's latest template was rejected and no approved
/// template remains.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectedTemplatePolicy {
    /// Send nothing.
    #[default]
    NoResponse,
    /// Use the configured fallback template.
    FallbackTemplate,
    /// Hand the conversation to a human.
    Escalate,
}

/// Outcome of template selection.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSelection {
    /// Reply with this approved template.
    Use(CommunicationTemplate),
    /// No automated reply.
    NoResponse,
    /// Escalate instead of replying.
    Escalate,
}

/// Picks dispatchable templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateSelector {
    on_rejected: RejectedTemplatePolicy,
    fallback_template_id: Option<String>,
}

impl TemplateSelector {
    /// Create a selector with the given rejection fallback.
    #[must_use]
    pub fn new(on_rejected: RejectedTemplatePolicy, fallback_template_id: Option<String>) -> Self {
        Self {
            on_rejected,
            fallback_template_id,
        }
    }

    /// Fallback template id, when the rejection policy uses one.
    ///
    /// The fallback may answer another trigger, so callers loading
    /// candidates by trigger must add it to the candidate set.
    #[must_use]
    pub fn fallback_template_id(&self) -> Option<&str> {
        match self.on_rejected {
            RejectedTemplatePolicy::FallbackTemplate => self.fallback_template_id.as_deref(),
            RejectedTemplatePolicy::NoResponse | RejectedTemplatePolicy::Escalate => None,
        }
    }

    /// Select the template answering `trigger` among `templates`.
    ///
    /// Eligible templates are approved, match `trigger` and the trigger is
    /// governed by `settings`. The best has the highest confidence, then
    /// the earliest `created_at`, then the smallest id.
    #[must_use]
    pub fn select(
        &self,
        trigger: ResponseTrigger,
        settings: &ResponseSettings,
        templates: &[CommunicationTemplate],
    ) -> TemplateSelection {
        if !settings.governs(trigger) {
            debug!(%trigger, "trigger not governed, no template eligible");
            return TemplateSelection::NoResponse;
        }

        let best = templates
            .iter()
            .filter(|t| t.trigger == trigger && t.is_dispatchable())
            .min_by(|a, b| rank(a, b));
        if let Some(template) = best {
            return TemplateSelection::Use(template.clone());
        }

        let latest = templates
            .iter()
            .filter(|t| t.trigger == trigger)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        match latest {
            Some(t) if t.status == TemplateStatus::Rejected => {
                self.on_rejected(trigger, settings, templates)
            }
            _ => TemplateSelection::NoResponse,
        }
    }

    fn on_rejected(
        &self,
        trigger: ResponseTrigger,
        settings: &ResponseSettings,
        templates: &[CommunicationTemplate],
    ) -> TemplateSelection {
        match self.on_rejected {
            RejectedTemplatePolicy::NoResponse => TemplateSelection::NoResponse,
            RejectedTemplatePolicy::Escalate => TemplateSelection::Escalate,
            RejectedTemplatePolicy::FallbackTemplate => {
                let fallback = self.fallback_template_id.as_deref().and_then(|id| {
                    templates
                        .iter()
                        .find(|t| t.id == id && t.is_dispatchable() && settings.governs(t.trigger))
                });
                match fallback {
                    Some(template) => TemplateSelection::Use(template.clone()),
                    None => {
                        warn!(
                            %trigger,
                            fallback_template_id = ?self.fallback_template_id,
                            "fallback template unavailable, sending nothing"
                        );
                        TemplateSelection::NoResponse
                    }
                }
            }
        }
    }
}

fn rank(a: &CommunicationTemplate, b: &CommunicationTemplate) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
