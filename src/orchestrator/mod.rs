//! Governance service wiring the policy core to its collaborators.
//!
//! [`GovernanceService`] owns the settings watcher, tone/style store,
//! template store, directive registry, escalation sink and audit trail, and exposes the
//! flows the HTTP layer and the directive consumer drive:
//!
//! - [`conversation_flow`]: inbound messages, escalation checks and
//!   conversation resolution, serialized per conversation.
//! - [`template_workflow`]: drafting, review and resubmission of templates.

pub mod conversation_flow;
pub mod template_workflow;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::audit::{AuditEntry, AuditEventType, AuditLogger};
use crate::dispatch::EscalationSink;
use crate::governance::selection::TemplateSelector;
use crate::governance::TemplateGovernance;
use crate::models::catalog::{ToneStyle, ToneStylePatch};
use crate::models::settings::{ResponseSettings, SettingsPatch};
use crate::models::Actor;
use crate::persistence::template_repo::TemplateRepo;
use crate::policy::keywords::KeywordDetector;
use crate::policy::settings::ResponsePolicy;
use crate::policy::tone_style::ToneStyleStore;
use crate::policy::watcher::SettingsWatcher;
use crate::scheduler::business_hours::BusinessHours;
use crate::scheduler::directives::DirectiveRegistry;
use crate::scheduler::locks::ConversationLocks;
use crate::{GlobalConfig, Result};

pub use conversation_flow::InboundOutcome;
pub use template_workflow::NewTemplate;

/// Shared application service.
pub struct GovernanceService {
    feature: String,
    settings: Arc<SettingsWatcher>,
    templates: TemplateRepo,
    governance: TemplateGovernance,
    selector: TemplateSelector,
    keywords: KeywordDetector,
    business_hours: BusinessHours,
    directives: Arc<DirectiveRegistry>,
    locks: ConversationLocks,
    settings_write: Mutex<()>,
    tone_style: ToneStyleStore,
    sink: Arc<dyn EscalationSink>,
    audit: Option<Arc<dyn AuditLogger>>,
}

impl GovernanceService {
    /// Assemble the service from configuration and collaborators.
    #[must_use]
    pub fn new(
        config: &GlobalConfig,
        settings: Arc<SettingsWatcher>,
        templates: TemplateRepo,
        directives: Arc<DirectiveRegistry>,
        sink: Arc<dyn EscalationSink>,
    ) -> Self {
        Self {
            feature: config.feature.clone(),
            settings,
            templates,
            governance: TemplateGovernance::new(config.governance.approvers()),
            selector: TemplateSelector::new(
                config.governance.rejected_template_policy,
                config.governance.fallback_template_id.clone(),
            ),
            keywords: KeywordDetector::new(&config.keywords.patterns),
            business_hours: config.business_hours.clone(),
            directives,
            locks: ConversationLocks::new(),
            settings_write: Mutex::new(()),
            tone_style: ToneStyleStore::new(&config.settings_dir, &config.feature),
            sink,
            audit: None,
        }
    }

    /// Record governance events through `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Governed feature name.
    #[must_use]
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Template governance rules in force.
    #[must_use]
    pub fn governance(&self) -> &TemplateGovernance {
        &self.governance
    }

    /// Pending reply directives.
    #[must_use]
    pub fn directives(&self) -> &Arc<DirectiveRegistry> {
        &self.directives
    }

    /// Conversations currently holding an entry in the lock table.
    #[must_use]
    pub fn tracked_conversations(&self) -> usize {
        self.locks.len()
    }

    /// Current response settings; defaults when none are stored.
    pub async fn settings(&self) -> ResponseSettings {
        self.settings.get(&self.feature).await
    }

    /// Merge `patch` into the current settings and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the merged settings are invalid,
    /// leaving the stored settings untouched, or `AppError::Io` if they
    /// cannot be written.
    pub async fn update_settings(&self, patch: &SettingsPatch, actor: &Actor) -> Result<ResponseSettings> {
        let _write = self.settings_write.lock().await;
        let current = self.settings().await;
        let updated = ResponsePolicy::update(&current, patch)?;
        let stored = self.settings.replace(&self.feature, updated).await?;

        self.record(
            AuditEntry::new(AuditEventType::SettingsUpdated)
                .with_actor(actor)
                .with_detail(serde_json::json!({ "feature": self.feature })),
        );
        Ok(stored)
    }

    /// Current tone and style preference; defaults when none is stored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Policy` if the stored document is unreadable.
    pub async fn tone_style(&self) -> Result<ToneStyle> {
        self.tone_style.get().await
    }

    /// Merge `patch` into the tone and style preference and persist it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Policy` if the stored document is unreadable or
    /// `AppError::Io` if the result cannot be written.
    pub async fn update_tone_style(&self, patch: &ToneStylePatch, actor: &Actor) -> Result<ToneStyle> {
        let stored = self.tone_style.update(patch).await?;
        self.record(
            AuditEntry::new(AuditEventType::ToneStyleUpdated)
                .with_actor(actor)
                .with_detail(serde_json::json!({
                    "feature": self.feature,
                    "tone": stored.tone,
                    "style": stored.style,
                })),
        );
        Ok(stored)
    }

    /// Append to the audit trail. Audit failures are logged, never raised.
    fn record(&self, entry: AuditEntry) {
        if let Some(audit) = &self.audit {
            if let Err(err) = audit.log_entry(entry) {
                warn!(%err, "failed to record audit entry");
            }
        }
    }
}
