//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::governance::roles::{ApproverRoles, DEFAULT_APPROVER_ROLES};
use crate::governance::selection::RejectedTemplatePolicy;
use crate::scheduler::business_hours::BusinessHours;
use crate::{AppError, Result};

/// Template review configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GovernanceConfig {
    /// Roles allowed to approve or reject templates.
    #[serde(default = "default_approver_roles")]
    pub approver_roles: Vec<String>,
    /// What to send when a trigger's latest template was rejected.
    #[serde(default)]
    pub rejected_template_policy: RejectedTemplatePolicy,
    /// Approved template used by [`RejectedTemplatePolicy::FallbackTemplate`].
    #[serde(default)]
    pub fallback_template_id: Option<String>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            approver_roles: default_approver_roles(),
            rejected_template_policy: RejectedTemplatePolicy::default(),
            fallback_template_id: None,
        }
    }
}

impl GovernanceConfig {
    /// Normalized approver role set.
    #[must_use]
    pub fn approvers(&self) -> ApproverRoles {
        ApproverRoles::new(&self.approver_roles)
    }
}

/// Escalation notice delivery.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct EscalationConfig {
    /// Endpoint receiving escalation notices; notices are only logged when
    /// unset.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Webhook request timeout.
    #[serde(default = "default_webhook_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_seconds: default_webhook_timeout_seconds(),
        }
    }
}

impl EscalationConfig {
    /// Webhook timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Watched keyword patterns feeding the `specific_keywords` condition.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct KeywordsConfig {
    /// Case-insensitive regular expressions.
    #[serde(default)]
    pub patterns: Vec<String>,
}

fn default_approver_roles() -> Vec<String> {
    DEFAULT_APPROVER_ROLES.iter().map(|r| (*r).to_owned()).collect()
}

fn default_webhook_timeout_seconds() -> u64 {
    10
}

fn default_http_port() -> u16 {
    3000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data").join("governor.db")
}

fn default_settings_dir() -> PathBuf {
    PathBuf::from("settings")
}

fn default_feature() -> String {
    "tenant-messages".into()
}

fn default_retention_days() -> u32 {
    90
}

fn default_directive_tick_seconds() -> u64 {
    5
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// HTTP listen port.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// `SQLite` database file holding templates.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Directory holding one settings document per governed feature.
    #[serde(default = "default_settings_dir")]
    pub settings_dir: PathBuf,
    /// Feature whose settings the HTTP API serves.
    #[serde(default = "default_feature")]
    pub feature: String,
    /// Days after review before rejected templates are purged; 0 keeps
    /// them forever.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Interval at which due reply directives are released.
    #[serde(default = "default_directive_tick_seconds")]
    pub directive_tick_seconds: u64,
    /// Directory for daily audit logs; auditing is off when unset.
    #[serde(default)]
    pub audit_dir: Option<PathBuf>,
    /// Template review settings.
    #[serde(default)]
    pub governance: GovernanceConfig,
    /// Office hours used to fill `isBusinessHours`.
    #[serde(default)]
    pub business_hours: BusinessHours,
    /// Escalation delivery.
    #[serde(default)]
    pub escalation: EscalationConfig,
    /// Keyword detection.
    #[serde(default)]
    pub keywords: KeywordsConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            db_path: default_db_path(),
            settings_dir: default_settings_dir(),
            feature: default_feature(),
            retention_days: default_retention_days(),
            directive_tick_seconds: default_directive_tick_seconds(),
            audit_dir: None,
            governance: GovernanceConfig::default(),
            business_hours: BusinessHours::default(),
            escalation: EscalationConfig::default(),
            keywords: KeywordsConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Directive pump interval.
    #[must_use]
    pub fn directive_tick(&self) -> Duration {
        Duration::from_secs(self.directive_tick_seconds)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.feature.is_empty()
            || !self
                .feature
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AppError::Config(format!(
                "feature must be non-empty and use only [A-Za-z0-9_-], got '{}'",
                self.feature
            )));
        }

        if self.directive_tick_seconds == 0 {
            return Err(AppError::Config(
                "directive_tick_seconds must be greater than zero".into(),
            ));
        }

        if self.governance.approvers().is_empty() {
            return Err(AppError::Config(
                "governance.approver_roles must name at least one role".into(),
            ));
        }

        if self.governance.rejected_template_policy == RejectedTemplatePolicy::FallbackTemplate
            && self
                .governance
                .fallback_template_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            return Err(AppError::Config(
                "governance.fallback_template_id is required when rejected_template_policy is fallback_template".into(),
            ));
        }

        self.business_hours.validate()?;

        if self.escalation.timeout_seconds == 0 {
            return Err(AppError::Config(
                "escalation.timeout_seconds must be greater than zero".into(),
            ));
        }
        if let Some(url) = &self.escalation.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "escalation.webhook_url must be an http(s) url, got '{url}'"
                )));
            }
        }

        for pattern in &self.keywords.patterns {
            regex::Regex::new(pattern).map_err(|err| {
                AppError::Config(format!("invalid keyword pattern '{pattern}': {err}"))
            })?;
        }

        Ok(())
    }
}
