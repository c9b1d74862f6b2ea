//! Response policy validation and immutable updates.
//!
//! Settings are only ever replaced as a whole: every edit goes through
//! [`ResponsePolicy::update`], which merges the patch into a fresh value
//! and validates it before anything is handed back. A failing patch
//! leaves the caller's settings untouched.

use std::collections::HashSet;

use tracing::{info_span, warn};

use crate::models::settings::{EscalationRule, ResponseSettings, SettingsPatch};
use crate::{AppError, Result};

/// Validates and updates [`ResponseSettings`].
pub struct ResponsePolicy;

impl ResponsePolicy {
    /// Check `settings` against the policy invariants.
    ///
    /// Unrecognized rule conditions are accepted here and reported by the
    /// escalation evaluator; they are logged as a warning.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when `delayMinutes < 0`,
    /// `maxAttempts < 1`, a rule id is empty or duplicated, or a rule
    /// threshold is negative or above its unit's maximum.
    pub fn validate(settings: ResponseSettings) -> Result<ResponseSettings> {
        if settings.delay_minutes < 0 {
            return Err(AppError::Validation(format!(
                "delayMinutes must be >= 0, got {}",
                settings.delay_minutes
            )));
        }

        if settings.max_attempts < 1 {
            return Err(AppError::Validation(format!(
                "maxAttempts must be >= 1, got {}",
                settings.max_attempts
            )));
        }

        let mut seen = HashSet::with_capacity(settings.escalation_rules.len());
        for rule in &settings.escalation_rules {
            validate_rule(rule)?;
            if !seen.insert(rule.id.as_str()) {
                return Err(AppError::Validation(format!(
                    "duplicate escalation rule id: {}",
                    rule.id
                )));
            }
        }

        Ok(settings)
    }

    /// Merge `patch` into `settings`, returning the validated result.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the merged settings are invalid;
    /// no part of the patch is applied in that case.
    pub fn update(settings: &ResponseSettings, patch: &SettingsPatch) -> Result<ResponseSettings> {
        let _span = info_span!("settings_update").entered();
        Self::validate(patch.apply_to(settings))
    }

    /// Replace the rule with the same id, or append `rule` if it is new.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the result is invalid.
    pub fn upsert_rule(settings: &ResponseSettings, rule: EscalationRule) -> Result<ResponseSettings> {
        let mut rules = settings.escalation_rules.clone();
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
        Self::update(settings, &SettingsPatch::rules(rules))
    }

    /// Remove the rule with `rule_id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no rule has that id.
    pub fn remove_rule(settings: &ResponseSettings, rule_id: &str) -> Result<ResponseSettings> {
        if settings.rule(rule_id).is_none() {
            return Err(AppError::NotFound(format!("escalation rule {rule_id}")));
        }
        let rules = settings
            .escalation_rules
            .iter()
            .filter(|r| r.id != rule_id)
            .cloned()
            .collect();
        Self::update(settings, &SettingsPatch::rules(rules))
    }

    /// Flip the `enabled` flag of the rule with `rule_id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no rule has that id.
    pub fn toggle_rule(settings: &ResponseSettings, rule_id: &str) -> Result<ResponseSettings> {
        let Some(current) = settings.rule(rule_id) else {
            return Err(AppError::NotFound(format!("escalation rule {rule_id}")));
        };
        let toggled = EscalationRule {
            enabled: !current.enabled,
            ..current.clone()
        };
        Self::upsert_rule(settings, toggled)
    }
}

fn validate_rule(rule: &EscalationRule) -> Result<()> {
    if rule.id.trim().is_empty() {
        return Err(AppError::Validation(
            "escalation rule id must not be empty".into(),
        ));
    }

    if rule.threshold < 0 {
        return Err(AppError::Validation(format!(
            "rule {}: threshold must be >= 0, got {}",
            rule.id, rule.threshold
        )));
    }

    match rule.condition.known() {
        Some(condition) => {
            if let Some(max) = condition.unit().max() {
                if rule.threshold > max {
                    return Err(AppError::Validation(format!(
                        "rule {}: {} threshold must be <= {max}, got {}",
                        rule.id, condition, rule.threshold
                    )));
                }
            }
        }
        None => {
            warn!(
                rule_id = %rule.id,
                condition = %rule.condition,
                "unrecognized escalation condition; rule will never fire"
            );
        }
    }

    Ok(())
}
