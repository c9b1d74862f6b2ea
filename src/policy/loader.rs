//! Response settings file loader.
//!
//! Settings for a governed feature live in `{settings_dir}/{feature}.json`
//! as the `camelCase` JSON document exchanged with the REST collaborator.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::settings::ResponseSettings;
use crate::policy::settings::ResponsePolicy;
use crate::{AppError, Result};

/// File extension of settings documents.
pub const SETTINGS_EXTENSION: &str = "json";

/// Loads and validates response settings documents.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Path of the settings document for `feature`.
    #[must_use]
    pub fn path_for(settings_dir: &Path, feature: &str) -> PathBuf {
        settings_dir.join(format!("{feature}.{SETTINGS_EXTENSION}"))
    }

    /// Load the settings for `feature` from `settings_dir`.
    ///
    /// # Behaviour
    ///
    /// - **Missing file**: returns `ResponseSettings::default()`.
    /// - **Empty, malformed or invalid file**: returns an error. A broken
    ///   document is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Policy` if the file cannot be read or parsed and
    /// `AppError::Validation` if it parses but violates the policy
    /// invariants.
    pub fn load(settings_dir: &Path, feature: &str) -> Result<ResponseSettings> {
        let path = Self::path_for(settings_dir, feature);

        if !path.exists() {
            info!(path = %path.display(), "no settings file, using defaults");
            return Ok(ResponseSettings::default());
        }

        Self::load_file(&path)
    }

    /// Load and validate a single settings document.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_file(path: &Path) -> Result<ResponseSettings> {
        let raw = fs::read_to_string(path).map_err(|err| {
            AppError::Policy(format!("failed to read {}: {err}", path.display()))
        })?;

        if raw.trim().is_empty() {
            return Err(AppError::Policy(format!(
                "settings file {} is empty",
                path.display()
            )));
        }

        let settings: ResponseSettings = serde_json::from_str(&raw).map_err(|err| {
            AppError::Policy(format!("malformed settings file {}: {err}", path.display()))
        })?;

        ResponsePolicy::validate(settings)
    }
}
