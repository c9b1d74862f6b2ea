//! Tone and style preference storage.
//!
//! One document per feature at `{settings_dir}/tone-style/{feature}.json`.
//! The settings watcher only reloads top-level documents, so these are
//! read once and then changed only through [`ToneStyleStore::update`].

use std::fs;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::info;

use crate::models::catalog::{ToneStyle, ToneStylePatch};
use crate::{AppError, Result};

/// Subdirectory of the settings directory holding tone/style documents.
pub const TONE_STYLE_DIR: &str = "tone-style";

/// Lazily loaded, write-through tone/style preference of one feature.
#[derive(Debug)]
pub struct ToneStyleStore {
    path: PathBuf,
    current: Mutex<Option<ToneStyle>>,
}

impl ToneStyleStore {
    /// Store for `feature` under `settings_dir`. Nothing is read until
    /// first use.
    #[must_use]
    pub fn new(settings_dir: &Path, feature: &str) -> Self {
        Self {
            path: settings_dir.join(TONE_STYLE_DIR).join(format!("{feature}.json")),
            current: Mutex::new(None),
        }
    }

    /// Document location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current preference; defaults when no document exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Policy` if the document is empty or malformed.
    pub async fn get(&self) -> Result<ToneStyle> {
        let mut current = self.current.lock().await;
        if let Some(tone_style) = current.as_ref() {
            return Ok(tone_style.clone());
        }
        let loaded = load(&self.path)?;
        *current = Some(loaded.clone());
        Ok(loaded)
    }

    /// Apply `patch` and persist the result with a rename into place.
    ///
    /// Concurrent updates are serialized; each sees the previous result.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Policy` if the stored document is unreadable or
    /// `AppError::Io` if the new one cannot be written.
    pub async fn update(&self, patch: &ToneStylePatch) -> Result<ToneStyle> {
        let mut current = self.current.lock().await;
        let base = match current.as_ref() {
            Some(tone_style) => tone_style.clone(),
            None => load(&self.path)?,
        };
        let updated = base.apply(patch);

        let body = serde_json::to_string_pretty(&updated)
            .map_err(|err| AppError::Io(format!("failed to encode tone/style: {err}")))?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body)?;
        fs::rename(&staging, &self.path)?;

        *current = Some(updated.clone());
        info!(tone = %updated.tone.as_str(), style = %updated.style.as_str(), "tone/style updated");
        Ok(updated)
    }
}

fn load(path: &Path) -> Result<ToneStyle> {
    if !path.exists() {
        return Ok(ToneStyle::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|err| AppError::Policy(format!("failed to read {}: {err}", path.display())))?;
    if raw.trim().is_empty() {
        return Err(AppError::Policy(format!(
            "tone/style file {} is empty",
            path.display()
        )));
    }
    serde_json::from_str(&raw).map_err(|err| {
        AppError::Policy(format!("malformed tone/style file {}: {err}", path.display()))
    })
}
