//! Hot-reload file watcher for response settings documents.
//!
//! Watches the settings directory using the `notify` crate. On change
//! events for a registered feature's document, reloads it via
//! [`SettingsLoader`] and swaps the cached value. A document that fails
//! to load leaves the previous settings in place.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, info_span, warn};

use crate::models::settings::ResponseSettings;
use crate::policy::loader::{SettingsLoader, SETTINGS_EXTENSION};
use crate::policy::settings::ResponsePolicy;
use crate::{AppError, Result};

/// Thread-safe in-memory settings cache keyed by feature name.
pub type SettingsCache = Arc<RwLock<HashMap<String, ResponseSettings>>>;

/// Owns the settings directory: loading, caching, persisting and
/// hot-reloading per-feature documents.
pub struct SettingsWatcher {
    settings_dir: PathBuf,
    watcher: Mutex<Option<RecommendedWatcher>>,
    cache: SettingsCache,
}

impl SettingsWatcher {
    /// Create a watcher rooted at `settings_dir` (not yet watching).
    #[must_use]
    pub fn new(settings_dir: PathBuf) -> Self {
        Self {
            settings_dir,
            watcher: Mutex::new(None),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Directory holding the settings documents.
    #[must_use]
    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    /// Shared settings cache.
    #[must_use]
    pub fn cache(&self) -> &SettingsCache {
        &self.cache
    }

    /// Load the initial settings for `feature` and cache them.
    ///
    /// # Errors
    ///
    /// Returns the loader error if the existing document is broken.
    pub async fn register(&self, feature: &str) -> Result<ResponseSettings> {
        let settings = SettingsLoader::load(&self.settings_dir, feature)?;
        self.cache
            .write()
            .await
            .insert(feature.to_owned(), settings.clone());
        info!(feature, "registered response settings");
        Ok(settings)
    }

    /// Start watching the settings directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Policy` if the directory or watcher cannot be
    /// created.
    pub async fn start(&self) -> Result<()> {
        fs::create_dir_all(&self.settings_dir).map_err(|err| {
            AppError::Policy(format!(
                "failed to create settings dir {}: {err}",
                self.settings_dir.display()
            ))
        })?;

        let cache = Arc::clone(&self.cache);
        let mut watcher = notify::recommended_watcher(
            move |result: std::result::Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if !is_settings_event(&event) {
                        return;
                    }
                    for path in &event.paths {
                        reload_path(&cache, path);
                    }
                }
                Err(err) => {
                    warn!(%err, "settings watcher error");
                }
            },
        )
        .map_err(|err| AppError::Policy(format!("failed to create watcher: {err}")))?;

        watcher
            .watch(&self.settings_dir, RecursiveMode::NonRecursive)
            .map_err(|err| AppError::Policy(format!("failed to watch directory: {err}")))?;

        *self.watcher.lock().await = Some(watcher);
        info!(dir = %self.settings_dir.display(), "watching response settings");
        Ok(())
    }

    /// Current settings for `feature`, or defaults if none are cached.
    pub async fn get(&self, feature: &str) -> ResponseSettings {
        self.cache
            .read()
            .await
            .get(feature)
            .cloned()
            .unwrap_or_default()
    }

    /// Validate and persist `settings` for `feature`, replacing the whole
    /// document and the cached value.
    ///
    /// The document is written to a temporary file and renamed into place
    /// so the watcher never observes a partial write.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for invalid settings or
    /// `AppError::Io` if the document cannot be written.
    pub async fn replace(&self, feature: &str, settings: ResponseSettings) -> Result<ResponseSettings> {
        let settings = ResponsePolicy::validate(settings)?;
        let body = serde_json::to_string_pretty(&settings)
            .map_err(|err| AppError::Io(format!("failed to encode settings: {err}")))?;

        fs::create_dir_all(&self.settings_dir)?;
        let target = SettingsLoader::path_for(&self.settings_dir, feature);
        let staging = target.with_extension(format!("{SETTINGS_EXTENSION}.tmp"));
        fs::write(&staging, body)?;
        fs::rename(&staging, &target)?;

        self.cache
            .write()
            .await
            .insert(feature.to_owned(), settings.clone());
        info!(feature, "response settings replaced");
        Ok(settings)
    }

    /// Stop watching. Cached settings stay available.
    pub async fn stop(&self) {
        self.watcher.lock().await.take();
        info!("stopped watching response settings");
    }
}

/// Reload one changed document into the cache, if its feature is registered.
fn reload_path(cache: &SettingsCache, path: &Path) {
    let Some(feature) = feature_name(path) else {
        return;
    };

    let _span = info_span!("settings_reload", feature = %feature).entered();

    // Sync notify callback: blocking access to the tokio lock is fine here.
    let mut guard = cache.blocking_write();
    if !guard.contains_key(&feature) {
        return;
    }

    if !path.exists() {
        warn!("settings file removed, keeping last known settings");
        return;
    }

    match SettingsLoader::load_file(path) {
        Ok(settings) => {
            guard.insert(feature, settings);
            info!("hot-reloaded response settings");
        }
        Err(err) => {
            warn!(%err, "failed to reload settings, keeping previous value");
        }
    }
}

/// Feature name encoded in a settings document path.
fn feature_name(path: &Path) -> Option<String> {
    if path.extension().is_none_or(|ext| ext != SETTINGS_EXTENSION) {
        return None;
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
}

/// Check whether a notify event can affect a settings document.
fn is_settings_event(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| feature_name(p).is_some())
}
