//! Response policy modules.
//!
//! Provides settings validation and immutable updates, escalation rule
//! evaluation, keyword detection, settings loading from the settings
//! directory, hot-reload via file system watching, and the tone/style
//! preference store.

pub mod evaluator;
pub mod keywords;
pub mod loader;
pub mod settings;
pub mod tone_style;
pub mod watcher;
