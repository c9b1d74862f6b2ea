//! Domain model module declarations.

pub mod catalog;
pub mod conversation;
pub mod settings;
pub mod template;

use serde::{Deserialize, Serialize};

/// Caller performing a governed action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Stable user identifier, recorded as `reviewedBy`.
    pub id: String,
    /// Role name (e.g. `manager`, `tenant`).
    pub role: String,
}

impl Actor {
    /// Construct an actor.
    #[must_use]
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
        }
    }
}
