//! Reviewer role set.

use std::collections::BTreeSet;

/// Roles allowed to approve or reject templates when none are configured.
pub const DEFAULT_APPROVER_ROLES: [&str; 3] = ["admin", "manager", "approver"];

/// Normalized set of roles allowed to review templates.
///
/// Role names compare case-insensitively and ignore surrounding
/// whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproverRoles {
    roles: BTreeSet<String>,
}

impl ApproverRoles {
    /// Build from role names. Blank names are dropped.
    #[must_use]
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roles: roles
                .into_iter()
                .map(|r| normalize(r.as_ref()))
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Whether `role` may review templates.
    #[must_use]
    pub fn allows(&self, role: &str) -> bool {
        self.roles.contains(&normalize(role))
    }

    /// Whether the set is empty (nobody can review).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Iterate over normalized role names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

impl Default for ApproverRoles {
    fn default() -> Self {
        Self::new(DEFAULT_APPROVER_ROLES)
    }
}

fn normalize(role: &str) -> String {
    role.trim().to_ascii_lowercase()
}
