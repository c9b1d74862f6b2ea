//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Configuration file parsing or validation failure.
    Config(String),
    /// Persistence failure when interacting with `SQLite`.
    Db(String),
    /// Malformed response settings (negative delay, duplicate rule id, ...).
    Validation(String),
    /// Escalation rule uses a condition this build does not support.
    Configuration(String),
    /// Illegal template status move.
    InvalidTransition(String),
    /// Caller's role is not allowed to perform the requested action.
    Unauthorized(String),
    /// Template rejection attempted without review comments.
    MissingReason(String),
    /// Requested entity does not exist.
    NotFound(String),
    /// Settings file loading or watching failure.
    Policy(String),
    /// Escalation notice could not be delivered.
    Dispatch(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl AppError {
    /// Stable machine-readable kind, used in HTTP error bodies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Db(_) => "db",
            Self::Validation(_) => "validation",
            Self::Configuration(_) => "configuration",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::Unauthorized(_) => "unauthorized",
            Self::MissingReason(_) => "missing_reason",
            Self::NotFound(_) => "not_found",
            Self::Policy(_) => "policy",
            Self::Dispatch(_) => "dispatch",
            Self::Io(_) => "io",
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Db(msg) => write!(f, "db: {msg}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::Configuration(msg) => write!(f, "configuration: {msg}"),
            Self::InvalidTransition(msg) => write!(f, "invalid transition: {msg}"),
            Self::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            Self::MissingReason(msg) => write!(f, "missing reason: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Policy(msg) => write!(f, "policy: {msg}"),
            Self::Dispatch(msg) => write!(f, "dispatch: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("invalid json: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
