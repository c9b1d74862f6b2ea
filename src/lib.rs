#![forbid(unsafe_code)]

//! Governance core for AI-drafted tenant communications.
//!
//! Decides whether and when automated replies go out, when conversations
//! escalate to humans, and which drafted templates may be used at all.

pub mod audit;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod governance;
pub mod http;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod policy;
pub mod scheduler;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
