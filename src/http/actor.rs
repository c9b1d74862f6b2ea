//! Caller identity from request headers.

use axum::http::HeaderMap;

use crate::models::Actor;
use crate::{AppError, Result};

/// Header carrying the caller's user id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the caller's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Read the acting user from `x-actor-id` / `x-actor-role`.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if either header is missing, blank or
/// not valid text.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor> {
    let id = header_text(headers, ACTOR_ID_HEADER)?;
    let role = header_text(headers, ACTOR_ROLE_HEADER)?;
    Ok(Actor::new(id, role))
}

fn header_text(headers: &HeaderMap, name: &str) -> Result<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AppError::Unauthorized(format!("missing {name} header")))
}
