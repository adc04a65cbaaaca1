//! Caller identity
//!
//! The upstream gateway authenticates the user and forwards the actor in
//! trusted headers. This service never sees credentials.

use axum::extract::FromRequestParts;
use http::request::Parts;
use shared::error::AppError;
use shared::models::{Actor, Role};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const COMPANY_ID_HEADER: &str = "x-company-id";

/// Authenticated actor of the current request
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn actor_from_parts(parts: &Parts) -> Option<Actor> {
    let id = header(parts, ACTOR_ID_HEADER)?.parse().ok()?;
    let role: Role = header(parts, ACTOR_ROLE_HEADER)?.parse().ok()?;
    let company_id = header(parts, COMPANY_ID_HEADER)?.parse().ok()?;
    Some(Actor::new(id, role, company_id))
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(Self(*actor));
        }

        match actor_from_parts(parts) {
            Some(actor) => {
                parts.extensions.insert(actor);
                Ok(Self(actor))
            }
            None => {
                tracing::warn!(uri = %parts.uri, "Missing or malformed actor headers");
                Err(AppError::not_authenticated())
            }
        }
    }
}
