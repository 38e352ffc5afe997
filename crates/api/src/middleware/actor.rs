//! Identification of the acting user.
//!
//! Authentication happens upstream; mutating requests name the acting user
//! in the `X-User-Id` header and the id is recorded as creator.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde_json::json;
use uuid::Uuid;

/// Header carrying the acting user's id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Extractor for the acting user.
///
/// ```ignore
/// async fn handler(actor: Actor) -> impl IntoResponse {
///     let user_id = actor.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub Uuid);

impl Actor {
    /// Returns the acting user's id.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0
    }
}

fn parse_actor(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_actor)
            .map(Actor)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "missing_actor",
                        "message": "X-User-Id header with a valid user id is required"
                    })),
                )
            })
    }
}
