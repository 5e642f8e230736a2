//! Axum extractor for the request actor.
//!
//! The actor is read from `x-user-id` (identifier) and `x-user-roles`
//! (comma-separated role list). A request without `x-user-id` is anonymous.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};

use crate::actor::Actor;

/// Header carrying the actor identifier.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the comma-separated roles of the actor.
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Reads the actor from request headers.
pub fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    let roles = headers
        .get(USER_ROLES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Some(Actor {
        id: id.to_string(),
        roles,
    })
}

/// Extracted actor, `None` for anonymous requests.
#[derive(Debug, Clone, Default)]
pub struct RequestActor(pub Option<Actor>);

impl<S> FromRequestParts<S> for RequestActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = actor_from_headers(&parts.headers);
        if let Some(actor) = &actor {
            tracing::trace!(actor = %actor.id, roles = ?actor.roles, "Request actor");
        }
        Ok(Self(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_anonymous_without_header() {
        assert!(actor_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_roles_are_split_and_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("ann"));
        headers.insert(USER_ROLES_HEADER, HeaderValue::from_static("admin, clerk,,"));

        let actor = actor_from_headers(&headers).unwrap();
        assert_eq!(actor.id, "ann");
        assert_eq!(actor.roles, vec!["admin", "clerk"]);
    }

    #[test]
    fn test_blank_id_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        assert!(actor_from_headers(&headers).is_none());
    }
}
