use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::IntoResponse,
};
use serde_json::json;

use crate::types::SessionContext;

/// Header the upstream session layer sets to identify the authenticated
/// user. Session management itself (cookies, OAuth sign-in) lives in front
/// of this service.
pub const HEADER_USER_ID: &str = "x-user-id";

pub enum SessionRejection {
    MissingUser,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionRejection::MissingUser => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required." })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(HEADER_USER_ID)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|user_id| SessionContext {
                user_id: user_id.to_string(),
            })
            .ok_or(SessionRejection::MissingUser)
    }
}
