use std::sync::Arc;

use axum::{
    Extension, Json,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use crate::{
    info,
    server::AppState,
    types::{ConnectRequest, Credential, SessionContext},
};

/// Stores the tokens produced by the upstream OAuth code exchange as this
/// user's credential for one provider, replacing any previous credential.
pub async fn connect(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionContext,
    Json(request): Json<ConnectRequest>,
) -> Response {
    let expires_at = request
        .expires_in
        .map(|secs| Utc::now().timestamp() + secs as i64);

    let credential = Credential {
        provider: request.provider,
        access_token: Some(request.access_token),
        refresh_token: request.refresh_token,
        expires_at,
    };

    state.store.link(&session.user_id, credential).await;
    info!(
        "Linked {} provider for user {}",
        request.provider, session.user_id
    );

    Json(json!({ "connected": request.provider })).into_response()
}
