use std::sync::Arc;

use axum::{
    Extension, Json,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    info,
    server::AppState,
    types::{DisconnectRequest, SessionContext},
};

/// Clears the named provider's credential fields for the session user.
///
/// Disconnecting an already-absent credential still responds with success:
/// the desired state (disconnected) is achieved either way.
pub async fn disconnect(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionContext,
    Json(request): Json<DisconnectRequest>,
) -> Response {
    state
        .store
        .disconnect(&session.user_id, request.provider)
        .await;
    info!(
        "Disconnected {} provider for user {}",
        request.provider, session.user_id
    );

    Json(json!({ "disconnected": request.provider })).into_response()
}
