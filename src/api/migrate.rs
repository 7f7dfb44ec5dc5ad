use std::sync::Arc;

use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::{
    destination,
    migration::{self, MigrationContext},
    server::AppState,
    types::{MigrationRequest, SessionContext},
    warning,
};

pub async fn migrate(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionContext,
    Json(request): Json<MigrationRequest>,
) -> Response {
    // One limiter per request: the pipeline is sequential within a request,
    // while requests for different users run in parallel.
    let limiter = destination::search::search_limiter(state.search_interval);
    let cancel = CancellationToken::new();

    let ctx = MigrationContext {
        session: &session,
        store: &state.store,
        refresher: &state.refresher,
        source: &state.source,
        search: &state.search,
        writer: &state.writer,
        limiter: &limiter,
        cancel: &cancel,
    };

    match migration::run_migration(&ctx, &request).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            warning!("Migration failed for user {}: {}", session.user_id, e);
            (e.status_code(), Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
