use std::{net::SocketAddr, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use axum::{
    Extension, Router,
    routing::{get, post},
};

use crate::{
    api, config,
    destination::{playlist::HttpPlaylistWriter, search::HttpTrackSearch},
    error,
    management::{CredentialStore, HttpTokenRefresher},
    source::playlist::HttpPlaylistSource,
};

/// Shared state behind the API endpoints.
///
/// The credential store is the only piece mutated across requests; the
/// provider clients are stateless handles.
pub struct AppState {
    pub store: CredentialStore,
    pub refresher: HttpTokenRefresher,
    pub source: HttpPlaylistSource,
    pub search: HttpTrackSearch,
    pub writer: HttpPlaylistWriter,
    pub search_interval: Duration,
}

impl AppState {
    /// Builds the production state from configuration, with credential
    /// snapshots persisted under the local data directory.
    pub fn from_config() -> Self {
        let mut persist_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        persist_dir.push("trackport/credentials");

        AppState {
            store: CredentialStore::new(config::token_refresh_buffer_secs())
                .with_persistence(persist_dir),
            refresher: HttpTokenRefresher,
            source: HttpPlaylistSource::new(),
            search: HttpTrackSearch::new(),
            writer: HttpPlaylistWriter::new(),
            search_interval: config::search_interval(),
        }
    }
}

pub async fn start_api_server(state: Arc<AppState>, addr: String) {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/connect", post(api::connect))
        .route("/disconnect", post(api::disconnect))
        .route("/migrate", post(api::migrate))
        .layer(Extension(state));

    let addr = match SocketAddr::from_str(&addr) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
