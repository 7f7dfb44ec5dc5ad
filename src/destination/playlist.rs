use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::{
    config,
    types::{AppendItemRequest, CreatePlaylistRequest, CreatePlaylistResponse, Credential},
    utils,
};

/// Creating or populating the destination playlist failed.
///
/// Always fatal for the migration request: a playlist that exists but is
/// only partially populated must not be reported as success.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to create destination playlist: {0}")]
    Create(String),
    #[error("failed to append item to destination playlist: {0}")]
    Append(String),
}

/// Playlist creation and item appends on the destination provider.
#[async_trait]
pub trait PlaylistWriter: Send + Sync {
    async fn create_playlist(
        &self,
        credential: &Credential,
        title: &str,
    ) -> Result<String, BuildError>;

    async fn append_item(
        &self,
        credential: &Credential,
        playlist_id: &str,
        item_id: &str,
    ) -> Result<(), BuildError>;
}

/// Writes playlists through the configured destination provider API.
pub struct HttpPlaylistWriter {
    client: Client,
    base_url: String,
}

impl HttpPlaylistWriter {
    pub fn new() -> Self {
        HttpPlaylistWriter {
            client: utils::http_client(),
            base_url: config::destination_api_url(),
        }
    }
}

#[async_trait]
impl PlaylistWriter for HttpPlaylistWriter {
    async fn create_playlist(
        &self,
        credential: &Credential,
        title: &str,
    ) -> Result<String, BuildError> {
        let api_url = format!("{uri}/playlists", uri = self.base_url);
        let token = credential.access_token.as_deref().unwrap_or_default();

        let body = CreatePlaylistRequest {
            title: title.to_string(),
            // new playlists are private by convention
            privacy: "private".to_string(),
        };

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| BuildError::Create(e.to_string()))?
            .error_for_status()
            .map_err(|e| BuildError::Create(e.to_string()))?;

        let created = response
            .json::<CreatePlaylistResponse>()
            .await
            .map_err(|e| BuildError::Create(e.to_string()))?;

        Ok(created.id)
    }

    async fn append_item(
        &self,
        credential: &Credential,
        playlist_id: &str,
        item_id: &str,
    ) -> Result<(), BuildError> {
        let api_url = format!(
            "{uri}/playlists/{id}/items",
            uri = self.base_url,
            id = playlist_id
        );
        let token = credential.access_token.as_deref().unwrap_or_default();

        let body = AppendItemRequest {
            item_id: item_id.to_string(),
        };

        self.client
            .post(&api_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| BuildError::Append(e.to_string()))?
            .error_for_status()
            .map_err(|e| BuildError::Append(e.to_string()))?;

        Ok(())
    }
}

/// Creates the destination playlist and appends the matched items to it.
///
/// Items are appended one at a time in the order given, which preserves
/// original track order. The first failure aborts and surfaces as a
/// [`BuildError`]; there is no rollback of the partially built playlist.
pub async fn populate_playlist(
    api: &dyn PlaylistWriter,
    credential: &Credential,
    title: &str,
    item_ids: &[String],
) -> Result<String, BuildError> {
    let playlist_id = api.create_playlist(credential, title).await?;

    for item_id in item_ids {
        api.append_item(credential, &playlist_id, item_id).await?;
    }

    Ok(playlist_id)
}
