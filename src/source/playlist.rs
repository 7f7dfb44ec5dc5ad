use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::{
    config,
    types::{Credential, PlaylistTracksPage, Track, TrackWindow},
    utils,
};

/// A playlist could not be fetched from the source provider.
///
/// Scoped to a single playlist; the orchestrator recovers by skipping it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("playlist page request failed: {0}")]
    Request(String),
    #[error("playlist page could not be decoded: {0}")]
    Decode(String),
}

/// One page of a playlist's tracks from the source provider.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn fetch_page(
        &self,
        credential: &Credential,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<PlaylistTracksPage, FetchError>;
}

/// Fetches pages from the configured source provider API.
pub struct HttpPlaylistSource {
    client: Client,
    base_url: String,
    page_size: u32,
}

impl HttpPlaylistSource {
    pub fn new() -> Self {
        HttpPlaylistSource {
            client: utils::http_client(),
            base_url: config::source_api_url(),
            page_size: config::fetch_page_size(),
        }
    }
}

#[async_trait]
impl PlaylistSource for HttpPlaylistSource {
    async fn fetch_page(
        &self,
        credential: &Credential,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<PlaylistTracksPage, FetchError> {
        let mut api_url = format!(
            "{uri}/playlists/{id}/tracks?limit={limit}",
            uri = self.base_url,
            id = playlist_id,
            limit = self.page_size
        );
        if let Some(cursor) = cursor {
            api_url.push_str(&format!("&cursor={}", cursor));
        }

        let token = credential.access_token.as_deref().unwrap_or_default();
        let response = self
            .client
            .get(&api_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        response
            .json::<PlaylistTracksPage>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Retrieves all tracks of a source playlist, following pagination to
/// completion.
///
/// Tracks accumulate in source-provider order (oldest-added-first). Items
/// without a resolvable track (removed or local-only entries, or entries
/// with no named artist) are skipped silently. A `window`, when present, is
/// applied after the full fetch: with `latest_first` the sequence is
/// reversed and truncated to the window limit.
pub async fn fetch_tracks(
    api: &dyn PlaylistSource,
    credential: &Credential,
    playlist_id: &str,
    window: Option<&TrackWindow>,
) -> Result<Vec<Track>, FetchError> {
    let mut tracks: Vec<Track> = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = api
            .fetch_page(credential, playlist_id, cursor.as_deref())
            .await?;

        for item in page.items {
            let Some(track) = item.track else { continue };
            let Some(artist) = track.artists.first() else {
                continue;
            };
            if track.name.is_empty() || artist.name.is_empty() {
                continue;
            }

            let artist = artist.name.clone();
            tracks.push(Track {
                name: track.name,
                artist,
                duration_ms: track.duration_ms,
            });
        }

        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    if let Some(window) = window {
        utils::apply_window(&mut tracks, window);
    }

    Ok(tracks)
}
