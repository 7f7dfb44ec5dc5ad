use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The two providers a migration request spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Source,
    Destination,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Source => write!(f, "source"),
            Provider::Destination => write!(f, "destination"),
        }
    }
}

/// Access credentials for one provider and one user.
///
/// No access token means the provider is disconnected. `expires_at` is a unix
/// timestamp in seconds; a credential without one never needs a refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub provider: Provider,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
}

impl Credential {
    pub fn disconnected(provider: Provider) -> Self {
        Credential {
            provider,
            access_token: None,
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.access_token.is_some()
    }

    /// True once the credential is within `buffer_secs` of its expiry instant.
    pub fn needs_refresh(&self, buffer_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now().timestamp() >= expires_at - buffer_secs,
            None => false,
        }
    }
}

/// Per-user mapping of provider to credential.
///
/// Updates are pure: `with_credential` and `with_cleared` return new sets and
/// the store swaps whole snapshots, so concurrent readers never observe a
/// half-updated set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialSet {
    credentials: HashMap<Provider, Credential>,
}

impl CredentialSet {
    pub fn get(&self, provider: Provider) -> Option<&Credential> {
        self.credentials.get(&provider)
    }

    pub fn with_credential(&self, credential: Credential) -> CredentialSet {
        let mut credentials = self.credentials.clone();
        credentials.insert(credential.provider, credential);
        CredentialSet { credentials }
    }

    pub fn with_cleared(&self, provider: Provider) -> CredentialSet {
        let mut credentials = self.credentials.clone();
        credentials.insert(provider, Credential::disconnected(provider));
        CredentialSet { credentials }
    }
}

/// One track as read from the source provider.
///
/// Identity for matching purposes is the (name, artist) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub duration_ms: Option<u64>,
}

/// Exactly one outcome per track submitted to the matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(String),
    Unmatched,
    QuotaExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitMode {
    All,
    Latest,
}

/// Restricts a fetch to the most recently added tracks.
///
/// Applied only after the full playlist has been fetched; pagination offers
/// no reverse iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackWindow {
    pub limit: usize,
    pub latest_first: bool,
}

/// The authenticated user a request acts on behalf of.
///
/// Threaded explicitly through the pipeline; session management itself lives
/// upstream of this service.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequest {
    pub source_playlist_ids: Vec<String>,
    pub target_playlist_name: String,
    pub track_limit: Option<u32>,
    pub limit_mode: Option<LimitMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub destination_playlist_id: String,
    pub total_tracks_processed: usize,
    pub total_videos_added: usize,
    pub unmatched_tracks: Vec<String>,
    pub quota_exceeded_tracks: Vec<String>,
    pub quota_exceeded: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub provider: Provider,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisconnectRequest {
    pub provider: Provider,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksPage {
    pub items: Vec<PlaylistTrackItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTrack {
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub title: String,
    pub privacy: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendItemRequest {
    pub item_id: String,
}
