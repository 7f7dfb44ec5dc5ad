use reqwest::Client;

use crate::{
    config,
    types::{Track, TrackWindow},
};

/// HTTP client with the configured per-call deadline applied.
pub fn http_client() -> Client {
    Client::builder()
        .timeout(config::request_timeout())
        .build()
        .expect("failed to build HTTP client")
}

pub fn build_search_query(track: &Track) -> String {
    format!("{} {}", track.name, track.artist)
}

pub fn track_label(track: &Track) -> String {
    format!("{} - {}", track.name, track.artist)
}

/// Applies a fetch window to a fully fetched track list.
///
/// The whole playlist must already be present: with `latest_first` the
/// sequence is reversed (newest added first) before truncating to `limit`.
pub fn apply_window(tracks: &mut Vec<Track>, window: &TrackWindow) {
    if window.latest_first {
        tracks.reverse();
    }
    tracks.truncate(window.limit);
}
