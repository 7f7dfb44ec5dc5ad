//! Migration orchestrator.
//!
//! Drives one migration request through its states (`Validating ->
//! FetchingSource -> Matching -> Building -> Done`) with every failure mode
//! expressed as a typed [`MigrationError`] so the API layer can map it to a
//! status code without inspecting strings. Failures below the
//! playlist/track granularity are absorbed into the report; failures at the
//! request granularity abort.

use axum::http::StatusCode;
use governor::DefaultDirectRateLimiter;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    destination::{self, playlist::PlaylistWriter, search::TrackSearch},
    info,
    management::{AuthError, CredentialStore, TokenRefresher},
    source::{self, playlist::PlaylistSource},
    success,
    types::{
        LimitMode, MatchOutcome, MigrationReport, MigrationRequest, Provider, SessionContext,
        Track, TrackWindow,
    },
    utils, warning,
};

/// A migration request failed as a whole.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("no tracks found in the selected source playlists")]
    NoTracksFound,
    #[error("no matching destination items found for any track")]
    NoMatchesFound,
    #[error("destination search quota exhausted: {0}")]
    QuotaExceeded(String),
    #[error(transparent)]
    Build(#[from] destination::playlist::BuildError),
    #[error("migration cancelled")]
    Cancelled,
}

impl MigrationError {
    /// The HTTP status this failure maps to at the API boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            MigrationError::Validation(_)
            | MigrationError::NoTracksFound
            | MigrationError::NoMatchesFound => StatusCode::BAD_REQUEST,
            MigrationError::Auth(_) => StatusCode::UNAUTHORIZED,
            MigrationError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            MigrationError::Build(_) | MigrationError::Cancelled => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Everything one migration request runs against, passed explicitly so the
/// pipeline has no ambient state and tests can substitute any piece.
pub struct MigrationContext<'a> {
    pub session: &'a SessionContext,
    pub store: &'a CredentialStore,
    pub refresher: &'a dyn TokenRefresher,
    pub source: &'a dyn PlaylistSource,
    pub search: &'a dyn TrackSearch,
    pub writer: &'a dyn PlaylistWriter,
    pub limiter: &'a DefaultDirectRateLimiter,
    pub cancel: &'a CancellationToken,
}

/// Runs one migration request to completion.
///
/// The pipeline is causally sequential: validation, then credential checks
/// for both providers, then per-playlist fetching (best-effort), then
/// sequential matching, then playlist building. Cancellation is honored at
/// the next suspension point and surfaces as [`MigrationError::Cancelled`].
pub async fn run_migration(
    ctx: &MigrationContext<'_>,
    request: &MigrationRequest,
) -> Result<MigrationReport, MigrationError> {
    // Validating: a bad request is rejected before any network call.
    validate(request)?;
    let window = track_window(request);

    // Both providers must be usable before the first provider call.
    let source_credential = ctx
        .store
        .get_valid_credential(&ctx.session.user_id, Provider::Source, ctx.refresher)
        .await?;
    let destination_credential = ctx
        .store
        .get_valid_credential(&ctx.session.user_id, Provider::Destination, ctx.refresher)
        .await?;

    // FetchingSource: a failed playlist is skipped, not fatal.
    let mut all_tracks: Vec<Track> = Vec::new();
    for playlist_id in &request.source_playlist_ids {
        if ctx.cancel.is_cancelled() {
            return Err(MigrationError::Cancelled);
        }

        match source::playlist::fetch_tracks(
            ctx.source,
            &source_credential,
            playlist_id,
            window.as_ref(),
        )
        .await
        {
            Ok(tracks) => {
                info!("Fetched {} tracks from playlist {}", tracks.len(), playlist_id);
                all_tracks.extend(tracks);
            }
            Err(e) => {
                warning!("Skipping playlist {}: {}", playlist_id, e);
            }
        }
    }

    if all_tracks.is_empty() {
        return Err(MigrationError::NoTracksFound);
    }

    // Matching: sequential and rate-limited, in fetched order.
    let outcomes = tokio::select! {
        _ = ctx.cancel.cancelled() => return Err(MigrationError::Cancelled),
        outcomes = destination::search::match_tracks(
            ctx.search,
            ctx.limiter,
            &destination_credential,
            &all_tracks,
        ) => outcomes,
    };

    let mut matched_ids: Vec<String> = Vec::new();
    let mut unmatched_tracks: Vec<String> = Vec::new();
    let mut quota_exceeded_tracks: Vec<String> = Vec::new();
    for (track, outcome) in all_tracks.iter().zip(&outcomes) {
        match outcome {
            MatchOutcome::Matched(item_id) => matched_ids.push(item_id.clone()),
            MatchOutcome::Unmatched => unmatched_tracks.push(utils::track_label(track)),
            MatchOutcome::QuotaExceeded => quota_exceeded_tracks.push(utils::track_label(track)),
        }
    }
    info!(
        "Matching complete: {} matched, {} unmatched, {} quota-exceeded",
        matched_ids.len(),
        unmatched_tracks.len(),
        quota_exceeded_tracks.len()
    );

    if matched_ids.is_empty() {
        // No playlist is created in this branch; the client learns whether
        // the quota ceiling caused the emptiness.
        return Err(if quota_exceeded_tracks.is_empty() {
            MigrationError::NoMatchesFound
        } else {
            MigrationError::QuotaExceeded(
                "quota exhausted before any track could be matched".to_string(),
            )
        });
    }

    // Building: fatal on any failure, no rollback of matched state.
    let title = request.target_playlist_name.trim();
    let destination_playlist_id = tokio::select! {
        _ = ctx.cancel.cancelled() => return Err(MigrationError::Cancelled),
        result = destination::playlist::populate_playlist(
            ctx.writer,
            &destination_credential,
            title,
            &matched_ids,
        ) => result?,
    };

    success!(
        "Migration complete: {} of {} tracks added to playlist {}",
        matched_ids.len(),
        all_tracks.len(),
        destination_playlist_id
    );

    let quota_exceeded = !quota_exceeded_tracks.is_empty();
    Ok(MigrationReport {
        destination_playlist_id,
        total_tracks_processed: all_tracks.len(),
        total_videos_added: matched_ids.len(),
        unmatched_tracks,
        quota_exceeded_tracks,
        quota_exceeded,
    })
}

fn validate(request: &MigrationRequest) -> Result<(), MigrationError> {
    if request.source_playlist_ids.is_empty() {
        return Err(MigrationError::Validation(
            "sourcePlaylistIds must not be empty".to_string(),
        ));
    }
    if request.target_playlist_name.trim().is_empty() {
        return Err(MigrationError::Validation(
            "targetPlaylistName must not be blank".to_string(),
        ));
    }
    if request.limit_mode == Some(LimitMode::Latest) && request.track_limit.unwrap_or(0) == 0 {
        return Err(MigrationError::Validation(
            "trackLimit must be a positive number when limitMode is \"latest\"".to_string(),
        ));
    }
    Ok(())
}

fn track_window(request: &MigrationRequest) -> Option<TrackWindow> {
    match request.limit_mode {
        Some(LimitMode::Latest) => request.track_limit.map(|limit| TrackWindow {
            limit: limit as usize,
            latest_first: true,
        }),
        _ => None,
    }
}
