use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::{
    config,
    types::{Credential, MatchOutcome, SearchResponse, Track},
    utils, warning,
};

/// A destination search call failed.
///
/// Callers must not conflate the two variants: a quota exhaustion ends
/// searching for the whole request, a request failure affects one track.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("destination search quota exhausted")]
    QuotaExceeded,
    #[error("search request failed: {0}")]
    Request(String),
}

/// One bounded search against the destination provider.
#[async_trait]
pub trait TrackSearch: Send + Sync {
    /// Returns the first matching item id, or `None` when the destination
    /// has no result for the query.
    async fn search(
        &self,
        credential: &Credential,
        query: &str,
    ) -> Result<Option<String>, SearchError>;
}

/// Searches the configured destination provider API.
pub struct HttpTrackSearch {
    client: Client,
    base_url: String,
}

impl HttpTrackSearch {
    pub fn new() -> Self {
        HttpTrackSearch {
            client: utils::http_client(),
            base_url: config::destination_api_url(),
        }
    }
}

#[async_trait]
impl TrackSearch for HttpTrackSearch {
    async fn search(
        &self,
        credential: &Credential,
        query: &str,
    ) -> Result<Option<String>, SearchError> {
        let api_url = format!("{uri}/search", uri = self.base_url);
        let token = credential.access_token.as_deref().unwrap_or_default();

        let response = self
            .client
            .get(&api_url)
            .query(&[("q", query), ("limit", "1")])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            // Quota exhaustion arrives as a 403 with a quota-flavored body;
            // any other 403 is treated like a transient request failure.
            let body = response.text().await.unwrap_or_default();
            if body.to_ascii_lowercase().contains("quota") {
                return Err(SearchError::QuotaExceeded);
            }
            return Err(SearchError::Request(format!("search returned {status}")));
        }
        if !status.is_success() {
            return Err(SearchError::Request(format!("search returned {status}")));
        }

        let res = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        Ok(res.items.into_iter().next().map(|item| item.id))
    }
}

/// Builds the limiter that paces destination search calls.
///
/// The first call passes immediately; each subsequent call waits out the
/// remainder of `interval`. The interval comes from configuration so the
/// policy is tunable without touching the match loop.
pub fn search_limiter(interval: Duration) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::with_period(interval).expect("search interval must be non-zero"))
}

/// Matches tracks to destination items, strictly sequentially and strictly
/// in input order.
///
/// Produces exactly one [`MatchOutcome`] per submitted track. On the
/// quota-exhaustion signal the loop stops issuing calls: the current track
/// and every remaining untried track are labeled `QuotaExceeded`. Any other
/// failure marks that single track `Unmatched` and iteration continues.
pub async fn match_tracks(
    api: &dyn TrackSearch,
    limiter: &DefaultDirectRateLimiter,
    credential: &Credential,
    tracks: &[Track],
) -> Vec<MatchOutcome> {
    let mut outcomes = Vec::with_capacity(tracks.len());
    let mut quota_exhausted = false;

    for track in tracks {
        if quota_exhausted {
            // The ceiling is global; retrying would burn budget without
            // producing matches.
            outcomes.push(MatchOutcome::QuotaExceeded);
            continue;
        }

        limiter.until_ready().await;

        let query = utils::build_search_query(track);
        match api.search(credential, &query).await {
            Ok(Some(item_id)) => outcomes.push(MatchOutcome::Matched(item_id)),
            Ok(None) => outcomes.push(MatchOutcome::Unmatched),
            Err(SearchError::QuotaExceeded) => {
                warning!(
                    "Destination quota exhausted at \"{}\"; skipping remaining searches",
                    query
                );
                quota_exhausted = true;
                outcomes.push(MatchOutcome::QuotaExceeded);
            }
            Err(SearchError::Request(e)) => {
                warning!("Search failed for \"{}\": {}", query, e);
                outcomes.push(MatchOutcome::Unmatched);
            }
        }
    }

    outcomes
}
