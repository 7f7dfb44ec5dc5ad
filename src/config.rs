//! Configuration management for the playlist migration service.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration: the two providers' API and token
//! endpoints, client credentials, server settings, and pipeline tunables.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (tunables only)

use std::{env, path::PathBuf, time::Duration};

use crate::Res;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from `trackport/.env` in the platform-specific local
/// data directory. A missing file is not an error, since deployments may
/// configure the process environment directly; in that case a `.env` in the
/// working directory is tried as a fallback.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Res<()> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("trackport/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)?;
    } else {
        dotenv::dotenv().ok();
    }
    Ok(())
}

/// Returns the address the migration API server binds to.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the source provider's Web API base URL.
///
/// Playlist pages are fetched from endpoints under this URL.
///
/// # Panics
///
/// Panics if the `SOURCE_API_URL` environment variable is not set.
pub fn source_api_url() -> String {
    env::var("SOURCE_API_URL").expect("SOURCE_API_URL must be set")
}

/// Returns the source provider's OAuth token endpoint.
///
/// Used for `grant_type=refresh_token` exchanges when a stored source
/// credential is about to expire.
///
/// # Panics
///
/// Panics if the `SOURCE_TOKEN_URL` environment variable is not set.
pub fn source_token_url() -> String {
    env::var("SOURCE_TOKEN_URL").expect("SOURCE_TOKEN_URL must be set")
}

/// Returns the client ID registered with the source provider.
///
/// # Panics
///
/// Panics if the `SOURCE_CLIENT_ID` environment variable is not set.
pub fn source_client_id() -> String {
    env::var("SOURCE_CLIENT_ID").expect("SOURCE_CLIENT_ID must be set")
}

/// Returns the client secret registered with the source provider.
///
/// Sent as HTTP Basic credentials on token refresh calls; keep it out of
/// logs and version control.
///
/// # Panics
///
/// Panics if the `SOURCE_CLIENT_SECRET` environment variable is not set.
pub fn source_client_secret() -> String {
    env::var("SOURCE_CLIENT_SECRET").expect("SOURCE_CLIENT_SECRET must be set")
}

/// Returns the destination provider's Web API base URL.
///
/// Search and playlist endpoints live under this URL.
///
/// # Panics
///
/// Panics if the `DESTINATION_API_URL` environment variable is not set.
pub fn destination_api_url() -> String {
    env::var("DESTINATION_API_URL").expect("DESTINATION_API_URL must be set")
}

/// Returns the destination provider's OAuth token endpoint.
///
/// # Panics
///
/// Panics if the `DESTINATION_TOKEN_URL` environment variable is not set.
pub fn destination_token_url() -> String {
    env::var("DESTINATION_TOKEN_URL").expect("DESTINATION_TOKEN_URL must be set")
}

/// Returns the client ID registered with the destination provider.
///
/// # Panics
///
/// Panics if the `DESTINATION_CLIENT_ID` environment variable is not set.
pub fn destination_client_id() -> String {
    env::var("DESTINATION_CLIENT_ID").expect("DESTINATION_CLIENT_ID must be set")
}

/// Returns the client secret registered with the destination provider.
///
/// # Panics
///
/// Panics if the `DESTINATION_CLIENT_SECRET` environment variable is not set.
pub fn destination_client_secret() -> String {
    env::var("DESTINATION_CLIENT_SECRET").expect("DESTINATION_CLIENT_SECRET must be set")
}

/// Returns the refresh buffer applied to credential expiry checks, in seconds.
///
/// A credential is refreshed once it is within this many seconds of its
/// expiry instant. Reads `TOKEN_REFRESH_BUFFER_SECS`, defaulting to 60.
pub fn token_refresh_buffer_secs() -> i64 {
    env::var("TOKEN_REFRESH_BUFFER_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60)
}

/// Returns the minimum interval between destination search calls.
///
/// Sized to stay under the destination's documented per-second call budget.
/// Reads `SEARCH_INTERVAL_MS`, defaulting to 1100 milliseconds.
///
/// # Panics
///
/// Panics if `SEARCH_INTERVAL_MS` is set to zero.
pub fn search_interval() -> Duration {
    let ms: u64 = env::var("SEARCH_INTERVAL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1100);
    if ms == 0 {
        panic!("SEARCH_INTERVAL_MS must be greater than zero");
    }
    Duration::from_millis(ms)
}

/// Returns the deadline applied to every outbound provider call.
///
/// Reads `REQUEST_TIMEOUT_SECS`, defaulting to 30 seconds.
pub fn request_timeout() -> Duration {
    let secs: u64 = env::var("REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    Duration::from_secs(secs)
}

/// Returns the page size requested from the source provider's track listing.
///
/// Reads `FETCH_PAGE_SIZE`, defaulting to 50.
pub fn fetch_page_size() -> u32 {
    env::var("FETCH_PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(50)
}
