//! # Source Provider Module
//!
//! Client for the provider playlists are migrated *from*. It covers the two
//! operations the migration pipeline needs on the source side:
//!
//! - [`auth`] - refreshing an expiring access token at the provider's OAuth
//!   token endpoint (`grant_type=refresh_token` with Basic client
//!   credentials). The authorization-code exchange that produces the initial
//!   token happens upstream of this service.
//! - [`playlist`] - fetching every track of a playlist through cursor-based
//!   pagination, skipping entries without a resolvable track, and applying
//!   an optional latest-N window after the full fetch.
//!
//! ## Pagination
//!
//! Each page request returns a bounded item list plus an opaque next cursor;
//! the fetcher loops until the cursor is exhausted and accumulates one
//! ordered sequence (source-provider order, oldest-added-first). The window
//! is applied only afterwards because the provider offers no reverse
//! iteration.
//!
//! ## Error Handling
//!
//! A failed or undecodable page surfaces as a [`playlist::FetchError`] for
//! that playlist. The orchestrator treats this as a partial failure: the
//! playlist is skipped with a warning and the migration continues with the
//! remaining playlists.

pub mod auth;
pub mod playlist;
