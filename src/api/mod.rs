//! # API Module
//!
//! This module provides the HTTP API endpoints of the migration server. It
//! is the thin boundary between the HTTP world and the typed pipeline: it
//! decodes request bodies, resolves the session user, and maps every
//! [`crate::migration::MigrationError`] variant to its status code.
//!
//! ## Endpoints
//!
//! ### Migration
//!
//! - [`migrate`] - `POST /migrate`. Runs the fetch → match → build pipeline
//!   for the session user and returns the reconciliation report, or a
//!   structured `{"error": ...}` body with 400/401/429/500 depending on the
//!   failure.
//!
//! ### Provider linkage
//!
//! - [`connect`] - `POST /connect`. Stores the tokens produced by the
//!   upstream OAuth code exchange as one provider's credential.
//! - [`disconnect`] - `POST /disconnect`. Explicitly clears one provider's
//!   credential fields.
//!
//! ### Monitoring
//!
//! - [`health`] - `GET /health`. Application status and version for
//!   monitoring systems.
//!
//! ## Sessions
//!
//! All endpoints except `health` require the session user id, extracted
//! from the `x-user-id` header by the [`SessionContext`] extractor
//! (session management itself lives upstream); a missing header is a 401
//! before any handler code runs.
//!
//! [`SessionContext`]: crate::types::SessionContext

mod connect;
mod disconnect;
mod health;
mod migrate;
mod session;

pub use connect::connect;
pub use disconnect::disconnect;
pub use health::health;
pub use migrate::migrate;
pub use session::HEADER_USER_ID;
pub use session::SessionRejection;
