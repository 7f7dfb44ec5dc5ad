//! Playlist Migration Service Library
//!
//! This library implements the core of a playlist migration service: it reads
//! track metadata from a source music-streaming provider, searches for
//! equivalent content on a destination provider, and populates a newly
//! created destination playlist, returning a reconciliation report.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the migration server
//! - `config` - Configuration management and environment variables
//! - `destination` - Destination provider API client (search, playlists)
//! - `management` - Credential store with single-flight token refresh
//! - `migration` - The migration orchestrator and its error taxonomy
//! - `server` - HTTP server wiring for the API endpoints
//! - `source` - Source provider API client (paginated track fetch)
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use trackport::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> trackport::Res<()> {
//!     config::load_env().await?;
//!     // Build state and serve...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod destination;
pub mod management;
pub mod migration;
pub mod server;
pub mod source;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern for plumbing code (config
/// loading, credential persistence) using a boxed dynamic error trait object
/// while maintaining Send + Sync bounds for async contexts. Pipeline code
/// uses the typed errors defined next to each component instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Used for general status updates throughout the service, such as pipeline
/// stage transitions during a migration request.
///
/// # Example
///
/// ```
/// info!("Fetched {} tracks from playlist {}", count, playlist_id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Used to signal completed operations, such as a finished migration.
///
/// # Example
///
/// ```
/// success!("Migration complete: {} of {} tracks added", added, total);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Immediately terminates the process with exit code 1, so this is reserved
/// for unrecoverable startup failures (bad configuration, unusable listen
/// address). Request-level failures are reported through typed errors and
/// the `warning!` macro instead.
///
/// # Example
///
/// ```
/// error!("Failed to parse server address: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recovered failures that should be visible but do not abort the
/// request: a skipped source playlist, a transient search error, a failed
/// best-effort persistence write.
///
/// # Example
///
/// ```
/// warning!("Skipping playlist {}: {}", playlist_id, e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
