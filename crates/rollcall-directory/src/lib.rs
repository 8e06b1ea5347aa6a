//! # Rollcall Directory
//!
//! Resolves scanned badge identifiers to display names.
//!
//! The directory is an external collaborator of the check-in board: it may
//! answer with a name, report that the badge is unknown, or fail. Callers
//! decide how long to wait; resolvers themselves never retry.
//!
//! ## Resolvers
//!
//! - [`StaticDirectory`]: in-memory roster, optionally loaded from a JSON roster file
//! - [`HttpDirectory`]: `GET {base}/{badge_id}` against a directory service

pub mod error;
pub mod http;
pub mod roster;

pub use error::DirectoryError;
pub use http::HttpDirectory;
pub use roster::{RosterRecord, StaticDirectory};

use async_trait::async_trait;

/// Maps badge identifiers to display names
#[async_trait]
pub trait DirectoryResolver: Send + Sync {
    /// Look up the display name for `badge_id`
    ///
    /// `Ok(None)` means the directory answered and does not know the badge.
    async fn resolve(&self, badge_id: &str) -> Result<Option<String>, DirectoryError>;

    /// Short label for logs
    fn name(&self) -> &'static str;
}
