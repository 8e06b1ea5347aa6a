//! Error types for rollcall-directory

use thiserror::Error;

/// Errors that can occur while resolving a badge
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Directory could not be reached or answered with a server error
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// Directory answered with something that is not a name record
    #[error("invalid directory response: {0}")]
    InvalidResponse(String),

    /// Roster file could not be read or parsed
    #[error("roster error: {0}")]
    Roster(String),

    /// Directory base URL is unusable
    #[error("invalid directory url: {0}")]
    InvalidUrl(String),
}
