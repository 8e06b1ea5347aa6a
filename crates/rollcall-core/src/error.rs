//! Error types for rollcall-core

use thiserror::Error;

/// Reasons a submitted (`badge_id`, `activity`) pair is rejected before
/// any lookup happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field absent, or empty after trimming
    #[error("missing field: {0}")]
    Missing(&'static str),

    /// Field longer than the accepted maximum
    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Field contains control characters (newlines, NUL, escape codes)
    #[error("{0} contains control characters")]
    ControlCharacters(&'static str),
}
