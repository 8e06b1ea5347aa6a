//! Check-in events and the key that identifies them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest badge identifier accepted from a scanner
pub const MAX_BADGE_ID_LEN: usize = 128;

/// Longest activity tag accepted from a scanner
pub const MAX_ACTIVITY_LEN: usize = 64;

/// The (`badge_id`, `activity`) pair that identifies a check-in
///
/// At most one [`CheckInEvent`] exists per key. Keys are only built through
/// [`CheckInKey::new`] or [`CheckInKey::parse`], so both fields are always
/// trimmed, non-empty and free of control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckInKey {
    badge_id: String,
    activity: String,
}

impl CheckInKey {
    /// Validate and build a key
    pub fn new(badge_id: &str, activity: &str) -> Result<Self, ValidationError> {
        Self::parse(Some(badge_id), Some(activity))
    }

    /// Validate optional request fields into a key
    ///
    /// Absent fields are reported the same way as empty ones.
    pub fn parse(badge_id: Option<&str>, activity: Option<&str>) -> Result<Self, ValidationError> {
        let badge_id = validate_field("badge_id", badge_id, MAX_BADGE_ID_LEN)?;
        let activity = validate_field("activity", activity, MAX_ACTIVITY_LEN)?;
        Ok(Self { badge_id, activity })
    }

    /// The scanned badge identifier
    pub fn badge_id(&self) -> &str {
        &self.badge_id
    }

    /// The activity tag
    pub fn activity(&self) -> &str {
        &self.activity
    }
}

impl fmt::Display for CheckInKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.badge_id, self.activity)
    }
}

fn validate_field(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<String, ValidationError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacters(field));
    }
    Ok(value.to_string())
}

/// A single admitted check-in
///
/// The display name is resolved once at admission and frozen into the event;
/// later directory changes do not rewrite history. The timestamp is the
/// hour:minute wall-clock time of admission and is for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInEvent {
    pub badge_id: String,
    pub display_name: String,
    pub activity: String,
    pub timestamp: String,
}

impl CheckInEvent {
    /// Build an event for a validated key
    pub fn new(key: &CheckInKey, display_name: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            badge_id: key.badge_id.clone(),
            display_name: display_name.into(),
            activity: key.activity.clone(),
            timestamp: timestamp.into(),
        }
    }

    /// Whether this event belongs to the given key
    pub fn matches(&self, key: &CheckInKey) -> bool {
        self.badge_id == key.badge_id && self.activity == key.activity
    }

    /// The key of this event, without re-validating it
    pub fn key(&self) -> CheckInKey {
        CheckInKey {
            badge_id: self.badge_id.clone(),
            activity: self.activity.clone(),
        }
    }
}
