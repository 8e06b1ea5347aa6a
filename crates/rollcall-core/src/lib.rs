//! # Rollcall Core
//!
//! Shared types for the rollcall check-in board.
//!
//! A scanner submits a badge identifier together with an activity tag. Once
//! admitted, the pair is frozen into a [`CheckInEvent`] that lives in the
//! shared log until an operator deletes it.
//!
//! ## Key Types
//!
//! - [`CheckInEvent`]: A single admitted check-in (badge, resolved name, activity, time)
//! - [`CheckInKey`]: The validated (`badge_id`, `activity`) pair that identifies an event
//! - [`LogSnapshot`]: The ordered event list plus its count, as pushed to viewers
//! - [`SearchQuery`]: Case-folded substring filter over a log
//! - [`Clock`]: Time abstraction so admission timestamps are testable

pub mod clock;
pub mod error;
pub mod event;
pub mod search;
pub mod snapshot;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ValidationError;
pub use event::{CheckInEvent, CheckInKey, MAX_ACTIVITY_LEN, MAX_BADGE_ID_LEN};
pub use search::{SearchQuery, search};
pub use snapshot::LogSnapshot;
