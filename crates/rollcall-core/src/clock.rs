//! Wall-clock abstraction for admission timestamps

use chrono::{Local, NaiveTime};

/// Display format of check-in timestamps
const STAMP_FORMAT: &str = "%H:%M";

/// Source of the local wall-clock time
///
/// Timestamps are display-only, so only the time of day is needed.
pub trait Clock: Send + Sync {
    /// Current local time of day
    fn now(&self) -> NaiveTime;

    /// Current time formatted as hour:minute
    fn stamp(&self) -> String {
        self.now().format(STAMP_FORMAT).to_string()
    }
}

/// Real clock reading the local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Clock frozen at a fixed time of day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl FixedClock {
    /// Returns `None` for an out-of-range hour or minute
    pub fn at(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}
