//! Time source for date-partitioned ids and the timestamp fallback.

use std::fmt;

use chrono::{DateTime, Local, TimeZone};

/// Supplies the current local time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    #[must_use]
    pub const fn new(at: DateTime<Local>) -> Self {
        Self(at)
    }

    /// Noon local time on the given calendar date.
    ///
    /// Returns `None` for dates that do not exist.
    pub fn on_date(year: i32, month: u32, day: u32) -> Option<Self> {
        Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
