//! World clock for the Nightwire simulation.
//!
//! The clock is the single source of truth for simulated time. It holds the
//! current timestamp and the world day counter. Time only moves when a
//! player-facing operation asks it to; there is no wall-clock coupling.
//!
//! # Design Principles
//!
//! - Advancing reports how many calendar-day boundaries were crossed. The
//!   tick pipeline runs once per crossed boundary, never scaled.
//! - The day counter is bumped by the pipeline through [`WorldClock::begin_day`],
//!   so the counter and the pipeline can never disagree.
//! - All arithmetic is checked; a timestamp overflow is an error, not a panic.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Milliseconds in one hour.
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    /// The requested advance is negative, NaN, or infinite.
    #[error("invalid time advance: {hours} hours")]
    InvalidHours {
        /// The rejected amount.
        hours: f64,
    },

    /// The timestamp would leave chrono's representable range.
    #[error("simulated time overflow")]
    TimestampOverflow,
}

/// What one call to [`WorldClock::advance`] covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockAdvance {
    /// Timestamp before the advance.
    pub from: NaiveDateTime,
    /// Timestamp after the advance.
    pub to: NaiveDateTime,
    /// Number of calendar-day boundaries crossed.
    pub days_crossed: u32,
}

/// Simulated time: a timestamp and the world day counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldClock {
    now: NaiveDateTime,
    day: u32,
}

impl WorldClock {
    /// A clock at `start`, on day 0.
    pub const fn new(start: NaiveDateTime) -> Self {
        Self {
            now: start,
            day: 0,
        }
    }

    /// Current simulated timestamp.
    pub const fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Current world day.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Move time forward by `hours` (fractions allowed).
    pub fn advance(&mut self, hours: f64) -> Result<ClockAdvance, ClockError> {
        let step = hours_to_duration(hours)?;
        let from = self.now;
        let to = from
            .checked_add_signed(step)
            .ok_or(ClockError::TimestampOverflow)?;
        let days = to.date().signed_duration_since(from.date()).num_days();
        let days_crossed = u32::try_from(days).map_err(|_err| ClockError::TimestampOverflow)?;
        self.now = to;
        Ok(ClockAdvance {
            from,
            to,
            days_crossed,
        })
    }

    /// Open the next world day and return its number.
    pub const fn begin_day(&mut self) -> u32 {
        self.day = self.day.saturating_add(1);
        self.day
    }

    /// `now + hours`, for expiry timestamps (blocks, jail).
    pub fn after_hours(&self, hours: u32) -> Result<NaiveDateTime, ClockError> {
        self.now
            .checked_add_signed(Duration::hours(i64::from(hours)))
            .ok_or(ClockError::TimestampOverflow)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn hours_to_duration(hours: f64) -> Result<Duration, ClockError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(ClockError::InvalidHours { hours });
    }
    let ms = (hours * MS_PER_HOUR).round();
    if ms > i64::MAX as f64 {
        return Err(ClockError::TimestampOverflow);
    }
    Duration::try_milliseconds(ms as i64).ok_or(ClockError::TimestampOverflow)
}
