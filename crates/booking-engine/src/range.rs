//! Half-open time ranges and the overlap predicate.
//!
//! A [`TimeRange`] is `[start, end)`: the start instant belongs to the range, the
//! end instant does not. Two bookings that touch (one ends exactly when the next
//! starts) therefore never overlap.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a pair of instants cannot form a [`TimeRange`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("start {start} must be before end {end}")]
    NotIncreasing {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("start {start} lies in the past (now is {now})")]
    StartsInPast {
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

/// A non-empty half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawRange> for TimeRange {
    type Error = RangeError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        TimeRange::new(raw.start, raw.end)
    }
}

impl TimeRange {
    /// Build a range, rejecting `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
        if start >= end {
            return Err(RangeError::NotIncreasing { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a range for a newly created event.
    ///
    /// On top of [`TimeRange::new`], the start must not lie before `now`. Edits of
    /// existing events use [`TimeRange::new`] and are not re-checked against the
    /// clock.
    pub fn new_upcoming(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, RangeError> {
        let range = Self::new(start, end)?;
        if start < now {
            return Err(RangeError::StartsInPast { start, now });
        }
        Ok(range)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether two ranges share at least one instant.
    ///
    /// Containment, left overlap and right overlap are all special cases of
    /// `a.start < b.end && b.start < a.end`. Adjacent ranges do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The part of this range inside `[window_start, window_end]`, if non-empty.
    pub fn clip(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Option<TimeRange> {
        let start = self.start.max(window_start);
        let end = self.end.min(window_end);
        (start < end).then_some(TimeRange { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length of the range in fractional hours.
    pub fn hours(&self) -> f64 {
        self.duration().num_milliseconds() as f64 / 3_600_000.0
    }
}
