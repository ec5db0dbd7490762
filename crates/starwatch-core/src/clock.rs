//! Reference clock.
//!
//! All matching happens against a single reference clock: UTC plus one fixed
//! offset chosen at load time. The same offset is applied to catalog times
//! (see [`Catalog::translated`](crate::catalog::Catalog::translated)), so the
//! comparison stays consistent.

use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClockError;

/// Supplies the current reference time.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> Result<NaiveDateTime, ClockError>;
}

/// Truncation applied to the reference time before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Minute,
    Second,
}

impl Granularity {
    pub fn truncate(self, at: NaiveDateTime) -> NaiveDateTime {
        let truncated = match self {
            Granularity::Minute => at.with_second(0).and_then(|t| t.with_nanosecond(0)),
            Granularity::Second => at.with_nanosecond(0),
        };
        // with_second(0)/with_nanosecond(0) are always in range
        truncated.unwrap_or(at)
    }
}

/// Wall clock in UTC shifted by a fixed number of minutes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    utc_offset_minutes: i32,
}

impl SystemClock {
    pub fn new(utc_offset_minutes: i32) -> Self {
        Self { utc_offset_minutes }
    }

    pub fn utc() -> Self {
        Self::default()
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        let utc = Utc::now().naive_utc();
        utc.checked_add_signed(Duration::minutes(i64::from(self.utc_offset_minutes)))
            .ok_or_else(|| ClockError::Unavailable("offset overflows the calendar".into()))
    }
}

/// Clock pinned to a single instant. Used by tests and `--at` evaluation.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl ClockSource for FixedClock {
    fn now(&self) -> Result<NaiveDateTime, ClockError> {
        Ok(self.0)
    }
}
