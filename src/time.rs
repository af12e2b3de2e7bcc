use std::fmt;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::error::{Result, SimError};

// ---------------------------------------------------------------------------
// Reference epoch
// ---------------------------------------------------------------------------

/// J2000.0 reference epoch (2000-01-01 12:00:00).
///
/// The TT-UTC offset (~64 s) is ignored; all epochs in this crate are UTC.
pub fn j2000() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Seconds elapsed from J2000.0 to `t` (negative before J2000).
pub fn seconds_since_j2000(t: DateTime<Utc>) -> f64 {
    let delta = t - j2000();
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) * 1e-9
}

// ---------------------------------------------------------------------------
// Simulation clock
// ---------------------------------------------------------------------------

/// Monotonic simulation clock: a fixed start epoch plus elapsed seconds.
///
/// Elapsed time is kept as `f64` seconds so that `advance(dt * n)` is exact
/// to the same rounding as the integrator's own time arithmetic; the calendar
/// epoch is only materialised on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    epoch: DateTime<Utc>,
    elapsed: f64, // s
}

impl SimClock {
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self { epoch, elapsed: 0.0 }
    }

    /// Epoch the clock started at.
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Seconds elapsed since the start epoch.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Current calendar time, rounded to the nearest nanosecond.
    pub fn now(&self) -> DateTime<Utc> {
        let whole = self.elapsed.trunc();
        let nanos = ((self.elapsed - whole) * 1e9).round() as i64;
        TimeDelta::try_seconds(whole as i64)
            .and_then(|s| s.checked_add(&TimeDelta::nanoseconds(nanos)))
            .and_then(|delta| self.epoch.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Move the clock forward. Negative or non-finite amounts are rejected.
    pub fn advance(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "clock can only move forward by a finite amount, got {seconds}"
            )));
        }
        self.elapsed += seconds;
        Ok(())
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.now().format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}
