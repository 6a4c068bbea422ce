//! Simulation timestamps and the truncating duration helpers used by the engine.
//!
//! The engine keeps time as a [`SimulationTime`], an absolute timestamp measured from an arbitrary
//! epoch. Intervals are plain [`std::time::Duration`]s. Motion only uses whole seconds of a tick
//! and disease periods are whole hours; the truncation helpers here are where that happens.
use std::fmt::{self, Display};
use std::ops::{Add, AddAssign, Sub};
use std::time::Duration;

const SECONDS_PER_HOUR: u64 = 60 * 60;

/// An absolute point in simulated time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimulationTime(Duration);

impl SimulationTime {
    /// The epoch.
    pub const ZERO: SimulationTime = SimulationTime(Duration::ZERO);

    pub fn from_duration(since_epoch: Duration) -> Self {
        SimulationTime(since_epoch)
    }

    /// The offset of this timestamp from the epoch.
    pub fn since_epoch(self) -> Duration {
        self.0
    }
}

impl Add<Duration> for SimulationTime {
    type Output = SimulationTime;

    fn add(self, rhs: Duration) -> SimulationTime {
        SimulationTime(self.0 + rhs)
    }
}

impl AddAssign<Duration> for SimulationTime {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs;
    }
}

impl Sub for SimulationTime {
    type Output = Duration;

    /// Time only moves forward, so an earlier minus a later timestamp saturates to zero.
    fn sub(self, rhs: SimulationTime) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

impl Display for SimulationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}", humantime::format_duration(self.0))
    }
}

/// A duration of `count` whole hours.
///
/// # Panics
///
/// Panics if `count` hours do not fit in a `Duration`.
pub fn hours(count: u64) -> Duration {
    match count.checked_mul(SECONDS_PER_HOUR) {
        Some(seconds) => Duration::from_secs(seconds),
        None => panic!("{count} hours overflows a Duration"),
    }
}

/// The number of whole seconds in `duration`; the sub-second remainder is dropped.
pub fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs()
}

/// The number of whole hours in `duration`; the remainder is dropped.
pub fn whole_hours(duration: Duration) -> u64 {
    duration.as_secs() / SECONDS_PER_HOUR
}

/// A duration of `days` days truncated to whole hours. Negative and NaN inputs give zero.
///
/// # Panics
///
/// Panics if the number of hours does not fit in a `Duration`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn days_as_whole_hours(days: f64) -> Duration {
    hours((days * 24.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_whole_units() {
        assert_eq!(whole_seconds(Duration::from_millis(2_999)), 2);
        assert_eq!(whole_hours(Duration::from_secs(2 * 3600 + 3599)), 2);
        assert_eq!(days_as_whole_hours(14.0), hours(336));
        // 1.99 days is 47.76 hours
        assert_eq!(days_as_whole_hours(1.99), hours(47));
    }

    #[test]
    #[should_panic(expected = "hours overflows a Duration")]
    fn hours_that_overflow_panic() {
        let _ = days_as_whole_hours(1e16);
    }

    #[test]
    fn time_arithmetic() {
        let start = SimulationTime::ZERO;
        let mut now = start;
        now += hours(3);
        assert_eq!(now - start, hours(3));
        assert_eq!(start - now, Duration::ZERO);
        assert!(now > start);
        assert_eq!(start + hours(3), now);
    }

    #[test]
    fn displays_offset_from_epoch() {
        assert_eq!((SimulationTime::ZERO + hours(26)).to_string(), "t+1day 2h");
    }
}
