//! Time sources shared by the health service and the rate limiter.

use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use time::OffsetDateTime;

/// Supplies monotonic and wall-clock readings.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Monotonic time elapsed since the clock was created.
    fn elapsed(&self) -> Duration;

    /// Current wall-clock time as whole seconds since the Unix epoch.
    fn unix_seconds(&self) -> i64;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Starts a clock whose monotonic origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn unix_seconds(&self) -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }
}

/// Clock that only moves when told to.
///
/// Wall-clock readings advance together with the monotonic reading so
/// timestamps and rate-limit windows stay consistent in tests.
#[derive(Debug)]
pub struct ManualClock {
    elapsed_nanos: AtomicU64,
    epoch_seconds: AtomicI64,
}

impl ManualClock {
    /// Creates a clock anchored at the given Unix timestamp.
    #[must_use]
    pub const fn starting_at(epoch_seconds: i64) -> Self {
        Self {
            elapsed_nanos: AtomicU64::new(0),
            epoch_seconds: AtomicI64::new(epoch_seconds),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, step: Duration) {
        let nanos = u64::try_from(step.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::Acquire))
    }

    fn unix_seconds(&self) -> i64 {
        let elapsed = i64::try_from(self.elapsed().as_secs()).unwrap_or(i64::MAX);
        self.epoch_seconds
            .load(Ordering::Acquire)
            .saturating_add(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::{Clock, ManualClock, SystemClock};

    #[rstest]
    fn manual_clock_advances_both_readings() {
        let clock = ManualClock::starting_at(1_700_000_000);
        clock.advance(Duration::from_millis(1_500));

        assert_eq!(clock.elapsed(), Duration::from_millis(1_500));
        assert_eq!(clock.unix_seconds(), 1_700_000_001);
    }

    #[rstest]
    fn system_clock_reports_a_plausible_epoch() {
        let clock = SystemClock::new();
        assert!(clock.unix_seconds() > 1_600_000_000);
    }
}
