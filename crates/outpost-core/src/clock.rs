//! Injectable current-time source.
//!
//! Construction and research durations are wall-clock based, but nothing in
//! the engine ever reads the system clock directly. The orchestrator is
//! handed a [`Clock`] at construction, so timing behavior is fully
//! deterministic under test: a [`ManualClock`] is advanced explicitly instead
//! of waiting.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A moment in time, as whole seconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Seconds elapsed since `earlier`. Negative if `earlier` is in the future.
    pub fn seconds_since(self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }

    /// This timestamp shifted forward by `secs` seconds.
    pub fn plus_secs(self, secs: i64) -> Timestamp {
        Timestamp(self.0.saturating_add(secs))
    }
}

/// A source of the current time. The engine only ever asks "what time is it
/// now"; scheduling of future ticks is the caller's concern.
pub trait Clock: std::fmt::Debug + Send + Sync {
    /// The current time.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall-clock time from the operating system.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(elapsed.as_secs() as i64)
    }
}

/// A clock that only moves when told to. Used in tests to step through
/// construction and research timelines without waiting.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a manual clock starting at the given timestamp.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(start.0),
        }
    }

    /// Jump the clock to an absolute timestamp.
    pub fn set(&self, to: Timestamp) {
        self.now.store(to.0, Ordering::SeqCst);
    }

    /// Advance the clock by `secs` seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_where_told() {
        let clock = ManualClock::new(Timestamp(1_000));
        assert_eq!(clock.now(), Timestamp(1_000));
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(Timestamp(0));
        clock.advance_secs(3_600);
        assert_eq!(clock.now(), Timestamp(3_600));
        clock.advance_secs(30);
        assert_eq!(clock.now(), Timestamp(3_630));
    }

    #[test]
    fn manual_clock_set_jumps() {
        let clock = ManualClock::new(Timestamp(50));
        clock.set(Timestamp(10));
        assert_eq!(clock.now(), Timestamp(10));
    }

    #[test]
    fn timestamp_arithmetic() {
        let t0 = Timestamp(100);
        let t1 = t0.plus_secs(60);
        assert_eq!(t1, Timestamp(160));
        assert_eq!(t1.seconds_since(t0), 60);
        assert_eq!(t0.seconds_since(t1), -60);
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
