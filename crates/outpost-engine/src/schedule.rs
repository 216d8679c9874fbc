//! Fixed wall-clock tick schedule.
//!
//! Ticks fire at fixed local times of day (the deployment default is 00:00,
//! 12:00, 15:00, 18:00, and 21:00). The engine never fires itself: an
//! external scheduler asks [`TickSchedule::next_tick_after`] when to wake up
//! and then invokes the tick. Local time is modeled as a fixed UTC offset
//! configured at deployment; the arithmetic is plain integer math, so the
//! answer is the same on every host.

use outpost_core::clock::Timestamp;

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;

/// The daily tick times of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSchedule {
    /// Hours of the local day at which ticks fire, sorted ascending.
    hours: Vec<u8>,
    /// Offset of local time from UTC, in minutes.
    utc_offset_minutes: i32,
}

impl TickSchedule {
    /// The standard deployment schedule: 00:00, 12:00, 15:00, 18:00, 21:00.
    pub fn standard(utc_offset_minutes: i32) -> Self {
        Self::new(vec![0, 12, 15, 18, 21], utc_offset_minutes)
    }

    /// A schedule from arbitrary hours. Hours are deduplicated, clamped to
    /// the 24-hour day, and sorted.
    pub fn new(mut hours: Vec<u8>, utc_offset_minutes: i32) -> Self {
        hours.retain(|h| *h < 24);
        hours.sort_unstable();
        hours.dedup();
        Self {
            hours,
            utc_offset_minutes,
        }
    }

    /// The configured local tick hours.
    pub fn hours(&self) -> &[u8] {
        &self.hours
    }

    /// The first scheduled tick strictly after `after`.
    pub fn next_tick_after(&self, after: Timestamp) -> Option<Timestamp> {
        if self.hours.is_empty() {
            return None;
        }
        let offset = self.utc_offset_minutes as i64 * 60;
        let local = after.0 + offset;
        let day_start = local.div_euclid(SECS_PER_DAY) * SECS_PER_DAY;

        for &hour in &self.hours {
            let candidate = day_start + hour as i64 * SECS_PER_HOUR;
            if candidate > local {
                return Some(Timestamp(candidate - offset));
            }
        }
        // Past the last slot today: first slot tomorrow.
        let first = self.hours[0] as i64 * SECS_PER_HOUR;
        Some(Timestamp(day_start + SECS_PER_DAY + first - offset))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
