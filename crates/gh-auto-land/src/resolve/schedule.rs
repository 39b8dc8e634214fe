//! Inter-attempt backoff schedule
//!
//! GitHub computes `mergeable_state` asynchronously, with latency that
//! depends on conflict detection and CI pipelines. A linearly increasing
//! schedule stays responsive when the verdict lands quickly without
//! hammering the API when it doesn't.

use std::time::Duration;

/// Base unit of the schedule in milliseconds; `delay(n)` is
/// `base * n * 10 / 3`, so attempt 1 waits ~3.3s and attempt 7 ~23.3s.
const DEFAULT_BASE_MS: u64 = 1_000;

/// Linear backoff schedule for verdict polling
///
/// Pure function of the attempt ordinal; nothing is persisted between
/// attempts. The base is parameterizable so tests can run with a
/// zero-length schedule.
#[derive(Debug, Clone, Copy)]
pub struct BackoffSchedule {
    base_ms: u64,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            base_ms: DEFAULT_BASE_MS,
        }
    }
}

impl BackoffSchedule {
    /// A schedule with no waiting at all, for tests
    pub fn immediate() -> Self {
        Self { base_ms: 0 }
    }

    /// Delay to observe after the given (1-based) attempt
    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_ms * u64::from(attempt) * 10 / 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_endpoints() {
        let schedule = BackoffSchedule::default();
        assert_eq!(schedule.delay(1), Duration::from_millis(3_333));
        assert_eq!(schedule.delay(7), Duration::from_millis(23_333));
    }

    #[test]
    fn test_delay_strictly_increasing() {
        let schedule = BackoffSchedule::default();
        for attempt in 1..7 {
            assert!(
                schedule.delay(attempt) < schedule.delay(attempt + 1),
                "delay({}) should be shorter than delay({})",
                attempt,
                attempt + 1
            );
        }
    }

    #[test]
    fn test_immediate_schedule_never_waits() {
        let schedule = BackoffSchedule::immediate();
        for attempt in 1..=7 {
            assert_eq!(schedule.delay(attempt), Duration::ZERO);
        }
    }
}
