//! Fixed-rate scheduling on an absolute time grid.
//!
//! Every deadline is the previous deadline plus one period, never "now plus
//! one period". Work done inside a tick therefore does not accumulate as
//! drift: a slow tick makes the next sleep shorter, and a tick that overruns
//! its deadline is followed immediately by the next one.

use core::future::Future;

/// Monotonic time source.
pub trait Clock {
    /// Microseconds since an arbitrary fixed epoch.
    fn now_us(&self) -> u64;

    /// Sleep until `deadline_us`. Returns at once if it has already passed.
    fn wait_until(&mut self, deadline_us: u64) -> impl Future<Output = ()>;
}

/// Visible liveness indicator, typically an LED.
pub trait Heartbeat {
    fn toggle(&mut self);
}

/// Periodic wake-up source with a heartbeat divider.
///
/// # Example
///
/// ```
/// use gpsp_core::PeriodicScheduler;
///
/// let mut sched = PeriodicScheduler::new(1_000, 0x7F);
/// sched.start(5_000);
/// assert_eq!(sched.next_deadline(), 6_000);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PeriodicScheduler {
    period_us: u64,
    last_wake_us: u64,
    counter: u8,
    heartbeat_mask: u8,
}

impl PeriodicScheduler {
    #[must_use]
    pub const fn new(period_us: u64, heartbeat_mask: u8) -> Self {
        Self {
            period_us,
            last_wake_us: 0,
            counter: 0,
            heartbeat_mask,
        }
    }

    /// Anchor the grid at `now_us`.
    pub fn start(&mut self, now_us: u64) {
        self.last_wake_us = now_us;
        self.counter = 0;
    }

    #[inline]
    #[must_use]
    pub const fn next_deadline(&self) -> u64 {
        self.last_wake_us + self.period_us
    }

    #[inline]
    #[must_use]
    pub const fn period_us(&self) -> u64 {
        self.period_us
    }

    /// Wait for the next grid point and return it.
    pub async fn wait_next<C: Clock>(&mut self, clock: &mut C) -> u64 {
        let deadline = self.next_deadline();
        clock.wait_until(deadline).await;
        self.last_wake_us = deadline;
        deadline
    }

    /// Count one tick and toggle the heartbeat when the divider rolls over.
    ///
    /// Returns whether the heartbeat was toggled.
    pub fn beat<H: Heartbeat>(&mut self, heartbeat: &mut H) -> bool {
        self.counter = self.counter.wrapping_add(1);
        if self.counter & self.heartbeat_mask == 0 {
            heartbeat.toggle();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{block_on, MockClock, MockHeartbeat};
    use std::vec::Vec;

    const PERIOD: u64 = 1_000;

    /// Deterministic work durations in `[0, PERIOD / 2]`.
    fn work_durations(n: usize) -> Vec<u64> {
        let mut state: u32 = 0x1234_5678;
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                u64::from(state) % (PERIOD / 2 + 1)
            })
            .collect()
    }

    #[test]
    fn test_no_drift_over_many_ticks() {
        let mut clock = MockClock::default();
        let now = clock.handle();
        now.set(10_000);
        let mut sched = PeriodicScheduler::new(PERIOD, 0x7F);
        sched.start(clock.now_us());

        let mut wakes = Vec::new();
        for work in work_durations(1000) {
            wakes.push(block_on(sched.wait_next(&mut clock)));
            now.set(now.get() + work);
        }

        assert_eq!(wakes[0], 10_000 + PERIOD);
        assert_eq!(wakes[999], 10_000 + 1000 * PERIOD);
        assert!(wakes.windows(2).all(|w| w[1] - w[0] == PERIOD));
    }

    fn mean_period(wakes: &[u64]) -> u64 {
        (wakes[wakes.len() - 1] - wakes[0]) / (wakes.len() as u64 - 1)
    }

    #[test]
    fn test_grid_holds_period_where_relative_sleep_drifts() {
        let works = work_durations(1000);

        // Sleeping "now + period" after each tick's work
        let mut clock = MockClock::default();
        let now = clock.handle();
        let mut relative = Vec::new();
        for &work in &works {
            let deadline = clock.now_us() + PERIOD;
            block_on(clock.wait_until(deadline));
            relative.push(clock.now_us());
            now.set(now.get() + work);
        }

        let mut clock = MockClock::default();
        let now = clock.handle();
        let mut sched = PeriodicScheduler::new(PERIOD, 0x7F);
        sched.start(clock.now_us());
        let mut grid = Vec::new();
        for &work in &works {
            block_on(sched.wait_next(&mut clock));
            grid.push(clock.now_us());
            now.set(now.get() + work);
        }

        assert!(mean_period(&relative) > PERIOD);
        assert_eq!(mean_period(&grid), PERIOD);
        assert_eq!(grid[999], 1000 * PERIOD);
    }

    #[test]
    fn test_overrun_catches_up_on_grid() {
        let mut clock = MockClock::default();
        let now = clock.handle();
        let mut sched = PeriodicScheduler::new(PERIOD, 0x7F);
        sched.start(0);

        assert_eq!(block_on(sched.wait_next(&mut clock)), 1_000);
        // Tick body runs for 2.5 periods
        now.set(3_500);

        assert_eq!(block_on(sched.wait_next(&mut clock)), 2_000);
        assert_eq!(block_on(sched.wait_next(&mut clock)), 3_000);
        assert_eq!(block_on(sched.wait_next(&mut clock)), 4_000);
        assert_eq!(now.get(), 4_000);
        assert_eq!(clock.waits, [1_000, 2_000, 3_000, 4_000]);
    }

    #[test]
    fn test_heartbeat_every_128_ticks() {
        let mut sched = PeriodicScheduler::new(PERIOD, 0x7F);
        let mut led = MockHeartbeat::default();

        let mut toggled_at = Vec::new();
        for tick in 1..=300u32 {
            if sched.beat(&mut led) {
                toggled_at.push(tick);
            }
        }

        assert_eq!(toggled_at, [128, 256]);
        assert_eq!(led.toggles, 2);
    }

    #[test]
    fn test_counter_wraps() {
        let mut sched = PeriodicScheduler::new(PERIOD, 0x7F);
        let mut led = MockHeartbeat::default();

        for _ in 0..(256 * 4) {
            sched.beat(&mut led);
        }

        assert_eq!(led.toggles, 8);
    }
}
