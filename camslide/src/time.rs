// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Loop timing.
//!
//! The control loop runs at a fixed tick. [`TickPacer`] measures how long the tick body took and
//! busy-waits the rest of the interval. An overrunning tick is not made up: the next tick simply
//! starts late.
//!
//! Waits elsewhere in the crate are millisecond [`Timer`]s: the time they were armed plus how long
//! to wait. Elapsed time is a wrapping difference, so every wait up to `u32::MAX` ms works across
//! a wrap of the millisecond counter, provided the timer is polled at least once per wrap.

/// Free-running microsecond clock.
pub trait Monotonic {
    fn now_us(&mut self) -> u64;
}

/// A millisecond wait.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timer {
    pub armed_ms: u32,
    pub wait_ms: u32,
}

impl Timer {
    #[inline]
    pub const fn start(now_ms: u32, wait_ms: u32) -> Self {
        Self {
            armed_ms: now_ms,
            wait_ms,
        }
    }

    /// Whether `wait_ms` has passed since the timer was armed.
    #[inline]
    pub fn expired(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.armed_ms) >= self.wait_ms
    }
}

/// Time left in the tick that started at `start_us`, or `None` if it already ran over.
#[inline]
pub fn remaining_us(start_us: u64, now_us: u64, interval_us: u64) -> Option<u64> {
    let elapsed = now_us.saturating_sub(start_us);
    interval_us.checked_sub(elapsed).filter(|&left| left > 0)
}

/// Outcome of [`TickPacer::finish`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pacing {
    /// The tick finished early and the remainder was spent waiting.
    OnTime { waited_us: u64 },
    /// The tick body took longer than the interval. Nothing was waited.
    Overrun { by_us: u64 },
}

/// Holds a fixed loop cadence against a [`Monotonic`] clock.
pub struct TickPacer<CLOCK> {
    clock: CLOCK,
    interval_us: u64,
    started_us: u64,
}

impl<CLOCK: Monotonic> TickPacer<CLOCK> {
    pub fn new(clock: CLOCK, interval_us: u32) -> Self {
        Self {
            clock,
            interval_us: u64::from(interval_us),
            started_us: 0,
        }
    }

    /// Mark the start of a tick. Returns the start time.
    pub fn begin(&mut self) -> u64 {
        self.started_us = self.clock.now_us();
        self.started_us
    }

    /// Busy-wait until one interval has passed since [`begin`](Self::begin).
    pub fn finish(&mut self) -> Pacing {
        let now = self.clock.now_us();
        let Some(left) = remaining_us(self.started_us, now, self.interval_us) else {
            let by_us = now
                .saturating_sub(self.started_us)
                .saturating_sub(self.interval_us);
            trace!("tick overrun by {=u64} us", by_us);
            return Pacing::Overrun { by_us };
        };

        let deadline = self.started_us + self.interval_us;
        while self.clock.now_us() < deadline {
            core::hint::spin_loop();
        }
        Pacing::OnTime { waited_us: left }
    }

    /// Milliseconds since the clock's epoch at the start of the current tick.
    #[inline]
    pub fn tick_ms(&self) -> u32 {
        (self.started_us / 1_000) as u32
    }

    pub fn clock(&mut self) -> &mut CLOCK {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Advances by a fixed step every time it is read.
    struct Stepping {
        now: u64,
        step: u64,
    }

    impl Monotonic for Stepping {
        fn now_us(&mut self) -> u64 {
            let now = self.now;
            self.now += self.step;
            now
        }
    }

    #[test]
    fn timers_survive_wraparound() {
        let t = Timer::start(100, 0);
        assert!(t.expired(100));

        let t = Timer::start(u32::MAX - 5, 10);
        assert!(!t.expired(u32::MAX));
        assert!(!t.expired(3));
        assert!(t.expired(4));
    }

    #[test]
    fn waits_past_half_the_counter_range() {
        let t = Timer::start(1_000, 0x8000_0000);
        assert!(!t.expired(1_005));
        assert!(!t.expired(1_000 + 0x7FFF_FFFF));
        assert!(t.expired(1_000 + 0x8000_0000));

        let longest = Timer::start(7, u32::MAX);
        assert!(!longest.expired(5));
        assert!(longest.expired(6));
        assert!(longest.expired(7));
    }

    #[test]
    fn remaining_is_never_negative() {
        assert_eq!(remaining_us(1_000, 1_300, 1_000), Some(700));
        assert_eq!(remaining_us(1_000, 2_000, 1_000), None);
        assert_eq!(remaining_us(1_000, 5_000, 1_000), None);
        // clock read before the start, e.g. a stale sample
        assert_eq!(remaining_us(1_000, 900, 1_000), Some(1_000));
    }

    #[test]
    fn short_tick_waits_out_the_interval() {
        let mut pacer = TickPacer::new(Stepping { now: 0, step: 100 }, 1_000);
        assert_eq!(pacer.begin(), 0);
        // finish reads 100 => 900 left
        assert_eq!(pacer.finish(), Pacing::OnTime { waited_us: 900 });
        assert!(pacer.clock().now >= 1_000);
    }

    #[test]
    fn overrun_is_not_compensated() {
        let mut pacer = TickPacer::new(Stepping { now: 0, step: 2_500 }, 1_000);
        pacer.begin();
        assert_eq!(pacer.finish(), Pacing::Overrun { by_us: 1_500 });

        // next tick starts where the clock is, not at the missed slot
        let start = pacer.begin();
        assert_eq!(start, 5_000);
        assert_eq!(pacer.tick_ms(), 5);
    }
}
