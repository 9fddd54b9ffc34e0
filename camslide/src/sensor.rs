// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Incremental carriage position from a falling-edge pulse train.
//!
//! Each motor pulse fires an edge interrupt that calls [`PositionSensor::on_edge`]. Pulses that
//! arrive implausibly soon after the previous one are treated as noise. Instead of a fixed
//! threshold, an edge is judged against the interval that preceded it:
//!
//! - accept if the previous interval was longer than [`MAX_PULSE_LENGTH_US`] (motor was stopped
//!   or just starting), or
//! - accept if `5 * interval > 3 * previous_interval`.
//!
//! The edge time and interval are recorded for every edge, accepted or not, so the reference
//! follows the motor down as it decelerates and slow real pulses keep counting.
//!
//! ## Sharing
//!
//! The sensor is meant to live in a `static` shared by the edge interrupt and the main loop. All
//! fields are atomics. The interrupt is the only writer of the timing fields and publishes the
//! count with release RMW operations; readers use acquire loads. The main loop writes the
//! direction (read by the interrupt) and zeroes the count once after homing.

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

use crate::drivers::Direction;

/// Intervals longer than this mean the previous pulse cannot be used as a reference.
pub const MAX_PULSE_LENGTH_US: u32 = 20_000;

/// Pulses per centimeter of carriage travel (53.33 * 3 * 2 * 2).
pub const COUNTS_PER_CM: i32 = 6399;
const UM_PER_CM: i32 = 10_000;

/// Convert a pulse count to micrometers, truncating toward zero.
///
/// Stop points depend on this exact rounding.
pub fn counts_to_micrometers(counts: i32) -> i32 {
    (counts as i64 * UM_PER_CM as i64 / COUNTS_PER_CM as i64) as i32
}

/// Pulse counter shared between the edge interrupt and the control loop.
pub struct PositionSensor {
    position: AtomicI32,
    last_edge_us: AtomicU32,
    last_interval_us: AtomicU32,
    /// `true` for [`Direction::Forward`]
    forward: AtomicBool,
}

impl PositionSensor {
    pub const fn new() -> Self {
        Self {
            position: AtomicI32::new(0),
            last_edge_us: AtomicU32::new(0),
            last_interval_us: AtomicU32::new(0),
            forward: AtomicBool::new(false),
        }
    }

    /// Record one edge at `timestamp_us` (free-running microsecond counter, wrapping).
    ///
    /// Returns `true` if the edge was counted as motion.
    pub fn on_edge(&self, timestamp_us: u32) -> bool {
        let last = self.last_edge_us.load(Ordering::Relaxed);
        let previous = self.last_interval_us.load(Ordering::Relaxed);
        let interval = timestamp_us.wrapping_sub(last);

        let accepted = previous > MAX_PULSE_LENGTH_US
            || 5 * u64::from(interval) > 3 * u64::from(previous);

        if accepted {
            if self.forward.load(Ordering::Acquire) {
                self.position.fetch_sub(1, Ordering::Release);
            } else {
                self.position.fetch_add(1, Ordering::Release);
            }
        }

        self.last_edge_us.store(timestamp_us, Ordering::Relaxed);
        self.last_interval_us.store(interval, Ordering::Relaxed);

        accepted
    }

    /// Set the sign applied to future accepted edges.
    pub fn set_direction(&self, direction: Direction) {
        self.forward
            .store(direction == Direction::Forward, Ordering::Release);
    }

    pub fn direction(&self) -> Direction {
        if self.forward.load(Ordering::Acquire) {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Signed pulse count since the last [`reset`](Self::reset).
    #[inline]
    pub fn position_counts(&self) -> i32 {
        self.position.load(Ordering::Acquire)
    }

    /// Position in micrometers.
    #[inline]
    pub fn position_um(&self) -> i32 {
        counts_to_micrometers(self.position_counts())
    }

    /// Interval preceding the most recent edge.
    #[inline]
    pub fn last_interval_us(&self) -> u32 {
        self.last_interval_us.load(Ordering::Relaxed)
    }

    /// Zero the count.
    pub fn reset(&self) {
        self.position.store(0, Ordering::Release);
    }
}

impl Default for PositionSensor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn conversion_is_exact_at_one_centimeter() {
        assert_eq!(counts_to_micrometers(6399), 10_000);
        assert_eq!(counts_to_micrometers(-6399), -10_000);
        assert_eq!(counts_to_micrometers(1), 1);
        assert_eq!(counts_to_micrometers(-1), -1);
        assert_eq!(counts_to_micrometers(0), 0);
    }

    #[test]
    fn conversion_does_not_overflow() {
        assert_eq!(counts_to_micrometers(1_000_000), 1_562_744);
    }

    #[test]
    fn steady_pulses_count_up_in_reverse() {
        let sensor = PositionSensor::new();
        sensor.set_direction(Direction::Reverse);
        for i in 1..=10u32 {
            assert!(sensor.on_edge(i * 1_000));
        }
        assert_eq!(sensor.position_counts(), 10);
    }

    #[test]
    fn forward_counts_down() {
        let sensor = PositionSensor::new();
        sensor.set_direction(Direction::Forward);
        sensor.on_edge(1_000);
        sensor.on_edge(2_000);
        assert_eq!(sensor.position_counts(), -2);
    }

    #[test]
    fn early_glitch_is_rejected_but_becomes_reference() {
        let sensor = PositionSensor::new();
        sensor.set_direction(Direction::Reverse);
        sensor.on_edge(1_000);
        sensor.on_edge(2_000);
        assert_eq!(sensor.position_counts(), 2);

        // 100 µs after a 1000 µs interval: 500 > 3000 is false
        assert!(!sensor.on_edge(2_100));
        assert_eq!(sensor.position_counts(), 2);
        assert_eq!(sensor.last_interval_us(), 100);

        // judged against the glitch interval, so the next real pulse counts
        assert!(sensor.on_edge(3_000));
        assert_eq!(sensor.position_counts(), 3);
    }

    #[test]
    fn decelerating_pulses_keep_counting() {
        let sensor = PositionSensor::new();
        sensor.set_direction(Direction::Reverse);
        let mut t = 0;
        for interval in [1_000u32, 1_200, 1_500, 2_000, 3_000, 5_000] {
            t += interval;
            assert!(sensor.on_edge(t));
        }
        assert_eq!(sensor.position_counts(), 6);
    }

    #[test]
    fn direction_change_is_not_retroactive() {
        let sensor = PositionSensor::new();
        sensor.set_direction(Direction::Reverse);
        sensor.on_edge(1_000);
        sensor.on_edge(2_000);
        sensor.set_direction(Direction::Forward);
        assert_eq!(sensor.position_counts(), 2);
        sensor.on_edge(3_000);
        assert_eq!(sensor.position_counts(), 1);
    }

    #[test]
    fn timestamps_may_wrap() {
        let sensor = PositionSensor::new();
        sensor.set_direction(Direction::Reverse);
        sensor.on_edge(u32::MAX - 1_500);
        sensor.on_edge(u32::MAX - 500);
        assert!(sensor.on_edge(500));
        assert_eq!(sensor.last_interval_us(), 1_001);
    }

    #[test]
    fn reset_zeroes_position_only() {
        let sensor = PositionSensor::new();
        sensor.on_edge(30_000);
        sensor.reset();
        assert_eq!(sensor.position_counts(), 0);
        assert_eq!(sensor.last_interval_us(), 30_000);
    }

    proptest! {
        #[test]
        fn conversion_truncates_toward_zero(counts in -10_000_000i32..10_000_000) {
            let exact = counts as f64 * 10_000.0 / 6_399.0;
            prop_assert_eq!(counts_to_micrometers(counts) as f64, exact.trunc());
        }

        #[test]
        fn every_edge_moves_by_at_most_one(
            intervals in proptest::collection::vec(1u32..50_000, 1..64),
            forward in any::<bool>(),
        ) {
            let sensor = PositionSensor::new();
            sensor.set_direction(if forward { Direction::Forward } else { Direction::Reverse });
            let step = if forward { -1 } else { 1 };
            let mut t = 0u32;
            for interval in intervals {
                t = t.wrapping_add(interval);
                let before = sensor.position_counts();
                let accepted = sensor.on_edge(t);
                let expected = if accepted { before + step } else { before };
                prop_assert_eq!(sensor.position_counts(), expected);
                prop_assert_eq!(sensor.last_interval_us(), interval);
            }
        }
    }
}
