// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Camera shutter trigger.
//!
//! The trigger line is pulsed high for a fixed width. [`Shutter::fire`] blocks for the whole
//! pulse; the supervisor only fires with the motor already stopped, so the stall is bounded by
//! the pulse width and harmless.

use embedded_hal::{delay::DelayNs, digital::OutputPin};

pub struct Shutter<PIN, DELAY> {
    pin: PIN,
    delay: DELAY,
    pulse_ms: u32,
    fired: u32,
}

impl<PIN, DELAY> Shutter<PIN, DELAY>
where
    PIN: OutputPin,
    DELAY: DelayNs,
{
    /// Create a trigger, initializing the line low.
    pub fn new(mut pin: PIN, delay: DELAY, pulse_ms: u32) -> Self {
        pin.set_low().ok();
        Self {
            pin,
            delay,
            pulse_ms,
            fired: 0,
        }
    }

    /// Assert the trigger, hold it for the pulse width, release it.
    pub fn fire(&mut self) {
        self.pin.set_high().ok();
        self.delay.delay_ms(self.pulse_ms);
        self.pin.set_low().ok();
        self.fired = self.fired.wrapping_add(1);
    }

    #[inline]
    pub fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }

    /// Number of pulses since construction.
    #[inline]
    pub fn fired(&self) -> u32 {
        self.fired
    }

    pub fn free(self) -> (PIN, DELAY) {
        (self.pin, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct Line {
        high: bool,
        rises: u32,
    }

    impl embedded_hal::digital::ErrorType for Line {
        type Error = Infallible;
    }

    impl OutputPin for Line {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            if !self.high {
                self.rises += 1;
            }
            self.high = true;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Elapsed {
        ns: u64,
    }

    impl DelayNs for Elapsed {
        fn delay_ns(&mut self, ns: u32) {
            self.ns += u64::from(ns);
        }
    }

    #[test]
    fn fire_pulses_once_for_the_width() {
        let mut shutter = Shutter::new(Line::default(), Elapsed::default(), 100);
        shutter.fire();

        assert_eq!(shutter.fired(), 1);
        let (line, delay) = shutter.free();
        assert!(!line.high);
        assert_eq!(line.rises, 1);
        assert_eq!(delay.ns, 100_000_000);
    }
}
