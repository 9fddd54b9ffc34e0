// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Microsecond time base on TIM2.
//!
//! TIM2 is a 32-bit timer; here it free-runs at 1 MHz over its full range and is never stopped or
//! reset after [`Microseconds::start`]. The raw counter wraps every ~71.6 minutes:
//!
//! - the edge interrupt stamps pulses with [`now_us32`] and relies on wrapping subtraction,
//! - the main loop uses [`MicrosClock`], which widens the count to 64 bits as long as it is read
//!   at least once per wrap,
//! - drivers that need a blocking wait get a [`TimerDelay`].

use camslide::time::Monotonic;
use embedded_hal::delay::DelayNs;
use stm32f7xx_hal::pac;

const TICK_HZ: u32 = 1_000_000;

/// Owner of the running TIM2.
pub struct Microseconds {
    _tim: pac::TIM2,
}

impl Microseconds {
    /// Start TIM2 counting microseconds. `timer_clock_hz` is the APB1 timer clock.
    pub fn start(tim: pac::TIM2, timer_clock_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        let prescaler = (timer_clock_hz / TICK_HZ).saturating_sub(1);
        tim.psc.write(|w| unsafe { w.bits(prescaler) });

        // Auto-reload: max 32-bit
        tim.arr.write(|w| unsafe { w.bits(0xFFFF_FFFF) });

        // Load the prescaler now rather than at the first overflow
        tim.egr.write(|w| w.ug().set_bit());
        tim.cnt.write(|w| unsafe { w.bits(0) });

        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { _tim: tim }
    }

    pub fn clock(&self) -> MicrosClock {
        MicrosClock {
            last: now_us32(),
            high: 0,
        }
    }

    pub fn delay(&self) -> TimerDelay {
        TimerDelay { _private: () }
    }
}

/// Raw 32-bit microsecond count. Safe to call from any context.
#[inline]
pub fn now_us32() -> u32 {
    // read-only access to a register nothing else writes after start
    let tim = unsafe { &*pac::TIM2::ptr() };
    tim.cnt.read().bits()
}

/// TIM2 widened to 64 bits.
pub struct MicrosClock {
    last: u32,
    high: u32,
}

impl Monotonic for MicrosClock {
    fn now_us(&mut self) -> u64 {
        let now = now_us32();
        if now < self.last {
            self.high = self.high.wrapping_add(1);
        }
        self.last = now;
        (u64::from(self.high) << 32) | u64::from(now)
    }
}

/// Busy-wait delay on TIM2, microsecond resolution.
pub struct TimerDelay {
    _private: (),
}

impl TimerDelay {
    fn wait_us(&mut self, us: u32) {
        let start = now_us32();
        while now_us32().wrapping_sub(start) < us {
            core::hint::spin_loop();
        }
    }
}

impl DelayNs for TimerDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.wait_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.wait_us(us);
    }

    fn delay_ms(&mut self, mut ms: u32) {
        // stay well inside one counter wrap per wait
        const CHUNK_MS: u32 = 1_000_000;
        while ms > 0 {
            let step = ms.min(CHUNK_MS);
            self.wait_us(step * 1_000);
            ms -= step;
        }
    }
}
