// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-channel PWM on TIM4 for the H-bridge inputs.
//!
//! This module configures TIM4 registers for edge-aligned PWM mode 1 on CH1 (PD12) and CH2 (PD13)
//! and exposes each channel as an `embedded-hal` [`SetDutyCycle`].

use core::convert::Infallible;

use camslide::drivers::motor::FULL_DUTY;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use stm32f7xx_hal::pac;

/// PWM mode 1 with preload, in an OCxM/OCxPE byte of CCMR1.
const OC_PWM1_PRELOAD: u32 = (0b110 << 4) | (1 << 3);

/// Configured TIM4, ready to be split into its two channels.
pub struct Tim4Pwm {
    _tim: pac::TIM4,
}

impl Tim4Pwm {
    /// Enable TIM4 with auto-reload [`FULL_DUTY`] and both channels at 0 % duty.
    ///
    /// `prescaler` divides the timer clock; 0 runs the counter at full speed.
    pub fn new(tim: pac::TIM4, prescaler: u16) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        tim.psc.write(|w| unsafe { w.bits(u32::from(prescaler)) });
        tim.arr.write(|w| unsafe { w.bits(u32::from(FULL_DUTY)) });
        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });

        // CH1 in the low byte, CH2 in the high byte
        tim.ccmr1_output()
            .write(|w| unsafe { w.bits(OC_PWM1_PRELOAD | (OC_PWM1_PRELOAD << 8)) });

        // Outputs enabled, active high
        tim.ccer.write(|w| unsafe { w.bits((1 << 0) | (1 << 4)) });

        // Auto-reload preload, then latch everything with an update event
        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { _tim: tim }
    }

    /// Hand out the two channels. The timer stays running.
    pub fn split(self) -> (Channel<1>, Channel<2>) {
        (Channel { _private: () }, Channel { _private: () })
    }
}

/// One compare channel of TIM4.
pub struct Channel<const CH: u8> {
    _private: (),
}

impl<const CH: u8> ErrorType for Channel<CH> {
    type Error = Infallible;
}

impl<const CH: u8> SetDutyCycle for Channel<CH> {
    #[inline]
    fn max_duty_cycle(&self) -> u16 {
        FULL_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        // each channel owns its own compare register
        let tim = unsafe { &*pac::TIM4::ptr() };
        let duty = u32::from(duty.min(FULL_DUTY));
        match CH {
            1 => tim.ccr1.write(|w| unsafe { w.bits(duty) }),
            _ => tim.ccr2.write(|w| unsafe { w.bits(duty) }),
        }
        Ok(())
    }
}
