// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! DC motor on a single-supply H-bridge driven by two complementary PWM legs.
//!
//! One leg is held at full duty and the other carries the inverse of the requested power, so
//! `power = 0` leaves both legs high (braked) and `power = FULL_DUTY` drives at full speed. Which
//! leg is held depends on the direction.
//!
//! Current is read from a shunt amplifier biased at mid-supply, sampled by a 12-bit ADC.

use embedded_hal::pwm::SetDutyCycle;

use super::Direction;

/// PWM auto-reload value of the motor timer. Also the largest accepted power.
pub const FULL_DUTY: u16 = 8192;

/// ADC reference voltage in millivolts.
const ADC_REF_MV: i32 = 3300;
/// Largest 12-bit ADC code.
const ADC_MAX: i32 = 4095;
/// Amplifier output at zero current.
const SENSE_BIAS_MV: i32 = 1650;
// 0.04 mV/mA shunt, gain of 20 => 0.8 mV/mA
const SENSE_UV_PER_MA: i32 = 800;

/// Convert one raw ADC sample of the current-sense amplifier to milliamps.
///
/// The sign gives the current direction.
pub fn adc_to_milliamps(raw: u16) -> i32 {
    let mv = raw as i32 * ADC_REF_MV / ADC_MAX - SENSE_BIAS_MV;
    mv * 1000 / SENSE_UV_PER_MA
}

/// Motor drive over two PWM legs.
///
/// `Sense` is a closure that returns one raw 12-bit ADC reading (0..4095) of the current-sense
/// channel.
pub struct Motor<LegA, LegB, Sense> {
    leg_a: LegA,
    leg_b: LegB,
    sense: Sense,
    direction: Direction,
    power: u16,
}

impl<LegA, LegB, Sense> Motor<LegA, LegB, Sense>
where
    LegA: SetDutyCycle,
    LegB: SetDutyCycle,
    Sense: FnMut() -> u16,
{
    /// Wrap the two legs and brake.
    pub fn new(leg_a: LegA, leg_b: LegB, sense: Sense) -> Self {
        let mut motor = Self {
            leg_a,
            leg_b,
            sense,
            direction: Direction::Forward,
            power: 0,
        };
        motor.set_power(0);
        motor
    }

    /// Select the direction used by the next [`set_power`](Self::set_power).
    ///
    /// The outputs are not touched.
    #[inline]
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Drive the outputs at `power` (0..=[`FULL_DUTY`]) in the current direction.
    ///
    /// The range is not checked.
    pub fn set_power(&mut self, power: u16) {
        self.power = power;
        let active = FULL_DUTY.wrapping_sub(power);

        match self.direction {
            Direction::Forward => {
                self.leg_a.set_duty_cycle(FULL_DUTY).ok();
                self.leg_b.set_duty_cycle(active).ok();
            }
            Direction::Reverse => {
                self.leg_b.set_duty_cycle(FULL_DUTY).ok();
                self.leg_a.set_duty_cycle(active).ok();
            }
        }
    }

    /// Brake (both legs high).
    #[inline]
    pub fn brake(&mut self) {
        self.set_power(0);
    }

    /// Sample the current sense once.
    pub fn current_milliamps(&mut self) -> i32 {
        adc_to_milliamps((self.sense)())
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn power(&self) -> u16 {
        self.power
    }

    pub fn free(self) -> (LegA, LegB, Sense) {
        (self.leg_a, self.leg_b, self.sense)
    }
}
