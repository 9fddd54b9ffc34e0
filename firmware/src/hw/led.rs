// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board status LEDs.

use camslide::SystemState;
use embedded_hal::digital::OutputPin;

/// LED that remembers its last state. The board wires all LEDs active-low.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn active_low(mut pin: PIN) -> Self {
        pin.set_high().ok();
        Self { pin, is_on: false }
    }

    pub fn set(&mut self, on: bool) {
        if on == self.is_on {
            return;
        }
        if on {
            self.pin.set_low().ok();
        } else {
            self.pin.set_high().ok();
        }
        self.is_on = on;
    }
}

/// Red while homing, green while idle, yellow while a program step runs.
pub struct StatusLeds<R: OutputPin, Y: OutputPin, G: OutputPin> {
    pub red: Led<R>,
    pub yellow: Led<Y>,
    pub green: Led<G>,
}

impl<R: OutputPin, Y: OutputPin, G: OutputPin> StatusLeds<R, Y, G> {
    pub fn new(red: R, yellow: Y, green: G) -> Self {
        Self {
            red: Led::active_low(red),
            yellow: Led::active_low(yellow),
            green: Led::active_low(green),
        }
    }

    pub fn show(&mut self, state: SystemState) {
        let homing = matches!(state, SystemState::Init | SystemState::Homing);
        let idle = state == SystemState::Idle;

        self.red.set(homing);
        self.green.set(idle);
        self.yellow.set(!homing && !idle);
    }
}
