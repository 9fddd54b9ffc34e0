// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed physical constants for the slider.
//!
//! Nothing here is persisted; the values are baked in at build time and handed to
//! [`Supervisor::new`](crate::Supervisor::new).

/// Timing and drive levels used by the supervisor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SliderConfig {
    /// Main loop period.
    pub tick_interval_us: u32,

    /// Drive level while seeking the limit switch (0..=8192).
    pub homing_power: u16,
    /// Drive level for a program step.
    pub travel_power: u16,
    /// Drive level for manual Forward/Reverse commands.
    pub jog_power: u16,

    /// Wait after the motor stops, before the shutter fires.
    pub settle_delay_ms: u32,
    /// How long the shutter output is held high.
    pub shutter_pulse_ms: u32,
    /// Period of the motor current report.
    pub current_report_interval_ms: u32,

    /// Usable rail length. Not enforced by the control loop.
    pub max_travel_um: u32,
}

impl SliderConfig {
    pub const DEFAULT: Self = Self {
        tick_interval_us: 1_000,
        homing_power: 8_000,
        travel_power: 8_000,
        jog_power: 8_000,
        settle_delay_ms: 100,
        shutter_pulse_ms: 100,
        current_report_interval_ms: 100,
        max_travel_um: 85_000,
    };
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
