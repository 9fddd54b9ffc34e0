// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device Drivers
//!
//! Drivers that sit on top of `embedded-hal` traits and below the supervisor.
//!
//! ## Existing drivers
//!
//! - [`motor`] – DC motor on two complementary PWM legs, with an analog current sense
//! - [`shutter`] – camera trigger output with a fixed pulse width

pub mod motor;
pub mod shutter;

pub use motor::Motor;
pub use shutter::Shutter;

/// Carriage travel direction.
///
/// `Forward` runs toward the home limit switch and counts the position down. `Reverse` runs away
/// from it and counts up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Reverse,
}
