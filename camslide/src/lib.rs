// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # camslide
//!
//! Control core for a single-axis motorized camera slider. The slider homes its carriage against
//! a limit switch, then runs a step program: advance a fixed distance, settle, fire the camera
//! shutter, wait, repeat. Position, motor current and step completion are reported over a serial
//! link.
//!
//! Everything here is generic over `embedded-hal` 1.0 traits, so the same code runs on the board
//! and in host tests. Board bring-up lives in the `firmware` crate.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`sensor`] | Interrupt-fed pulse counter with timing-based noise rejection |
//! | [`drivers`] | Two-leg PWM motor drive and the shutter trigger |
//! | [`protocol`] | Inbound command parser and outbound telemetry framing |
//! | [`control`] | The motion supervisor state machine |
//! | [`time`] | Tick pacing and wrap-safe millisecond timers |
//! | [`config`] | Fixed physical constants |
//!
//! ## Logging
//!
//! Enable the `defmt` feature to route internal log points through `defmt`. Without it the log
//! macros compile to nothing.
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod control;
pub mod drivers;
pub mod protocol;
pub mod sensor;
pub mod time;

pub use config::SliderConfig;
pub use control::{Supervisor, SystemState};
pub use drivers::Direction;
pub use sensor::PositionSensor;
