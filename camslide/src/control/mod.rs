// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Motion Control
//!
//! - [`supervisor`] - The homing / step-program state machine.
//! - [`state`] - State types owned by the supervisor.

pub mod state;
pub mod supervisor;

pub use state::{MotionProgress, PauseState, SystemState};
pub use supervisor::Supervisor;
