// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! State owned by the motion supervisor.

use crate::protocol::ProgramSpec;
use crate::time::Timer;

/// Top-level supervisor state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemState {
    /// Just booted or reset. Starts the homing drive on the next tick.
    Init,
    /// Driving toward the limit switch.
    Homing,
    /// Waiting for a program.
    Idle,
    /// Starts the travel drive for the current step on the next tick.
    StartMove,
    /// Travelling, then settling once the step target is passed.
    Moving,
    /// Shutter fired, waiting out the pulse and the inter-shot delay.
    ShutterActuation,
}

/// Where the running program is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionProgress {
    /// Carriage position when the program was started.
    pub origin_position_um: i32,
    /// Step being executed, starting at 1.
    pub step_index: u32,
    /// Settle or shutter wait, when armed.
    pub timer: Option<Timer>,
}

impl MotionProgress {
    pub fn new(origin_position_um: i32) -> Self {
        Self {
            origin_position_um,
            step_index: 1,
            timer: None,
        }
    }

    /// Position the carriage must pass to finish the current step.
    pub fn target_um(&self, program: &ProgramSpec) -> i64 {
        i64::from(self.origin_position_um)
            + i64::from(program.step_distance_um) * i64::from(self.step_index)
    }

    /// Whether every step of `program` has run.
    #[inline]
    pub fn finished(&self, program: &ProgramSpec) -> bool {
        self.step_index > u32::from(program.step_count)
    }
}

/// Pause toggle and the state to resume into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PauseState {
    pub is_paused: bool,
    pub saved_state: SystemState,
}

impl PauseState {
    pub const fn new() -> Self {
        Self {
            is_paused: false,
            saved_state: SystemState::Idle,
        }
    }

    /// State to enter when the pause is lifted.
    ///
    /// A paused move restarts its step drive instead of assuming the motor is still running.
    pub fn resume_state(&self) -> SystemState {
        match self.saved_state {
            SystemState::Moving => SystemState::StartMove,
            other => other,
        }
    }
}

impl Default for PauseState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_grows_with_each_step() {
        let program = ProgramSpec {
            step_distance_um: 1000,
            inter_shot_delay_ms: 0,
            step_count: 2,
        };
        let mut progress = MotionProgress::new(-250);
        assert_eq!(progress.target_um(&program), 750);
        progress.step_index = 2;
        assert_eq!(progress.target_um(&program), 1750);
        assert!(!progress.finished(&program));
        progress.step_index = 3;
        assert!(progress.finished(&program));
    }

    #[test]
    fn target_does_not_overflow() {
        let program = ProgramSpec {
            step_distance_um: u32::MAX,
            inter_shot_delay_ms: 0,
            step_count: 255,
        };
        let mut progress = MotionProgress::new(i32::MAX);
        progress.step_index = 255;
        assert!(progress.target_um(&program) > i64::from(i32::MAX));
    }

    #[test]
    fn paused_move_resumes_as_start_move() {
        let mut pause = PauseState::new();
        pause.saved_state = SystemState::Moving;
        assert_eq!(pause.resume_state(), SystemState::StartMove);
        pause.saved_state = SystemState::ShutterActuation;
        assert_eq!(pause.resume_state(), SystemState::ShutterActuation);
    }
}
