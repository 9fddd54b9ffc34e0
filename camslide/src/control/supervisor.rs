// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Motion supervisor: the slider's top-level state machine.
//!
//! Call [`Supervisor::tick`] once per loop iteration. Each tick:
//!
//! 1. drains every byte waiting on the serial port through the [`Parser`] and dispatches each
//!    completed command immediately,
//! 2. reads the carriage position and runs one transition of the state machine,
//! 3. reports the position if it changed, and the motor current every report interval.
//!
//! ```ignore
//! loop {
//!     let start = pacer.begin();
//!     supervisor.tick((start / 1_000) as u32, &mut usart);
//!     pacer.finish();
//! }
//! ```
//!
//! Nothing here fails. Bad frames are dropped by the parser, commands that don't fit the current
//! state are ignored, and Reset always re-homes.

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    pwm::SetDutyCycle,
};
use embedded_hal_nb::serial;

use crate::config::SliderConfig;
use crate::control::state::{MotionProgress, PauseState, SystemState};
use crate::drivers::{Direction, Motor, Shutter};
use crate::protocol::{Command, Message, Parser, ProgramSpec};
use crate::sensor::PositionSensor;
use crate::time::Timer;

/// Supervisor state and the hardware it drives.
///
/// The position sensor is shared with the edge interrupt and only borrowed here.
pub struct Supervisor<'a, LegA, LegB, Sense, Trig, Delay, Limit> {
    config: SliderConfig,
    sensor: &'a PositionSensor,
    motor: Motor<LegA, LegB, Sense>,
    shutter: Shutter<Trig, Delay>,
    limit_switch: Limit,
    parser: Parser,

    state: SystemState,
    program: ProgramSpec,
    progress: MotionProgress,
    pause: PauseState,

    /// Position reported on the previous tick
    last_position_um: i32,
    /// Armed after each current report; unset until the first one.
    current_report: Option<Timer>,
}

impl<'a, LegA, LegB, Sense, Trig, Delay, Limit> Supervisor<'a, LegA, LegB, Sense, Trig, Delay, Limit>
where
    LegA: SetDutyCycle,
    LegB: SetDutyCycle,
    Sense: FnMut() -> u16,
    Trig: OutputPin,
    Delay: DelayNs,
    Limit: InputPin,
{
    /// Create a supervisor in [`SystemState::Init`]. The first tick starts homing.
    pub fn new(
        config: SliderConfig,
        sensor: &'a PositionSensor,
        motor: Motor<LegA, LegB, Sense>,
        shutter: Shutter<Trig, Delay>,
        limit_switch: Limit,
    ) -> Self {
        Self {
            config,
            sensor,
            motor,
            shutter,
            limit_switch,
            parser: Parser::new(),
            state: SystemState::Init,
            program: ProgramSpec::default(),
            progress: MotionProgress::default(),
            pause: PauseState::new(),
            last_position_um: 0,
            current_report: None,
        }
    }

    /// Run one control tick at `now_ms`.
    pub fn tick<P>(&mut self, now_ms: u32, port: &mut P)
    where
        P: serial::Read<u8> + serial::Write<u8>,
    {
        self.drain(port);

        let position_um = self.sensor.position_um();
        self.step(now_ms, position_um, port);
        self.report(now_ms, position_um, port);
    }

    fn drain<P: serial::Read<u8>>(&mut self, port: &mut P) {
        loop {
            match port.read() {
                Ok(byte) => match self.parser.push(byte) {
                    Ok(Some(command)) => self.dispatch(command),
                    Ok(None) => {}
                    Err(e) => debug!("dropped frame: {}", e),
                },
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(_)) => {
                    debug!("serial read error");
                    break;
                }
            }
        }
    }

    /// Apply one decoded command.
    pub fn dispatch(&mut self, command: Command) {
        debug!("command {}", command);

        match command {
            Command::Stop => self.motor.brake(),
            Command::Forward => self.drive(Direction::Forward, self.config.jog_power),
            Command::Reverse => self.drive(Direction::Reverse, self.config.jog_power),
            Command::Shutter => self.shutter.fire(),
            Command::Start(program) => self.start(program),
            Command::Pause => self.toggle_pause(),
            Command::Reset => {
                self.pause.is_paused = false;
                self.enter(SystemState::Init);
            }
        }
    }

    fn start(&mut self, program: ProgramSpec) {
        if self.state != SystemState::Idle {
            debug!("start ignored in {}", self.state);
            return;
        }

        self.program = program;
        self.progress = MotionProgress::new(self.sensor.position_um());
        self.pause.is_paused = false;
        info!(
            "program: {=u32} um x {=u8}, {=u32} ms between shots",
            program.step_distance_um,
            program.step_count,
            program.inter_shot_delay_ms
        );
        self.enter(SystemState::StartMove);
    }

    fn toggle_pause(&mut self) {
        self.pause.is_paused = !self.pause.is_paused;

        if self.pause.is_paused {
            self.motor.brake();
            self.pause.saved_state = self.state;
            self.enter(SystemState::Idle);
        } else {
            self.enter(self.pause.resume_state());
        }
    }

    fn step<P: serial::Write<u8>>(&mut self, now_ms: u32, position_um: i32, port: &mut P) {
        match self.state {
            SystemState::Init => {
                self.drive(Direction::Forward, self.config.homing_power);
                self.enter(SystemState::Homing);
            }

            SystemState::Homing => {
                if self.limit_switch.is_high().unwrap_or(false) {
                    self.motor.brake();
                    self.sensor.reset();
                    self.enter(SystemState::Idle);
                }
            }

            SystemState::Idle => {}

            SystemState::StartMove => {
                self.drive(Direction::Reverse, self.config.travel_power);
                self.progress.timer = None;
                self.enter(SystemState::Moving);
            }

            SystemState::Moving => {
                if i64::from(position_um) <= self.progress.target_um(&self.program) {
                    return;
                }
                match self.progress.timer {
                    None => {
                        self.motor.brake();
                        self.progress.timer =
                            Some(Timer::start(now_ms, self.config.settle_delay_ms));
                    }
                    Some(settle) if settle.expired(now_ms) => {
                        self.progress.timer = None;
                        self.enter(SystemState::ShutterActuation);
                    }
                    Some(_) => {}
                }
            }

            SystemState::ShutterActuation => match self.progress.timer {
                None => {
                    self.shutter.fire();
                    let wait = self
                        .shutter
                        .pulse_ms()
                        .saturating_add(self.program.inter_shot_delay_ms);
                    self.progress.timer = Some(Timer::start(now_ms, wait));
                }
                Some(shot) if shot.expired(now_ms) => {
                    self.progress.timer = None;
                    self.progress.step_index += 1;

                    if self.progress.finished(&self.program) {
                        self.enter(SystemState::Idle);
                        Self::send(port, Message::done());
                    } else {
                        self.enter(SystemState::StartMove);
                    }
                }
                Some(_) => {}
            },
        }
    }

    fn report<P: serial::Write<u8>>(&mut self, now_ms: u32, position_um: i32, port: &mut P) {
        if position_um != self.last_position_um {
            Self::send(port, Message::position(position_um));
        }
        self.last_position_um = position_um;

        if self.current_report.is_none_or(|t| t.expired(now_ms)) {
            let ma = self.motor.current_milliamps();
            Self::send(port, Message::current(ma));
            self.current_report =
                Some(Timer::start(now_ms, self.config.current_report_interval_ms));
        }
    }

    fn send<P: serial::Write<u8>>(port: &mut P, message: Message) {
        for byte in message.encode() {
            if nb::block!(port.write(byte)).is_err() {
                debug!("dropped {}", message.kind);
                return;
            }
        }
    }

    /// Point both the motor and the pulse counter in `direction`, then apply `power`.
    fn drive(&mut self, direction: Direction, power: u16) {
        self.sensor.set_direction(direction);
        self.motor.set_direction(direction);
        self.motor.set_power(power);
    }

    fn enter(&mut self, next: SystemState) {
        if next != self.state {
            debug!("{} -> {}", self.state, next);
        }
        self.state = next;
    }

    #[inline]
    pub fn state(&self) -> SystemState {
        self.state
    }

    #[inline]
    pub fn program(&self) -> &ProgramSpec {
        &self.program
    }

    #[inline]
    pub fn progress(&self) -> &MotionProgress {
        &self.progress
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.pause.is_paused
    }

    #[inline]
    pub fn config(&self) -> &SliderConfig {
        &self.config
    }

    #[inline]
    pub fn sensor(&self) -> &PositionSensor {
        self.sensor
    }

    #[inline]
    pub fn motor(&self) -> &Motor<LegA, LegB, Sense> {
        &self.motor
    }

    #[inline]
    pub fn shutter(&self) -> &Shutter<Trig, Delay> {
        &self.shutter
    }

    #[inline]
    pub fn parser(&self) -> &Parser {
        &self.parser
    }
}
