// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! In-memory stand-ins for the board and a small carriage simulation.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use camslide::drivers::{motor::FULL_DUTY, Motor, Shutter};
use camslide::protocol::{Command, Message, MessageKind};
use camslide::{PositionSensor, SliderConfig, Supervisor, SystemState};
use embedded_hal::{delay::DelayNs, digital, pwm};
use embedded_hal_nb::serial;

pub struct Leg;

impl pwm::ErrorType for Leg {
    type Error = Infallible;
}

impl pwm::SetDutyCycle for Leg {
    fn max_duty_cycle(&self) -> u16 {
        FULL_DUTY
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Infallible> {
        Ok(())
    }
}

pub struct Trigger;

impl digital::ErrorType for Trigger {
    type Error = Infallible;
}

impl digital::OutputPin for Trigger {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Shutter pulses don't take simulated time.
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[derive(Clone, Default)]
pub struct Switch(pub Rc<Cell<bool>>);

impl digital::ErrorType for Switch {
    type Error = Infallible;
}

impl digital::InputPin for Switch {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

#[derive(Debug)]
pub struct PortError;

impl serial::Error for PortError {
    fn kind(&self) -> serial::ErrorKind {
        serial::ErrorKind::Other
    }
}

#[derive(Default)]
pub struct Port {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    /// Fail one read after this many more bytes have been read. The failing read consumes nothing.
    pub rx_error_after: Option<usize>,
    /// Number of upcoming writes to fail.
    pub failing_writes: usize,
}

impl serial::ErrorType for Port {
    type Error = PortError;
}

impl serial::Read<u8> for Port {
    fn read(&mut self) -> nb::Result<u8, PortError> {
        if self.rx_error_after == Some(0) {
            self.rx_error_after = None;
            return Err(nb::Error::Other(PortError));
        }
        let byte = self.rx.pop_front().ok_or(nb::Error::WouldBlock)?;
        if let Some(n) = self.rx_error_after.as_mut() {
            *n -= 1;
        }
        Ok(byte)
    }
}

impl serial::Write<u8> for Port {
    fn write(&mut self, word: u8) -> nb::Result<(), PortError> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(nb::Error::Other(PortError));
        }
        self.tx.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), PortError> {
        Ok(())
    }
}

/// Mid-scale reading, i.e. zero current.
fn sense() -> u16 {
    2048
}

pub type Slider = Supervisor<'static, Leg, Leg, fn() -> u16, Trigger, NoDelay, Switch>;

/// A supervisor wired to fakes, with a clock and a carriage that moves one pulse per tick while
/// the motor is powered.
pub struct Rig {
    pub slider: Slider,
    pub sensor: &'static PositionSensor,
    pub port: Port,
    pub limit: Switch,
    pub now_ms: u32,
    edge_us: u32,
}

impl Rig {
    pub fn new() -> Self {
        let sensor: &'static PositionSensor = Box::leak(Box::new(PositionSensor::new()));
        let config = SliderConfig::DEFAULT;
        let limit = Switch::default();
        let motor = Motor::new(Leg, Leg, sense as fn() -> u16);
        let shutter = Shutter::new(Trigger, NoDelay, config.shutter_pulse_ms);
        let slider = Supervisor::new(config, sensor, motor, shutter, limit.clone());

        Self {
            slider,
            sensor,
            port: Port::default(),
            limit,
            now_ms: 0,
            edge_us: 0,
        }
    }

    /// A rig that has already homed and is idle, with its outbound buffer cleared.
    pub fn homed() -> Self {
        let mut rig = Self::new();
        rig.tick();
        assert_eq!(rig.slider.state(), SystemState::Homing);
        rig.limit.0.set(true);
        rig.tick();
        rig.limit.0.set(false);
        assert_eq!(rig.slider.state(), SystemState::Idle);
        rig.port.tx.clear();
        rig
    }

    /// One control tick, then one millisecond of carriage motion.
    pub fn tick(&mut self) {
        self.slider.tick(self.now_ms, &mut self.port);
        if self.slider.motor().power() > 0 {
            self.pulse(1);
        }
        self.now_ms += 1;
    }

    pub fn ticks(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Tick until `done` holds, failing after `limit` ticks.
    pub fn tick_until(&mut self, limit: u32, mut done: impl FnMut(&Rig) -> bool) {
        for _ in 0..limit {
            if done(self) {
                return;
            }
            self.tick();
        }
        panic!("condition not reached after {limit} ticks");
    }

    /// Feed `n` evenly spaced edges to the sensor.
    pub fn pulse(&mut self, n: u32) {
        for _ in 0..n {
            self.edge_us = self.edge_us.wrapping_add(1_000);
            self.sensor.on_edge(self.edge_us);
        }
    }

    pub fn send(&mut self, command: Command) {
        self.port.rx.extend(command.to_frame().iter().copied());
    }

    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.port.rx.extend(bytes.iter().copied());
    }

    /// Every message written so far.
    pub fn messages(&self) -> Vec<Message> {
        assert_eq!(self.port.tx.len() % 7, 0, "partial message on the wire");
        self.port
            .tx
            .chunks(7)
            .map(|chunk| Message::decode(chunk).expect("well-formed outbound frame"))
            .collect()
    }

    pub fn count(&self, kind: MessageKind) -> usize {
        self.messages().iter().filter(|m| m.kind == kind).count()
    }
}
