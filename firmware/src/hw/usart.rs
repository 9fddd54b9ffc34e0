// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART link to the host.
//!
//! Wraps a split HAL serial port and exposes it through the `embedded-hal-nb` serial traits the
//! supervisor is written against. Reads never block; a write blocks only while the transmit
//! register is full.
//!
//! To watch the raw stream on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```
//! The link carries binary frames, so expect noise rather than text.

use embedded_hal_nb::serial::{self, ErrorKind};
use stm32f7xx_hal::{
    prelude::*,
    serial::{self as hal_serial, Instance, Pins, Rx, Serial, Tx},
};

/// A receive fault reported by the peripheral.
#[derive(Debug)]
pub struct UsartError(pub hal_serial::Error);

impl serial::Error for UsartError {
    fn kind(&self) -> ErrorKind {
        match self.0 {
            hal_serial::Error::Overrun => ErrorKind::Overrun,
            hal_serial::Error::Framing => ErrorKind::FrameFormat,
            hal_serial::Error::Parity => ErrorKind::Parity,
            hal_serial::Error::Noise => ErrorKind::Noise,
            _ => ErrorKind::Other,
        }
    }
}

pub struct Usart<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }
}

impl<U: Instance> serial::ErrorType for Usart<U> {
    type Error = UsartError;
}

impl<U: Instance> serial::Read<u8> for Usart<U> {
    #[inline]
    fn read(&mut self) -> nb::Result<u8, UsartError> {
        self.rx.read().map_err(|e| e.map(UsartError))
    }
}

impl<U: Instance> serial::Write<u8> for Usart<U> {
    #[inline]
    fn write(&mut self, word: u8) -> nb::Result<(), UsartError> {
        // the transmitter has no failure mode of its own, only backpressure
        match self.tx.write(word) {
            Err(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
            _ => Ok(()),
        }
    }

    #[inline]
    fn flush(&mut self) -> nb::Result<(), UsartError> {
        match self.tx.flush() {
            Err(nb::Error::WouldBlock) => Err(nb::Error::WouldBlock),
            _ => Ok(()),
        }
    }
}
