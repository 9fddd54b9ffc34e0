// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level wrappers that present the board to `camslide` as `embedded-hal` traits.

pub mod adc;
pub mod clock;
pub mod gpio;
pub mod led;
pub mod pins;
pub mod pwm;
pub mod usart;

pub use adc::Adc;
pub use clock::{now_us32, Microseconds};
pub use gpio::{In, Out};
pub use led::StatusLeds;
pub use pins::BoardPins;
pub use pwm::Tim4Pwm;
pub use usart::Usart;
