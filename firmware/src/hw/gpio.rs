// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `embedded-hal` 1.0 digital traits for the board's GPIO pins.
//!
//! The HAL's pin types expose inherent `set_high`/`is_high` methods; these newtypes forward to
//! them so the pins can be handed to the `camslide` drivers.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stm32f7xx_hal::gpio::{gpioa, gpiod, gpioe, Input, Output, PullUp, PushPull};

/// Push-pull output.
pub struct Out<PIN>(pub PIN);

/// Input read as a logic level.
pub struct In<PIN>(pub PIN);

macro_rules! output_pins {
    ($($pin:ty),+ $(,)?) => {
        $(
            impl ErrorType for Out<$pin> {
                type Error = Infallible;
            }

            impl OutputPin for Out<$pin> {
                #[inline]
                fn set_low(&mut self) -> Result<(), Infallible> {
                    self.0.set_low();
                    Ok(())
                }

                #[inline]
                fn set_high(&mut self) -> Result<(), Infallible> {
                    self.0.set_high();
                    Ok(())
                }
            }
        )+
    };
}

macro_rules! input_pins {
    ($($pin:ty),+ $(,)?) => {
        $(
            impl ErrorType for In<$pin> {
                type Error = Infallible;
            }

            impl InputPin for In<$pin> {
                #[inline]
                fn is_high(&mut self) -> Result<bool, Infallible> {
                    Ok(self.0.is_high())
                }

                #[inline]
                fn is_low(&mut self) -> Result<bool, Infallible> {
                    Ok(self.0.is_low())
                }
            }
        )+
    };
}

output_pins!(
    gpiod::PD8<Output<PushPull>>,
    gpiod::PD9<Output<PushPull>>,
    gpiod::PD10<Output<PushPull>>,
    gpioe::PE4<Output<PushPull>>,
);

input_pins!(gpioa::PA1<Input<PullUp>>);
