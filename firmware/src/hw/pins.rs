// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 slider controller board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpioc, gpiod, gpioe, Alternate, Analog, Input, Output, PullUp, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOC, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub motor: MotorPins,
    pub sensor: SensorPins,
    pub shutter: gpioe::PE4<Output<PushPull>>,
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

/// Host link
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// H-bridge control pins
pub struct MotorPins {
    pub in1: gpiod::PD12<Alternate<2>>, // TIM4_CH1 (PWM)
    pub in2: gpiod::PD13<Alternate<2>>, // TIM4_CH2 (PWM)
    pub nsleep: gpioa::PA4<Output<PushPull>>,
    pub disable: gpioa::PA3<Output<PushPull>>,
    pub iprop: gpioc::PC4<Analog>, // ADC1_IN14
}

/// Motor pulse input and the home limit switch, both pulled up.
pub struct SensorPins {
    /// Falling edge on EXTI0
    pub pulse: gpioa::PA0<Input<PullUp>>,
    /// High when the carriage sits on the switch
    pub limit: gpioa::PA1<Input<PullUp>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpioc: pac::GPIOC, gpiod: pac::GPIOD, gpioe: pac::GPIOE) -> Self {
        let gpioa = gpioa.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            motor: MotorPins {
                in1: gpiod.pd12.into_alternate::<2>(),
                in2: gpiod.pd13.into_alternate::<2>(),
                nsleep: gpioa.pa4.into_push_pull_output(),
                disable: gpioa.pa3.into_push_pull_output(),
                iprop: gpioc.pc4.into_analog(),
            },

            sensor: SensorPins {
                pulse: gpioa.pa0.into_pull_up_input(),
                limit: gpioa.pa1.into_pull_up_input(),
            },

            shutter: gpioe.pe4.into_push_pull_output(),
        }
    }
}
