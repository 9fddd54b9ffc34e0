// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # camslide firmware
//!
//! Board bring-up and main loop for the camera slider controller on an STM32F777.
//!
//! The control logic lives in the `camslide` crate; this binary only wires the board's
//! peripherals to it:
//!
//! | Peripheral | Use |
//! | ---------- | --- |
//! | USART1 (PA9/PA10) | host link, 115 200 baud |
//! | TIM4 CH1/CH2 (PD12/PD13) | H-bridge PWM |
//! | ADC1_IN14 (PC4) | motor current sense |
//! | TIM2 | 1 MHz free-running time base |
//! | EXTI0 (PA0) | motor pulse input, falling edge |
//! | PA1 | home limit switch |
//! | PE4 | shutter trigger |
//!
//! Logs go out over RTT. Flash and attach with:
//!
//! ```bash
//! cargo run --release
//! ```

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::{interrupt::Mutex, peripheral::NVIC};
use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_halt as _;

use hal::{
    gpio::{gpioa, Edge, ExtiPin, Input, PullUp},
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use camslide::{
    drivers::{Motor, Shutter},
    time::TickPacer,
    PositionSensor, SliderConfig, Supervisor,
};

mod hw;
use hw::{
    adc::CURRENT_SENSE_CHANNEL, Adc, BoardPins, In, Microseconds, Out, StatusLeds, Tim4Pwm, Usart,
};

type PulsePin = gpioa::PA0<Input<PullUp>>;

/// Carriage position, written by the EXTI0 handler.
static SENSOR: PositionSensor = PositionSensor::new();

/// Kept so the handler can clear its pending bit.
static PULSE_PIN: Mutex<RefCell<Option<PulsePin>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let mut apb2 = rcc.apb2;

    let BoardPins {
        leds,
        usart1,
        motor: motor_pins,
        sensor: sensor_pins,
        shutter: shutter_pin,
    } = BoardPins::new(dp.GPIOA, dp.GPIOC, dp.GPIOD, dp.GPIOE);

    // LED
    let mut leds = StatusLeds::new(Out(leds.red), Out(leds.yellow), Out(leds.green));

    // USART1 (host link)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART1, (usart1.tx, usart1.rx), &clocks, usart_cfg);
    let mut usart = Usart::new(serial);

    // Time base
    let micros = Microseconds::start(dp.TIM2, clocks.timclk1().raw());

    // Motor: wake the bridge, then PWM on both legs
    let mut nsleep = motor_pins.nsleep;
    let mut disable = motor_pins.disable;
    nsleep.set_high();
    disable.set_low();
    let (leg_a, leg_b) = Tim4Pwm::new(dp.TIM4, 0).split();
    let adc = RefCell::new(Adc::adc1(dp.ADC1));
    let motor = Motor::new(leg_a, leg_b, Adc::make_reader(&adc, CURRENT_SENSE_CHANNEL));

    let config = SliderConfig::DEFAULT;
    let shutter = Shutter::new(Out(shutter_pin), micros.delay(), config.shutter_pulse_ms);

    // Pulse input on EXTI0
    let mut syscfg = dp.SYSCFG;
    let mut exti = dp.EXTI;
    let mut pulse = sensor_pins.pulse;
    pulse.make_interrupt_source(&mut syscfg, &mut apb2);
    pulse.trigger_on_edge(&mut exti, Edge::Falling);
    pulse.enable_interrupt(&mut exti);
    cortex_m::interrupt::free(|cs| PULSE_PIN.borrow(cs).replace(Some(pulse)));
    unsafe { NVIC::unmask(pac::Interrupt::EXTI0) };

    let mut slider = Supervisor::new(config, &SENSOR, motor, shutter, In(sensor_pins.limit));
    let mut pacer = TickPacer::new(micros.clock(), config.tick_interval_us);

    defmt::info!("camslide up, tick {=u32} us", config.tick_interval_us);

    loop {
        pacer.begin();
        slider.tick(pacer.tick_ms(), &mut usart);
        leds.show(slider.state());
        pacer.finish();
    }
}

#[interrupt]
fn EXTI0() {
    let now = hw::now_us32();

    cortex_m::interrupt::free(|cs| {
        if let Some(pin) = PULSE_PIN.borrow(cs).borrow_mut().as_mut() {
            pin.clear_interrupt_pending_bit();
        }
    });

    SENSOR.on_edge(now);
}
