// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! ADC1 support using direct PAC register access.
//!
//! Blocking single-channel reads, used for the motor current-sense channel.
//!
//! Example:
//! ```ignore
//! let adc = RefCell::new(Adc::adc1(dp.ADC1));
//! let sense = Adc::make_reader(&adc, CURRENT_SENSE_CHANNEL);
//! ```

use core::cell::RefCell;

use stm32f7xx_hal::pac;

/// IPROP output of the bridge on PC4.
pub const CURRENT_SENSE_CHANNEL: u8 = 14;

/// Longest sample time (480 cycles) for a high-impedance source.
const SMP_480: u32 = 0b111;

pub struct Adc {
    adc: pac::ADC1,
}

impl Adc {
    /// Enable and initialize ADC1: 12-bit, right-aligned, software trigger.
    pub fn adc1(adc: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        // ADC prescaler: PCLK2 / 4
        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        common.ccr.modify(|_, w| w.adcpre().div4());

        // Power off to configure
        adc.cr2.modify(|_, w| w.adon().clear_bit());

        adc.cr1.modify(|_, w| w.res().bits(0b00));
        adc.cr2.modify(|_, w| {
            w.cont().clear_bit();
            w.align().right();
            w.exten().disabled();
            w
        });

        adc.smpr1.write(|w| unsafe { w.bits(0) });
        adc.smpr2.write(|w| unsafe { w.bits(0) });

        adc.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc }
    }

    /// Convert one channel and return the raw 12-bit result.
    pub fn read(&mut self, channel: u8) -> u16 {
        let channel = channel & 0x1F;

        // Three bits per channel: 0..=9 in SMPR2, 10..=18 in SMPR1.
        if channel <= 9 {
            let shift = 3 * u32::from(channel);
            self.adc
                .smpr2
                .modify(|r, w| unsafe { w.bits(r.bits() | (SMP_480 << shift)) });
        } else if channel <= 18 {
            let shift = 3 * u32::from(channel - 10);
            self.adc
                .smpr1
                .modify(|r, w| unsafe { w.bits(r.bits() | (SMP_480 << shift)) });
        }

        // Sequence length = 1 conversion
        self.adc.sqr1.modify(|_, w| w.l().bits(0));
        self.adc.sqr3.modify(|_, w| unsafe { w.sq1().bits(channel) });

        self.adc.cr2.modify(|_, w| w.swstart().set_bit());
        while self.adc.sr.read().eoc().bit_is_clear() {}

        self.adc.dr.read().data().bits()
    }

    /// Create a closure that reads `channel` through the shared ADC.
    pub fn make_reader(adc_ref: &RefCell<Self>, channel: u8) -> impl FnMut() -> u16 + '_ {
        move || adc_ref.borrow_mut().read(channel)
    }
}
