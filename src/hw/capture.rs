// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hall sensor capture on TIM1 CH1.
//!
//! The counter runs at [`TICK_HZ`] and is reset by the sensor edge itself (slave reset mode on
//! TI1FP1), so the captured value is the interval since the previous edge. URS restricts update
//! events to real overflows: an update means a whole counter period passed without an edge.

use stm32f7xx_hal::{pac, rcc::Clocks};

use crate::calibration::TICK_HZ;
use crate::irq::CaptureHandler;

const SR_UIF: u32 = 1 << 0;
const SR_CC1IF: u32 = 1 << 1;
const SR_CC1OF: u32 = 1 << 9;

/// CC1S = TI1, IC1F = fSAMPLING = fCK_INT, N = 8.
const CCMR1_INPUT: u32 = 0b01 | (0b0011 << 4);
/// SMS = reset mode, TS = TI1FP1.
const SMCR_RESET_ON_TI1FP1: u32 = 0b100 | (0b101 << 4);

pub struct CaptureTimer {
    tim: pac::TIM1,
}

impl CaptureTimer {
    /// Configure TIM1 for interval capture and start it.
    pub fn tim1(tim1: pac::TIM1, clocks: &Clocks) -> Self {
        // SAFETY: single read-modify-write of a clock enable bit during init.
        unsafe {
            (*pac::RCC::ptr()).apb2enr.modify(|_, w| w.tim1en().set_bit());
        }

        let tim = tim1;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        let psc = (clocks.timclk2().raw() + TICK_HZ / 2) / TICK_HZ - 1;
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.arr.write(|w| unsafe { w.bits(0xFFFF) });

        // CH1 as input from TI1, rising edge
        tim.ccmr1_input().write(|w| unsafe { w.bits(CCMR1_INPUT) });
        tim.ccer.write(|w| w.cc1p().clear_bit().cc1np().clear_bit().cc1e().set_bit());

        tim.smcr.write(|w| unsafe { w.bits(SMCR_RESET_ON_TI1FP1) });

        // Updates from overflow only, then latch the prescaler without raising UIF
        tim.cr1.modify(|_, w| w.urs().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.write(|w| unsafe { w.bits(0) });

        tim.dier.write(|w| w.cc1ie().set_bit().uie().set_bit());

        tim.cnt.write(|w| unsafe { w.bits(0) });
        tim.cr1.modify(|_, w| w.cen().set_bit());

        #[cfg(feature = "defmt")]
        defmt::info!("TIM1 capture running, PSC = {=u32}", psc);

        Self { tim }
    }

    /// Forward pending overflow and capture events to `handler`, overflow first.
    ///
    /// Serves both TIM1 vectors (`TIM1_UP_TIM10` and `TIM1_CC`).
    pub fn dispatch<H: CaptureHandler>(&mut self, handler: &mut H) {
        let sr = self.tim.sr.read().bits();

        if sr & SR_UIF != 0 {
            self.tim.sr.write(|w| unsafe { w.bits(!SR_UIF) });
            #[cfg(feature = "defmt")]
            defmt::debug!("sensor dropout");
            handler.on_counter_overflow();
        }

        if sr & SR_CC1IF != 0 {
            // Reading CCR1 clears CC1IF.
            let ticks = self.tim.ccr1.read().bits() & 0xFFFF;
            if sr & SR_CC1OF != 0 {
                self.tim.sr.write(|w| unsafe { w.bits(!SR_CC1OF) });
            }
            #[cfg(feature = "defmt")]
            defmt::trace!("TIM1_CCR1 = {=u32}", ticks);
            handler.on_edge_captured(ticks);
        }
    }

    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> pac::TIM1 {
        self.tim
    }
}
