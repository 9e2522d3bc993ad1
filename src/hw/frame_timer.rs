// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Frame clock tick on TIM2.

use stm32f7xx_hal::{pac, rcc::Clocks};

const SR_UIF: u32 = 1 << 0;

pub struct FrameTimer {
    tim: pac::TIM2,
}

impl FrameTimer {
    /// Configure TIM2 to raise an update interrupt `fps` times per second.
    pub fn tim2(tim2: pac::TIM2, clocks: &Clocks, fps: u32) -> Self {
        // SAFETY: single read-modify-write of a clock enable bit during init.
        unsafe {
            (*pac::RCC::ptr()).apb1enr.modify(|_, w| w.tim2en().set_bit());
        }

        let tim = tim2;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // 1 MHz tick, 32-bit counter
        let psc = clocks.timclk1().raw() / 1_000_000 - 1;
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.arr.write(|w| unsafe { w.bits(1_000_000 / fps - 1) });

        tim.cr1.modify(|_, w| w.urs().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.write(|w| unsafe { w.bits(0) });

        tim.dier.write(|w| w.uie().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Acknowledge the update that started this frame.
    #[inline]
    pub fn acknowledge(&mut self) {
        self.tim.sr.write(|w| unsafe { w.bits(!SR_UIF) });
    }

    /// The next update already fired, so the current frame took longer than its period.
    #[inline]
    pub fn overran(&self) -> bool {
        self.tim.sr.read().bits() & SR_UIF != 0
    }
}
