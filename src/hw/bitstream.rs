// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! WS2812 output: TIM3 CH2 PWM fed by DMA1 stream 2.
//!
//! Every TIM3 update requests one DMA transfer (channel 5 on stream 2), which writes the next
//! symbol into the CCR2 preload register. The stream runs circularly over the transfer buffer and
//! raises half-transfer and transfer-complete interrupts, one per bank.

use stm32f7xx_hal::pac;

use crate::irq::TransferHandler;
use crate::ws2812::{PulseTiming, Symbol, TransferEvent};

const STREAM: usize = 2;

/// Offset of CCR2 in the timer register block.
const TIM_CCR2_OFFSET: u32 = 0x38;

/// OC2M = PWM mode 1, OC2PE.
const CCMR1_OC2_PWM1: u32 = (0b110 << 12) | (1 << 11);

const CR_EN: u32 = 1 << 0;
const CR_HTIE: u32 = 1 << 3;
const CR_TCIE: u32 = 1 << 4;
const CR_DIR_M2P: u32 = 0b01 << 6;
const CR_CIRC: u32 = 1 << 8;
const CR_MINC: u32 = 1 << 10;
const CR_PSIZE_16: u32 = 0b01 << 11;
const CR_MSIZE_16: u32 = 0b01 << 13;
const CR_PL_VERY_HIGH: u32 = 0b11 << 16;
const CR_CHSEL_5: u32 = 5 << 25;

/// Stream 2 flags in LISR/LIFCR.
const FEIF2: u32 = 1 << 16;
const DMEIF2: u32 = 1 << 18;
const TEIF2: u32 = 1 << 19;
const HTIF2: u32 = 1 << 20;
const TCIF2: u32 = 1 << 21;
const STREAM2_FLAGS: u32 = FEIF2 | DMEIF2 | TEIF2 | HTIF2 | TCIF2;

pub struct BitstreamOutput {
    tim: pac::TIM3,
    dma: pac::DMA1,
}

impl BitstreamOutput {
    /// Configure TIM3 CH2 for PWM at `timing`, stopped, with an idle-low output.
    pub fn new(tim3: pac::TIM3, dma1: pac::DMA1, timing: PulseTiming) -> Self {
        // SAFETY: single read-modify-write of clock enable bits during init.
        unsafe {
            let rcc = &*pac::RCC::ptr();
            rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());
            rcc.ahb1enr.modify(|_, w| w.dma1en().set_bit());
        }

        let tim = tim3;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit().arpe().set_bit());

        tim.psc.write(|w| unsafe { w.bits(0) });
        tim.arr.write(|w| unsafe { w.bits(u32::from(timing.auto_reload())) });

        tim.ccmr1_output().write(|w| unsafe { w.bits(CCMR1_OC2_PWM1) });
        tim.ccer.write(|w| w.cc2p().clear_bit().cc2e().set_bit());

        // Load ARR/PSC; CCR2 is still 0, so the line stays low
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.write(|w| unsafe { w.bits(0) });

        #[cfg(feature = "defmt")]
        defmt::info!(
            "TIM3 pulse timing: period {=u16}, zero {=u16}, one {=u16}",
            timing.period(),
            timing.zero(),
            timing.one()
        );

        Self { tim, dma: dma1 }
    }

    /// Point the DMA stream at `len` symbols starting at `memory` and enable it. Requests only
    /// start once [`start_pulses`](Self::start_pulses) runs the timer.
    ///
    /// # Safety
    ///
    /// `memory` must stay valid for reads of `len` symbols for as long as the stream runs, and
    /// `len` must be even and at most `u16::MAX`.
    pub unsafe fn arm(&mut self, memory: *const Symbol, len: usize) {
        let st = &self.dma.st[STREAM];

        st.cr.write(|w| w.bits(0));
        while st.cr.read().bits() & CR_EN != 0 {}
        self.dma.lifcr.write(|w| w.bits(STREAM2_FLAGS));

        st.par.write(|w| w.bits(pac::TIM3::ptr() as u32 + TIM_CCR2_OFFSET));
        st.m0ar.write(|w| w.bits(memory as u32));
        st.ndtr.write(|w| w.bits(len as u32));
        // Direct mode
        st.fcr.write(|w| w.bits(0));

        st.cr.write(|w| {
            w.bits(
                CR_CHSEL_5
                    | CR_PL_VERY_HIGH
                    | CR_MSIZE_16
                    | CR_PSIZE_16
                    | CR_MINC
                    | CR_CIRC
                    | CR_DIR_M2P
                    | CR_TCIE
                    | CR_HTIE,
            )
        });
        st.cr.modify(|r, w| w.bits(r.bits() | CR_EN));

        #[cfg(feature = "defmt")]
        defmt::info!("DMA1 stream 2 armed, {=usize} symbols", len);
    }

    /// Run the pulse timer; each update now pulls one symbol.
    pub fn start_pulses(&mut self) {
        self.tim.dier.write(|w| w.ude().set_bit());
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    /// Forward pending block-transfer notifications to `handler`. Other stream flags are
    /// cleared and dropped.
    #[inline]
    pub fn dispatch<H: TransferHandler>(&mut self, handler: &mut H) {
        let isr = self.dma.lisr.read().bits() & STREAM2_FLAGS;
        // SAFETY: LIFCR is write-1-to-clear; only stream 2 bits are written.
        self.dma.lifcr.write(|w| unsafe { w.bits(isr) });

        if isr & HTIF2 != 0 {
            handler.on_transfer_event(TransferEvent::HalfComplete);
        }
        if isr & TCIF2 != 0 {
            handler.on_transfer_event(TransferEvent::Complete);
        }
    }
}
