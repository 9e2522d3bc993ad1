// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt priorities and handler traits.
//!
//! Every interrupt source the firmware uses dispatches into one of the traits below, and every
//! NVIC priority comes from the constants here. The ordering between them is checked at compile
//! time: the bitstream must never wait on the tachometer, and the tachometer must be able to
//! preempt the frame clock while it renders.

use crate::ws2812::TransferEvent;

/// Number of priority bits implemented by the STM32F7 NVIC.
pub const NVIC_PRIO_BITS: u8 = 4;

/// NVIC priority. Lower raw values preempt higher ones.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priority(u8);

impl Priority {
    /// Priority from a logical level in `0..16`, 0 being the most urgent.
    pub const fn from_level(level: u8) -> Self {
        Self((level & 0x0F) << (8 - NVIC_PRIO_BITS))
    }

    /// Raw value for `NVIC::set_priority`.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// True if an interrupt at `self` can preempt one running at `other`.
    #[inline]
    pub const fn preempts(self, other: Priority) -> bool {
        self.0 < other.0
    }
}

/// DMA half/full-transfer notifications of the WS2812 stream.
pub const TRANSFER: Priority = Priority::from_level(0);

/// Capture edge and counter overflow of the tachometer timer.
pub const TACHO: Priority = Priority::from_level(8);

/// Frame clock rendering into the color buffer.
pub const FRAME: Priority = Priority::from_level(15);

const _: () = assert!(TRANSFER.preempts(TACHO));
const _: () = assert!(TACHO.preempts(FRAME));

/// Receiver of capture timer events.
pub trait CaptureHandler {
    /// A sensor edge was captured `duration` ticks after the previous one.
    fn on_edge_captured(&mut self, duration: u32);

    /// A full counter period elapsed without an edge.
    fn on_counter_overflow(&mut self);
}

/// Receiver of block-transfer notifications.
pub trait TransferHandler {
    fn on_transfer_event(&mut self, event: TransferEvent);
}
