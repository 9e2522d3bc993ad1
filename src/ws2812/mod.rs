// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # WS2812 Bitstream
//!
//! - [`timing`] – pulse timer period and the duty values of `0`/`1` bits
//! - [`color`] – channel packing into 24-bit color words
//! - [`encoder`] – color words to duty-cycle symbols, with the reset gap
//! - [`transfer`] – the double-banked buffer the DMA reads from
//!
//! [`Ws2812Stream`] ties them together: it owns the encoder, borrows the transfer buffer and the
//! shared [`ColorBuffer`], and refills whichever bank each DMA notification releases.

pub mod color;
pub mod encoder;
pub mod timing;
pub mod transfer;

pub use color::{rgb, ColorOrder};
pub use encoder::{Encoder, Ws2812Config, BITS_PER_LED, DEFAULT_RESET_SLOTS};
pub use timing::{PulseTiming, Symbol, RESET_SYMBOL};
pub use transfer::{Bank, TransferBuffer, TransferEvent};

use crate::irq::TransferHandler;
use crate::shared::ColorBuffer;

/// LEDs on the wheel.
pub const LED_COUNT: usize = 50;

/// Symbols per bank: one frame (LEDs plus the default reset gap) per full buffer.
pub const BANK_SYMBOLS: usize = encoder::frame_bank_symbols(LED_COUNT, DEFAULT_RESET_SLOTS);

/// Continuous bitstream of `LEDS` LEDs through a buffer of two `BANK`-symbol banks.
pub struct Ws2812Stream<'a, const LEDS: usize, const BANK: usize> {
    encoder: Encoder<LEDS>,
    buffer: &'a mut TransferBuffer<BANK>,
    colors: &'a ColorBuffer<LEDS>,
}

impl<'a, const LEDS: usize, const BANK: usize> Ws2812Stream<'a, LEDS, BANK> {
    pub fn new(
        config: Ws2812Config,
        buffer: &'a mut TransferBuffer<BANK>,
        colors: &'a ColorBuffer<LEDS>,
    ) -> Self {
        Self {
            encoder: Encoder::new(config),
            buffer,
            colors,
        }
    }

    /// Encode both banks, lower first. Call once before the DMA starts.
    pub fn prime(&mut self) {
        self.encoder
            .fill(self.colors, self.buffer.bank_mut(Bank::Lower));
        self.encoder
            .fill(self.colors, self.buffer.bank_mut(Bank::Upper));
    }

    #[inline]
    pub fn buffer(&self) -> &TransferBuffer<BANK> {
        self.buffer
    }

    #[inline]
    pub fn encoder(&self) -> &Encoder<LEDS> {
        &self.encoder
    }
}

impl<const LEDS: usize, const BANK: usize> TransferHandler for Ws2812Stream<'_, LEDS, BANK> {
    #[inline]
    fn on_transfer_event(&mut self, event: TransferEvent) {
        self.encoder.fill(self.colors, self.buffer.released(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bank_holds_half_a_frame() {
        assert_eq!(BANK_SYMBOLS, 636);
        assert_eq!(TransferBuffer::<BANK_SYMBOLS>::SYMBOLS, 1272);
    }

    #[test]
    fn event_refills_only_the_released_bank() {
        let colors = ColorBuffer::<1>::new();
        colors.set(0, 0xFF_FFFF);
        let timing = PulseTiming::from_period(100);
        let mut buf = TransferBuffer::<24>::new();
        let mut stream = Ws2812Stream::new(Ws2812Config::new(timing), &mut buf, &colors);

        stream.prime();
        // Lower: LED 0. Upper: first reset slot.
        assert!(stream.buffer().bank(Bank::Lower).iter().all(|&s| s == timing.one()));
        assert!(stream.buffer().bank(Bank::Upper).iter().all(|&s| s == RESET_SYMBOL));

        // Next slot is reset slot 2, written into the lower bank.
        stream.on_transfer_event(TransferEvent::HalfComplete);
        assert!(stream.buffer().bank(Bank::Lower).iter().all(|&s| s == RESET_SYMBOL));
        assert_eq!(stream.encoder().cursor(), (3, 0));

        // Then slot 3 (last reset) into upper, then LED 0 again into lower.
        stream.on_transfer_event(TransferEvent::Complete);
        stream.on_transfer_event(TransferEvent::HalfComplete);
        assert!(stream.buffer().bank(Bank::Lower).iter().all(|&s| s == timing.one()));
        assert!(stream.buffer().bank(Bank::Upper).iter().all(|&s| s == RESET_SYMBOL));
    }
}
