// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bitstream encoder.
//!
//! Converts packed color words into duty-cycle symbols, one symbol per bit, MSB first. A frame is
//! `LEDS` color slots followed by `reset_slots` slots of [`RESET_SYMBOL`]s (the latch gap), and the
//! encoder's cursor runs over that frame forever. Banks do not need to line up with frame
//! boundaries; the cursor simply carries on into the next bank.

use crate::shared::ColorBuffer;
use crate::ws2812::timing::{PulseTiming, Symbol, RESET_SYMBOL};

/// Symbols per LED.
pub const BITS_PER_LED: usize = 24;

/// Reset gap after the last LED, in LED slots.
pub const DEFAULT_RESET_SLOTS: usize = 3;

const MSB: u32 = 1 << (BITS_PER_LED - 1);

/// Encoder settings.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ws2812Config {
    timing: PulseTiming,
    reset_slots: usize,
}

impl Ws2812Config {
    pub const fn new(timing: PulseTiming) -> Self {
        Self {
            timing,
            reset_slots: DEFAULT_RESET_SLOTS,
        }
    }

    /// Length of the latch gap in LED slots, at least one.
    pub const fn with_reset_slots(mut self, slots: usize) -> Self {
        self.reset_slots = if slots == 0 { 1 } else { slots };
        self
    }

    #[inline]
    pub const fn timing(&self) -> PulseTiming {
        self.timing
    }

    #[inline]
    pub const fn reset_slots(&self) -> usize {
        self.reset_slots
    }
}

/// Symbols in one bank of a buffer holding exactly one frame of `leds` LEDs.
pub const fn frame_bank_symbols(leds: usize, reset_slots: usize) -> usize {
    (leds + reset_slots) * BITS_PER_LED / 2
}

/// Frame cursor and symbol generator for a strip of `LEDS` LEDs.
pub struct Encoder<const LEDS: usize> {
    config: Ws2812Config,
    /// Slot within the frame, `0..LEDS + reset_slots`.
    slot: usize,
    /// Bit within the slot, `0..BITS_PER_LED`.
    bit: usize,
}

impl<const LEDS: usize> Encoder<LEDS> {
    pub const fn new(config: Ws2812Config) -> Self {
        Self {
            config,
            slot: 0,
            bit: 0,
        }
    }

    /// LED slots plus reset slots.
    #[inline]
    pub const fn frame_slots(&self) -> usize {
        LEDS + self.config.reset_slots
    }

    /// Symbols per frame; the period of the emitted stream.
    #[inline]
    pub const fn frame_symbols(&self) -> usize {
        self.frame_slots() * BITS_PER_LED
    }

    /// Position of the next symbol as `(slot, bit)`.
    #[inline]
    pub fn cursor(&self) -> (usize, usize) {
        (self.slot, self.bit)
    }

    #[inline]
    pub fn config(&self) -> &Ws2812Config {
        &self.config
    }

    /// Fill `bank` with the next `bank.len()` symbols of the stream.
    pub fn fill(&mut self, colors: &ColorBuffer<LEDS>, bank: &mut [Symbol]) {
        let timing = self.config.timing;
        let mut word = self.load(colors);

        for symbol in bank.iter_mut() {
            *symbol = match word {
                Some(w) => timing.symbol(w & (MSB >> self.bit) != 0),
                None => RESET_SYMBOL,
            };

            self.bit += 1;
            if self.bit == BITS_PER_LED {
                self.bit = 0;
                self.slot = (self.slot + 1) % self.frame_slots();
                word = self.load(colors);
            }
        }
    }

    /// Color of the current slot, `None` inside the reset gap.
    #[inline]
    fn load(&self, colors: &ColorBuffer<LEDS>) -> Option<u32> {
        (self.slot < LEDS).then(|| colors.get(self.slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws2812::color::rgb;

    const TIMING: PulseTiming = PulseTiming::from_period(100);

    #[test]
    fn single_blue_led() {
        let colors = ColorBuffer::<1>::new();
        colors.set(0, rgb(0, 0, 255));
        let mut enc = Encoder::<1>::new(Ws2812Config::new(TIMING));

        let mut bank: [Symbol; 4 * BITS_PER_LED] = [0xAA; 4 * BITS_PER_LED];
        enc.fill(&colors, &mut bank);

        let one = TIMING.one();
        let zero = TIMING.zero();
        for (i, &s) in bank[..BITS_PER_LED].iter().enumerate() {
            let expected = if (8..16).contains(&i) { one } else { zero };
            assert_eq!(s, expected, "symbol {i}");
        }
        assert!(bank[BITS_PER_LED..].iter().all(|&s| s == RESET_SYMBOL));
        assert_eq!(enc.cursor(), (0, 0));
    }

    #[test]
    fn cursor_carries_over_between_banks() {
        let colors = ColorBuffer::<2>::new();
        colors.set(0, 0x80_0001);
        colors.set(1, 0xFF_FFFF);
        let mut enc = Encoder::<2>::new(Ws2812Config::new(TIMING));

        let mut a: [Symbol; 10] = [0; 10];
        let mut b: [Symbol; 20] = [0; 20];
        enc.fill(&colors, &mut a);
        enc.fill(&colors, &mut b);

        assert_eq!(a[0], TIMING.one());
        assert!(a[1..].iter().all(|&s| s == TIMING.zero()));
        // Symbols 10..24 of LED 0 end with its LSB, then LED 1 starts.
        assert!(b[..13].iter().all(|&s| s == TIMING.zero()));
        assert_eq!(b[13], TIMING.one());
        assert!(b[14..].iter().all(|&s| s == TIMING.one()));
        assert_eq!(enc.cursor(), (1, 6));
    }

    #[test]
    fn reset_gap_is_tunable() {
        let colors = ColorBuffer::<1>::new();
        let config = Ws2812Config::new(TIMING).with_reset_slots(5);
        let enc = Encoder::<1>::new(config);
        assert_eq!(enc.frame_slots(), 6);
        assert_eq!(enc.frame_symbols(), 144);
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn reset_gap_never_empty() {
        let config = Ws2812Config::new(TIMING).with_reset_slots(0);
        assert_eq!(config.reset_slots(), 1);
    }

    #[test]
    fn frame_bank_size() {
        assert_eq!(frame_bank_symbols(50, DEFAULT_RESET_SLOTS), 636);
        assert_eq!(frame_bank_symbols(1, 3), 48);
    }
}
