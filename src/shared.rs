// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! State shared between interrupt handlers.
//!
//! - [`TachoCell`] carries the tachometer output from the capture handlers to the frame clock.
//!   Readers get one consistent [`TachoReading`]; the copy happens inside a critical section,
//!   which on single-core Cortex-M masks interrupts for a few cycles.
//! - [`ColorBuffer`] carries packed color words from the frame clock to the bitstream encoder.
//!   There is no lock: each word is an atomic, and the encoder may see a frame that is half old
//!   and half new. Neither side ever waits.
//! - [`HandlerCell`] holds state owned by several interrupt vectors that run at one priority. It
//!   masks nothing, so higher-priority handlers keep preempting while it is in use.

use core::cell::{Cell, UnsafeCell};
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;

/// One consistent snapshot of the tachometer output.
///
/// `frequency_millihertz` is zero exactly when `is_overflow` is set.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TachoReading {
    frequency_millihertz: u32,
    phase_index: u8,
}

impl TachoReading {
    /// Reading of a wheel that is not (known to be) turning.
    pub const fn stalled(phase_index: u8) -> Self {
        Self {
            frequency_millihertz: 0,
            phase_index,
        }
    }

    /// Reading of a turning wheel. A zero frequency is raised to 1 mHz so the snapshot never
    /// claims a valid measurement of zero.
    pub const fn turning(frequency_millihertz: u32, phase_index: u8) -> Self {
        let frequency_millihertz = if frequency_millihertz == 0 {
            1
        } else {
            frequency_millihertz
        };
        Self {
            frequency_millihertz,
            phase_index,
        }
    }

    #[inline]
    pub const fn frequency_millihertz(&self) -> u32 {
        self.frequency_millihertz
    }

    /// Magnet that triggered most recently.
    #[inline]
    pub const fn phase_index(&self) -> u8 {
        self.phase_index
    }

    /// No valid interval since the last counter overflow.
    #[inline]
    pub const fn is_overflow(&self) -> bool {
        self.frequency_millihertz == 0
    }
}

/// Single-writer, multi-reader cell for [`TachoReading`].
pub struct TachoCell {
    reading: Mutex<Cell<TachoReading>>,
}

impl TachoCell {
    pub const fn new() -> Self {
        Self {
            reading: Mutex::new(Cell::new(TachoReading::stalled(0))),
        }
    }

    /// Replace the current reading. Called from the tachometer handlers only.
    #[inline]
    pub fn publish(&self, reading: TachoReading) {
        critical_section::with(|cs| self.reading.borrow(cs).set(reading));
    }

    /// Copy out the current reading.
    #[inline]
    pub fn snapshot(&self) -> TachoReading {
        critical_section::with(|cs| self.reading.borrow(cs).get())
    }
}

impl Default for TachoCell {
    fn default() -> Self {
        Self::new()
    }
}

/// State owned by interrupt handlers that all run at the same NVIC priority.
///
/// Handlers at one priority never preempt each other, so they can take turns on the value
/// without a critical section.
pub struct HandlerCell<T> {
    value: UnsafeCell<Option<T>>,
}

// SAFETY: access goes through `install` and `get_mut`, whose callers guarantee exclusivity.
unsafe impl<T: Send> Sync for HandlerCell<T> {}

impl<T> HandlerCell<T> {
    pub const fn new() -> Self {
        Self {
            value: UnsafeCell::new(None),
        }
    }

    /// Store the handlers' state.
    ///
    /// # Safety
    ///
    /// None of the handlers that use the cell may be able to run, e.g. their vectors are still
    /// masked.
    pub unsafe fn install(&self, value: T) {
        *self.value.get() = Some(value);
    }

    /// The handlers' state, `None` until installed.
    ///
    /// # Safety
    ///
    /// Must only be called from handlers that share one priority level, and the returned
    /// reference must not outlive the handler invocation.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn get_mut(&self) -> Option<&mut T> {
        (*self.value.get()).as_mut()
    }
}

impl<T> Default for HandlerCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Packed color words of `N` LEDs, in strip order.
///
/// Index `i` always addresses the `i`-th LED on the wire.
pub struct ColorBuffer<const N: usize> {
    words: [AtomicU32; N],
}

impl<const N: usize> ColorBuffer<N> {
    pub const fn new() -> Self {
        Self {
            words: [const { AtomicU32::new(0) }; N],
        }
    }

    /// Number of LEDs.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Color word of LED `index`. Out-of-range indices read as off.
    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        self.words
            .get(index)
            .map_or(0, |w| w.load(Ordering::Relaxed))
    }

    /// Set LED `index`. Out-of-range indices are ignored.
    #[inline]
    pub fn set(&self, index: usize, word: u32) {
        if let Some(w) = self.words.get(index) {
            w.store(word & 0x00FF_FFFF, Ordering::Relaxed);
        }
    }

    /// Set every LED to `word`.
    pub fn fill(&self, word: u32) {
        for i in 0..N {
            self.set(i, word);
        }
    }

    /// Copy a whole frame in. Extra words are ignored, missing ones keep their value.
    pub fn write_frame(&self, frame: &[u32]) {
        for (i, &word) in frame.iter().enumerate().take(N) {
            self.set(i, word);
        }
    }
}

impl<const N: usize> Default for ColorBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stalled_reading_reports_overflow() {
        let r = TachoReading::stalled(3);
        assert!(r.is_overflow());
        assert_eq!(r.frequency_millihertz(), 0);
        assert_eq!(r.phase_index(), 3);
    }

    #[test]
    fn turning_reading_is_never_zero() {
        let r = TachoReading::turning(0, 1);
        assert!(!r.is_overflow());
        assert_eq!(r.frequency_millihertz(), 1);
    }

    #[test]
    fn cell_starts_stalled_and_returns_last_publish() {
        let cell = TachoCell::new();
        assert!(cell.snapshot().is_overflow());

        cell.publish(TachoReading::turning(1500, 2));
        cell.publish(TachoReading::turning(1250, 3));
        assert_eq!(cell.snapshot(), TachoReading::turning(1250, 3));
    }

    #[test]
    fn handler_cell_is_empty_until_installed() {
        let cell = HandlerCell::<u32>::new();
        unsafe {
            assert_eq!(cell.get_mut(), None);
            cell.install(7);
            if let Some(v) = cell.get_mut() {
                *v += 1;
            }
            assert_eq!(cell.get_mut().copied(), Some(8));
        }
    }

    #[test]
    fn color_words_are_masked_to_24_bits() {
        let colors = ColorBuffer::<2>::new();
        colors.set(0, 0xFF12_3456);
        assert_eq!(colors.get(0), 0x12_3456);
    }

    #[test]
    fn color_buffer_ignores_out_of_range() {
        let colors = ColorBuffer::<2>::new();
        colors.set(5, 0x00FF_FFFF);
        assert_eq!(colors.get(5), 0);
        colors.write_frame(&[1, 2, 3]);
        assert_eq!((colors.get(0), colors.get(1)), (1, 2));
    }

    #[test]
    fn fill_sets_every_led() {
        let colors = ColorBuffer::<4>::new();
        colors.fill(0x0000_00FF);
        assert!((0..colors.len()).all(|i| colors.get(i) == 0xFF));
    }
}
