// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Phase/speed estimator.
//!
//! Fed with one raw interval per sensor edge and one event per counter overflow. Keeps the last
//! `H` intervals, tracks which magnet fired last, and converts the newest interval into a wheel
//! frequency using that magnet's arc.
//!
//! Phase tracking assumes the next edge is the next magnet. After every edge the whole history is
//! re-scored against each possible phase ([`disambiguate`]); a clearly better phase replaces the
//! assumed one. That recovers from missed or spurious edges and from the unknown phase at power-up
//! within one clean revolution.

use heapless::HistoryBuffer;

use crate::calibration::Calibration;
use crate::shared::TachoReading;
use crate::tacho::phase::{disambiguate, Verdict};

/// Interval assumed for every history slot at power-up: one full counter period.
pub const INITIAL_INTERVAL: u32 = 0xFFFF;

/// Tunables of the estimator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EstimatorConfig {
    /// Minimum confidence (percent) before a phase override is accepted.
    pub confidence_threshold: u32,
}

impl EstimatorConfig {
    pub const fn new() -> Self {
        Self {
            confidence_threshold: 150,
        }
    }

    pub const fn with_confidence_threshold(mut self, threshold: u32) -> Self {
        self.confidence_threshold = threshold;
        self
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimator for an `N`-magnet wheel keeping `H` intervals of history.
pub struct PhaseEstimator<const N: usize, const H: usize = N> {
    calibration: Calibration<N>,
    config: EstimatorConfig,
    history: HistoryBuffer<u32, H>,
    phase: usize,
    /// Counter overflowed since the last edge; the next interval is not a real one.
    overflow: bool,
    frequency_millihertz: u32,
    last_verdict: Option<Verdict>,
}

impl<const N: usize, const H: usize> PhaseEstimator<N, H> {
    const HISTORY_OK: () = assert!(H >= 2, "history needs at least two intervals");
    const PHASE_FITS: () = assert!(N <= 256, "phase index is reported as a u8");

    pub fn new(calibration: Calibration<N>, config: EstimatorConfig) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::HISTORY_OK;
        #[allow(clippy::let_unit_value)]
        let () = Self::PHASE_FITS;

        Self {
            calibration,
            config,
            history: HistoryBuffer::new_with(INITIAL_INTERVAL),
            phase: 0,
            overflow: true,
            frequency_millihertz: 0,
            last_verdict: None,
        }
    }

    /// Handle a captured edge `duration` ticks after the previous one.
    pub fn on_edge_captured(&mut self, duration: u32) {
        self.history.write(duration);

        let tentative = (self.phase + 1) % N;

        let mut samples = [0u32; H];
        for (slot, &d) in samples.iter_mut().zip(self.history.oldest_ordered()) {
            *slot = d;
        }
        let verdict = disambiguate(&self.calibration, &samples, tentative);

        self.phase = if verdict.overrides(tentative, self.config.confidence_threshold) {
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "phase override {=usize} -> {=usize} (confidence {=u32})",
                tentative,
                verdict.best,
                verdict.confidence
            );
            verdict.best
        } else {
            tentative
        };
        self.last_verdict = Some(verdict);

        self.frequency_millihertz = if self.overflow {
            0
        } else {
            self.frequency_of(duration)
        };
        self.overflow = false;
    }

    /// Handle a full counter period without an edge.
    pub fn on_counter_overflow(&mut self) {
        self.overflow = true;
        self.frequency_millihertz = 0;
    }

    fn frequency_of(&self, duration: u32) -> u32 {
        if duration == 0 {
            return u32::MAX;
        }
        let arc = u64::from(self.calibration.arc(self.phase));
        let f = arc / (u64::from(duration) * N as u64);
        f.clamp(1, u64::from(u32::MAX)) as u32
    }

    /// Magnet that triggered most recently, in `0..N`.
    #[inline]
    pub fn phase_index(&self) -> usize {
        self.phase
    }

    /// Wheel frequency in mHz, 0 while no valid interval is available.
    #[inline]
    pub fn frequency_millihertz(&self) -> u32 {
        self.frequency_millihertz
    }

    /// Whether the counter overflowed since the last edge.
    #[inline]
    pub fn overflow_pending(&self) -> bool {
        self.overflow
    }

    /// Interval history, oldest first.
    pub fn history(&self) -> impl Iterator<Item = u32> + '_ {
        self.history.oldest_ordered().copied()
    }

    /// Result of the most recent disambiguation pass.
    #[inline]
    pub fn last_verdict(&self) -> Option<Verdict> {
        self.last_verdict
    }

    #[inline]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Snapshot for the frame clock.
    pub fn reading(&self) -> TachoReading {
        let phase = self.phase as u8;
        if self.frequency_millihertz == 0 {
            TachoReading::stalled(phase)
        } else {
            TachoReading::turning(self.frequency_millihertz, phase)
        }
    }
}
