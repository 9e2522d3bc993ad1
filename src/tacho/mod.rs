// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Tachometer
//!
//! - [`estimator`] – interval history, phase tracking and frequency estimate
//! - [`phase`] – scoring of candidate phases against the arc table
//!
//! [`Tachometer`] is what the capture interrupts talk to: it forwards events to the estimator and
//! publishes a fresh [`TachoReading`] after each one.

pub mod estimator;
pub mod phase;

pub use estimator::{EstimatorConfig, PhaseEstimator};
pub use phase::Verdict;

use crate::irq::CaptureHandler;
use crate::shared::{TachoCell, TachoReading};

/// Estimator bound to its output cell.
pub struct Tachometer<'a, const N: usize, const H: usize = N> {
    estimator: PhaseEstimator<N, H>,
    output: &'a TachoCell,
}

impl<'a, const N: usize, const H: usize> Tachometer<'a, N, H> {
    /// Wrap `estimator` and publish its initial (stalled) reading.
    pub fn new(estimator: PhaseEstimator<N, H>, output: &'a TachoCell) -> Self {
        output.publish(estimator.reading());
        Self { estimator, output }
    }

    #[inline]
    pub fn estimator(&self) -> &PhaseEstimator<N, H> {
        &self.estimator
    }

    /// Latest published reading.
    #[inline]
    pub fn reading(&self) -> TachoReading {
        self.output.snapshot()
    }

    #[inline]
    fn publish(&self) {
        self.output.publish(self.estimator.reading());
    }
}

impl<const N: usize, const H: usize> CaptureHandler for Tachometer<'_, N, H> {
    fn on_edge_captured(&mut self, duration: u32) {
        self.estimator.on_edge_captured(duration);
        self.publish();
    }

    fn on_counter_overflow(&mut self) {
        self.estimator.on_counter_overflow();
        self.publish();
    }
}
