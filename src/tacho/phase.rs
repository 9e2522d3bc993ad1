// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Magnet phase disambiguation.
//!
//! Every candidate phase assigns an arc entry to each interval in the history. Dividing arc by
//! interval gives an implied instantaneous rate per sample; under the right assignment those rates
//! lie on a smooth trend (constant speed, or steady acceleration), under a wrong one they jump
//! around by the spacing differences between magnets.
//!
//! The trend is the straight line through the first and last sample's rate over elapsed capture
//! time. A candidate's score is the largest relative deviation from that line, in parts per
//! million.

use crate::calibration::Calibration;

/// Fixed-point fraction bits of an implied rate.
pub const RATE_SHIFT: u32 = 16;

/// Rate assigned to zero-length intervals.
pub const SATURATED_RATE: i64 = (u32::MAX as i64) << RATE_SHIFT;

const PPM: u64 = 1_000_000;

/// `arc / duration` in `RATE_SHIFT` fixed point.
#[inline]
pub fn implied_rate(arc: u32, duration: u32) -> i64 {
    if duration == 0 {
        SATURATED_RATE
    } else {
        (i64::from(arc) << RATE_SHIFT) / i64::from(duration)
    }
}

/// Arc entry that `candidate` assigns to sample `k` of `len` (oldest first, newest last).
#[inline]
fn arc_for_sample<const N: usize>(
    calibration: &Calibration<N>,
    candidate: usize,
    k: usize,
    len: usize,
) -> u32 {
    let back = (len - 1 - k) % N;
    calibration.arc(candidate % N + N - back)
}

/// Worst relative deviation (ppm) of `samples` from a linear rate trend, assuming the newest
/// sample ends at magnet `candidate`.
pub fn score<const N: usize>(calibration: &Calibration<N>, samples: &[u32], candidate: usize) -> u32 {
    let len = samples.len();
    let (Some(&first), Some(&last)) = (samples.first(), samples.last()) else {
        return 0;
    };
    let r_first = implied_rate(arc_for_sample(calibration, candidate, 0, len), first);
    let r_last = implied_rate(arc_for_sample(calibration, candidate, len - 1, len), last);

    // Anchors: start of the first sample (t = 0) and start of the last one.
    let span: i64 = samples[..len - 1].iter().map(|&d| i64::from(d)).sum();

    let mut elapsed = 0i64;
    let mut worst = 0u32;
    for (k, &d) in samples.iter().enumerate() {
        let rate = implied_rate(arc_for_sample(calibration, candidate, k, len), d);
        let trend = if span == 0 {
            r_first
        } else {
            r_first + (r_last - r_first).saturating_mul(elapsed) / span
        };
        let deviation = (rate - trend).unsigned_abs().saturating_mul(PPM) / trend.max(1) as u64;
        worst = worst.max(deviation.min(u64::from(u32::MAX)) as u32);
        elapsed += i64::from(d);
    }
    worst
}

/// Outcome of one disambiguation pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Verdict {
    /// Lowest-scoring candidate.
    pub best: usize,
    pub best_score: u32,
    /// Second-lowest-scoring candidate.
    pub runner_up: usize,
    pub runner_up_score: u32,
    /// `100 * (runner_up_score - best_score) / (best_score + 1)`.
    pub confidence: u32,
}

impl Verdict {
    /// Whether `best` should replace the `tentative` phase.
    #[inline]
    pub fn overrides(&self, tentative: usize, threshold: u32) -> bool {
        self.confidence > threshold && self.best != tentative
    }
}

/// Score every candidate phase. Candidates are tried starting at `tentative`, so ties keep it.
pub fn disambiguate<const N: usize>(
    calibration: &Calibration<N>,
    samples: &[u32],
    tentative: usize,
) -> Verdict {
    let mut best = (tentative % N, u32::MAX);
    let mut runner_up = (tentative % N, u32::MAX);

    for i in 0..N {
        let candidate = (tentative + i) % N;
        let s = score(calibration, samples, candidate);
        if s < best.1 {
            runner_up = best;
            best = (candidate, s);
        } else if s < runner_up.1 {
            runner_up = (candidate, s);
        }
    }

    let gap = u64::from(runner_up.1 - best.1);
    let confidence = (100 * gap / (u64::from(best.1) + 1)).min(u64::from(u32::MAX)) as u32;

    Verdict {
        best: best.0,
        best_score: best.1,
        runner_up: runner_up.0,
        runner_up_score: runner_up.1,
        confidence,
    }
}
