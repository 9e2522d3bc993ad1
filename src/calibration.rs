// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Magnet calibration.
//!
//! The magnets on the wheel are not evenly spaced, which is what lets the tachometer tell them
//! apart. Each magnet gets an *arc* entry: the angular distance from the previous magnet,
//! expressed in units of `FREQUENCY_FACTOR * TICK_HZ * N * fraction_of_revolution`. With those
//! units a single interval of `duration` capture ticks converts to a wheel frequency with
//!
//! ```text
//! frequency_mhz = arc / (duration * N)
//! ```
//!
//! The table is measured offline with [`learn`] from a log of raw capture intervals and compiled
//! in as [`WHEEL`].

/// Number of magnets on the wheel.
pub const MAGNETS: usize = 5;

/// Capture timer tick rate in Hz.
pub const TICK_HZ: u32 = 65_536;

/// `frequency_millihertz / FREQUENCY_FACTOR` = wheel frequency in Hz.
pub const FREQUENCY_FACTOR: u32 = 1000;

/// Measured arc table of the current wheel.
pub const ARC_TABLE: [u32; MAGNETS] = [69340993, 61923605, 64606495, 65695792, 66113112];

/// Validated calibration of the current wheel. Checked at compile time.
pub const WHEEL: Calibration<MAGNETS> = match Calibration::new(ARC_TABLE) {
    Ok(c) => c,
    Err(_) => panic!("invalid compiled-in arc table"),
};

/// Calibration errors.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Fewer than three magnets; phase cannot be disambiguated.
    TooFewMagnets,
    /// An arc entry is zero.
    ZeroArc { index: usize },
    /// The interval log is too short for the requested magnet count.
    NotEnoughSamples,
    /// The interval log does not describe a turning wheel.
    NoMotion,
}

/// Per-magnet arc distances for an `N`-magnet wheel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Calibration<const N: usize> {
    arcs: [u32; N],
}

impl<const N: usize> Calibration<N> {
    /// Validate an arc table.
    pub const fn new(arcs: [u32; N]) -> Result<Self, Error> {
        if N < 3 {
            return Err(Error::TooFewMagnets);
        }
        let mut i = 0;
        while i < N {
            if arcs[i] == 0 {
                return Err(Error::ZeroArc { index: i });
            }
            i += 1;
        }
        Ok(Self { arcs })
    }

    /// Arc entry of magnet `index`, wrapping around the wheel.
    #[inline]
    pub fn arc(&self, index: usize) -> u32 {
        self.arcs[index % N]
    }

    #[inline]
    pub fn arcs(&self) -> &[u32; N] {
        &self.arcs
    }

    /// Number of magnets.
    #[inline]
    pub const fn magnets(&self) -> usize {
        N
    }
}

/// Derive an arc table from a log of consecutive capture intervals.
///
/// `intervals` are raw `TIM1_CCR1` values in capture order, as printed by the firmware's trace
/// log. The first `skip` samples are dropped (the wheel is usually still accelerating from the
/// push), then the drift of the interval length between sample 0 and sample `N` (same magnet, one
/// revolution later) is removed from the first `N` samples before they are normalized.
///
/// ```
/// use spinlight::calibration::learn;
///
/// let log = [1000, 2000, 3000, 1000, 2000, 3000, 1000];
/// let arcs: [u32; 3] = learn(&log, 0).unwrap();
/// assert_eq!(arcs, [32_768_000, 65_536_000, 98_304_000]);
/// ```
pub fn learn<const N: usize>(intervals: &[u32], skip: usize) -> Result<[u32; N], Error> {
    if N < 3 {
        return Err(Error::TooFewMagnets);
    }
    let samples = intervals
        .get(skip..)
        .filter(|s| s.len() > N)
        .ok_or(Error::NotEnoughSamples)?;

    // Start time of every sample, relative to sample 0.
    let mut starts = [0i64; N];
    let mut elapsed = 0i64;
    for (start, &d) in starts.iter_mut().zip(samples) {
        *start = elapsed;
        elapsed += i64::from(d);
    }
    let span = elapsed;
    if span == 0 {
        return Err(Error::NoMotion);
    }
    let drift = i64::from(samples[N]) - i64::from(samples[0]);

    // Detrended distances, scaled by `span` to stay in integers.
    let mut distances = [0i64; N];
    for ((dist, &d), &t) in distances.iter_mut().zip(samples).zip(&starts) {
        *dist = i64::from(d) * span - drift * t;
    }
    let total: i128 = distances.iter().map(|&d| i128::from(d)).sum();
    if total <= 0 {
        return Err(Error::NoMotion);
    }

    let unit = i128::from(FREQUENCY_FACTOR) * i128::from(TICK_HZ) * N as i128;
    let mut arcs = [0u32; N];
    for (arc, &dist) in arcs.iter_mut().zip(&distances) {
        let scaled = (unit * i128::from(dist) / total).clamp(1, i128::from(u32::MAX));
        *arc = scaled as u32;
    }
    Ok(arcs)
}
