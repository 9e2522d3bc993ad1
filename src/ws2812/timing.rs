// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! WS2812 pulse timing.
//!
//! One bit is one PWM period of the pulse timer. The DMA rewrites the compare register every
//! update event, so each transfer symbol is simply the high time of one bit, in timer ticks.

/// Nominal bit period.
pub const BIT_PERIOD_NS: u32 = 1250;

/// High time of a `0` bit, in percent of the period.
pub const ZERO_DUTY_PERCENT: u32 = 27;

/// High time of a `1` bit, in percent of the period.
pub const ONE_DUTY_PERCENT: u32 = 62;

/// One bit period as seen by the pulse timer: its compare value.
pub type Symbol = u16;

/// Symbol that keeps the line low for a whole period.
pub const RESET_SYMBOL: Symbol = 0;

/// Pulse timer settings for one bit period.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseTiming {
    period: u16,
    zero: Symbol,
    one: Symbol,
}

impl PulseTiming {
    /// Timing for a pulse timer clocked at `timer_hz`.
    pub const fn from_timer_clock(timer_hz: u32) -> Self {
        let ticks = (timer_hz as u64 * BIT_PERIOD_NS as u64 + 500_000_000) / 1_000_000_000;
        let period = if ticks > u16::MAX as u64 {
            u16::MAX
        } else {
            ticks as u16
        };
        Self::from_period(period)
    }

    /// Timing for a bit period of `period` ticks.
    pub const fn from_period(period: u16) -> Self {
        Self {
            period,
            zero: duty(period, ZERO_DUTY_PERCENT),
            one: duty(period, ONE_DUTY_PERCENT),
        }
    }

    /// Auto-reload value of the pulse timer (period - 1).
    #[inline]
    pub const fn auto_reload(&self) -> u16 {
        self.period.saturating_sub(1)
    }

    #[inline]
    pub const fn period(&self) -> u16 {
        self.period
    }

    /// Compare value encoding a `0` bit.
    #[inline]
    pub const fn zero(&self) -> Symbol {
        self.zero
    }

    /// Compare value encoding a `1` bit.
    #[inline]
    pub const fn one(&self) -> Symbol {
        self.one
    }

    #[inline]
    pub const fn symbol(&self, bit: bool) -> Symbol {
        if bit {
            self.one
        } else {
            self.zero
        }
    }
}

const fn duty(period: u16, percent: u32) -> Symbol {
    (period as u32 * percent / 100) as Symbol
}
