// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F767 wheel controller.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, Alternate, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust,ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB);
/// ```
pub struct BoardPins {
    pub tacho: TachoPins,
    pub strip: StripPins,
    pub heartbeat: gpiob::PB7<Output<PushPull>>,
}

/// Hall sensor input
pub struct TachoPins {
    pub tim1_ch1: gpioa::PA8<Alternate<1>>,
}

/// WS2812 data line
pub struct StripPins {
    pub tim3_ch2: gpioa::PA7<Alternate<2>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();

        Self {
            tacho: TachoPins {
                tim1_ch1: gpioa.pa8.into_alternate::<1>(),
            },

            strip: StripPins {
                tim3_ch2: gpioa.pa7.into_alternate::<2>(),
            },

            heartbeat: gpiob.pb7.into_push_pull_output(),
        }
    }
}
