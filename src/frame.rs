// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Frame clock.
//!
//! Runs once per frame at [`FPS`], lowest priority. Reads the latest tachometer snapshot,
//! integrates it into a wheel position and renders into the shared color buffer.
//!
//! Position and velocity are in LED units: one unit is the spacing between two LEDs on the strip,
//! so a pattern anchored at `position` stays put relative to the ground while the wheel turns.

#[cfg(not(test))]
use micromath::F32Ext;

use crate::calibration::FREQUENCY_FACTOR;
use crate::shared::{ColorBuffer, TachoReading};
use crate::ws2812::ColorOrder;

/// Frame rate of the frame clock.
pub const FPS: u32 = 60;

pub const WHEEL_RADIUS_MM: f32 = 105.0;

/// Distance between neighbouring LEDs on the strip.
pub const LED_SPACING_MM: f32 = 17.5;

/// Wheel circumference in LED units.
pub const WHEEL_CIRCUMFERENCE: f32 = 2.0 * core::f32::consts::PI * WHEEL_RADIUS_MM / LED_SPACING_MM;

/// Frames the slow warning stays raised after an overrun (and after power-up).
pub const SLOW_WARNING_FRAMES: u32 = 120;

/// Width of one band of [`three_color_bands`], in LED units.
pub const BAND_WIDTH: f32 = 30.0;

/// Accumulator value of one full revolution: frames per second times mHz per Hz.
const DISTANCE_PER_REVOLUTION: u64 = FPS as u64 * FREQUENCY_FACTOR as u64;

/// Everything a pattern needs to render one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Frame counter, wraps.
    pub index: u32,
    /// Wheel position in `0..WHEEL_CIRCUMFERENCE`.
    pub position: f32,
    /// LED units per second.
    pub velocity: f32,
    /// Non-zero for a while after the frame clock overran its period.
    pub slow_warning: u32,
}

/// Integrates tachometer readings into wheel position, one frame at a time.
pub struct FrameClock {
    index: u32,
    /// Distance within the current revolution, in mHz * frames.
    distance: u64,
    slow_warning: u32,
}

impl FrameClock {
    pub const fn new() -> Self {
        Self {
            index: 0,
            distance: 0,
            slow_warning: SLOW_WARNING_FRAMES,
        }
    }

    /// Advance by one frame using `reading`.
    pub fn tick(&mut self, reading: TachoReading) -> Frame {
        self.slow_warning = self.slow_warning.saturating_sub(1);
        self.index = self.index.wrapping_add(1);

        let f = reading.frequency_millihertz();
        self.distance = (self.distance + u64::from(f)) % DISTANCE_PER_REVOLUTION;

        let revolutions = self.distance as f32 / DISTANCE_PER_REVOLUTION as f32;
        Frame {
            index: self.index,
            position: revolutions * WHEEL_CIRCUMFERENCE,
            velocity: f as f32 * WHEEL_CIRCUMFERENCE / FREQUENCY_FACTOR as f32,
            slow_warning: self.slow_warning,
        }
    }

    /// The frame handler did not finish within its period.
    pub fn overrun(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::warn!("frame {=u32} overran its period", self.index);
        self.slow_warning = SLOW_WARNING_FRAMES;
    }

    #[inline]
    pub fn slow_warning(&self) -> u32 {
        self.slow_warning
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Power-up pattern: full red with a scattered green component.
pub fn initial_pattern<const N: usize>(colors: &ColorBuffer<N>, order: ColorOrder) {
    for i in 0..N {
        let g = ((i * 400) % 251 / 2) as u8;
        colors.set(i, order.pack(255, g, 0));
    }
}

/// Ground-fixed blue, green and red bands, each [`BAND_WIDTH`] LED units wide.
pub fn three_color_bands<const N: usize>(colors: &ColorBuffer<N>, order: ColorOrder, position: f32) {
    for i in 0..N {
        let band = ((i as f32 + position) / BAND_WIDTH).floor() as i32;
        let word = match band.rem_euclid(3) {
            0 => order.pack(0, 0, 255),
            1 => order.pack(0, 255, 0),
            _ => order.pack(255, 0, 0),
        };
        colors.set(i, word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn circumference_in_led_units() {
        assert!(close(WHEEL_CIRCUMFERENCE, 37.699));
    }

    #[test]
    fn one_hertz_for_one_second_is_one_revolution() {
        let mut clock = FrameClock::new();
        let reading = TachoReading::turning(1000, 0);

        let frame = clock.tick(reading);
        assert!(close(frame.velocity, WHEEL_CIRCUMFERENCE));
        assert!(close(frame.position, WHEEL_CIRCUMFERENCE / 60.0));

        for _ in 1..30 {
            clock.tick(reading);
        }
        let half = clock.tick(reading);
        assert!(close(half.position, WHEEL_CIRCUMFERENCE * 31.0 / 60.0));

        for _ in 31..59 {
            clock.tick(reading);
        }
        // Frame 60 completes the revolution and wraps to zero.
        let full = clock.tick(reading);
        assert_eq!(full.index, 60);
        assert!(close(full.position, 0.0));
    }

    #[test]
    fn stalled_wheel_does_not_move() {
        let mut clock = FrameClock::new();
        let frame = clock.tick(TachoReading::stalled(2));
        assert_eq!(frame.velocity, 0.0);
        assert_eq!(frame.position, 0.0);
    }

    #[test]
    fn slow_warning_counts_down_and_rearms() {
        let mut clock = FrameClock::new();
        let frame = clock.tick(TachoReading::stalled(0));
        assert_eq!(frame.slow_warning, SLOW_WARNING_FRAMES - 1);

        for _ in 0..SLOW_WARNING_FRAMES {
            clock.tick(TachoReading::stalled(0));
        }
        assert_eq!(clock.slow_warning(), 0);

        clock.overrun();
        assert_eq!(clock.slow_warning(), SLOW_WARNING_FRAMES);
    }

    #[test]
    fn initial_pattern_is_red_based() {
        let colors = ColorBuffer::<4>::new();
        initial_pattern(&colors, ColorOrder::Grb);
        // i = 1: (400 % 251) / 2 = 74.
        assert_eq!(ColorOrder::Grb.unpack(colors.get(1)), (255, 74, 0));
        assert_eq!(ColorOrder::Grb.unpack(colors.get(0)), (255, 0, 0));
    }

    #[test]
    fn bands_follow_position() {
        let colors = ColorBuffer::<3>::new();
        let order = ColorOrder::default();

        three_color_bands(&colors, order, 0.0);
        assert_eq!(colors.get(0), order.pack(0, 0, 255));

        three_color_bands(&colors, order, 29.5);
        assert_eq!(colors.get(0), order.pack(0, 0, 255));
        assert_eq!(colors.get(1), order.pack(0, 255, 0));

        three_color_bands(&colors, order, 60.0);
        assert_eq!(colors.get(2), order.pack(255, 0, 0));
    }
}
