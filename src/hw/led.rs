// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Heartbeat LED, toggled once per frame.

use embedded_hal::digital::v2::OutputPin;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

pub struct Heartbeat<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    lit: bool,
}

impl<PIN: OutputPin> Heartbeat<PIN> {
    /// Wrap `pin`, starting dark.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin,
            active,
            lit: true,
        };
        led.set(false);
        led
    }

    fn set(&mut self, lit: bool) {
        let high = lit == (self.active == ActiveLevel::High);
        if high {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
        self.lit = lit;
    }

    /// One beat.
    #[inline]
    pub fn beat(&mut self) {
        self.set(!self.lit);
    }
}
