// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Spinlight Firmware
//!
//! Firmware core for a spinning-wheel LED display, written in Rust, targeting an STM32F767 MCU.
//! A multi-magnet hall sensor on the wheel feeds a tachometer that tracks speed and magnet phase,
//! and a WS2812 strip is refreshed continuously by a timer + circular DMA bitstream.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`calibration`] | Compiled-in magnet arc table and the offline calibration learner |
//! | [`tacho`] | Phase/speed estimator fed by the capture timer |
//! | [`ws2812`] | Bitstream encoder, pulse timing and the double-banked transfer buffer |
//! | [`shared`] | State shared between interrupt handlers (tacho snapshot, color buffer) |
//! | [`irq`] | Interrupt priorities and the handler traits the ISRs dispatch to |
//! | [`frame`] | Frame-clock side: position/velocity tracking and basic patterns |
//! | `hw` | MCU-level wrappers around TIM1/TIM2/TIM3, DMA1 and GPIO (`hardware` feature) |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features hardware --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod calibration;
pub mod frame;
pub mod irq;
pub mod shared;
pub mod tacho;
pub mod ws2812;

#[cfg(feature = "hardware")]
pub mod hw;
