// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level wrappers for the STM32F767.

pub mod bitstream;
pub mod capture;
pub mod frame_timer;
pub mod led;
pub mod pins;

pub use bitstream::BitstreamOutput;
pub use capture::CaptureTimer;
pub use frame_timer::FrameTimer;
pub use led::{ActiveLevel, Heartbeat};
pub use pins::BoardPins;
