// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Packing of channel bytes into 24-bit color words.
//!
//! The encoder shifts words out MSB first, so the packing decides the order the LED sees the
//! channels in. Strips differ here; pick the order matching the one on the wheel.

/// Byte layout of a packed color word, named by wire order (bits 23:16, 15:8, 7:0).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    /// Green [23:16], blue [15:8], red [7:0].
    #[default]
    Gbr,
    /// Green [23:16], red [15:8], blue [7:0].
    Grb,
}

impl ColorOrder {
    pub const fn pack(self, r: u8, g: u8, b: u8) -> u32 {
        let (mid, low) = match self {
            ColorOrder::Gbr => (b, r),
            ColorOrder::Grb => (r, b),
        };
        (g as u32) << 16 | (mid as u32) << 8 | low as u32
    }

    /// Split a packed word back into `(r, g, b)`.
    pub const fn unpack(self, word: u32) -> (u8, u8, u8) {
        let g = (word >> 16) as u8;
        let mid = (word >> 8) as u8;
        let low = word as u8;
        match self {
            ColorOrder::Gbr => (low, g, mid),
            ColorOrder::Grb => (mid, g, low),
        }
    }
}

/// Pack with the default order.
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ColorOrder::Gbr.pack(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        assert_eq!(rgb(0xFF, 0, 0), 0x00_00FF);
        assert_eq!(rgb(0, 0xFF, 0), 0xFF_0000);
        assert_eq!(rgb(0, 0, 0xFF), 0x00_FF00);
    }

    #[test]
    fn grb_layout() {
        assert_eq!(ColorOrder::Grb.pack(0x12, 0x34, 0x56), 0x34_1256);
        assert_eq!(ColorOrder::Grb.unpack(0x34_1256), (0x12, 0x34, 0x56));
    }

    #[test]
    fn unpack_inverts_pack() {
        let word = ColorOrder::Gbr.pack(1, 2, 3);
        assert_eq!(ColorOrder::Gbr.unpack(word), (1, 2, 3));
    }
}
