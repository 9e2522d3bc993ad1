// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Double-banked transfer buffer.
//!
//! The DMA walks the whole buffer in circular mode, lower bank then upper bank. The half-transfer
//! notification means the lower bank has been consumed and the DMA moved on to the upper one; the
//! transfer-complete notification means the opposite. Each notification therefore hands exactly
//! one bank back to the CPU, and [`TransferBuffer::released`] is the only way to get write access
//! to a bank.

use crate::ws2812::timing::Symbol;

/// One half of the transfer buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    Lower,
    Upper,
}

impl Bank {
    /// The other bank.
    #[inline]
    pub const fn other(self) -> Bank {
        match self {
            Bank::Lower => Bank::Upper,
            Bank::Upper => Bank::Lower,
        }
    }
}

/// Block-transfer notification.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferEvent {
    /// Lower bank consumed, upper bank live.
    HalfComplete,
    /// Upper bank consumed, lower bank live.
    Complete,
}

impl TransferEvent {
    /// Bank the CPU may rewrite after this event.
    #[inline]
    pub const fn released_bank(self) -> Bank {
        match self {
            TransferEvent::HalfComplete => Bank::Lower,
            TransferEvent::Complete => Bank::Upper,
        }
    }

    /// Bank the DMA is emitting after this event.
    #[inline]
    pub const fn live_bank(self) -> Bank {
        self.released_bank().other()
    }
}

/// Symbols for the DMA, `BANK` per bank, banks stored back to back.
#[repr(C)]
pub struct TransferBuffer<const BANK: usize> {
    banks: [[Symbol; BANK]; 2],
}

impl<const BANK: usize> TransferBuffer<BANK> {
    /// Total symbols in both banks.
    pub const SYMBOLS: usize = 2 * BANK;

    /// All-zero buffer (line held low).
    pub const fn new() -> Self {
        Self {
            banks: [[0; BANK]; 2],
        }
    }

    /// Write access to the bank released by `event`.
    #[inline]
    pub fn released(&mut self, event: TransferEvent) -> &mut [Symbol; BANK] {
        self.bank_mut(event.released_bank())
    }

    /// Write access to a bank while the DMA is not running.
    #[inline]
    pub fn bank_mut(&mut self, bank: Bank) -> &mut [Symbol; BANK] {
        match bank {
            Bank::Lower => &mut self.banks[0],
            Bank::Upper => &mut self.banks[1],
        }
    }

    #[inline]
    pub fn bank(&self, bank: Bank) -> &[Symbol; BANK] {
        match bank {
            Bank::Lower => &self.banks[0],
            Bank::Upper => &self.banks[1],
        }
    }

    /// Symbol at `index` of the whole buffer, as the DMA sees it.
    #[inline]
    pub fn symbol(&self, index: usize) -> Option<Symbol> {
        self.banks.as_flattened().get(index).copied()
    }

    /// Start address for the DMA memory pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const Symbol {
        self.banks.as_ptr().cast()
    }
}

impl<const BANK: usize> Default for TransferBuffer<BANK> {
    fn default() -> Self {
        Self::new()
    }
}
