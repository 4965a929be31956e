//! Mode selectors and the per-mode drivers

pub mod ecb;

use std::fmt;

use crate::error::{CipherModeError, Result};

/// Number of blocks processed per window unless configured otherwise
pub const DEFAULT_WINDOW: usize = 10;

/// Chaining mode of a [`CipherContext`](crate::CipherContext).
///
/// All modes sharing the context layout are named so that callers get a
/// precise error for them, but only [`Mode::Ecb`] has a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mode {
    /// Electronic Code Book
    #[default]
    Ecb = 1,
    /// Cipher Block Chaining
    Cbc = 2,
    /// Cipher Feedback
    Cfb = 3,
    /// Output Feedback
    Ofb = 5,
    /// Counter
    Ctr = 6,
}

impl Mode {
    const ALL: [Mode; 5] = [Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Ofb, Mode::Ctr];

    /// Numeric mode id
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Mode::Ecb => "ECB",
            Mode::Cbc => "CBC",
            Mode::Cfb => "CFB",
            Mode::Ofb => "OFB",
            Mode::Ctr => "CTR",
        }
    }

    /// Whether this engine has a driver for the mode
    pub const fn is_supported(self) -> bool {
        matches!(self, Mode::Ecb)
    }

    /// List all supported modes
    pub fn supported() -> Vec<Mode> {
        Self::ALL.into_iter().filter(|mode| mode.is_supported()).collect()
    }
}

impl TryFrom<u8> for Mode {
    type Error = CipherModeError;

    fn try_from(id: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.id() == id)
            .ok_or(CipherModeError::UnsupportedMode(id))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress report handed to the caller after each completed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowProgress {
    /// Zero-based index of the window just finished
    pub index: usize,
    /// Bytes processed so far, including this window
    pub processed: usize,
    /// Length of the whole input
    pub total: usize,
}

impl WindowProgress {
    pub fn is_last(&self) -> bool {
        self.processed == self.total
    }
}
