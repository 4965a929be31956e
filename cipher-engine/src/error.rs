//! Error types for cipher context operations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherModeError {
    #[error("Unknown cipher feedback mode {0}")]
    UnsupportedMode(u8),

    #[error("Key must be {expected} bytes long, not {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Key cannot be the null string")]
    EmptyKey,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{subject} must be {requirement}, got {actual} bytes")]
    InvalidLength {
        subject: &'static str,
        requirement: String,
        actual: usize,
    },

    #[error("Key schedule error: {0}")]
    KeySchedule(String),

    #[error("No memory available for {requested} byte buffer")]
    OutOfMemory { requested: usize },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Cancelled after {processed} of {total} bytes")]
    Cancelled { processed: usize, total: usize },
}

impl CipherModeError {
    pub(crate) fn not_block_multiple(block_size: usize, actual: usize) -> Self {
        Self::InvalidLength {
            subject: "Input strings",
            requirement: format!("a multiple of {block_size} in length"),
            actual,
        }
    }

    pub(crate) fn wrong_iv_length(block_size: usize, actual: usize) -> Self {
        Self::InvalidLength {
            subject: "IV",
            requirement: format!("{block_size} bytes long"),
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, CipherModeError>;
