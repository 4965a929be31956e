//! # Cipher Engine
//!
//! A block cipher mode engine: any fixed-block-size primitive implementing
//! [`BlockCipher`] can be bound to a key inside a [`CipherContext`], which
//! validates buffers, processes them in windows of blocks and wipes its state
//! when dropped.
//!
//! ## Supported Modes
//!
//! - **ECB** (Electronic Code Book) - each window of blocks is decrypted and
//!   then encrypted again in place
//!
//! CBC, CFB, OFB and CTR are known [`Mode`]s and are rejected at construction.
//!
//! ## Usage
//!
//! ```rust
//! use cipher_engine::{Aes, BlockCipher, CipherContext, TwoAes};
//!
//! let k1 = b"1234567890123456";
//! let k2 = b"abcdefghijklmnop";
//!
//! // Ciphertext under k1
//! let mut block = *b"_this-is-a-test_";
//! Aes::new(k1)?.encrypt_block(&mut block);
//!
//! // Re-key it to k2 in one pass
//! let key = [&k1[..], &k2[..]].concat();
//! let ctx = CipherContext::<TwoAes>::new(&key)?;
//! let recrypted = ctx.encrypt(&block)?;
//!
//! let mut expected = *b"_this-is-a-test_";
//! Aes::new(k2)?.encrypt_block(&mut expected);
//! assert_eq!(recrypted, expected);
//! # Ok::<(), cipher_engine::CipherModeError>(())
//! ```
//!
//! ## Features
//!
//! - Generic `BlockCipher` trait with compile-time block and key sizes
//! - Windowed processing with optional progress reporting and cancellation
//! - Key schedules, IVs and working buffers are zeroized

// Public modules
pub mod cipher;
pub mod context;
pub mod error;
pub mod modes;
pub mod primitives;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-exports for easy access
pub use cipher::BlockCipher;
pub use context::{CipherContext, ContextOptions};
pub use error::{CipherModeError, Result};
pub use modes::{Mode, WindowProgress, DEFAULT_WINDOW};
pub use primitives::{Aes, TwoAes};

use zeroize::{Zeroize, Zeroizing};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dummy cipher implementation for testing and demonstration
///
/// XORs each block with the repeating key, so encryption and decryption are
/// the same operation and the ECB double pass leaves data unchanged. It
/// should **never** be used in production.
///
/// # Example
///
/// ```rust
/// use cipher_engine::{CipherContext, DummyCipher};
///
/// let ctx = CipherContext::<DummyCipher>::new(b"secret")?;
/// assert_eq!(ctx.block_size(), 16);
/// assert_eq!(ctx.encrypt(&[42u8; 32])?, vec![42u8; 32]);
/// # Ok::<(), cipher_engine::CipherModeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DummyCipher {
    key: Zeroizing<Vec<u8>>,
}

impl BlockCipher for DummyCipher {
    const BLOCK_SIZE: usize = 16;
    const KEY_SIZE: usize = 0;

    fn init(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(CipherModeError::KeySchedule(
                "Key cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
        })
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        utils::xor_with_key(block, &self.key);
    }

    /// Identical to encrypt for XOR
    fn decrypt_block(&self, block: &mut [u8]) {
        self.encrypt_block(block);
    }

    fn finalize(&mut self) {
        self.key.zeroize();
    }
}
