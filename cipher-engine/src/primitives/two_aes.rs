//! TWOAES: a pair of AES keys acting as one primitive.
//!
//! The key is `k1 || k2` with halves of equal length. Decryption runs AES
//! under `k1`, encryption runs AES under `k2`, so the ECB driver's
//! decrypt-then-encrypt pass turns `AES_k1` ciphertext into `AES_k2`
//! ciphertext in a single call.

use crate::{error::CipherModeError, BlockCipher, Result};

use super::Aes;

/// Two AES key schedules; see the module docs
#[derive(Clone)]
pub struct TwoAes {
    source: Aes,
    target: Aes,
}

impl BlockCipher for TwoAes {
    const BLOCK_SIZE: usize = 16;
    const KEY_SIZE: usize = 0;

    fn init(key: &[u8]) -> Result<Self> {
        if !matches!(key.len(), 32 | 48 | 64) {
            return Err(CipherModeError::KeySchedule(format!(
                "TWOAES key must be 32, 48 or 64 bytes long, not {}",
                key.len()
            )));
        }

        let (first, second) = key.split_at(key.len() / 2);
        Ok(Self {
            source: Aes::new(first)?,
            target: Aes::new(second)?,
        })
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        self.target.encrypt_block(block);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        self.source.decrypt_block(block);
    }

    fn finalize(&mut self) {
        self.source.finalize();
        self.target.finalize();
    }
}
