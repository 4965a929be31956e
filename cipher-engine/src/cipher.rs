//! Block primitive trait

use crate::error::Result;

/// A fixed-block-size cipher whose key schedule is derived once by
/// [`init`](BlockCipher::init) and then used for single-block operations.
///
/// Block operations work in place on slices of exactly
/// [`BLOCK_SIZE`](BlockCipher::BLOCK_SIZE) bytes; the mode driver never
/// hands out anything else.
pub trait BlockCipher: Sized {
    /// Block size in bytes, must be > 0
    const BLOCK_SIZE: usize;

    /// Required key length in bytes, 0 for variable-length keys
    const KEY_SIZE: usize;

    /// Builds the key schedule
    fn init(key: &[u8]) -> Result<Self>;

    /// Encrypts a single block in place
    fn encrypt_block(&self, block: &mut [u8]);

    /// Decrypts a single block in place
    fn decrypt_block(&self, block: &mut [u8]);

    /// Wipes the key schedule. The primitive is unusable afterwards.
    fn finalize(&mut self);
}
