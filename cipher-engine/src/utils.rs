//! Utility functions for the mode drivers and primitives

use zeroize::Zeroizing;

use crate::error::{CipherModeError, Result};

/// XOR `block` in place with `key`, repeating the key as needed
pub fn xor_with_key(block: &mut [u8], key: &[u8]) {
    for (byte, k) in block.iter_mut().zip(key.iter().cycle()) {
        *byte ^= k;
    }
}

/// Allocate a zero-filled working buffer that is wiped when dropped.
///
/// Allocation failure is reported instead of aborting the process.
pub(crate) fn zeroed_buffer(len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| CipherModeError::OutOfMemory { requested: len })?;
    buffer.resize(len, 0);
    Ok(Zeroizing::new(buffer))
}
