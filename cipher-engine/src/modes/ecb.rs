//! ECB window driver
//!
//! Each window of `window * BLOCK_SIZE` bytes goes through two passes: every
//! block is first decrypted from the input into the output buffer, then every
//! block of the output window is encrypted in place. With a primitive whose
//! two directions use different keys this re-keys ECB ciphertext without the
//! intermediate plaintext ever leaving the output window.

use std::ops::ControlFlow;

use log::{trace, warn};

use super::WindowProgress;
use crate::{error::CipherModeError, BlockCipher, Result};

/// Runs the windowed decrypt-then-encrypt transformation from `input` into
/// `output`.
///
/// Both slices must have the same length, a multiple of `C::BLOCK_SIZE`, and
/// `window` must be at least 1. `progress` is consulted after every window;
/// breaking while windows remain stops the run with
/// [`CipherModeError::Cancelled`].
pub(crate) fn process<C, F>(
    cipher: &C,
    input: &[u8],
    output: &mut [u8],
    window: usize,
    progress: &mut F,
) -> Result<()>
where
    C: BlockCipher,
    F: FnMut(WindowProgress) -> ControlFlow<()>,
{
    debug_assert_eq!(input.len(), output.len());
    debug_assert_eq!(input.len() % C::BLOCK_SIZE, 0);

    let block_size = C::BLOCK_SIZE;
    let total = input.len();
    // A window wider than the input is the same as one window covering it
    let span = window
        .checked_mul(block_size)
        .unwrap_or(total)
        .max(block_size);

    let mut processed = 0;
    let windows = input.chunks(span).zip(output.chunks_mut(span));

    for (index, (source, target)) in windows.enumerate() {
        for (block_in, block_out) in source
            .chunks_exact(block_size)
            .zip(target.chunks_exact_mut(block_size))
        {
            block_out.copy_from_slice(block_in);
            cipher.decrypt_block(block_out);
        }

        for block in target.chunks_exact_mut(block_size) {
            cipher.encrypt_block(block);
        }

        processed += source.len();
        trace!("ecb window {index} done ({processed}/{total} bytes)");

        let report = WindowProgress {
            index,
            processed,
            total,
        };
        if progress(report).is_break() && !report.is_last() {
            warn!("ecb run cancelled after {processed} of {total} bytes");
            return Err(CipherModeError::Cancelled { processed, total });
        }
    }

    Ok(())
}
