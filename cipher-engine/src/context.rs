//! Cipher context: one primitive key schedule bound to a mode

use std::fmt;
use std::ops::ControlFlow;

use log::debug;
use zeroize::Zeroize;

use crate::{
    error::{CipherModeError, Result},
    modes::{ecb, Mode, WindowProgress, DEFAULT_WINDOW},
    utils, BlockCipher,
};

/// Construction options for a [`CipherContext`]
///
/// # Example
///
/// ```rust
/// use cipher_engine::{CipherContext, ContextOptions, Mode, TwoAes};
///
/// let options = ContextOptions::default().with_mode(Mode::Ecb).with_window(4);
/// let ctx = CipherContext::<TwoAes>::with_options(&[0u8; 32], options)?;
/// assert_eq!(ctx.window(), 4);
/// # Ok::<(), cipher_engine::CipherModeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    pub mode: Mode,
    pub iv: Vec<u8>,
    pub window: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Ecb,
            iv: Vec::new(),
            window: DEFAULT_WINDOW,
        }
    }
}

impl ContextOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_iv(mut self, iv: impl Into<Vec<u8>>) -> Self {
        self.iv = iv.into();
        self
    }

    /// Blocks per window; must be at least 1
    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

/// A keyed block primitive plus the mode state around it.
///
/// Dropping the context (or calling [`destroy`](CipherContext::destroy))
/// finalizes the primitive first and then zeroes the IV, the feedback
/// register and the counters.
///
/// `encrypt` borrows the context shared and `set_iv` exclusively, so IV
/// updates can never race an encryption in progress.
pub struct CipherContext<C: BlockCipher> {
    mode: Mode,
    cipher: C,
    iv: Vec<u8>,
    old_cipher: Vec<u8>,
    used: usize,
    window: usize,
}

impl<C: BlockCipher> CipherContext<C> {
    /// ECB context with no IV and the default window
    pub fn new(key: &[u8]) -> Result<Self> {
        Self::with_options(key, ContextOptions::default())
    }

    pub fn with_options(key: &[u8], options: ContextOptions) -> Result<Self> {
        let ContextOptions { mode, iv, window } = options;

        if !mode.is_supported() {
            return Err(CipherModeError::UnsupportedMode(mode.id()));
        }
        check_key_length::<C>(key)?;
        if mode == Mode::Ecb && !iv.is_empty() {
            return Err(CipherModeError::InvalidArgument(
                "ECB mode does not use IV".into(),
            ));
        }
        if iv.len() > C::BLOCK_SIZE {
            return Err(CipherModeError::wrong_iv_length(C::BLOCK_SIZE, iv.len()));
        }
        if window == 0 {
            return Err(CipherModeError::InvalidArgument(
                "window must be at least one block".into(),
            ));
        }

        let cipher = C::init(key)?;

        let mut iv_buffer = vec![0u8; C::BLOCK_SIZE];
        iv_buffer[..iv.len()].copy_from_slice(&iv);

        debug!(
            "cipher context created: mode={mode} block_size={} window={window}",
            C::BLOCK_SIZE
        );

        Ok(Self {
            mode,
            cipher,
            iv: iv_buffer,
            old_cipher: vec![0u8; C::BLOCK_SIZE],
            used: C::BLOCK_SIZE,
            window,
        })
    }

    /// Run the mode over `data`.
    ///
    /// For ECB every window is first decrypted from `data` into the output
    /// buffer and then encrypted in place; see [`crate::modes::ecb`].
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_with_progress(data, |_| ControlFlow::Continue(()))
    }

    /// Same as [`encrypt`](CipherContext::encrypt), reporting after every
    /// window. Returning [`ControlFlow::Break`] while input remains aborts
    /// with [`CipherModeError::Cancelled`]; the partial output is wiped.
    pub fn encrypt_with_progress<F>(&self, data: &[u8], mut progress: F) -> Result<Vec<u8>>
    where
        F: FnMut(WindowProgress) -> ControlFlow<()>,
    {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        if data.len() % C::BLOCK_SIZE != 0 {
            return Err(CipherModeError::not_block_multiple(
                C::BLOCK_SIZE,
                data.len(),
            ));
        }

        let mut buffer = utils::zeroed_buffer(data.len())?;

        match self.mode {
            Mode::Ecb => ecb::process(
                &self.cipher,
                data,
                buffer.as_mut_slice(),
                self.window,
                &mut progress,
            )?,
            other => {
                return Err(CipherModeError::Internal(format!(
                    "Unknown ciphertext feedback mode {}; this shouldn't happen",
                    other.id()
                )))
            }
        }

        Ok(std::mem::take(&mut *buffer))
    }

    /// Current IV, always `BLOCK_SIZE` bytes
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// Replace the IV; on a length mismatch the old IV is kept
    pub fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        if iv.len() != C::BLOCK_SIZE {
            return Err(CipherModeError::wrong_iv_length(C::BLOCK_SIZE, iv.len()));
        }
        self.iv.copy_from_slice(iv);
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn block_size(&self) -> usize {
        C::BLOCK_SIZE
    }

    pub fn key_size(&self) -> usize {
        C::KEY_SIZE
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Finalize the primitive and scrub the context
    pub fn destroy(self) {
        drop(self);
    }

    fn scrub(&mut self) {
        self.iv.as_mut_slice().zeroize();
        self.old_cipher.as_mut_slice().zeroize();
        self.used.zeroize();
        self.window = DEFAULT_WINDOW;
    }
}

impl<C: BlockCipher> Drop for CipherContext<C> {
    fn drop(&mut self) {
        self.cipher.finalize();
        self.scrub();
        debug!("cipher context destroyed");
    }
}

impl<C: BlockCipher> fmt::Debug for CipherContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherContext")
            .field("mode", &self.mode)
            .field("block_size", &C::BLOCK_SIZE)
            .field("key_size", &C::KEY_SIZE)
            .field("window", &self.window)
            .field("iv", &hex::encode(&self.iv))
            .finish_non_exhaustive()
    }
}

fn check_key_length<C: BlockCipher>(key: &[u8]) -> Result<()> {
    if C::KEY_SIZE != 0 && key.len() != C::KEY_SIZE {
        return Err(CipherModeError::InvalidKeyLength {
            expected: C::KEY_SIZE,
            actual: key.len(),
        });
    }
    if C::KEY_SIZE == 0 && key.is_empty() {
        return Err(CipherModeError::EmptyKey);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Call, IdentityCipher, RecordingCipher, RejectingCipher};
    use crate::{Aes, DummyCipher, TwoAes};

    const KEY: [u8; 16] = [0u8; 16];

    fn blocks(count: usize, block_size: usize) -> Vec<u8> {
        (0..count * block_size).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn test_reports_primitive_sizes() {
        let ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        assert_eq!(ctx.block_size(), 8);
        assert_eq!(ctx.key_size(), 16);
        assert_eq!(ctx.mode(), Mode::Ecb);
        assert_eq!(ctx.window(), DEFAULT_WINDOW);
        assert_eq!(ctx.cipher.key(), &KEY);

        let ctx = CipherContext::<Aes>::new(b"1234567890123456").unwrap();
        assert_eq!(ctx.block_size(), 16);
        assert_eq!(ctx.key_size(), 0);
    }

    #[test]
    fn test_initial_state() {
        let ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        assert_eq!(ctx.iv(), &[0u8; 8]);
        assert_eq!(ctx.old_cipher, vec![0u8; 8]);
        assert_eq!(ctx.used, 8);
    }

    #[test]
    fn test_wrong_key_length() {
        for len in [0, 15, 17, 32] {
            let err = CipherContext::<RecordingCipher>::new(&vec![0u8; len]).unwrap_err();
            assert_eq!(
                err,
                CipherModeError::InvalidKeyLength {
                    expected: 16,
                    actual: len
                }
            );
        }
    }

    #[test]
    fn test_empty_key_on_variable_length_primitive() {
        let err = CipherContext::<IdentityCipher>::new(&[]).unwrap_err();
        assert_eq!(err, CipherModeError::EmptyKey);
    }

    #[test]
    fn test_ecb_rejects_iv() {
        let options = ContextOptions::default().with_iv(vec![1u8; 8]);
        let err = CipherContext::<RecordingCipher>::with_options(&KEY, options).unwrap_err();
        assert_eq!(
            err,
            CipherModeError::InvalidArgument("ECB mode does not use IV".into())
        );
    }

    #[test]
    fn test_unsupported_mode() {
        for mode in [Mode::Cbc, Mode::Cfb, Mode::Ofb, Mode::Ctr] {
            let options = ContextOptions::default().with_mode(mode);
            let err = CipherContext::<RecordingCipher>::with_options(&KEY, options).unwrap_err();
            assert_eq!(err, CipherModeError::UnsupportedMode(mode.id()));
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        let options = ContextOptions::default().with_window(0);
        let err = CipherContext::<RecordingCipher>::with_options(&KEY, options).unwrap_err();
        assert!(matches!(err, CipherModeError::InvalidArgument(_)));
    }

    #[test]
    fn test_key_schedule_failure_propagates() {
        testing::reset();
        let err = CipherContext::<RejectingCipher>::new(b"k").unwrap_err();
        assert_eq!(err, CipherModeError::KeySchedule("weak key".into()));
        assert_eq!(testing::finalize_count(), 0);
    }

    #[test]
    fn test_validation_precedes_key_schedule() {
        testing::reset();
        let options = ContextOptions::default().with_iv(vec![0u8; 4]);
        let err = CipherContext::<RejectingCipher>::with_options(b"k", options).unwrap_err();
        assert!(matches!(err, CipherModeError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_input() {
        testing::reset();
        let ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        assert_eq!(ctx.encrypt(&[]).unwrap(), Vec::<u8>::new());
        assert!(testing::take_calls().is_empty());
    }

    #[test]
    fn test_input_not_block_multiple() {
        testing::reset();
        let ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        for len in [1, 7, 9, 15, 17] {
            let err = ctx.encrypt(&vec![0u8; len]).unwrap_err();
            assert_eq!(err, CipherModeError::not_block_multiple(8, len));
        }
        assert!(testing::take_calls().is_empty());

        let ctx = CipherContext::<Aes>::new(&[1u8; 16]).unwrap();
        for len in [15, 17] {
            assert!(matches!(
                ctx.encrypt(&vec![0u8; len]),
                Err(CipherModeError::InvalidLength { .. })
            ));
        }
    }

    #[test]
    fn test_decrypt_then_encrypt_per_block() {
        testing::reset();
        let ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        let input: Vec<u8> = [[0x10u8; 8], [0xa5u8; 8]].concat();

        let output = ctx.encrypt(&input).unwrap();

        let expected: Vec<u8> = input.iter().map(|b| b ^ 0x03).collect();
        assert_eq!(output, expected);
        assert_eq!(
            testing::take_calls(),
            vec![Call::Decrypt, Call::Decrypt, Call::Encrypt, Call::Encrypt]
        );
    }

    #[test]
    fn test_window_size_does_not_change_output() {
        let key = [&b"1234567890123456"[..], &b"abcdefghijklmnop"[..]].concat();
        let input = blocks(23, 16);

        let reference = CipherContext::<TwoAes>::new(&key)
            .unwrap()
            .encrypt(&input)
            .unwrap();

        for window in [1, 10, 23, 1000] {
            let options = ContextOptions::default().with_window(window);
            let ctx = CipherContext::<TwoAes>::with_options(&key, options).unwrap();
            assert_eq!(ctx.encrypt(&input).unwrap(), reference, "window {window}");
        }
    }

    #[test]
    fn test_identity_primitive_round_trip() {
        let input = blocks(13, 8);
        for window in [1, 3, 10] {
            let options = ContextOptions::default().with_window(window);
            let ctx = CipherContext::<IdentityCipher>::with_options(b"any", options).unwrap();
            assert_eq!(ctx.encrypt(&input).unwrap(), input);
        }

        let ctx = CipherContext::<DummyCipher>::new(b"dummy").unwrap();
        let input = blocks(5, 16);
        assert_eq!(ctx.encrypt(&input).unwrap(), input);
    }

    #[test]
    fn test_encrypt_does_not_mutate_context() {
        let ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        let input = blocks(4, 8);
        let first = ctx.encrypt(&input).unwrap();
        assert_eq!(ctx.encrypt(&input).unwrap(), first);
        assert_eq!(ctx.iv(), &[0u8; 8]);
    }

    #[test]
    fn test_iv_set_get() {
        let mut ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        ctx.set_iv(b"12345678").unwrap();
        assert_eq!(ctx.iv(), b"12345678");

        for len in [0, 7, 9, 16] {
            let err = ctx.set_iv(&vec![0xffu8; len]).unwrap_err();
            assert_eq!(err, CipherModeError::wrong_iv_length(8, len));
            assert_eq!(ctx.iv(), b"12345678");
        }
    }

    #[test]
    fn test_destroy_finalizes_once() {
        testing::reset();
        let ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        ctx.destroy();
        assert_eq!(testing::finalize_count(), 1);

        testing::reset();
        {
            let _ctx = CipherContext::<IdentityCipher>::new(b"k").unwrap();
        }
        assert_eq!(testing::finalize_count(), 1);
    }

    #[test]
    fn test_scrub_zeroes_context_buffers() {
        let mut ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        ctx.set_iv(&[0xaa; 8]).unwrap();
        ctx.old_cipher.copy_from_slice(&[0xbb; 8]);

        ctx.scrub();

        assert!(ctx.iv.iter().all(|&b| b == 0));
        assert!(ctx.old_cipher.iter().all(|&b| b == 0));
        assert_eq!(ctx.used, 0);
    }

    #[test]
    fn test_cancel_between_windows() {
        let options = ContextOptions::default().with_window(2);
        let ctx = CipherContext::<RecordingCipher>::with_options(&KEY, options).unwrap();
        let input = blocks(6, 8);

        let err = ctx
            .encrypt_with_progress(&input, |report| {
                if report.index == 1 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap_err();

        assert_eq!(
            err,
            CipherModeError::Cancelled {
                processed: 32,
                total: 48
            }
        );
    }

    #[test]
    fn test_break_after_last_window_completes() {
        let ctx = CipherContext::<RecordingCipher>::new(&KEY).unwrap();
        let input = blocks(3, 8);
        let output = ctx
            .encrypt_with_progress(&input, |_| ControlFlow::Break(()))
            .unwrap();
        assert_eq!(output, ctx.encrypt(&input).unwrap());
    }

    #[test]
    fn test_debug_hides_key_material() {
        let ctx = CipherContext::<RecordingCipher>::new(&[0x5a; 16]).unwrap();
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("Ecb"));
        assert!(rendered.contains("0000000000000000"));
        assert!(!rendered.contains("5a5a"));
    }
}
