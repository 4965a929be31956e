//! Test doubles for the block primitive contract.
//!
//! Calls are recorded per thread so parallel tests do not see each other.

use std::cell::{Cell, RefCell};

use crate::{error::CipherModeError, utils, BlockCipher, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Decrypt,
    Encrypt,
}

thread_local! {
    static CALLS: RefCell<Vec<Call>> = const { RefCell::new(Vec::new()) };
    static FINALIZED: Cell<usize> = const { Cell::new(0) };
}

pub fn reset() {
    CALLS.with(|calls| calls.borrow_mut().clear());
    FINALIZED.with(|count| count.set(0));
}

pub fn take_calls() -> Vec<Call> {
    CALLS.with(|calls| std::mem::take(&mut *calls.borrow_mut()))
}

pub fn finalize_count() -> usize {
    FINALIZED.with(Cell::get)
}

fn record(call: Call) {
    CALLS.with(|calls| calls.borrow_mut().push(call));
}

/// 8-byte blocks, 16-byte keys. Decrypt XORs every byte with 0x01,
/// encrypt with 0x02.
#[derive(Debug)]
pub struct RecordingCipher {
    key: [u8; 16],
}

impl RecordingCipher {
    pub fn key(&self) -> &[u8; 16] {
        &self.key
    }
}

impl BlockCipher for RecordingCipher {
    const BLOCK_SIZE: usize = 8;
    const KEY_SIZE: usize = 16;

    fn init(key: &[u8]) -> Result<Self> {
        let key: [u8; 16] = key
            .try_into()
            .map_err(|_| CipherModeError::KeySchedule("recording cipher needs 16 bytes".into()))?;
        Ok(Self { key })
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        record(Call::Encrypt);
        utils::xor_with_key(block, &[0x02]);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        record(Call::Decrypt);
        utils::xor_with_key(block, &[0x01]);
    }

    fn finalize(&mut self) {
        self.key = [0u8; 16];
        FINALIZED.with(|count| count.set(count.get() + 1));
    }
}

/// Variable-length key, both directions are no-ops
#[derive(Debug)]
pub struct IdentityCipher;

impl BlockCipher for IdentityCipher {
    const BLOCK_SIZE: usize = 8;
    const KEY_SIZE: usize = 0;

    fn init(_key: &[u8]) -> Result<Self> {
        Ok(Self)
    }

    fn encrypt_block(&self, _block: &mut [u8]) {
        record(Call::Encrypt);
    }

    fn decrypt_block(&self, _block: &mut [u8]) {
        record(Call::Decrypt);
    }

    fn finalize(&mut self) {
        FINALIZED.with(|count| count.set(count.get() + 1));
    }
}

/// Key schedule always fails
#[derive(Debug)]
pub struct RejectingCipher;

impl BlockCipher for RejectingCipher {
    const BLOCK_SIZE: usize = 8;
    const KEY_SIZE: usize = 0;

    fn init(_key: &[u8]) -> Result<Self> {
        Err(CipherModeError::KeySchedule("weak key".into()))
    }

    fn encrypt_block(&self, _block: &mut [u8]) {}

    fn decrypt_block(&self, _block: &mut [u8]) {}

    fn finalize(&mut self) {
        FINALIZED.with(|count| count.set(count.get() + 1));
    }
}
