//! AES (FIPS-197) with 128, 192 and 256-bit keys.
//!
//! The state is kept as 16 bytes in column order, byte `i` sits in row
//! `i % 4`, column `i / 4`, which is the order the block arrives in.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{error::CipherModeError, BlockCipher, Result};

const BLOCK: usize = 16;
const MAX_ROUNDS: usize = 14;

const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

const INV_SBOX: [u8; 256] = [
    0x52, 0x09, 0x6a, 0xd5, 0x30, 0x36, 0xa5, 0x38, 0xbf, 0x40, 0xa3, 0x9e, 0x81, 0xf3, 0xd7, 0xfb,
    0x7c, 0xe3, 0x39, 0x82, 0x9b, 0x2f, 0xff, 0x87, 0x34, 0x8e, 0x43, 0x44, 0xc4, 0xde, 0xe9, 0xcb,
    0x54, 0x7b, 0x94, 0x32, 0xa6, 0xc2, 0x23, 0x3d, 0xee, 0x4c, 0x95, 0x0b, 0x42, 0xfa, 0xc3, 0x4e,
    0x08, 0x2e, 0xa1, 0x66, 0x28, 0xd9, 0x24, 0xb2, 0x76, 0x5b, 0xa2, 0x49, 0x6d, 0x8b, 0xd1, 0x25,
    0x72, 0xf8, 0xf6, 0x64, 0x86, 0x68, 0x98, 0x16, 0xd4, 0xa4, 0x5c, 0xcc, 0x5d, 0x65, 0xb6, 0x92,
    0x6c, 0x70, 0x48, 0x50, 0xfd, 0xed, 0xb9, 0xda, 0x5e, 0x15, 0x46, 0x57, 0xa7, 0x8d, 0x9d, 0x84,
    0x90, 0xd8, 0xab, 0x00, 0x8c, 0xbc, 0xd3, 0x0a, 0xf7, 0xe4, 0x58, 0x05, 0xb8, 0xb3, 0x45, 0x06,
    0xd0, 0x2c, 0x1e, 0x8f, 0xca, 0x3f, 0x0f, 0x02, 0xc1, 0xaf, 0xbd, 0x03, 0x01, 0x13, 0x8a, 0x6b,
    0x3a, 0x91, 0x11, 0x41, 0x4f, 0x67, 0xdc, 0xea, 0x97, 0xf2, 0xcf, 0xce, 0xf0, 0xb4, 0xe6, 0x73,
    0x96, 0xac, 0x74, 0x22, 0xe7, 0xad, 0x35, 0x85, 0xe2, 0xf9, 0x37, 0xe8, 0x1c, 0x75, 0xdf, 0x6e,
    0x47, 0xf1, 0x1a, 0x71, 0x1d, 0x29, 0xc5, 0x89, 0x6f, 0xb7, 0x62, 0x0e, 0xaa, 0x18, 0xbe, 0x1b,
    0xfc, 0x56, 0x3e, 0x4b, 0xc6, 0xd2, 0x79, 0x20, 0x9a, 0xdb, 0xc0, 0xfe, 0x78, 0xcd, 0x5a, 0xf4,
    0x1f, 0xdd, 0xa8, 0x33, 0x88, 0x07, 0xc7, 0x31, 0xb1, 0x12, 0x10, 0x59, 0x27, 0x80, 0xec, 0x5f,
    0x60, 0x51, 0x7f, 0xa9, 0x19, 0xb5, 0x4a, 0x0d, 0x2d, 0xe5, 0x7a, 0x9f, 0x93, 0xc9, 0x9c, 0xef,
    0xa0, 0xe0, 0x3b, 0x4d, 0xae, 0x2a, 0xf5, 0xb0, 0xc8, 0xeb, 0xbb, 0x3c, 0x83, 0x53, 0x99, 0x61,
    0x17, 0x2b, 0x04, 0x7e, 0xba, 0x77, 0xd6, 0x26, 0xe1, 0x69, 0x14, 0x63, 0x55, 0x21, 0x0c, 0x7d,
];

const RCON: [u8; 11] = [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

/// AES block cipher with an expanded key schedule.
///
/// Accepts 16, 24 or 32 byte keys; the schedule is wiped on
/// [`finalize`](BlockCipher::finalize) and again on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Aes {
    round_keys: [[u8; BLOCK]; MAX_ROUNDS + 1],
    rounds: usize,
}

impl Aes {
    /// Expands `key` into the round keys
    pub fn new(key: &[u8]) -> Result<Self> {
        let words = match key.len() {
            16 => 4,
            24 => 6,
            32 => 8,
            n => {
                return Err(CipherModeError::KeySchedule(format!(
                    "AES key must be 16, 24 or 32 bytes long, not {n}"
                )))
            }
        };
        let rounds = words + 6;

        let mut schedule = Zeroizing::new([0u8; BLOCK * (MAX_ROUNDS + 1)]);
        schedule[..key.len()].copy_from_slice(key);

        for i in words..4 * (rounds + 1) {
            let mut temp = [0u8; 4];
            temp.copy_from_slice(&schedule[(i - 1) * 4..i * 4]);

            if i % words == 0 {
                temp.rotate_left(1);
                sub_word(&mut temp);
                temp[0] ^= RCON[i / words];
            } else if words > 6 && i % words == 4 {
                sub_word(&mut temp);
            }

            for j in 0..4 {
                schedule[i * 4 + j] = schedule[(i - words) * 4 + j] ^ temp[j];
            }
            temp.zeroize();
        }

        let mut round_keys = [[0u8; BLOCK]; MAX_ROUNDS + 1];
        for (round_key, chunk) in round_keys
            .iter_mut()
            .zip(schedule.chunks_exact(BLOCK))
            .take(rounds + 1)
        {
            round_key.copy_from_slice(chunk);
        }

        Ok(Self { round_keys, rounds })
    }

    /// Number of rounds: 10, 12 or 14
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    fn encrypt_state(&self, state: &mut [u8]) {
        add_round_key(state, &self.round_keys[0]);

        for round in 1..self.rounds {
            sub_bytes(state);
            shift_rows(state);
            mix_columns(state);
            add_round_key(state, &self.round_keys[round]);
        }

        // Final round without MixColumns
        sub_bytes(state);
        shift_rows(state);
        add_round_key(state, &self.round_keys[self.rounds]);
    }

    fn decrypt_state(&self, state: &mut [u8]) {
        add_round_key(state, &self.round_keys[self.rounds]);

        for round in (1..self.rounds).rev() {
            inv_shift_rows(state);
            inv_sub_bytes(state);
            add_round_key(state, &self.round_keys[round]);
            inv_mix_columns(state);
        }

        inv_shift_rows(state);
        inv_sub_bytes(state);
        add_round_key(state, &self.round_keys[0]);
    }
}

impl BlockCipher for Aes {
    const BLOCK_SIZE: usize = BLOCK;
    const KEY_SIZE: usize = 0;

    fn init(key: &[u8]) -> Result<Self> {
        Self::new(key)
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), BLOCK);
        self.encrypt_state(block);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), BLOCK);
        self.decrypt_state(block);
    }

    fn finalize(&mut self) {
        self.zeroize();
    }
}

fn sub_word(word: &mut [u8; 4]) {
    for byte in word.iter_mut() {
        *byte = SBOX[*byte as usize];
    }
}

fn sub_bytes(state: &mut [u8]) {
    for byte in state.iter_mut() {
        *byte = SBOX[*byte as usize];
    }
}

fn inv_sub_bytes(state: &mut [u8]) {
    for byte in state.iter_mut() {
        *byte = INV_SBOX[*byte as usize];
    }
}

/// Row `r` rotates left by `r` columns
fn shift_rows(state: &mut [u8]) {
    for row in 1..4 {
        let temp = [state[row], state[row + 4], state[row + 8], state[row + 12]];
        for col in 0..4 {
            state[row + 4 * col] = temp[(col + row) % 4];
        }
    }
}

fn inv_shift_rows(state: &mut [u8]) {
    for row in 1..4 {
        let temp = [state[row], state[row + 4], state[row + 8], state[row + 12]];
        for col in 0..4 {
            state[row + 4 * col] = temp[(col + 4 - row) % 4];
        }
    }
}

/// Multiplication in GF(2^8) modulo x^8 + x^4 + x^3 + x + 1
fn gf_mult(mut a: u8, mut b: u8) -> u8 {
    let mut result = 0;
    while b != 0 {
        if b & 1 != 0 {
            result ^= a;
        }
        let carry = a & 0x80;
        a <<= 1;
        if carry != 0 {
            a ^= 0x1b;
        }
        b >>= 1;
    }
    result
}

fn mix_columns(state: &mut [u8]) {
    for column in state.chunks_exact_mut(4) {
        let [a, b, c, d] = [column[0], column[1], column[2], column[3]];
        column[0] = gf_mult(2, a) ^ gf_mult(3, b) ^ c ^ d;
        column[1] = a ^ gf_mult(2, b) ^ gf_mult(3, c) ^ d;
        column[2] = a ^ b ^ gf_mult(2, c) ^ gf_mult(3, d);
        column[3] = gf_mult(3, a) ^ b ^ c ^ gf_mult(2, d);
    }
}

fn inv_mix_columns(state: &mut [u8]) {
    for column in state.chunks_exact_mut(4) {
        let [a, b, c, d] = [column[0], column[1], column[2], column[3]];
        column[0] = gf_mult(0x0e, a) ^ gf_mult(0x0b, b) ^ gf_mult(0x0d, c) ^ gf_mult(0x09, d);
        column[1] = gf_mult(0x09, a) ^ gf_mult(0x0e, b) ^ gf_mult(0x0b, c) ^ gf_mult(0x0d, d);
        column[2] = gf_mult(0x0d, a) ^ gf_mult(0x09, b) ^ gf_mult(0x0e, c) ^ gf_mult(0x0b, d);
        column[3] = gf_mult(0x0b, a) ^ gf_mult(0x0d, b) ^ gf_mult(0x09, c) ^ gf_mult(0x0e, d);
    }
}

fn add_round_key(state: &mut [u8], round_key: &[u8; BLOCK]) {
    for (byte, k) in state.iter_mut().zip(round_key) {
        *byte ^= k;
    }
}
