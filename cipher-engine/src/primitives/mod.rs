//! Block primitives shipped with the engine

pub mod aes;
pub mod two_aes;

pub use aes::Aes;
pub use two_aes::TwoAes;
