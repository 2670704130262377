//! crypto/mod.rs
//! Key material and the cipher/MAC stages of the backup pipeline.
//!
//! Design notes:
//! - AES-256-CBC with PKCS#7 padding, keyed by the cipher key and a fresh 16-byte IV.
//! - HMAC-SHA256 keyed by the MAC key, over `IV || ciphertext`, appended last.
//! - Key derivation is external; callers plug it in through `KeyDeriver`.

pub mod types;
pub mod keys;
pub mod cbc;
pub mod mac;

pub use types::*;
pub use keys::*;
pub use cbc::{CbcDecryptReader, CbcEncryptWriter};
pub use mac::{verify_stream_mac, MacWriter};
