use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key slice of the wrong size.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    /// HMAC over `IV || ciphertext` does not match the trailing digest.
    #[error("backup MAC mismatch")]
    MacMismatch,

    /// Input cannot even hold IV, one cipher block and the MAC.
    #[error("encrypted stream too short: {len} bytes, need at least {min}")]
    StreamTooShort { len: u64, min: u64 },

    /// Ciphertext tail is not a whole number of cipher blocks.
    #[error("ciphertext tail is not block aligned ({len} bytes)")]
    Unaligned { len: usize },

    /// Final block does not carry valid PKCS#7 padding.
    #[error("invalid PKCS#7 padding")]
    BadPadding,

    /// External key derivation failed.
    #[error("key derivation failed: {0}")]
    Derivation(String),
}

impl CryptoError {
    /// Wrap as an `InvalidData` I/O error, for failures inside `Read`/`Write` impls.
    pub(crate) fn into_io(self) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, self)
    }
}
