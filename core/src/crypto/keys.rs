//! crypto/keys.rs
//! Per-backup key bundle and IV generation.
//!
//! Lifecycle: derived once per backup operation, held for one write or read,
//! never persisted by this crate. Keys are wiped on drop.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::constants::{CIPHER_KEY_LEN, IV_LEN, MAC_KEY_LEN};
use crate::crypto::types::CryptoError;

/// Cipher key + MAC key for one backup.
#[derive(Clone)]
pub struct MessageBackupKey {
    cipher_key: [u8; CIPHER_KEY_LEN],
    mac_key: [u8; MAC_KEY_LEN],
}

impl MessageBackupKey {
    pub fn new(cipher_key: [u8; CIPHER_KEY_LEN], mac_key: [u8; MAC_KEY_LEN]) -> Self {
        Self { cipher_key, mac_key }
    }

    pub fn from_slices(cipher_key: &[u8], mac_key: &[u8]) -> Result<Self, CryptoError> {
        let cipher_key: [u8; CIPHER_KEY_LEN] = cipher_key.try_into().map_err(|_| {
            CryptoError::InvalidKeyLen { expected: CIPHER_KEY_LEN, actual: cipher_key.len() }
        })?;
        let mac_key: [u8; MAC_KEY_LEN] = mac_key.try_into().map_err(|_| {
            CryptoError::InvalidKeyLen { expected: MAC_KEY_LEN, actual: mac_key.len() }
        })?;
        Ok(Self { cipher_key, mac_key })
    }

    /// Split 64 bytes of derived key material: MAC key first, cipher key second.
    pub fn from_derived(okm: &[u8]) -> Result<Self, CryptoError> {
        let expected = MAC_KEY_LEN + CIPHER_KEY_LEN;
        if okm.len() != expected {
            return Err(CryptoError::InvalidKeyLen { expected, actual: okm.len() });
        }
        let (mac_key, cipher_key) = okm.split_at(MAC_KEY_LEN);
        Self::from_slices(cipher_key, mac_key)
    }

    pub fn cipher_key(&self) -> &[u8; CIPHER_KEY_LEN] {
        &self.cipher_key
    }

    pub fn mac_key(&self) -> &[u8; MAC_KEY_LEN] {
        &self.mac_key
    }
}

impl Drop for MessageBackupKey {
    fn drop(&mut self) {
        self.cipher_key.zeroize();
        self.mac_key.zeroize();
    }
}

impl fmt::Debug for MessageBackupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBackupKey").finish_non_exhaustive()
    }
}

/// Derives the per-backup key bundle from a master backup key and the
/// account's stable identifier.
pub trait KeyDeriver {
    fn derive(&self, master_key: &[u8], account_id: &[u8]) -> Result<MessageBackupKey, CryptoError>;
}

impl<F> KeyDeriver for F
where
    F: Fn(&[u8], &[u8]) -> Result<MessageBackupKey, CryptoError>,
{
    fn derive(&self, master_key: &[u8], account_id: &[u8]) -> Result<MessageBackupKey, CryptoError> {
        self(master_key, account_id)
    }
}

/// Fresh random IV from the OS RNG.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}
