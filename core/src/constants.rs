//! constants.rs
//! Wire-level sizes and defaults shared by every layer of the backup stream.

/// Backup format version written into `BackupInfo::version` by default.
pub const BACKUP_FORMAT_VERSION: u64 = 1;

/// Cipher key length (AES-256).
pub const CIPHER_KEY_LEN: usize = 32;

/// HMAC-SHA256 key length.
pub const MAC_KEY_LEN: usize = 32;

/// Per-backup IV, written unencrypted as the first bytes of the stream.
pub const IV_LEN: usize = 16;

/// AES block size; CBC ciphertext is always a multiple of this.
pub const AES_BLOCK_LEN: usize = 16;

/// Trailing HMAC-SHA256 digest length.
pub const MAC_LEN: usize = 32;

/// Smallest possible encrypted stream: IV, one padded block, MAC.
pub const MIN_ENCRYPTED_LEN: u64 = (IV_LEN + AES_BLOCK_LEN + MAC_LEN) as u64;

/// Longest base-128 varint needed for a u64.
pub const MAX_VARINT_LEN: usize = 10;

/// Default upper bound on a single record (16 MiB) accepted by readers.
pub const DEFAULT_MAX_RECORD_LEN: usize = 16 * 1024 * 1024;

/// Default I/O buffer size for readers and the CBC stages.
pub const DEFAULT_BUFFER_LEN: usize = 8 * 1024;

/// Default gzip level (flate2 scale 0..=9).
pub const DEFAULT_GZIP_LEVEL: u32 = 6;

/// Padding buckets.
pub mod padding {
    /// No compressed stream is padded to less than this many bytes.
    pub const MIN_PADDED_SIZE: u64 = 541;

    /// Each bucket is this factor larger than the previous one.
    pub const BUCKET_GROWTH: f64 = 1.05;
}
