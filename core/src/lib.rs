//! backup-core
//!
//! Encrypted backup stream codec.
//!
//! Wire layout of an encrypted backup:
//!
//! ```text
//! [ IV (16, plaintext) ]
//! [ AES-256-CBC/PKCS#7 ciphertext of:
//!     gzip member {
//!         varint(len) ++ BackupInfo
//!         ( varint(len) ++ Frame )*
//!     }
//!     zero padding
//! ]
//! [ HMAC-SHA256(mac_key, IV || ciphertext) (32) ]
//! ```
//!
//! Writers and readers are single-threaded and one-pass; callers wanting
//! async behavior run a whole export/import on their own task.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod proto;
pub mod framing;
pub mod compression;
pub mod crypto;
pub mod telemetry;

// Writer / reader layer
pub mod stream;

pub use types::{BackupError, Result};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::crypto::{KeyDeriver, MessageBackupKey};
    pub use crate::proto::{BackupInfo, Frame};
    pub use crate::stream::{
        BackupExportWriter, BackupImportReader, BackupSink, EncryptedBackupReader,
        EncryptedBackupWriter, PlainTextBackupReader, PlainTextBackupWriter, ReaderConfig,
        WriterConfig,
    };
    pub use crate::types::{BackupError, Result};
}
