//! stream/mod.rs
//! Writer and reader layer over the framing, compression and crypto stages.
//!
//! Export pipeline (encrypted):
//!
//! ```text
//! records -> PaddedGzipWriter -> CbcEncryptWriter -> MacWriter -> BackupSink
//! ```
//!
//! Import pipeline (encrypted), after a full MAC pass over the source:
//!
//! ```text
//! source -> Take(ciphertext) -> CbcDecryptReader -> GzDecoder -> BufReader -> FrameCursor
//! ```

pub mod stage;
pub mod sink;
pub mod config;
pub mod state;
pub mod traits;
pub mod cursor;
pub mod plaintext;
pub mod encrypted;

pub use stage::Stage;
pub use sink::{AppendFnSink, BackupSink};
pub use config::{ReaderConfig, WriterConfig};
pub use state::{StateError, WriterState};
pub use traits::{BackupExportWriter, BackupImportReader};
pub use cursor::FrameCursor;
pub use plaintext::{PlainTextBackupReader, PlainTextBackupWriter};
pub use encrypted::{EncryptedBackupReader, EncryptedBackupWriter};
