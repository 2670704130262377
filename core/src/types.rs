use std::io;

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::framing::FrameError;
use crate::stream::StateError;

/// Unified backup error covering I/O, framing, crypto and writer state.
/// - `From<T>` impls let `?` cross every layer of the pipeline.
/// - Clean end-of-stream is never an error; readers report it through `Option`/`has_next`.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Underlying stream read/write failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Record-level failure: truncation, malformed payload, oversized record.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Key material, cipher or MAC failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Writer called out of order.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Rejected writer or reader configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// `next_frame()` called with nothing buffered.
    #[error("no more frames")]
    NoSuchElement,
}

impl BackupError {
    /// True when the stream failed MAC verification.
    pub fn is_authentication(&self) -> bool {
        matches!(self, BackupError::Crypto(CryptoError::MacMismatch))
    }

    /// True when a record (or its length prefix) was cut short.
    pub fn is_truncation(&self) -> bool {
        matches!(self, BackupError::Frame(FrameError::Truncated(_)))
    }

    /// True when record bytes did not match the schema.
    pub fn is_decode(&self) -> bool {
        matches!(self, BackupError::Frame(FrameError::Decode(_)))
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
