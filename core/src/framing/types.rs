use std::fmt;

use thiserror::Error;

/// Where a record was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// Stream ended inside the varint length prefix.
    LengthPrefix { bytes_read: usize },
    /// Length prefix read, but fewer payload bytes followed.
    Payload { expected: usize, actual: usize },
}

impl fmt::Display for Truncation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Truncation::LengthPrefix { bytes_read } =>
                write!(f, "length prefix ended after {} bytes", bytes_read),
            Truncation::Payload { expected, actual } =>
                write!(f, "expected {} payload bytes, got {}", expected, actual),
        }
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("truncated record: {0}")]
    Truncated(Truncation),

    #[error("malformed record: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("length prefix does not fit in 64 bits")]
    VarintOverflow,

    #[error("record too large: {len} > {max}")]
    TooLarge { len: u64, max: usize },
}

/// Result of pulling one record off a stream.
///
/// Clean end-of-stream is a normal outcome, not an error: it is reported only
/// when the stream is exhausted before the first byte of a length prefix.
#[derive(Debug)]
pub enum ReadOutcome<M> {
    Record(M),
    EndOfStream,
    Truncated(Truncation),
    /// Payload or length prefix does not conform (schema mismatch, overflow, oversize).
    DecodeFailed(FrameError),
}

impl<M> ReadOutcome<M> {
    /// Collapse into `Ok(Some)` / `Ok(None)` at end-of-stream / `Err` otherwise.
    pub fn into_result(self) -> Result<Option<M>, FrameError> {
        match self {
            ReadOutcome::Record(m) => Ok(Some(m)),
            ReadOutcome::EndOfStream => Ok(None),
            ReadOutcome::Truncated(t) => Err(FrameError::Truncated(t)),
            ReadOutcome::DecodeFailed(e) => Err(e),
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }
}
