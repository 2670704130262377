//! stream/state.rs
//! Writer lifecycle shared by both writer variants.
//!
//! ```text
//! Created --write_header--> HeaderWritten --write_frame--> FrameWritten
//!    |                           |                             |  ^
//!    x close (error)             +----------close--------------+--+--> Closed
//! any I/O failure -> Failed (terminal)
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Created,
    HeaderWritten,
    FrameWritten,
    Closed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("header already written")]
    HeaderAlreadyWritten,
    #[error("header must be written first")]
    HeaderNotWritten,
    #[error("writer is closed")]
    Closed,
    #[error("writer failed earlier and cannot be used")]
    Failed,
}

impl WriterState {
    pub fn check_header(self) -> Result<(), StateError> {
        match self {
            WriterState::Created => Ok(()),
            WriterState::HeaderWritten | WriterState::FrameWritten => {
                Err(StateError::HeaderAlreadyWritten)
            }
            WriterState::Closed => Err(StateError::Closed),
            WriterState::Failed => Err(StateError::Failed),
        }
    }

    pub fn check_frame(self) -> Result<(), StateError> {
        match self {
            WriterState::HeaderWritten | WriterState::FrameWritten => Ok(()),
            WriterState::Created => Err(StateError::HeaderNotWritten),
            WriterState::Closed => Err(StateError::Closed),
            WriterState::Failed => Err(StateError::Failed),
        }
    }

    /// `Ok(false)` when already closed: a second close is a no-op.
    pub fn check_close(self) -> Result<bool, StateError> {
        match self {
            WriterState::HeaderWritten | WriterState::FrameWritten => Ok(true),
            WriterState::Closed => Ok(false),
            WriterState::Created => Err(StateError::HeaderNotWritten),
            WriterState::Failed => Err(StateError::Failed),
        }
    }
}
