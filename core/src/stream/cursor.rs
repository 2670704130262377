//! stream/cursor.rs
//! One-record lookahead over a decoded byte stream.
//!
//! The cursor reads the header on open and always keeps the next frame (or
//! the error met while reading it) primed, so `has_next` never touches I/O.
//! A frame that decoded fine is handed out before a failure that follows it.

use std::io::Read;

use log::{debug, trace, warn};
use prost::Message;

use crate::framing::{read_next, record_len, FrameError, ReadOutcome};
use crate::telemetry::BackupCounters;
use crate::types::{BackupError, Result};

enum Lookahead<F> {
    Primed(F),
    Failed(BackupError),
    Exhausted,
}

pub struct FrameCursor<S, H, F> {
    source: Option<S>,
    header: Option<H>,
    lookahead: Lookahead<F>,
    max_record_len: usize,
    counters: BackupCounters,
}

impl<S, H, F> FrameCursor<S, H, F>
where
    S: Read,
    H: Message + Default,
    F: Message + Default,
{
    /// Reads the header and primes the first frame.
    ///
    /// An empty source gives a cursor with no header and no frames. A
    /// truncated or undecodable header is an error here.
    pub fn open(mut source: S, max_record_len: usize) -> Result<Self> {
        let mut counters = BackupCounters::default();

        let header = read_next::<H, _>(&mut source, max_record_len)?.into_result()?;
        match header.as_ref() {
            Some(h) => {
                counters.add_header(record_len(h));
                debug!("[FRAME CURSOR] opened, header {} bytes", counters.bytes_plaintext);
            }
            None => debug!("[FRAME CURSOR] opened on an empty stream"),
        }

        let mut cursor = Self {
            source: Some(source),
            header,
            lookahead: Lookahead::Exhausted,
            max_record_len,
            counters,
        };
        if cursor.header.is_some() {
            cursor.advance();
        }
        Ok(cursor)
    }

    fn advance(&mut self) {
        self.lookahead = match self.source.as_mut() {
            None => Lookahead::Exhausted,
            Some(source) => match read_next::<F, _>(source, self.max_record_len) {
                Ok(ReadOutcome::Record(frame)) => {
                    self.counters.add_frame(record_len(&frame));
                    Lookahead::Primed(frame)
                }
                Ok(ReadOutcome::EndOfStream) => {
                    debug!("[FRAME CURSOR] end of stream after {} frames", self.counters.frames_data);
                    Lookahead::Exhausted
                }
                Ok(ReadOutcome::Truncated(t)) => {
                    warn!("[FRAME CURSOR] truncated record: {}", t);
                    Lookahead::Failed(FrameError::Truncated(t).into())
                }
                Ok(ReadOutcome::DecodeFailed(e)) => {
                    warn!("[FRAME CURSOR] undecodable record: {}", e);
                    Lookahead::Failed(e.into())
                }
                Err(e) => {
                    warn!("[FRAME CURSOR] read failed: {}", e);
                    Lookahead::Failed(e.into())
                }
            },
        };
    }

    pub fn header(&self) -> Option<&H> {
        self.header.as_ref()
    }

    /// `true` for a primed failure too; see `BackupImportReader::has_next`.
    pub fn has_next(&self) -> bool {
        !matches!(self.lookahead, Lookahead::Exhausted)
    }

    pub fn next_frame(&mut self) -> Result<F> {
        match std::mem::replace(&mut self.lookahead, Lookahead::Exhausted) {
            Lookahead::Primed(frame) => {
                trace!("[FRAME CURSOR] frame {} handed out", self.counters.frames_data);
                self.advance();
                Ok(frame)
            }
            Lookahead::Failed(err) => {
                self.source = None;
                Err(err)
            }
            Lookahead::Exhausted => Err(BackupError::NoSuchElement),
        }
    }

    /// Drops the source and any primed frame. Idempotent.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            debug!("[FRAME CURSOR] closed");
        }
        self.lookahead = Lookahead::Exhausted;
    }

    pub fn counters(&self) -> &BackupCounters {
        &self.counters
    }
}
