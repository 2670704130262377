//! stream/plaintext.rs
//! Unencrypted, uncompressed variant: records go straight to the writer.
//!
//! Used for debugging exports and for tests of the record layer.

use std::io::{BufReader, Read, Write};

use log::debug;
use prost::Message;

use crate::framing::write_record;
use crate::proto::{BackupInfo, Frame};
use crate::stream::config::ReaderConfig;
use crate::stream::cursor::FrameCursor;
use crate::stream::state::WriterState;
use crate::stream::traits::{BackupExportWriter, BackupImportReader};
use crate::telemetry::BackupCounters;
use crate::types::Result;

pub struct PlainTextBackupWriter<W: Write> {
    out: W,
    state: WriterState,
    counters: BackupCounters,
}

impl<W: Write> PlainTextBackupWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: WriterState::Created,
            counters: BackupCounters::default(),
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn counters(&self) -> &BackupCounters {
        &self.counters
    }

    /// Closes if still open and returns the writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        Ok(self.out)
    }

    fn put<M: Message>(&mut self, record: &M) -> Result<usize> {
        write_record(&mut self.out, record).map_err(|e| {
            self.state = WriterState::Failed;
            e.into()
        })
    }
}

impl<W: Write> BackupExportWriter for PlainTextBackupWriter<W> {
    fn write_header<H: Message>(&mut self, header: &H) -> Result<()> {
        self.state.check_header()?;
        let n = self.put(header)?;
        self.counters.add_header(n);
        self.state = WriterState::HeaderWritten;
        Ok(())
    }

    fn write_frame<F: Message>(&mut self, frame: &F) -> Result<()> {
        self.state.check_frame()?;
        let n = self.put(frame)?;
        self.counters.add_frame(n);
        self.state = WriterState::FrameWritten;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.state.check_close()? {
            return Ok(());
        }
        if let Err(e) = self.out.flush() {
            self.state = WriterState::Failed;
            return Err(e.into());
        }
        self.state = WriterState::Closed;
        debug!(
            "[PLAINTEXT WRITER] closed after {} frames, {} bytes",
            self.counters.frames_data, self.counters.bytes_plaintext
        );
        Ok(())
    }
}

/// Reads a plaintext backup: header eagerly, frames one ahead.
pub struct PlainTextBackupReader<R: Read, H = BackupInfo, F = Frame> {
    cursor: FrameCursor<BufReader<R>, H, F>,
}

impl<R, H, F> PlainTextBackupReader<R, H, F>
where
    R: Read,
    H: Message + Default,
    F: Message + Default,
{
    pub fn new(source: R) -> Result<Self> {
        Self::with_config(source, &ReaderConfig::default())
    }

    pub fn with_config(source: R, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        let buffered = BufReader::with_capacity(config.buffer_len, source);
        Ok(Self { cursor: FrameCursor::open(buffered, config.max_record_len)? })
    }

    pub fn counters(&self) -> &BackupCounters {
        self.cursor.counters()
    }
}

impl<R, H, F> BackupImportReader for PlainTextBackupReader<R, H, F>
where
    R: Read,
    H: Message + Default,
    F: Message + Default,
{
    type Header = H;
    type Frame = F;

    fn header(&self) -> Option<&H> {
        self.cursor.header()
    }

    fn has_next(&self) -> bool {
        self.cursor.has_next()
    }

    fn next_frame(&mut self) -> Result<F> {
        self.cursor.next_frame()
    }

    fn close(&mut self) {
        self.cursor.close();
    }
}

impl<R, H, F> Iterator for PlainTextBackupReader<R, H, F>
where
    R: Read,
    H: Message + Default,
    F: Message + Default,
{
    type Item = Result<F>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.has_next() {
            Some(self.cursor.next_frame())
        } else {
            None
        }
    }
}
