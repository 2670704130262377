//! stream/traits.rs
//! Capabilities shared by plaintext and encrypted variants.

use prost::Message;

use crate::types::Result;

/// Export side: one header, any number of frames, then `close`.
pub trait BackupExportWriter {
    /// Must be the first call; at most once.
    fn write_header<H: Message>(&mut self, header: &H) -> Result<()>;

    /// Only after the header.
    fn write_frame<F: Message>(&mut self, frame: &F) -> Result<()>;

    /// Finalizes the stream. Closing twice is a no-op; closing before the
    /// header is an error.
    fn close(&mut self) -> Result<()>;
}

/// Import side: the header is read eagerly, frames one ahead.
pub trait BackupImportReader {
    type Header;
    type Frame;

    /// `None` only for an empty stream.
    fn header(&self) -> Option<&Self::Header>;

    /// True while a frame or a pending error remains.
    ///
    /// A read failure after the last good frame, such as truncation or an
    /// oversized record, does not end the stream: `has_next` stays true and
    /// the following `next_frame` returns that error. Only a clean end of
    /// input or `close` makes it false.
    fn has_next(&self) -> bool;

    /// Next frame, the error hit while reading it, or `NoSuchElement`.
    fn next_frame(&mut self) -> Result<Self::Frame>;

    /// Releases the source. Idempotent.
    fn close(&mut self);
}
