//! stream/sink.rs
//! Output sinks for encrypted backups.
//!
//! A sink is an ordinary writer plus an `append` operation used exactly once,
//! for the trailing MAC, after every other byte has been written.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};

pub trait BackupSink: Write {
    /// Append `bytes` after everything written so far.
    fn append(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl BackupSink for Vec<u8> {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl BackupSink for File {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.seek(SeekFrom::End(0))?;
        self.write_all(bytes)
    }
}

impl<S: BackupSink + ?Sized> BackupSink for &mut S {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).append(bytes)
    }
}

impl<S: BackupSink + ?Sized> BackupSink for Box<S> {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).append(bytes)
    }
}

/// Adapts a plain writer plus an append callback into a `BackupSink`,
/// for outputs where the tail goes somewhere other than the main writer
/// (a separate upload part, a detached MAC file).
pub struct AppendFnSink<W, F> {
    writer: W,
    append: F,
}

impl<W, F> AppendFnSink<W, F>
where
    W: Write,
    F: FnMut(&[u8]) -> io::Result<()>,
{
    pub fn new(writer: W, append: F) -> Self {
        Self { writer, append }
    }

    pub fn into_parts(self) -> (W, F) {
        (self.writer, self.append)
    }
}

impl<W: Write, F> Write for AppendFnSink<W, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W, F> BackupSink for AppendFnSink<W, F>
where
    W: Write,
    F: FnMut(&[u8]) -> io::Result<()>,
{
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.flush()?;
        (self.append)(bytes)
    }
}
