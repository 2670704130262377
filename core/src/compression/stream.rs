//! compression/stream.rs
//! Streaming gzip stage: a padded writer for export and a decoder for import.

use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::trace;

use crate::compression::padding::padding_len;
use crate::compression::types::{PaddingPolicy, PaddingSummary};
use crate::stream::stage::Stage;
use crate::utils::{write_zeros, CountingWriter};

/// Gzip-compresses everything written, then appends zero padding on `finish`.
pub struct PaddedGzipWriter<W: Write> {
    encoder: GzEncoder<CountingWriter<W>>,
    policy: PaddingPolicy,
    plaintext_len: u64,
}

impl<W: Write> PaddedGzipWriter<W> {
    /// `level` outside 0..=9 falls back to flate2's default.
    pub fn new(inner: W, level: u32, policy: PaddingPolicy) -> Self {
        let level = match level {
            0..=9 => Compression::new(level),
            _ => Compression::default(),
        };
        Self {
            encoder: GzEncoder::new(CountingWriter::new(inner), level),
            policy,
            plaintext_len: 0,
        }
    }

    /// Uncompressed bytes accepted so far.
    pub fn plaintext_len(&self) -> u64 {
        self.plaintext_len
    }
}

impl<W: Write> Write for PaddedGzipWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.encoder.write(buf)?;
        self.plaintext_len += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }
}

impl<W: Write> Stage for PaddedGzipWriter<W> {
    type Output = (W, PaddingSummary);

    fn finish(self) -> io::Result<Self::Output> {
        let counted = self.encoder.finish()?;
        let compressed_len = counted.count();
        let mut inner = counted.into_inner();

        let padding_len = padding_len(compressed_len, self.policy, &mut rand::thread_rng());
        write_zeros(&mut inner, padding_len)?;
        trace!(
            "gzip stage finished: plaintext={} compressed={} padding={}",
            self.plaintext_len, compressed_len, padding_len
        );

        Ok((
            inner,
            PaddingSummary {
                plaintext_len: self.plaintext_len,
                compressed_len,
                padding_len,
            },
        ))
    }
}

/// Decoder for one gzip member; bytes after the member are left unread.
pub fn gzip_reader<R: Read>(inner: R) -> GzDecoder<R> {
    GzDecoder::new(inner)
}
