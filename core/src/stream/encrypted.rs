//! stream/encrypted.rs
//! Encrypted variant: gzip + padding, AES-256-CBC, trailing HMAC-SHA256.
//!
//! Design notes:
//! - The IV is written through the MAC stage, so the digest covers
//!   `IV || ciphertext` without a separate update.
//! - The MAC reaches the sink through `BackupSink::append`, after the final
//!   cipher block.
//! - Readers authenticate the whole stream before decrypting any of it, which
//!   requires a seekable source.

use std::io::{BufReader, Read, Seek, SeekFrom, Take, Write};

use flate2::read::GzDecoder;
use log::{debug, warn};
use prost::Message;

use crate::compression::{gzip_reader, PaddedGzipWriter};
use crate::constants::{IV_LEN, MAC_LEN, MIN_ENCRYPTED_LEN};
use crate::crypto::{
    generate_iv, verify_stream_mac, CbcDecryptReader, CbcEncryptWriter, CryptoError, KeyDeriver,
    MacWriter, MessageBackupKey,
};
use crate::framing::write_record;
use crate::proto::{BackupInfo, Frame};
use crate::stream::config::{ReaderConfig, WriterConfig};
use crate::stream::cursor::FrameCursor;
use crate::stream::sink::BackupSink;
use crate::stream::stage::Stage;
use crate::stream::state::{StateError, WriterState};
use crate::stream::traits::{BackupExportWriter, BackupImportReader};
use crate::telemetry::BackupCounters;
use crate::types::Result;

type EncryptStack<S> = PaddedGzipWriter<CbcEncryptWriter<MacWriter<S>>>;

enum Pipeline<S: BackupSink> {
    Open(EncryptStack<S>),
    Finished(S),
    /// Taken apart mid-close and never reassembled.
    Broken,
}

pub struct EncryptedBackupWriter<S: BackupSink> {
    pipeline: Pipeline<S>,
    state: WriterState,
    counters: BackupCounters,
}

impl<S: BackupSink> EncryptedBackupWriter<S> {
    /// Opens a writer with a fresh random IV. The IV is written immediately.
    pub fn new(sink: S, key: &MessageBackupKey, config: &WriterConfig) -> Result<Self> {
        Self::with_iv(sink, key, generate_iv(), config)
    }

    /// Derives the key bundle with `deriver`, then opens as `new`.
    pub fn from_master_key<D: KeyDeriver + ?Sized>(
        sink: S,
        deriver: &D,
        master_key: &[u8],
        account_id: &[u8],
        config: &WriterConfig,
    ) -> Result<Self> {
        let key = deriver.derive(master_key, account_id)?;
        Self::new(sink, &key, config)
    }

    /// Opens a writer with a caller-chosen IV.
    ///
    /// Reusing an IV under the same key leaks plaintext prefixes; only
    /// deterministic test vectors should need this.
    pub fn with_iv(
        sink: S,
        key: &MessageBackupKey,
        iv: [u8; IV_LEN],
        config: &WriterConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut mac = MacWriter::new(sink, key.mac_key())?;
        mac.write_all(&iv)?;
        let cipher = CbcEncryptWriter::new(mac, key.cipher_key(), &iv);
        let gzip = PaddedGzipWriter::new(cipher, config.compression_level, config.padding);

        debug!(
            "[ENCRYPTED WRITER] opened: level={} padding={:?}",
            config.compression_level, config.padding
        );
        Ok(Self {
            pipeline: Pipeline::Open(gzip),
            state: WriterState::Created,
            counters: BackupCounters::default(),
        })
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn counters(&self) -> &BackupCounters {
        &self.counters
    }

    /// Closes if still open and returns the sink.
    pub fn into_inner(mut self) -> Result<S> {
        self.close()?;
        match std::mem::replace(&mut self.pipeline, Pipeline::Broken) {
            Pipeline::Finished(sink) => Ok(sink),
            _ => Err(StateError::Failed.into()),
        }
    }

    fn put<M: Message>(&mut self, record: &M) -> Result<usize> {
        let stack = match &mut self.pipeline {
            Pipeline::Open(stack) => stack,
            Pipeline::Finished(_) => return Err(StateError::Closed.into()),
            Pipeline::Broken => return Err(StateError::Failed.into()),
        };
        match write_record(stack, record) {
            Ok(n) => Ok(n),
            Err(e) => {
                warn!("[ENCRYPTED WRITER] write failed: {}", e);
                self.state = WriterState::Failed;
                Err(e.into())
            }
        }
    }

    fn finish_pipeline(stack: EncryptStack<S>, counters: &mut BackupCounters) -> Result<S> {
        let (cipher, summary) = stack.finish()?;
        counters.add_compression(&summary);

        let mac = cipher.finish()?;
        let body_len = mac.bytes_written();

        let (mut sink, digest) = mac.finish()?;
        sink.append(&digest)?;
        sink.flush()?;
        counters.add_encryption(body_len, digest.len());
        Ok(sink)
    }
}

impl<S: BackupSink> BackupExportWriter for EncryptedBackupWriter<S> {
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

        let stack = match std::mem::replace(&mut self.pipeline, Pipeline::Broken) {
            Pipeline::Open(stack) => stack,
            other => {
                self.pipeline = other;
                self.state = WriterState::Failed;
                return Err(StateError::Failed.into());
            }
        };

        match Self::finish_pipeline(stack, &mut self.counters) {
            Ok(sink) => {
                self.pipeline = Pipeline::Finished(sink);
                self.state = WriterState::Closed;
                debug!(
                    "[ENCRYPTED WRITER] closed: frames={} plaintext={} compressed={} padding={} output={}",
                    self.counters.frames_data,
                    self.counters.bytes_plaintext,
                    self.counters.bytes_compressed,
                    self.counters.bytes_padding,
                    self.counters.bytes_output()
                );
                Ok(())
            }
            Err(e) => {
                warn!("[ENCRYPTED WRITER] close failed: {}", e);
                self.state = WriterState::Failed;
                Err(e)
            }
        }
    }
}

type DecryptStack<R> = BufReader<GzDecoder<CbcDecryptReader<Take<R>>>>;

/// Reads an encrypted backup after verifying its MAC over the whole source.
pub struct EncryptedBackupReader<R: Read + Seek, H = BackupInfo, F = Frame> {
    cursor: FrameCursor<DecryptStack<R>, H, F>,
}

impl<R, H, F> EncryptedBackupReader<R, H, F>
where
    R: Read + Seek,
    H: Message + Default,
    F: Message + Default,
{
    pub fn new(source: R, key: &MessageBackupKey) -> Result<Self> {
        Self::with_config(source, key, &ReaderConfig::default())
    }

    pub fn from_master_key<D: KeyDeriver + ?Sized>(
        source: R,
        deriver: &D,
        master_key: &[u8],
        account_id: &[u8],
        config: &ReaderConfig,
    ) -> Result<Self> {
        let key = deriver.derive(master_key, account_id)?;
        Self::with_config(source, &key, config)
    }

    /// Authenticates, then opens the decrypting cursor.
    ///
    /// Fails with `CryptoError::MacMismatch` before any plaintext is
    /// produced if a single byte of IV, ciphertext or MAC was altered.
    pub fn with_config(mut source: R, key: &MessageBackupKey, config: &ReaderConfig) -> Result<Self> {
        config.validate()?;

        let len = source.seek(SeekFrom::End(0))?;
        if len < MIN_ENCRYPTED_LEN {
            warn!("[ENCRYPTED READER] stream too short: {} bytes", len);
            return Err(CryptoError::StreamTooShort { len, min: MIN_ENCRYPTED_LEN }.into());
        }

        source.seek(SeekFrom::Start(0))?;
        let body_len = len - MAC_LEN as u64;
        if let Err(e) = verify_stream_mac(&mut source, key.mac_key(), body_len, config.buffer_len) {
            warn!("[ENCRYPTED READER] authentication failed: {}", e);
            return Err(e);
        }
        debug!("[ENCRYPTED READER] MAC verified over {} bytes", body_len);

        source.seek(SeekFrom::Start(0))?;
        let mut iv = [0u8; IV_LEN];
        source.read_exact(&mut iv)?;

        let ciphertext_len = body_len - IV_LEN as u64;
        let cbc = CbcDecryptReader::new(
            source.take(ciphertext_len),
            key.cipher_key(),
            &iv,
            config.buffer_len,
        );
        let plaintext = BufReader::with_capacity(config.buffer_len, gzip_reader(cbc));

        Ok(Self { cursor: FrameCursor::open(plaintext, config.max_record_len)? })
    }

    pub fn counters(&self) -> &BackupCounters {
        self.cursor.counters()
    }
}

impl<R, H, F> BackupImportReader for EncryptedBackupReader<R, H, F>
where
    R: Read + Seek,
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

impl<R, H, F> Iterator for EncryptedBackupReader<R, H, F>
where
    R: Read + Seek,
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
