//! crypto/cbc.rs
//! Streaming AES-256-CBC stages.
//!
//! - `CbcEncryptWriter` encrypts whole blocks as they fill and emits the
//!   PKCS#7-padded final block on `finish`.
//! - `CbcDecryptReader` always holds back the last complete block until the
//!   source is exhausted, since only that block carries padding.

use std::io::{self, Read, Write};

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;

use crate::constants::{AES_BLOCK_LEN, CIPHER_KEY_LEN, IV_LEN};
use crate::crypto::types::CryptoError;
use crate::stream::stage::Stage;
use crate::utils::read_full;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub struct CbcEncryptWriter<W: Write> {
    inner: W,
    cipher: Aes256CbcEnc,
    /// Bytes not yet forming a whole block.
    pending: Vec<u8>,
}

impl<W: Write> CbcEncryptWriter<W> {
    pub fn new(inner: W, key: &[u8; CIPHER_KEY_LEN], iv: &[u8; IV_LEN]) -> Self {
        Self {
            inner,
            cipher: Aes256CbcEnc::new(&(*key).into(), &(*iv).into()),
            pending: Vec::with_capacity(AES_BLOCK_LEN * 2),
        }
    }
}

impl<W: Write> Write for CbcEncryptWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        let whole = self.pending.len() - self.pending.len() % AES_BLOCK_LEN;
        if whole > 0 {
            for block in self.pending[..whole].chunks_exact_mut(AES_BLOCK_LEN) {
                self.cipher.encrypt_block_mut(GenericArray::from_mut_slice(block));
            }
            self.inner.write_all(&self.pending[..whole])?;
            self.pending.drain(..whole);
        }

        Ok(buf.len())
    }

    /// Flushes the sink only; a partial block cannot be emitted before `finish`.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Stage for CbcEncryptWriter<W> {
    type Output = W;

    fn finish(self) -> io::Result<W> {
        let CbcEncryptWriter { mut inner, cipher, pending } = self;

        let mut block = [0u8; AES_BLOCK_LEN];
        block[..pending.len()].copy_from_slice(&pending);
        let last = cipher
            .encrypt_padded_mut::<Pkcs7>(&mut block, pending.len())
            .map_err(|_| CryptoError::BadPadding.into_io())?;

        inner.write_all(last)?;
        inner.flush()?;
        Ok(inner)
    }
}

pub struct CbcDecryptReader<R: Read> {
    inner: R,
    /// `None` once the final block has been unpadded.
    cipher: Option<Aes256CbcDec>,
    /// Ciphertext read but not yet decrypted.
    held: Vec<u8>,
    /// Decrypted bytes waiting to be handed out.
    out: Vec<u8>,
    out_pos: usize,
    chunk: Box<[u8]>,
}

impl<R: Read> CbcDecryptReader<R> {
    /// `inner` must yield exactly the ciphertext: no IV, no MAC.
    pub fn new(
        inner: R,
        key: &[u8; CIPHER_KEY_LEN],
        iv: &[u8; IV_LEN],
        buffer_len: usize,
    ) -> Self {
        let chunk_len = buffer_len.max(AES_BLOCK_LEN);
        Self {
            inner,
            cipher: Some(Aes256CbcDec::new(&(*key).into(), &(*iv).into())),
            held: Vec::with_capacity(chunk_len + AES_BLOCK_LEN),
            out: Vec::with_capacity(chunk_len + AES_BLOCK_LEN),
            out_pos: 0,
            chunk: vec![0u8; chunk_len].into_boxed_slice(),
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        let n = read_full(&mut self.inner, &mut self.chunk[..])?;
        if n == 0 {
            return self.finish_blocks();
        }
        self.held.extend_from_slice(&self.chunk[..n]);

        // A trailing partial block means more ciphertext follows, so every
        // whole block before it is safe; otherwise keep the last whole block.
        let keep = match self.held.len() % AES_BLOCK_LEN {
            0 => AES_BLOCK_LEN,
            partial => partial,
        };
        if self.held.len() > keep {
            let ready = self.held.len() - keep;
            if let Some(cipher) = self.cipher.as_mut() {
                for block in self.held[..ready].chunks_exact_mut(AES_BLOCK_LEN) {
                    cipher.decrypt_block_mut(GenericArray::from_mut_slice(block));
                }
            }
            self.out.extend_from_slice(&self.held[..ready]);
            self.held.drain(..ready);
        }
        Ok(())
    }

    fn finish_blocks(&mut self) -> io::Result<()> {
        let cipher = match self.cipher.take() {
            Some(cipher) => cipher,
            None => return Ok(()),
        };

        if self.held.is_empty() || self.held.len() % AES_BLOCK_LEN != 0 {
            return Err(CryptoError::Unaligned { len: self.held.len() }.into_io());
        }

        let mut tail = std::mem::take(&mut self.held);
        let plaintext = cipher
            .decrypt_padded_mut::<Pkcs7>(&mut tail)
            .map_err(|_| CryptoError::BadPadding.into_io())?;
        self.out.extend_from_slice(plaintext);
        Ok(())
    }
}

impl<R: Read> Read for CbcDecryptReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.out_pos == self.out.len() {
            if self.cipher.is_none() {
                return Ok(0);
            }
            self.out.clear();
            self.out_pos = 0;
            self.fill()?;
        }

        let n = buf.len().min(self.out.len() - self.out_pos);
        buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
        self.out_pos += n;
        Ok(n)
    }
}
