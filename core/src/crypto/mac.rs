//! crypto/mac.rs
//! HMAC-SHA256 over the raw output: a tee on the write side, a full-pass
//! verifier on the read side.

use std::io::{self, Read, Write};

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::constants::{MAC_KEY_LEN, MAC_LEN};
use crate::crypto::types::CryptoError;
use crate::stream::stage::Stage;
use crate::types::BackupError;
use crate::utils::read_full;

type HmacSha256 = Hmac<Sha256>;

fn new_mac(mac_key: &[u8; MAC_KEY_LEN]) -> Result<HmacSha256, CryptoError> {
    <HmacSha256 as Mac>::new_from_slice(mac_key)
        .map_err(|_| CryptoError::InvalidKeyLen { expected: MAC_KEY_LEN, actual: mac_key.len() })
}

/// Passes bytes to the sink and feeds exactly the accepted bytes to the MAC.
pub struct MacWriter<W: Write> {
    inner: W,
    mac: HmacSha256,
    written: u64,
}

impl<W: Write> MacWriter<W> {
    pub fn new(inner: W, mac_key: &[u8; MAC_KEY_LEN]) -> Result<Self, CryptoError> {
        Ok(Self { inner, mac: new_mac(mac_key)?, written: 0 })
    }

    /// Bytes that reached the sink (and the MAC) so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }
}

impl<W: Write> Write for MacWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.mac.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Stage for MacWriter<W> {
    type Output = (W, [u8; MAC_LEN]);

    fn finish(self) -> io::Result<Self::Output> {
        let MacWriter { mut inner, mac, .. } = self;
        inner.flush()?;

        let mut digest = [0u8; MAC_LEN];
        digest.copy_from_slice(&mac.finalize().into_bytes());
        Ok((inner, digest))
    }
}

/// Verify `HMAC(mac_key, first body_len bytes)` against the `MAC_LEN` bytes
/// that follow. The comparison is constant time.
///
/// Reads `body_len + MAC_LEN` bytes from the current position.
pub fn verify_stream_mac<R: Read + ?Sized>(
    r: &mut R,
    mac_key: &[u8; MAC_KEY_LEN],
    body_len: u64,
    buffer_len: usize,
) -> Result<(), BackupError> {
    let mut mac = new_mac(mac_key)?;
    let mut buf = vec![0u8; buffer_len.max(1)];
    let mut seen = 0u64;

    {
        let mut body = (&mut *r).take(body_len);
        loop {
            let n = read_full(&mut body, &mut buf)?;
            if n == 0 {
                break;
            }
            mac.update(&buf[..n]);
            seen += n as u64;
        }
    }

    if seen != body_len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stream ended after {} of {} authenticated bytes", seen, body_len),
        )
        .into());
    }

    let mut expected = [0u8; MAC_LEN];
    r.read_exact(&mut expected)?;

    mac.verify_slice(&expected).map_err(|_| CryptoError::MacMismatch)?;
    Ok(())
}
