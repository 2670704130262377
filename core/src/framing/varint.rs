//! Streaming base-128 varint reader: 7 data bits per byte, least significant
//! group first, MSB set on every byte except the last.
//!
//! Encoding goes through `prost::encoding`. Reading stays here because a
//! stream must tell a clean end apart from a cut prefix.

use std::io::{self, Read};

use crate::constants::MAX_VARINT_LEN;
use crate::utils::read_full;

/// Outcome of reading a varint from a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintRead {
    Value(u64),
    /// No byte was available at all.
    CleanEof,
    /// Stream ended after some, but not all, bytes of the varint.
    Truncated { bytes_read: usize },
    /// More than 64 bits of payload.
    Overflow,
}

/// Read one varint byte-by-byte. Wrap unbuffered sources in a `BufReader`.
pub fn read_varint<R: Read + ?Sized>(r: &mut R) -> io::Result<VarintRead> {
    let mut value: u64 = 0;
    let mut byte = [0u8; 1];

    for i in 0..MAX_VARINT_LEN {
        if read_full(r, &mut byte)? == 0 {
            return Ok(if i == 0 {
                VarintRead::CleanEof
            } else {
                VarintRead::Truncated { bytes_read: i }
            });
        }

        let b = byte[0];
        if i == MAX_VARINT_LEN - 1 && b > 0x01 {
            return Ok(VarintRead::Overflow);
        }
        value |= u64::from(b & 0x7F) << (7 * i);
        if b & 0x80 == 0 {
            return Ok(VarintRead::Value(value));
        }
    }

    Ok(VarintRead::Overflow)
}
