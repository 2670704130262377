use std::io::{self, Read};

use prost::Message;

use crate::constants::DEFAULT_BUFFER_LEN;
use crate::framing::types::{FrameError, ReadOutcome, Truncation};
use crate::framing::varint::{read_varint, VarintRead};
use crate::types::BackupError;

/// Pull the next record off `r`.
///
/// - Exhaustion before the first prefix byte: `EndOfStream`.
/// - Exhaustion inside the prefix or payload: `Truncated`.
/// - A zero length is a legal, all-defaults record.
/// - Lengths above `max_len` are rejected before any payload is buffered.
///
/// I/O failures other than end-of-stream are returned as `Err`.
pub fn read_next<M, R>(r: &mut R, max_len: usize) -> io::Result<ReadOutcome<M>>
where
    M: Message + Default,
    R: Read + ?Sized,
{
    let len = match read_varint(r)? {
        VarintRead::Value(len) => len,
        VarintRead::CleanEof => return Ok(ReadOutcome::EndOfStream),
        VarintRead::Truncated { bytes_read } => {
            return Ok(ReadOutcome::Truncated(Truncation::LengthPrefix { bytes_read }))
        }
        VarintRead::Overflow => return Ok(ReadOutcome::DecodeFailed(FrameError::VarintOverflow)),
    };

    if len > max_len as u64 {
        return Ok(ReadOutcome::DecodeFailed(FrameError::TooLarge { len, max: max_len }));
    }

    let expected = len as usize;
    let mut payload = Vec::with_capacity(expected.min(DEFAULT_BUFFER_LEN));
    (&mut *r).take(len).read_to_end(&mut payload)?;

    if payload.len() < expected {
        return Ok(ReadOutcome::Truncated(Truncation::Payload {
            expected,
            actual: payload.len(),
        }));
    }

    match M::decode(payload.as_slice()) {
        Ok(record) => Ok(ReadOutcome::Record(record)),
        Err(e) => Ok(ReadOutcome::DecodeFailed(FrameError::Decode(e))),
    }
}

/// Decode one record from the front of an in-memory buffer.
///
/// Returns `Ok(None)` for an empty buffer, otherwise the record and the
/// number of bytes it occupied (prefix included). Same outcomes as
/// `read_next`, with no size cap.
pub fn decode_record<M: Message + Default>(wire: &[u8]) -> Result<Option<(M, usize)>, BackupError> {
    let mut rest = wire;
    let record = read_next::<M, _>(&mut rest, usize::MAX)?.into_result()?;
    Ok(record.map(|m| (m, wire.len() - rest.len())))
}
