use std::io::{self, Write};

use prost::Message;

use crate::proto::{BackupInfo, Frame};

/// Encode a record into wire format.
///
/// Layout:
///
/// ```text
/// [ varint(len) (1..=10) ]
/// [ protobuf bytes (len) ]
/// ```
///
/// A record with every field at its default encodes to a single `0x00`.
pub fn encode_record<M: Message>(record: &M) -> Vec<u8> {
    record.encode_length_delimited_to_vec()
}

/// Encoded size of `record` including its length prefix.
pub fn record_len<M: Message>(record: &M) -> usize {
    let body = record.encoded_len();
    prost::encoding::encoded_len_varint(body as u64) + body
}

/// Encode and write one record. Returns the number of bytes written.
pub fn write_record<W: Write + ?Sized, M: Message>(w: &mut W, record: &M) -> io::Result<usize> {
    let wire = encode_record(record);
    w.write_all(&wire)?;
    Ok(wire.len())
}

pub fn encode_header(header: &BackupInfo) -> Vec<u8> {
    encode_record(header)
}

pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    encode_record(frame)
}
