//! Length-prefixed record framing.
//!
//! Responsibilities:
//! - Base-128 varint length prefixes
//! - Encode records as `varint(len) ++ bytes`
//! - Read one record at a time, separating clean end-of-stream from truncation
//!
//! Non-responsibilities:
//! - Cryptography
//! - Compression
//! - Ordering or cross-record integrity

pub mod types;
pub mod varint;
pub mod encode;
pub mod decode;

pub use types::{FrameError, ReadOutcome, Truncation};
pub use encode::{encode_frame, encode_header, encode_record, record_len, write_record};
pub use decode::{decode_record, read_next};
