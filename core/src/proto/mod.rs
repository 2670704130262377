//! proto/mod.rs
//! Record schema for the backup stream.
//!
//! Design notes:
//! - Records are protobuf messages (numbered tags, wire types) via `prost` derive.
//! - Unknown fields are skipped on decode; omitted optional fields are not written.
//! - The codec treats records as opaque: any `prost::Message + Default` works as
//!   a header or frame type. These are the defaults.

pub mod backup;

pub use backup::*;
