//! compression/mod.rs
//! Gzip stage of the encrypted pipeline plus size padding.
//!
//! Design notes:
//! - One gzip member per backup, default flate2 level unless configured.
//! - Zero padding is written after the gzip trailer and before encryption,
//!   so padded bytes are encrypted and MACed like everything else.
//! - Single-member gzip decoding stops at the trailer, so readers never see
//!   the padding.

pub mod types;
pub mod padding;
pub mod stream;

pub use types::{PaddingPolicy, PaddingSummary};
pub use padding::{padded_size, padding_len};
pub use stream::{gzip_reader, PaddedGzipWriter};
