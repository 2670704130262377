//! compression/types.rs
//! Padding policy and the summary returned when the gzip stage closes.

use serde::{Deserialize, Serialize};

/// How much zero padding follows the gzip member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingPolicy {
    /// Uniform in `0..=padded_size(n + 1) - n`, fresh per backup.
    #[default]
    Randomized,
    /// Exactly up to the bucket boundary `padded_size(n)`.
    Bucketed,
    /// No padding.
    Disabled,
}

/// Byte counts observed while finishing the gzip stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaddingSummary {
    /// Uncompressed bytes accepted.
    pub plaintext_len: u64,
    /// Length of the finished gzip member.
    pub compressed_len: u64,
    /// Zero bytes appended after the member.
    pub padding_len: u64,
}

impl PaddingSummary {
    /// Bytes handed to the next stage.
    pub fn total_len(&self) -> u64 {
        self.compressed_len + self.padding_len
    }
}
