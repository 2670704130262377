//! telemetry/counters.rs
//! Mutable counters updated while a backup stream is written or read.
//!
//! Summary: record counts plus byte counts per pipeline stage. Readers only
//! fill the record fields, since they never see the compressed or encrypted
//! lengths in isolation.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::compression::PaddingSummary;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupCounters {
    pub frames_header: u64,
    pub frames_data: u64,
    /// Record bytes including varint prefixes.
    pub bytes_plaintext: u64,
    pub bytes_compressed: u64,
    pub bytes_padding: u64,
    /// IV plus CBC ciphertext.
    pub bytes_ciphertext: u64,
    pub bytes_mac: u64,
}

impl BackupCounters {
    /// Record the header record (`record_len` includes its prefix).
    pub fn add_header(&mut self, record_len: usize) {
        self.frames_header += 1;
        self.bytes_plaintext += record_len as u64;
    }

    /// Record one frame record (`record_len` includes its prefix).
    pub fn add_frame(&mut self, record_len: usize) {
        self.frames_data += 1;
        self.bytes_plaintext += record_len as u64;
    }

    /// Record what the gzip stage produced on close.
    pub fn add_compression(&mut self, summary: &PaddingSummary) {
        self.bytes_compressed += summary.compressed_len;
        self.bytes_padding += summary.padding_len;
    }

    /// Record the encrypted body and trailing MAC.
    pub fn add_encryption(&mut self, ciphertext_len: u64, mac_len: usize) {
        self.bytes_ciphertext += ciphertext_len;
        self.bytes_mac += mac_len as u64;
    }

    /// Total bytes handed to the sink.
    pub fn bytes_output(&self) -> u64 {
        self.bytes_ciphertext + self.bytes_mac
    }

    /// `bytes_compressed / bytes_plaintext`, or 0 with no plaintext.
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_plaintext == 0 {
            0.0
        } else {
            self.bytes_compressed as f64 / self.bytes_plaintext as f64
        }
    }

    pub fn merge(&mut self, other: &BackupCounters) {
        self.frames_header += other.frames_header;
        self.frames_data += other.frames_data;

        self.bytes_plaintext += other.bytes_plaintext;
        self.bytes_compressed += other.bytes_compressed;
        self.bytes_padding += other.bytes_padding;
        self.bytes_ciphertext += other.bytes_ciphertext;
        self.bytes_mac += other.bytes_mac;
    }
}

impl AddAssign for BackupCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
