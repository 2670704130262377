//! stream/config.rs
//! Writer and reader configuration.
//!
//! Both structs deserialize with every field optional, so a partial JSON or
//! TOML table overrides only what it names.

use serde::{Deserialize, Serialize};

use crate::compression::PaddingPolicy;
use crate::constants::{DEFAULT_BUFFER_LEN, DEFAULT_GZIP_LEVEL, DEFAULT_MAX_RECORD_LEN};
use crate::types::BackupError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// flate2 level, 0..=9.
    pub compression_level: u32,
    pub padding: PaddingPolicy,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_GZIP_LEVEL,
            padding: PaddingPolicy::default(),
        }
    }
}

impl WriterConfig {
    pub fn new(compression_level: Option<u32>, padding: Option<PaddingPolicy>) -> Self {
        let defaults = Self::default();
        Self {
            compression_level: compression_level.unwrap_or(defaults.compression_level),
            padding: padding.unwrap_or(defaults.padding),
        }
    }

    pub fn validate(&self) -> Result<(), BackupError> {
        if self.compression_level > 9 {
            return Err(BackupError::Config(format!(
                "compression_level {} outside 0..=9",
                self.compression_level
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Records declaring a longer payload fail with `FrameError::TooLarge`.
    pub max_record_len: usize,
    /// Read buffer for the MAC pass, CBC stage and record reader.
    pub buffer_len: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            buffer_len: DEFAULT_BUFFER_LEN,
        }
    }
}

impl ReaderConfig {
    pub fn validate(&self) -> Result<(), BackupError> {
        if self.max_record_len == 0 {
            return Err(BackupError::Config("max_record_len must be > 0".into()));
        }
        if self.buffer_len == 0 {
            return Err(BackupError::Config("buffer_len must be > 0".into()));
        }
        Ok(())
    }
}
