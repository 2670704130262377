//! telemetry/mod.rs
//! Byte and record counters collected by writers and readers.
//!
//! Counters are plain values owned by one writer or reader; callers that run
//! several exports merge them afterwards.

pub mod counters;

pub use counters::*;
