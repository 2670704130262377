//! compression/padding.rs
//! Bucketed size padding.
//!
//! Buckets grow geometrically by `BUCKET_GROWTH` from a floor of
//! `MIN_PADDED_SIZE`, so the padded length reveals roughly the order of
//! magnitude of the compressed backup and nothing finer.

use rand::Rng;

use crate::compression::types::PaddingPolicy;
use crate::constants::padding::{BUCKET_GROWTH, MIN_PADDED_SIZE};

/// Smallest bucket boundary `>= len`:
/// `max(MIN_PADDED_SIZE, floor(BUCKET_GROWTH ^ ceil(log_BUCKET_GROWTH(len))))`.
pub fn padded_size(len: u64) -> u64 {
    if len <= MIN_PADDED_SIZE {
        return MIN_PADDED_SIZE;
    }
    let exponent = ((len as f64).ln() / BUCKET_GROWTH.ln()).ceil();
    let bucket = BUCKET_GROWTH.powf(exponent).floor() as u64;
    // Float rounding can land one below `len` on exact powers.
    bucket.max(len)
}

/// Number of zero bytes to append after `len` compressed bytes.
pub fn padding_len<G: Rng + ?Sized>(len: u64, policy: PaddingPolicy, rng: &mut G) -> u64 {
    match policy {
        PaddingPolicy::Disabled => 0,
        PaddingPolicy::Bucketed => padded_size(len) - len,
        PaddingPolicy::Randomized => {
            let max = padded_size(len.saturating_add(1)).saturating_sub(len);
            rng.gen_range(0..=max)
        }
    }
}
