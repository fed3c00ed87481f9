//! Read-only tables: codebooks, ICDFs, and fixed-point constants
//!
//! Everything in this module is `const` data fixed at compile time; there
//! is no runtime initialization. ICDF tables follow the range-coder
//! convention of RFC 6716 Section 4.1.3.3: entry `k` holds
//! `256 - cumulative(k)`, and every table terminates with 0.

pub mod cosine;
pub mod frame;
pub mod gains;
pub mod ltp;
pub mod nlsf;
pub mod pitch;
pub mod pulses;

/// Probability (out of 256) of symbol `k` under an ICDF table
#[inline]
pub fn icdf_prob_q8(icdf: &[u8], k: usize) -> i32 {
    let hi = if k == 0 { 256 } else { icdf[k - 1] as i32 };
    hi - icdf[k] as i32
}

/// Entropy rate of symbol `k` under an ICDF table, in Q5 bits
///
/// `rate = 32 * (8 - log2(p))`, computed with the fixed-point log of the
/// arithmetic layer so encoder-side rate-distortion searches stay integer.
#[inline]
pub fn icdf_rate_q5(icdf: &[u8], k: usize) -> i32 {
    let p = icdf_prob_q8(icdf, k).max(1);
    // lin2log is Q7; shift to Q5
    ((8 << 7) - crate::basic_ops::lin2log(p)) >> 2
}
