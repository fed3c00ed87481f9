//! Frame-level entropy tables
//!
//! ICDFs for the joint signal-type/quant-offset index (RFC 6716 Tables
//! 9-10), the per-frame dither seed, and the per-packet LBRR flag
//! combinations used when a payload carries multiple SILK frames.

/// Joint signal-type/quant-offset ICDF when the VAD flag is inactive
/// (symbols: inactive-low, inactive-high)
pub const FRAME_TYPE_ICDF_INACTIVE: &[u8] = &[230, 0];

/// Joint signal-type/quant-offset ICDF when the VAD flag is active
/// (symbols: unvoiced-low, unvoiced-high, voiced-low, voiced-high)
pub const FRAME_TYPE_ICDF_ACTIVE: &[u8] = &[232, 158, 10, 0];

/// Uniform ICDF for the 2-bit pseudo-random seed index
pub const SEED_ICDF: &[u8] = &[192, 128, 64, 0];

/// LBRR flag combinations for 2-frame packets (40 ms)
pub const LBRR_FLAGS_2_ICDF: &[u8] = &[203, 150, 0];

/// LBRR flag combinations for 3-frame packets (60 ms)
pub const LBRR_FLAGS_3_ICDF: &[u8] = &[215, 195, 166, 125, 110, 82, 0];

/// Speech activity threshold above which an LBRR payload is produced, Q8
pub const LBRR_SPEECH_ACTIVITY_THRES_Q8: i32 = 128; // 0.5

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::icdf_prob_q8;

    #[test]
    fn test_frame_type_alphabets() {
        assert_eq!(FRAME_TYPE_ICDF_INACTIVE.len(), 2);
        assert_eq!(FRAME_TYPE_ICDF_ACTIVE.len(), 4);
        // Voiced-low dominates active frames
        let probs: Vec<i32> = (0..4)
            .map(|k| icdf_prob_q8(FRAME_TYPE_ICDF_ACTIVE, k))
            .collect();
        assert_eq!(probs, vec![24, 74, 148, 10]);
    }

    #[test]
    fn test_seed_uniform() {
        for k in 0..4 {
            assert_eq!(icdf_prob_q8(SEED_ICDF, k), 64);
        }
    }
}
