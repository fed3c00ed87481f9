//! Gain quantization entropy tables
//!
//! ICDFs for the absolute gain index of the first subframe (3 MSBs under a
//! signal-type-conditioned table plus 3 uniform LSBs) and the delta-coded
//! indices of the following subframes, per RFC 6716 Tables 11-13.

/// Gain MSB ICDF for inactive frames
pub const GAIN_ICDF_INACTIVE: &[u8] = &[224, 112, 44, 15, 3, 2, 1, 0];

/// Gain MSB ICDF for unvoiced frames
pub const GAIN_ICDF_UNVOICED: &[u8] = &[254, 237, 192, 132, 70, 23, 4, 0];

/// Gain MSB ICDF for voiced frames
pub const GAIN_ICDF_VOICED: &[u8] = &[255, 252, 226, 155, 61, 11, 2, 0];

/// Uniform ICDF for the 3 gain LSBs
pub const GAIN_ICDF_LSB: &[u8] = &[224, 192, 160, 128, 96, 64, 32, 0];

/// Delta gain index ICDF, centered at symbol 4 (delta 0)
pub const GAIN_ICDF_DELTA: &[u8] = &[
    250, 245, 234, 203, 71, 50, 42, 38, 35, 33, 31, 29, 28, 27, 26, 25, 24, 23,
    22, 21, 20, 19, 18, 17, 16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2,
    1, 0,
];

/// Offset of the log-gain scale, Q7 log2 domain
/// `(MIN_QGAIN_DB * 128) / 6 + 16 * 128`
pub const GAIN_OFFSET_Q7: i32 = 2090;

/// Scale from Q7 log-gain to quantization index, Q16
/// `65536 * (N_LEVELS_QGAIN - 1) / ((MAX_QGAIN_DB - MIN_QGAIN_DB) * 128 / 6)`
pub const GAIN_SCALE_Q16: i32 = 2251;

/// Inverse scale from quantization index to Q7 log-gain, Q16
pub const GAIN_INV_SCALE_Q16: i32 = 1_907_825;
