//! Pitch lag and contour tables
//!
//! Lag range limits per sample rate, the contour codebooks searched by
//! pitch stages 2 and 3, and the lag/contour ICDFs of RFC 6716 Section
//! 4.2.7 (Tables 29-36). The stage-2 search at 8 kHz always uses the
//! narrowband contour codebooks; the stage-3 search at 12/16 kHz refines
//! with the wider medium/wideband codebooks.

/// Minimum pitch lag in samples at `fs_khz`
#[inline]
pub fn pitch_lag_min(fs_khz: usize) -> i32 {
    (crate::constants::PE_MIN_LAG_MS * fs_khz) as i32
}

/// Maximum pitch lag in samples at `fs_khz`
#[inline]
pub fn pitch_lag_max(fs_khz: usize) -> i32 {
    (crate::constants::PE_MAX_LAG_MS * fs_khz) as i32
}

/// ICDF for the high part of the primary pitch lag (RFC 6716 Table 29)
pub const PITCH_LAG_HIGH_ICDF: &[u8] = &[
    253, 250, 244, 233, 212, 182, 150, 131, 120, 110, 98, 85, 72, 60, 49, 40,
    32, 25, 19, 15, 13, 11, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0,
];

/// ICDF for the low part of the primary pitch lag, NB (uniform 4)
pub const PITCH_LAG_LOW_ICDF_NB: &[u8] = &[192, 128, 64, 0];

/// ICDF for the low part of the primary pitch lag, MB (uniform 6)
pub const PITCH_LAG_LOW_ICDF_MB: &[u8] = &[213, 171, 128, 85, 43, 0];

/// ICDF for the low part of the primary pitch lag, WB (uniform 8)
pub const PITCH_LAG_LOW_ICDF_WB: &[u8] = &[224, 192, 160, 128, 96, 64, 32, 0];

/// ICDF for the primary lag delta in conditional coding (RFC 6716 Table 31)
pub const PITCH_LAG_DELTA_ICDF: &[u8] = &[
    210, 208, 206, 203, 199, 193, 183, 168, 142, 104, 74, 52, 37, 27, 20, 14,
    10, 6, 4, 2, 0,
];

/// Pitch contour ICDF, NB 10 ms (RFC 6716 Table 32)
pub const PITCH_CONTOUR_ICDF_NB_10MS: &[u8] = &[113, 63, 0];

/// Pitch contour ICDF, NB 20 ms
pub const PITCH_CONTOUR_ICDF_NB_20MS: &[u8] =
    &[188, 176, 155, 138, 119, 97, 67, 43, 26, 10, 0];

/// Pitch contour ICDF, MB/WB 10 ms
pub const PITCH_CONTOUR_ICDF_MBWB_10MS: &[u8] =
    &[165, 119, 80, 61, 47, 35, 27, 20, 14, 9, 4, 0];

/// Pitch contour ICDF, MB/WB 20 ms
pub const PITCH_CONTOUR_ICDF_MBWB_20MS: &[u8] = &[
    223, 201, 183, 167, 152, 138, 124, 111, 98, 88, 79, 70, 62, 56, 50, 44, 39,
    35, 31, 27, 24, 21, 18, 16, 14, 12, 10, 8, 6, 4, 3, 2, 1, 0,
];

/// Subframe contour codebook, NB 10 ms: 3 vectors x 2 subframes
/// (RFC 6716 Table 33); also the stage-2 codebook for 10 ms frames
pub const PITCH_CONTOUR_CB_NB_10MS: [[i8; 2]; 3] = [[0, 0], [1, 0], [0, 1]];

/// Subframe contour codebook, NB 20 ms: 11 vectors x 4 subframes
/// (RFC 6716 Table 34); also the extended stage-2 codebook at 8 kHz
pub const PITCH_CONTOUR_CB_NB_20MS: [[i8; 4]; 11] = [
    [0, 0, 0, 0],
    [2, 1, 0, -1],
    [-1, 0, 1, 2],
    [-1, 0, 0, 1],
    [-1, 0, 0, 0],
    [0, 0, 0, 1],
    [0, 0, 1, 1],
    [1, 1, 0, 0],
    [1, 0, 0, 0],
    [0, 0, 0, -1],
    [1, 0, 0, -1],
];

/// Subframe contour codebook, MB/WB 10 ms: 12 vectors x 2 subframes
/// (RFC 6716 Table 35); the stage-3 codebook for 10 ms frames
pub const PITCH_CONTOUR_CB_MBWB_10MS: [[i8; 2]; 12] = [
    [0, 0],
    [0, 1],
    [1, 0],
    [-1, 1],
    [1, -1],
    [-1, 2],
    [2, -1],
    [-2, 2],
    [2, -2],
    [-2, 3],
    [3, -2],
    [-3, 3],
];

/// Subframe contour codebook, MB/WB 20 ms: 34 vectors x 4 subframes
/// (RFC 6716 Table 36); the stage-3 codebook for 20 ms frames
pub const PITCH_CONTOUR_CB_MBWB_20MS: [[i8; 4]; 34] = [
    [0, 0, 0, 0],
    [0, 0, 1, 1],
    [1, 1, 0, 0],
    [-1, 0, 0, 0],
    [0, 0, 0, 1],
    [1, 0, 0, 0],
    [-1, 0, 0, 1],
    [0, 0, 0, -1],
    [-1, 0, 1, 2],
    [1, 0, 0, -1],
    [-2, -1, 1, 2],
    [2, 1, 0, -1],
    [-2, 0, 0, 2],
    [-2, 0, 1, 3],
    [2, 1, -1, -2],
    [-3, -1, 1, 3],
    [2, 0, 0, -2],
    [3, 1, 0, -2],
    [-3, -1, 2, 4],
    [-4, -1, 1, 4],
    [3, 1, -1, -3],
    [-4, -1, 2, 5],
    [4, 2, -1, -3],
    [4, 1, -1, -4],
    [-5, -1, 2, 6],
    [5, 2, -1, -4],
    [-6, -2, 2, 6],
    [-5, -2, 2, 5],
    [6, 2, -1, -5],
    [-7, -2, 3, 8],
    [6, 2, -2, -6],
    [5, 2, -2, -5],
    [8, 3, -2, -7],
    [-9, -3, 3, 9],
];

/// Number of stage-3 codebook vectors searched per complexity setting
/// (minimum, middle, maximum)
pub const NB_CBK_SEARCHS_STAGE3: [usize; 3] = [
    crate::constants::PE_NB_CBKS_STAGE3_MIN,
    crate::constants::PE_NB_CBKS_STAGE3_MID,
    crate::constants::PE_NB_CBKS_STAGE3_MAX,
];
