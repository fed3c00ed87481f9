//! Constants and parameters for the SILK encoder core
//!
//! Frame layout, predictor orders, pitch estimation ranges, and quantizer
//! limits per RFC 6716 and the canonical SILK reference tables.

// Frame and subframe layout (milliseconds, converted per sample rate)
/// Subframe duration in milliseconds; every frame is 2 or 4 subframes
pub const SUB_FRAME_LENGTH_MS: usize = 5;
/// Maximum number of subframes per frame (20 ms framing)
pub const MAX_NB_SUBFR: usize = 4;
/// Long-term prediction memory in milliseconds
pub const LTP_MEM_LENGTH_MS: usize = 20;
/// Pitch analysis look-ahead in milliseconds
pub const LA_PITCH_MS: usize = 2;
/// Noise-shape analysis look-ahead in milliseconds
pub const LA_SHAPE_MS: usize = 5;
/// Noise-shape analysis window length in milliseconds
pub const SHAPE_LPC_WIN_MS: usize = 15;
/// Maximum SILK-internal sample rate in kHz
pub const MAX_FS_KHZ: usize = 16;
/// Maximum frame length in samples (20 ms at 16 kHz)
pub const MAX_FRAME_LENGTH: usize = SUB_FRAME_LENGTH_MS * MAX_NB_SUBFR * MAX_FS_KHZ;

// Prediction orders
/// LPC order for wideband (16 kHz)
pub const MAX_LPC_ORDER: usize = 16;
/// LPC order for narrowband and mediumband (8/12 kHz)
pub const MIN_LPC_ORDER: usize = 10;
/// Long-term predictor taps
pub const LTP_ORDER: usize = 5;
/// Maximum noise-shaping AR order
pub const MAX_SHAPE_LPC_ORDER: usize = 16;
/// Harmonic noise shaping FIR taps
pub const HARM_SHAPE_FIR_TAPS: usize = 3;
/// LPC order used for pitch-analysis whitening at wideband
pub const MAX_FIND_PITCH_LPC_ORDER: usize = 16;

// Pitch estimation
/// Minimum pitch lag in milliseconds (500 Hz)
pub const PE_MIN_LAG_MS: usize = 2;
/// Maximum pitch lag in milliseconds (56 Hz)
pub const PE_MAX_LAG_MS: usize = 18;
/// Number of stage-3 candidate lags per base lag
pub const PE_NB_STAGE3_LAGS: usize = 5;
/// Stage-2 contour codebook size (low complexity)
pub const PE_NB_CBKS_STAGE2: usize = 3;
/// Stage-2 contour codebook size (extended, complexity > 0)
pub const PE_NB_CBKS_STAGE2_EXT: usize = 11;
/// Stage-3 contour codebook size, maximum complexity
pub const PE_NB_CBKS_STAGE3_MAX: usize = 34;
/// Stage-3 contour codebook size, middle complexity
pub const PE_NB_CBKS_STAGE3_MID: usize = 24;
/// Stage-3 contour codebook size, minimum complexity
pub const PE_NB_CBKS_STAGE3_MIN: usize = 16;
/// Stage-3 contour codebook size for 10 ms frames
pub const PE_NB_CBKS_STAGE3_10MS: usize = 12;
/// Stage-2 contour codebook size for 10 ms frames
pub const PE_NB_CBKS_STAGE2_10MS: usize = 3;
/// Short-lag bias applied in stages 1 and 2
pub const PE_SHORTLAG_BIAS: f32 = 0.2;
/// Bias toward the previous frame's lag in stage 2
pub const PE_PREVLAG_BIAS: f32 = 0.2;
/// Bias against flat stage-3 contours
pub const PE_FLATCONTOUR_BIAS: f32 = 0.05;
/// Stage-1 correlation threshold below which the frame is unvoiced
pub const PE_STAGE1_UNVOICED_THRESHOLD: f32 = 0.2;

// NLSF quantization
/// Maximum residual quantizer amplitude before the extension escape
pub const NLSF_QUANT_MAX_AMPLITUDE: i32 = 4;
/// Maximum residual quantizer amplitude including extension range
pub const NLSF_QUANT_MAX_AMPLITUDE_EXT: i32 = 10;
/// Quantization level adjustment toward zero, Q10
pub const NLSF_QUANT_LEVEL_ADJ_Q10: i32 = 102;
/// Number of parallel states in the delayed-decision NLSF quantizer
pub const NLSF_QUANT_DEL_DEC_STATES: usize = 4;
/// Maximum number of stage-1 survivors searched
pub const MAX_NLSF_MSVQ_SURVIVORS: usize = 16;
/// Binary subdivision steps in the NLSF root search
pub const BIN_DIV_STEPS_A2NLSF: usize = 3;
/// Maximum restart iterations for the NLSF root search
pub const MAX_ITERATIONS_A2NLSF: usize = 16;

// Gain quantization
/// Number of log-gain quantization levels
pub const N_LEVELS_QGAIN: i32 = 64;
/// Smallest quantizable gain in dB
pub const MIN_QGAIN_DB: i32 = 2;
/// Largest quantizable gain in dB
pub const MAX_QGAIN_DB: i32 = 88;
/// Lower bound on the delta log-gain index
pub const MIN_DELTA_GAIN_QUANT: i32 = -4;
/// Upper bound on the delta log-gain index
pub const MAX_DELTA_GAIN_QUANT: i32 = 11;
/// Saturation point of the sum-of-log-gains accumulator, in dB
pub const MAX_SUM_LOG_GAIN_DB: i32 = 250;

// Excitation / shell coder
/// Samples per shell coder block
pub const SHELL_CODEC_FRAME_LENGTH: usize = 16;
/// log2 of the shell coder block length
pub const LOG2_SHELL_CODEC_FRAME_LENGTH: usize = 4;
/// Maximum pulse count representable per shell block
pub const SILK_MAX_PULSES: usize = 16;
/// Maximum absolute quantized pulse amplitude
pub const MAX_PULSE_AMP: i32 = 31;
/// Number of shell coder rate levels
pub const N_RATE_LEVELS: usize = 10;
/// Quantization level adjustment for the excitation, Q10
pub const QUANT_LEVEL_ADJUST_Q10: i32 = 80;

// NSQ
/// Maximum number of delayed-decision states
pub const MAX_DEL_DEC_STATES: usize = 4;
/// Number of samples the delayed-decision quantizer lags behind
pub const DECISION_DELAY: usize = 32;
/// Multiplier of the LCG dither generator
pub const RAND_MULTIPLIER: i32 = 196_314_165;
/// Increment of the LCG dither generator
pub const RAND_INCREMENT: i32 = 907_633_515;

// LPC analysis
/// Chirp factor applied to pitch-analysis whitening filters
pub const FIND_PITCH_BANDWIDTH_EXPANSION: f32 = 0.99;
/// White noise fraction added to pitch-analysis autocorrelation
pub const FIND_PITCH_WHITE_NOISE_FRACTION: f32 = 1e-3;
/// Conditioning fraction added to the Burg correlation estimates
pub const FIND_LPC_COND_FAC: f64 = 1e-5;
/// Chirp factor applied to the noise shaping AR filter
pub const BANDWIDTH_EXPANSION: f32 = 0.94;
/// White noise fraction added to the shape autocorrelation
pub const SHAPE_WHITE_NOISE_FRACTION: f32 = 3e-5;
/// Inverse prediction gain floor on the first frame after a reset
pub const MIN_INV_GAIN_FIRST_FRAME: f64 = 1e-2;
/// Inverse prediction gain floor on subsequent frames
pub const MIN_INV_GAIN: f64 = 1e-4;

// Noise shaping
/// Base harmonic shaping strength
pub const HARMONIC_SHAPING: f32 = 0.3;
/// Extra harmonic shaping at low coding quality
pub const LOW_RATE_HARMONIC_BOOST: f32 = 0.1;
/// Base low-frequency shaping strength
pub const LOW_FREQ_SHAPING: f32 = 4.0;
/// Reduction of low-frequency shaping at low quality
pub const LOW_QUALITY_LOW_FREQ_SHAPING_DECR: f32 = 0.5;
/// High-pass noise floor coefficient for tilt computation
pub const HP_NOISE_COEF: f32 = 0.25;
/// Additional voiced tilt scaling with speech activity
pub const HARM_HP_NOISE_COEF: f32 = 0.35;
/// Subframe smoothing coefficient for shape parameters
pub const SUBFR_SMTH_COEF: f32 = 0.4;
/// Gain reduction at the sigmoid midpoint for strongly predicted frames
pub const GAIN_REDUCTION_PRED_GAIN_DB: f32 = 12.0;

/// Conditional coding states: frame coded independently or relative to the
/// previous frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondCoding {
    /// No usable previous frame; all indices coded absolutely
    Independently = 0,
    /// Previous frame available; lag and gain delta coding enabled
    Conditionally = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        // 20 ms at 16 kHz
        assert_eq!(MAX_FRAME_LENGTH, 320);
        assert_eq!(SUB_FRAME_LENGTH_MS * MAX_NB_SUBFR, 20);
        assert_eq!(LTP_MEM_LENGTH_MS, 20);
    }

    #[test]
    fn test_pitch_lag_bounds() {
        // 2..18 ms covers 56..500 Hz
        assert!(PE_MIN_LAG_MS < PE_MAX_LAG_MS);
        assert_eq!(PE_MIN_LAG_MS * 16, 32);
        assert_eq!(PE_MAX_LAG_MS * 16, 288);
    }

    #[test]
    fn test_gain_quantizer_range() {
        assert_eq!(N_LEVELS_QGAIN, 64);
        assert!(MIN_DELTA_GAIN_QUANT < 0 && MAX_DELTA_GAIN_QUANT > 0);
        // Delta symbols fit the delta ICDF alphabet
        let symbols = (MAX_DELTA_GAIN_QUANT - MIN_DELTA_GAIN_QUANT + 1) as usize;
        assert!(symbols <= 41);
    }

    #[test]
    fn test_shell_block() {
        assert_eq!(1usize << LOG2_SHELL_CODEC_FRAME_LENGTH, SHELL_CODEC_FRAME_LENGTH);
        assert!(MAX_PULSE_AMP >= SILK_MAX_PULSES as i32);
    }
}
