//! Noise shape analysis
//!
//! Per subframe, a warped Burg/Schur analysis over a sine-windowed 15 ms
//! span produces the AR shaping filter and the pre-quantization gain.
//! Harmonic shaping, low-frequency shaping, and tilt follow the signal
//! classification, smoothed across subframes with first-order filters
//! seeded from the encoder state.

use crate::basic_ops::sat16;
use crate::constants::*;
use crate::math::{apply_sine_window, bwexpander_f32, k2a, schur, sigmoid, warped_autocorrelation};
use crate::types::{SignalType, VadState};

/// Background-noise dependent SNR reduction, dB
const BG_SNR_DECR_DB: f32 = 2.0;
/// Harmonicity dependent SNR increase, dB
const HARM_SNR_INCR_DB: f32 = 2.0;
/// Absolute ceiling on warped AR coefficients
const MAX_SHAPE_COEF: f32 = 3.999;

/// Inter-frame smoothing state for the shape parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeSmoothState {
    /// Smoothed harmonic shape gain
    pub harm_shape_gain_smth: f32,
    /// Smoothed tilt
    pub tilt_smth: f32,
}

impl ShapeSmoothState {
    /// Reset to the zero state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Shaping parameters for one frame
#[derive(Debug, Clone)]
pub struct ShapeParams {
    /// AR shaping coefficients per subframe, Q13
    pub ar_q13: [[i16; MAX_SHAPE_LPC_ORDER]; MAX_NB_SUBFR],
    /// Packed low-frequency shaping per subframe: AR in the upper 16 bits,
    /// MA in the lower, both Q14
    pub lf_shp_q14: [i32; MAX_NB_SUBFR],
    /// Spectral tilt per subframe, Q14
    pub tilt_q14: [i32; MAX_NB_SUBFR],
    /// Harmonic shape gain per subframe, Q14
    pub harm_shape_gain_q14: [i32; MAX_NB_SUBFR],
    /// Pre-quantization subframe gains (linear, int16 scale)
    pub gains: [f32; MAX_NB_SUBFR],
    /// Residual energy per subframe from the shape analysis
    pub res_nrg: [f32; MAX_NB_SUBFR],
    /// Input quality (average of the two lowest VAD quality bands)
    pub input_quality: f32,
    /// Coding quality from the adjusted SNR
    pub coding_quality: f32,
    /// SNR after activity and harmonicity adjustments, dB
    pub snr_adj_db: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            ar_q13: [[0; MAX_SHAPE_LPC_ORDER]; MAX_NB_SUBFR],
            lf_shp_q14: [0; MAX_NB_SUBFR],
            tilt_q14: [0; MAX_NB_SUBFR],
            harm_shape_gain_q14: [0; MAX_NB_SUBFR],
            gains: [1.0; MAX_NB_SUBFR],
            res_nrg: [0.0; MAX_NB_SUBFR],
            input_quality: 0.5,
            coding_quality: 0.5,
            snr_adj_db: 20.0,
        }
    }
}

/// Analyze the shape signal and derive all shaping parameters
///
/// `x` must cover `la_shape` history samples followed by the frame;
/// `x_offset` is the index of the frame's first sample inside `x`.
pub fn noise_shape_analysis(
    x: &[f32],
    x_offset: usize,
    fs_khz: usize,
    nb_subfr: usize,
    shape_order: usize,
    warping_q16: i32,
    snr_db_q7: i32,
    use_cbr: bool,
    vad: &VadState,
    signal_type: SignalType,
    ltp_corr: f32,
    pitch_lags: &[i32],
    smooth: &mut ShapeSmoothState,
) -> ShapeParams {
    let mut out = ShapeParams::default();
    let subfr_length = SUB_FRAME_LENGTH_MS * fs_khz;
    let la_shape = LA_SHAPE_MS * fs_khz;
    let shape_win_length = SHAPE_LPC_WIN_MS * fs_khz;
    if x_offset < la_shape || x.len() < x_offset + nb_subfr * subfr_length {
        // Invalid layout: neutral shaping keeps NSQ functional
        return out;
    }

    // Quality measures
    out.input_quality =
        0.5 * (vad.quality_bands_q15[0] + vad.quality_bands_q15[1]) as f32 / 32_768.0;
    let snr_db = snr_db_q7 as f32 / 128.0;
    out.coding_quality = sigmoid(0.25 * (snr_db - 20.0));
    let mut snr_adj_db = snr_db;
    if !use_cbr {
        let b = 1.0 - vad.speech_activity_q8 as f32 / 256.0;
        snr_adj_db -=
            BG_SNR_DECR_DB * out.coding_quality * (0.5 + 0.5 * out.input_quality) * b * b;
    }
    if signal_type.is_voiced() {
        snr_adj_db += HARM_SNR_INCR_DB * ltp_corr;
    }
    out.snr_adj_db = snr_adj_db;

    let warping = warping_q16 as f32 / 65_536.0;
    let mut x_windowed = vec![0.0f32; shape_win_length];
    let flat_len = shape_win_length - 2 * la_shape;

    for k in 0..nb_subfr {
        // Window: rising flank over the look-behind, flat subframe core,
        // falling flank into the look-ahead
        let start = x_offset + k * subfr_length - la_shape;
        let seg = &x[start..start + shape_win_length];
        apply_sine_window(&mut x_windowed[..la_shape], seg, 1, la_shape);
        x_windowed[la_shape..la_shape + flat_len]
            .copy_from_slice(&seg[la_shape..la_shape + flat_len]);
        apply_sine_window(
            &mut x_windowed[la_shape + flat_len..],
            &seg[la_shape + flat_len..],
            2,
            la_shape,
        );

        // Warped autocorrelation with a white noise floor
        let mut auto_corr = [0.0f32; MAX_SHAPE_LPC_ORDER + 1];
        warped_autocorrelation(&mut auto_corr, &x_windowed, warping, shape_order);
        auto_corr[0] += auto_corr[0] * SHAPE_WHITE_NOISE_FRACTION + 1.0;

        let mut refl = [0.0f32; MAX_SHAPE_LPC_ORDER];
        let nrg = schur(&mut refl, &auto_corr, shape_order).max(0.0);
        out.res_nrg[k] = nrg;
        out.gains[k] = nrg.sqrt().clamp(1.0, 32_767.0);

        let mut ar = [0.0f32; MAX_SHAPE_LPC_ORDER];
        k2a(&mut ar, &refl, shape_order);

        // Shape-specific bandwidth expansion, then clamp coefficients so
        // the Q13 representation cannot overflow
        bwexpander_f32(&mut ar, shape_order, BANDWIDTH_EXPANSION);
        for _ in 0..10 {
            let max_abs = ar[..shape_order].iter().fold(0.0f32, |m, &v| m.max(v.abs()));
            if max_abs <= MAX_SHAPE_COEF {
                break;
            }
            bwexpander_f32(&mut ar, shape_order, 0.97);
        }
        for i in 0..shape_order {
            out.ar_q13[k][i] = sat16((ar[i] * 8192.0).round() as i32);
        }
    }

    // Harmonic shaping, smoothed across subframes
    let mut harm_shape_gain = 0.0f32;
    if signal_type.is_voiced() {
        harm_shape_gain = HARMONIC_SHAPING + LOW_RATE_HARMONIC_BOOST * (1.0 - out.coding_quality);
        harm_shape_gain *= ltp_corr.max(0.0).sqrt();
    }

    // Tilt
    let tilt = if signal_type.is_voiced() {
        -HP_NOISE_COEF
            - (1.0 - HP_NOISE_COEF) * HARM_HP_NOISE_COEF * vad.speech_activity_q8 as f32 / 256.0
    } else {
        -HP_NOISE_COEF
    };

    // Low-frequency shaping strength
    let strength = if signal_type.is_voiced() {
        LOW_FREQ_SHAPING
            * (1.0
                + LOW_QUALITY_LOW_FREQ_SHAPING_DECR
                    * (vad.quality_bands_q15[0] as f32 / 32_768.0 - 1.0))
            * vad.speech_activity_q8 as f32
            / 256.0
    } else {
        0.6 * LOW_FREQ_SHAPING
    };

    for k in 0..nb_subfr {
        smooth.harm_shape_gain_smth +=
            SUBFR_SMTH_COEF * (harm_shape_gain - smooth.harm_shape_gain_smth);
        smooth.tilt_smth += SUBFR_SMTH_COEF * (tilt - smooth.tilt_smth);
        out.harm_shape_gain_q14[k] = (smooth.harm_shape_gain_smth * 16_384.0) as i32;
        out.tilt_q14[k] = (smooth.tilt_smth * 16_384.0) as i32;

        // Packed MA (low 16) and AR (high 16) low-frequency shaping pair
        let b = if signal_type.is_voiced() && pitch_lags[k] > 0 {
            0.2 / fs_khz as f32 + 3.0 / pitch_lags[k] as f32
        } else {
            1.3 / fs_khz as f32
        };
        let lf_ma = -1.0 + b;
        let lf_ar = 1.0 - b - b * strength;
        let ma_q14 = (lf_ma * 16_384.0) as i32;
        let ar_q14 = (lf_ar * 16_384.0) as i32;
        out.lf_shp_q14[k] = (ar_q14 << 16) | (ma_q14 & 0xffff);
    }

    out
}
