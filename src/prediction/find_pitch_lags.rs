//! Pitch lag estimation front end
//!
//! Whitens the analysis buffer with a short-term LPC estimated over an
//! asymmetric sine window, then runs the open-loop pitch search on the
//! residual. The voicing thresholds adapt to complexity, speech activity,
//! the previous frame's signal type, and the input tilt.

use crate::constants::*;
use crate::math::{apply_sine_window, autocorrelation, bwexpander_f32, k2a, schur};
use crate::pitch::{pitch_analysis_core, PitchResult};
use crate::prediction::lpc_analysis_filter;
use crate::types::SignalType;

/// Pitch estimation window: 20 ms plus both look-ahead flanks
const FIND_PITCH_LPC_WIN_MS: usize = 20 + (LA_PITCH_MS << 1);
/// Reduced window for 10 ms frames
const FIND_PITCH_LPC_WIN_MS_2_SF: usize = 10 + (LA_PITCH_MS << 1);

/// Pitch lag search output, including the whitened residual the LTP
/// analysis reuses
#[derive(Debug, Clone)]
pub struct PitchLagResult {
    /// Core search result
    pub pitch: PitchResult,
    /// Whitened residual over the whole analysis buffer
    pub residual: Vec<f32>,
    /// Short-term prediction gain of the whitening filter
    pub pred_gain: f32,
}

/// Complexity-dependent knobs of the pitch estimator
pub fn pitch_estimation_setup(complexity: usize) -> (usize, f32) {
    // (whitening LPC order, stage-1 threshold)
    match complexity {
        0 | 1 => (8, 0.80),
        2..=6 => (12, 0.76),
        _ => (16, 0.70),
    }
}

/// Estimate per-subframe pitch lags from the history buffer
///
/// `x_buf` holds `ltp_mem + frame + la_pitch` samples at the full rate.
/// Returns the lags plus the whitened residual over the same span.
pub fn find_pitch_lags(
    x_buf: &[f32],
    fs_khz: usize,
    nb_subfr: usize,
    complexity: usize,
    speech_activity_q8: i32,
    input_tilt_q15: i32,
    prev_signal_type: SignalType,
    prev_lag: i32,
    prev_ltp_corr: f32,
    first_frame_after_reset: bool,
) -> PitchLagResult {
    let la_pitch = LA_PITCH_MS * fs_khz;
    let frame_length = nb_subfr * SUB_FRAME_LENGTH_MS * fs_khz;
    let ltp_mem_length = LTP_MEM_LENGTH_MS * fs_khz;
    let buf_len = la_pitch + frame_length + ltp_mem_length;
    debug_assert!(x_buf.len() >= buf_len);

    let win_ms = if nb_subfr == MAX_NB_SUBFR {
        FIND_PITCH_LPC_WIN_MS
    } else {
        FIND_PITCH_LPC_WIN_MS_2_SF
    };
    let win_length = win_ms * fs_khz;
    let (lpc_order, thres1) = pitch_estimation_setup(complexity);

    // Asymmetric window over the tail of the buffer: rising flank, flat
    // middle, falling flank, both flanks of la_pitch length
    let win_start = buf_len - win_length;
    let mut w_sig = vec![0.0f32; win_length];
    apply_sine_window(&mut w_sig[..la_pitch], &x_buf[win_start..], 1, la_pitch);
    let flat_len = win_length - (la_pitch << 1);
    w_sig[la_pitch..la_pitch + flat_len]
        .copy_from_slice(&x_buf[win_start + la_pitch..win_start + la_pitch + flat_len]);
    apply_sine_window(
        &mut w_sig[la_pitch + flat_len..],
        &x_buf[win_start + la_pitch + flat_len..],
        2,
        la_pitch,
    );

    // Autocorrelation with white noise floor
    let mut auto_corr = [0.0f32; MAX_FIND_PITCH_LPC_ORDER + 1];
    autocorrelation(&mut auto_corr, &w_sig, lpc_order);
    auto_corr[0] += auto_corr[0] * FIND_PITCH_WHITE_NOISE_FRACTION + 1.0;

    // Schur and step-up to prediction coefficients, then chirp
    let mut refl = [0.0f32; MAX_FIND_PITCH_LPC_ORDER];
    let res_nrg = schur(&mut refl, &auto_corr, lpc_order);
    let pred_gain = auto_corr[0] / res_nrg.max(1.0);
    let mut a = [0.0f32; MAX_FIND_PITCH_LPC_ORDER];
    k2a(&mut a, &refl, lpc_order);
    bwexpander_f32(&mut a, lpc_order, FIND_PITCH_BANDWIDTH_EXPANSION);

    // Whiten the full buffer
    let mut residual = vec![0.0f32; buf_len];
    lpc_analysis_filter(&mut residual, &a[..lpc_order], &x_buf[..buf_len], lpc_order);

    // Decision thresholds
    let mut thres2 = 0.6f32;
    thres2 -= 0.004 * lpc_order as f32;
    thres2 -= 0.1 * speech_activity_q8 as f32 / 256.0;
    thres2 += 0.15 * (prev_signal_type.index() >> 1) as f32;
    thres2 -= 0.1 * input_tilt_q15 as f32 / 32_768.0;
    if first_frame_after_reset {
        thres2 += 0.1;
    }

    let pitch = pitch_analysis_core(
        &residual,
        fs_khz,
        nb_subfr,
        complexity,
        thres1,
        thres2,
        prev_lag,
        prev_ltp_corr,
    );

    PitchLagResult {
        pitch,
        residual,
        pred_gain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf_with_period(fs_khz: usize, nb_subfr: usize, period: usize, amp: f32) -> Vec<f32> {
        let len = (LA_PITCH_MS + LTP_MEM_LENGTH_MS + nb_subfr * SUB_FRAME_LENGTH_MS) * fs_khz;
        (0..len)
            .map(|i| {
                let ph = 2.0 * std::f32::consts::PI * i as f32 / period as f32;
                amp * (ph.sin() + 0.4 * (2.0 * ph).sin())
            })
            .collect()
    }

    #[test]
    fn test_silence_unvoiced_zero_residual() {
        let x = vec![0.0f32; (LA_PITCH_MS + LTP_MEM_LENGTH_MS + 20) * 16];
        let r = find_pitch_lags(&x, 16, 4, 8, 0, 0, SignalType::Inactive, 0, 0.0, true);
        assert!(!r.pitch.voiced);
        assert!(r.residual.iter().all(|&v| v.abs() < 1e-6));
    }

    #[test]
    fn test_voiced_tone_detected() {
        // 16 kHz, 200 Hz fundamental with a harmonic
        let x = buf_with_period(16, 4, 80, 3000.0);
        let r = find_pitch_lags(&x, 16, 4, 8, 240, 0, SignalType::Voiced, 0, 0.0, false);
        assert!(r.pitch.voiced);
        assert!(r.pred_gain > 1.0);
        for k in 0..4 {
            assert!(
                (r.pitch.pitch_lags[k] - 80).abs() <= 4,
                "lag {}",
                r.pitch.pitch_lags[k]
            );
        }
    }
}
