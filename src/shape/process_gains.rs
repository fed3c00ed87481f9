//! Gain post-processing and rate-distortion weighting
//!
//! Reduces voiced gains according to the LTP prediction gain, soft-limits
//! the quantized signal magnitude against the SNR target, selects the
//! quantizer offset type, and computes lambda for the NSQ search.

use crate::constants::MAX_NB_SUBFR;
use crate::math::sigmoid;
use crate::shape::{ShapeParams, QUANTIZATION_OFFSETS_Q10};
use crate::types::SignalType;

const LAMBDA_OFFSET: f32 = 1.2;
const LAMBDA_SPEECH_ACT: f32 = -0.2;
const LAMBDA_DELAYED_DECISIONS: f32 = -0.05;
const LAMBDA_INPUT_QUALITY: f32 = -0.1;
const LAMBDA_CODING_QUALITY: f32 = -0.2;
const LAMBDA_QUANT_OFFSET: f32 = 0.8;

/// Output of the gain processing
#[derive(Debug, Clone)]
pub struct ProcessedGains {
    /// Subframe gains, Q16
    pub gains_q16: [i32; MAX_NB_SUBFR],
    /// Quantization offset type (0 or 1)
    pub quant_offset_type: u8,
    /// Rate-distortion weight, Q10
    pub lambda_q10: i32,
}

/// Finalize the subframe gains and derive the NSQ tuning parameters
pub fn process_gains(
    shape: &ShapeParams,
    signal_type: SignalType,
    nb_subfr: usize,
    subfr_length: usize,
    ltp_pred_cod_gain_db: f32,
    input_tilt_q15: i32,
    speech_activity_q8: i32,
    snr_db_q7: i32,
    n_states_delayed_decision: usize,
    unvoiced_quant_offset: u8,
) -> ProcessedGains {
    let mut gains = [0.0f32; MAX_NB_SUBFR];
    gains[..nb_subfr].copy_from_slice(&shape.gains[..nb_subfr]);

    // Voiced gain reduction driven by the LTP prediction gain
    if signal_type.is_voiced() {
        let s = -0.5 * sigmoid(0.25 * (ltp_pred_cod_gain_db - 12.0));
        for g in gains.iter_mut().take(nb_subfr) {
            *g *= 1.0 + s;
        }
    }

    // Soft limit on the ratio of residual energy and squared gains
    let snr_db = snr_db_q7 as f32 / 128.0;
    let inv_max_sqr_val = (2.0f32).powf(0.33 * (21.0 - snr_db)) / subfr_length as f32;
    let mut gains_q16 = [0i32; MAX_NB_SUBFR];
    for k in 0..nb_subfr {
        let g = (gains[k] * gains[k] + shape.res_nrg[k] * inv_max_sqr_val).sqrt();
        let g = g.clamp(1.0, 32_767.0);
        gains_q16[k] = (g * 65_536.0) as i32;
    }

    // Quantizer offset: smaller offset for well-predicted voiced frames
    let quant_offset_type = if signal_type.is_voiced() {
        if ltp_pred_cod_gain_db + input_tilt_q15 as f32 / 32_768.0 > 1.0 {
            0
        } else {
            1
        }
    } else {
        unvoiced_quant_offset & 1
    };

    // Rate-distortion weight, bounded away from zero
    let quant_offset = QUANTIZATION_OFFSETS_Q10[usize::from(signal_type.is_voiced())]
        [quant_offset_type as usize] as f32
        / 1024.0;
    let lambda = LAMBDA_OFFSET
        + LAMBDA_DELAYED_DECISIONS * n_states_delayed_decision as f32
        + LAMBDA_SPEECH_ACT * speech_activity_q8 as f32 / 256.0
        + LAMBDA_INPUT_QUALITY * shape.input_quality
        + LAMBDA_CODING_QUALITY * shape.coding_quality
        + LAMBDA_QUANT_OFFSET * quant_offset;
    let lambda_q10 = ((lambda * 1024.0) as i32).max(32);

    ProcessedGains {
        gains_q16,
        quant_offset_type,
        lambda_q10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_shape() -> ShapeParams {
        let mut s = ShapeParams::default();
        s.gains = [1000.0; MAX_NB_SUBFR];
        s.res_nrg = [1_000_000.0; MAX_NB_SUBFR];
        s
    }

    #[test]
    fn test_voiced_high_pred_gain_reduces_gains() {
        let shape = base_shape();
        let strong = process_gains(&shape, SignalType::Voiced, 4, 80, 20.0, 0, 200, 21 << 7, 4, 0);
        let weak = process_gains(&shape, SignalType::Voiced, 4, 80, 0.0, 0, 200, 21 << 7, 4, 0);
        assert!(strong.gains_q16[0] < weak.gains_q16[0]);
    }

    #[test]
    fn test_quant_offset_rules() {
        let shape = base_shape();
        let p = process_gains(&shape, SignalType::Voiced, 4, 80, 5.0, 0, 200, 21 << 7, 4, 1);
        assert_eq!(p.quant_offset_type, 0);
        let p = process_gains(&shape, SignalType::Voiced, 4, 80, 0.5, 0, 200, 21 << 7, 4, 1);
        assert_eq!(p.quant_offset_type, 1);
        // Unvoiced follows the proposal
        let p = process_gains(&shape, SignalType::Unvoiced, 4, 80, 0.0, 0, 200, 21 << 7, 4, 1);
        assert_eq!(p.quant_offset_type, 1);
    }

    #[test]
    fn test_lambda_positive_and_bounded() {
        let shape = base_shape();
        let p = process_gains(&shape, SignalType::Voiced, 4, 80, 10.0, 0, 256, 40 << 7, 4, 0);
        assert!(p.lambda_q10 >= 32);
        assert!(p.lambda_q10 < 3 << 10);
    }

    #[test]
    fn test_gains_clamped_to_int16_domain() {
        let mut shape = base_shape();
        shape.gains = [100_000.0; MAX_NB_SUBFR];
        let p = process_gains(&shape, SignalType::Unvoiced, 4, 80, 0.0, 0, 200, 21 << 7, 1, 0);
        for k in 0..4 {
            assert!(p.gains_q16[k] <= 32_767 * 65_536);
            assert!(p.gains_q16[k] >= 65_536);
        }
    }
}
