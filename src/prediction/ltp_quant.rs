//! LTP vector quantization
//!
//! Rate-distortion search over the three periodicity-indexed codebooks.
//! The correlations arrive as floats and are scaled to Q17; each codebook
//! entry's residual energy comes from the symmetric quadratic form
//! `1 - 2 b'xX + b'XX b`, translated to bits under the high-rate
//! assumption, with a penalty for exceeding the remaining gain budget of
//! the saturating sum-log-gain accumulator.

use crate::basic_ops::{lin2log, log2lin, mla, smlawb, smulbb};
use crate::constants::{LTP_ORDER, MAX_NB_SUBFR, MAX_SUM_LOG_GAIN_DB};
use crate::tables::ltp::*;

/// Safety margin subtracted from the gain budget, Q7
const GAIN_SAFETY_Q7: i32 = 51; // 0.4

/// Result of the LTP quantization
#[derive(Debug, Clone, Default)]
pub struct LtpQuantResult {
    /// Chosen periodicity bin
    pub periodicity_index: i8,
    /// Per-subframe codebook indices
    pub cbk_index: [i8; MAX_NB_SUBFR],
    /// Quantized filter taps, Q14
    pub b_q14: [[i16; LTP_ORDER]; MAX_NB_SUBFR],
    /// LTP prediction gain in dB, Q7
    pub pred_gain_db_q7: i32,
    /// Updated sum-of-log-gains accumulator, Q7
    pub sum_log_gain_q7: i32,
}

/// Search one codebook for the entry minimizing the subframe cost
///
/// Returns (index, residual energy Q15 incl. penalty, rate-distortion Q8,
/// entry gain Q7).
fn vq_wmat_ec(
    xx_q17: &[i32; LTP_ORDER * LTP_ORDER],
    x_x_q17: &[i32; LTP_ORDER],
    cb_q7: &[[i8; 5]],
    cb_gain_q7: &[u8],
    cl_q5: &[i16],
    subfr_len: usize,
    max_gain_q7: i32,
) -> (i8, i32, i32, i32) {
    let mut best_rate_dist_q8 = i32::MAX;
    let mut best_res_nrg_q15 = i32::MAX;
    let mut best_ind = 0i8;
    let mut best_gain_q7 = 0i32;

    for (k, row) in cb_q7.iter().enumerate() {
        let gain_tmp_q7 = cb_gain_q7[k] as i32;

        // Penalty for exceeding the gain budget
        let penalty = (gain_tmp_q7 - max_gain_q7).max(0) << 11;

        // Quantization error: 1 - 2 xX'b + b'XX b, evaluated row by row
        // using the matrix symmetry
        let mut sum1_q15 = 32_801; // 1.001 in Q15
        for i in 0..LTP_ORDER {
            let mut sum2_q24 = -x_x_q17[i];
            for j in i + 1..LTP_ORDER {
                sum2_q24 = mla(sum2_q24, xx_q17[i * LTP_ORDER + j], row[j] as i32);
            }
            sum2_q24 <<= 1;
            sum2_q24 = mla(sum2_q24, xx_q17[i * LTP_ORDER + i], row[i] as i32);
            sum1_q15 = smlawb(sum1_q15, sum2_q24, row[i] as i32);
        }

        if sum1_q15 >= 0 {
            // 6 dB per bit under the high-rate assumption
            let bits_res_q8 = smulbb(
                subfr_len as i32,
                lin2log(sum1_q15.saturating_add(penalty)) - (15 << 7),
            );
            // Codelength component reduced by half
            let bits_tot_q8 = bits_res_q8 + ((cl_q5[k] as i32) << 2);
            if bits_tot_q8 <= best_rate_dist_q8 {
                best_rate_dist_q8 = bits_tot_q8;
                best_res_nrg_q15 = sum1_q15.saturating_add(penalty);
                best_ind = k as i8;
                best_gain_q7 = gain_tmp_q7;
            }
        }
    }
    (best_ind, best_res_nrg_q15, best_rate_dist_q8, best_gain_q7)
}

/// Quantize the LTP coefficients of all subframes
///
/// `xx`/`x_x` are the normalized correlations from [`super::find_ltp`];
/// `sum_log_gain_q7` carries the gain budget across frames.
pub fn quant_ltp_gains(
    xx: &[[f32; LTP_ORDER * LTP_ORDER]; MAX_NB_SUBFR],
    x_x: &[[f32; LTP_ORDER]; MAX_NB_SUBFR],
    subfr_len: usize,
    nb_subfr: usize,
    sum_log_gain_q7: i32,
) -> LtpQuantResult {
    // Scale the normalized correlations to Q17
    let mut xx_q17 = [[0i32; LTP_ORDER * LTP_ORDER]; MAX_NB_SUBFR];
    let mut x_x_q17 = [[0i32; LTP_ORDER]; MAX_NB_SUBFR];
    for k in 0..nb_subfr {
        for (dst, &src) in xx_q17[k].iter_mut().zip(xx[k].iter()) {
            *dst = (src as f64 * 131_072.0).round() as i32;
        }
        for (dst, &src) in x_x_q17[k].iter_mut().zip(x_x[k].iter()) {
            *dst = (src as f64 * 131_072.0).round() as i32;
        }
    }

    let mut out = LtpQuantResult {
        sum_log_gain_q7,
        ..Default::default()
    };
    let mut min_rate_dist_q8 = i32::MAX;
    let mut best_sum_log_gain_q7 = sum_log_gain_q7;
    let mut best_res_nrg_q15 = i32::MAX;

    for bin in 0..NB_LTP_CBKS {
        let cb = ltp_filter_cb(bin);
        let gains = LTP_FILTER_GAIN_Q7[bin];
        let rates = LTP_FILTER_RATES_Q5[bin];

        let mut temp_idx = [0i8; MAX_NB_SUBFR];
        let mut sum_log_gain_tmp_q7 = sum_log_gain_q7;
        let mut rate_dist_q8 = 0i32;
        let mut res_nrg_q15 = 0i32;
        for j in 0..nb_subfr {
            // Remaining gain budget for this subframe
            let max_gain_q7 = log2lin(
                ((MAX_SUM_LOG_GAIN_DB * 128) / 6 - sum_log_gain_tmp_q7) + (7 << 7),
            ) - GAIN_SAFETY_Q7;
            let (idx, res_nrg_sub, rate_dist_sub, gain_q7) = vq_wmat_ec(
                &xx_q17[j],
                &x_x_q17[j],
                cb,
                gains,
                rates,
                subfr_len,
                max_gain_q7,
            );
            temp_idx[j] = idx;
            res_nrg_q15 = res_nrg_q15.saturating_add(res_nrg_sub).max(0);
            rate_dist_q8 = rate_dist_q8.saturating_add(rate_dist_sub);
            sum_log_gain_tmp_q7 =
                (sum_log_gain_tmp_q7 + lin2log(gain_q7 + 1) - (7 << 7)).max(0);
        }

        if rate_dist_q8 <= min_rate_dist_q8 {
            min_rate_dist_q8 = rate_dist_q8;
            out.periodicity_index = bin as i8;
            out.cbk_index[..nb_subfr].copy_from_slice(&temp_idx[..nb_subfr]);
            best_sum_log_gain_q7 = sum_log_gain_tmp_q7;
            best_res_nrg_q15 = res_nrg_q15;
        }
    }

    // Expand the winning entries to Q14 taps
    let cb = ltp_filter_cb(out.periodicity_index as usize);
    for j in 0..nb_subfr {
        for k in 0..LTP_ORDER {
            out.b_q14[j][k] = (cb[out.cbk_index[j] as usize][k] as i16) << 7;
        }
    }
    out.sum_log_gain_q7 = best_sum_log_gain_q7;
    // 3 dB per halving of residual energy relative to unity
    out.pred_gain_db_q7 = smulbb(-3, lin2log(best_res_nrg_q15.max(1)) - (15 << 7));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlations_for_gain(g: f32) -> ([[f32; 25]; 4], [[f32; 5]; 4]) {
        // Diagonal XX, center-tap-only xX: ideal single-tap predictor of
        // gain g at the center position
        let mut xx = [[0.0f32; 25]; 4];
        let mut x_x = [[0.0f32; 5]; 4];
        for k in 0..4 {
            for i in 0..5 {
                xx[k][i * 5 + i] = 0.3;
            }
            x_x[k][2] = 0.3 * g;
        }
        (xx, x_x)
    }

    #[test]
    fn test_strong_periodicity_picks_high_gain_bin() {
        let (xx, x_x) = correlations_for_gain(0.9);
        let r = quant_ltp_gains(&xx, &x_x, 80, 4, 0);
        // High-gain entries live in the upper bins
        assert!(r.periodicity_index >= 1, "bin {}", r.periodicity_index);
        // Center tap dominates the chosen vectors
        for j in 0..4 {
            let taps = r.b_q14[j];
            assert!(taps[2] >= *taps.iter().max().unwrap() - 1);
        }
        assert!(r.pred_gain_db_q7 > 0);
    }

    #[test]
    fn test_weak_periodicity_low_gain() {
        let (xx, x_x) = correlations_for_gain(0.05);
        let r = quant_ltp_gains(&xx, &x_x, 80, 4, 0);
        let gain_sum: i32 = r.b_q14[0].iter().map(|&t| t as i32).sum();
        assert!(gain_sum < (80 << 7), "taps {:?}", r.b_q14[0]);
    }

    #[test]
    fn test_sum_log_gain_non_negative_and_bounded() {
        let (xx, x_x) = correlations_for_gain(0.9);
        let mut acc = 0i32;
        for _ in 0..50 {
            let r = quant_ltp_gains(&xx, &x_x, 80, 4, acc);
            acc = r.sum_log_gain_q7;
            assert!(acc >= 0);
        }
        // Accumulator saturates around (250/6) * 128
        assert!(acc <= (MAX_SUM_LOG_GAIN_DB * 128) / 6 + (8 << 7));
    }

    #[test]
    fn test_zero_correlations_zero_result() {
        let xx = [[0.0f32; 25]; 4];
        let x_x = [[0.0f32; 5]; 4];
        let r = quant_ltp_gains(&xx, &x_x, 80, 2, 0);
        // Lowest-gain entries selected everywhere
        let gain_sum: i32 = r.b_q14[0].iter().map(|&t| t as i32).sum();
        assert!(gain_sum <= 46 << 7);
    }
}
