//! Delayed-decision quantization of the NLSF residual
//!
//! Quantizes the backward prediction-residual chain of one stage-1
//! survivor with up to four parallel states. Each coefficient (walked from
//! last to first) expands every state with the two nearest quantization
//! levels; once the state count is full, dominated states are pruned by
//! pairwise min/max comparison. Rate and distortion accumulate in Q25.

use crate::basic_ops::{smulbb, Word32};
use crate::constants::{
    NLSF_QUANT_DEL_DEC_STATES, NLSF_QUANT_LEVEL_ADJ_Q10, NLSF_QUANT_MAX_AMPLITUDE,
    NLSF_QUANT_MAX_AMPLITUDE_EXT,
};

const STATES: usize = NLSF_QUANT_DEL_DEC_STATES;
const STATES_LOG2: usize = 2;
/// Rate of the first escape symbol, Q5
const ESCAPE_RATE_Q5: i32 = 280;
/// Extra rate per extension step, Q5
const EXT_STEP_RATE_Q5: i32 = 43;

/// Quantize the weighted residual `x_q10` with delayed decision
///
/// Writes the chosen quantization indices and returns the minimum
/// rate-distortion cost in Q25.
pub fn nlsf_del_dec_quant(
    indices: &mut [i8],
    x_q10: &[i16],
    w_q5: &[i16],
    pred_coef_q8: &[u8],
    ec_ix: &[usize],
    ec_rates_q5: &[i16],
    quant_step_size_q16: i32,
    inv_quant_step_size_q6: i32,
    mu_q20: i32,
    order: usize,
) -> i32 {
    // Precompute the dequantized outputs of every level and its upper
    // neighbour, with the level adjustment pulling magnitudes toward zero
    let mut out0_q10_table = [0i32; 2 * NLSF_QUANT_MAX_AMPLITUDE_EXT as usize];
    let mut out1_q10_table = [0i32; 2 * NLSF_QUANT_MAX_AMPLITUDE_EXT as usize];
    for i in -NLSF_QUANT_MAX_AMPLITUDE_EXT..NLSF_QUANT_MAX_AMPLITUDE_EXT {
        let mut out0 = i << 10;
        let mut out1 = out0 + 1024;
        if i > 0 {
            out0 -= NLSF_QUANT_LEVEL_ADJ_Q10;
            out1 -= NLSF_QUANT_LEVEL_ADJ_Q10;
        } else if i == 0 {
            out1 -= NLSF_QUANT_LEVEL_ADJ_Q10;
        } else if i == -1 {
            out0 += NLSF_QUANT_LEVEL_ADJ_Q10;
        } else {
            out0 += NLSF_QUANT_LEVEL_ADJ_Q10;
            out1 += NLSF_QUANT_LEVEL_ADJ_Q10;
        }
        let slot = (i + NLSF_QUANT_MAX_AMPLITUDE_EXT) as usize;
        out0_q10_table[slot] = smulbb(out0, quant_step_size_q16) >> 16;
        out1_q10_table[slot] = smulbb(out1, quant_step_size_q16) >> 16;
    }

    let mut n_states = 1usize;
    let mut rd_q25 = [0 as Word32; 2 * STATES];
    let mut prev_out_q10 = [0i32; 2 * STATES];
    let mut ind = [[0i8; 16]; STATES];
    let mut ind_sort = [0usize; STATES];

    let mut i = order as i32 - 1;
    loop {
        let iu = i as usize;
        let rates = &ec_rates_q5[ec_ix[iu]..];
        let in_q10 = x_q10[iu] as i32;
        for j in 0..n_states {
            let pred_q10 = smulbb(pred_coef_q8[iu] as i32, prev_out_q10[j]) >> 8;
            let res_q10 = in_q10 - pred_q10;
            let mut ind_tmp = smulbb(inv_quant_step_size_q6, res_q10) >> 16;
            ind_tmp = ind_tmp.clamp(-NLSF_QUANT_MAX_AMPLITUDE_EXT, NLSF_QUANT_MAX_AMPLITUDE_EXT - 1);
            ind[j][iu] = ind_tmp as i8;

            // Outputs for ind_tmp and ind_tmp + 1
            let slot = (ind_tmp + NLSF_QUANT_MAX_AMPLITUDE_EXT) as usize;
            let out0_q10 = out0_q10_table[slot] + pred_q10;
            let out1_q10 = out1_q10_table[slot] + pred_q10;
            prev_out_q10[j] = out0_q10;
            prev_out_q10[j + n_states] = out1_q10;

            // Rates, with the escape/extension ramp outside the base range
            let (rate0_q5, rate1_q5);
            if ind_tmp + 1 >= NLSF_QUANT_MAX_AMPLITUDE {
                if ind_tmp + 1 == NLSF_QUANT_MAX_AMPLITUDE {
                    rate0_q5 = rates[(ind_tmp + NLSF_QUANT_MAX_AMPLITUDE) as usize] as i32;
                    rate1_q5 = ESCAPE_RATE_Q5;
                } else {
                    rate0_q5 = ESCAPE_RATE_Q5 - EXT_STEP_RATE_Q5 * NLSF_QUANT_MAX_AMPLITUDE
                        + EXT_STEP_RATE_Q5 * ind_tmp;
                    rate1_q5 = rate0_q5 + EXT_STEP_RATE_Q5;
                }
            } else if ind_tmp <= -NLSF_QUANT_MAX_AMPLITUDE {
                if ind_tmp == -NLSF_QUANT_MAX_AMPLITUDE {
                    rate0_q5 = ESCAPE_RATE_Q5;
                    rate1_q5 = rates[(ind_tmp + 1 + NLSF_QUANT_MAX_AMPLITUDE) as usize] as i32;
                } else {
                    rate0_q5 = ESCAPE_RATE_Q5 - EXT_STEP_RATE_Q5 * NLSF_QUANT_MAX_AMPLITUDE
                        - EXT_STEP_RATE_Q5 * ind_tmp;
                    rate1_q5 = rate0_q5 - EXT_STEP_RATE_Q5;
                }
            } else {
                rate0_q5 = rates[(ind_tmp + NLSF_QUANT_MAX_AMPLITUDE) as usize] as i32;
                rate1_q5 = rates[(ind_tmp + 1 + NLSF_QUANT_MAX_AMPLITUDE) as usize] as i32;
            }

            let rd_tmp_q25 = rd_q25[j];
            let diff0_q10 = in_q10 - out0_q10;
            rd_q25[j] = rd_tmp_q25
                .wrapping_add((diff0_q10 * diff0_q10).wrapping_mul(w_q5[iu] as i32))
                + smulbb(mu_q20, rate0_q5);
            let diff1_q10 = in_q10 - out1_q10;
            rd_q25[j + n_states] = rd_tmp_q25
                .wrapping_add((diff1_q10 * diff1_q10).wrapping_mul(w_q5[iu] as i32))
                + smulbb(mu_q20, rate1_q5);
        }

        if n_states <= STATES / 2 {
            // Double the number of states, the upper half taking ind + 1
            for j in 0..n_states {
                ind[j + n_states][iu] = ind[j][iu] + 1;
            }
            n_states <<= 1;
            for j in n_states..STATES {
                ind[j][iu] = ind[j - n_states][iu];
            }
        } else if i > 0 {
            // Pair lower and upper halves, keep per-pair min in the lower slot
            let mut rd_min_q25 = [0i32; STATES];
            let mut rd_max_q25 = [0i32; STATES];
            for j in 0..STATES {
                if rd_q25[j] > rd_q25[j + STATES] {
                    rd_max_q25[j] = rd_q25[j];
                    rd_min_q25[j] = rd_q25[j + STATES];
                    rd_q25.swap(j, j + STATES);
                    prev_out_q10.swap(j, j + STATES);
                    ind_sort[j] = j + STATES;
                } else {
                    rd_min_q25[j] = rd_q25[j];
                    rd_max_q25[j] = rd_q25[j + STATES];
                    ind_sort[j] = j;
                }
            }
            // Eliminate dominated survivors: while some pair's max beats
            // another pair's min, replace the loser
            loop {
                let mut min_max_q25 = i32::MAX;
                let mut max_min_q25 = 0;
                let mut ind_min_max = 0usize;
                let mut ind_max_min = 0usize;
                for j in 0..STATES {
                    if min_max_q25 > rd_max_q25[j] {
                        min_max_q25 = rd_max_q25[j];
                        ind_min_max = j;
                    }
                    if max_min_q25 < rd_min_q25[j] {
                        max_min_q25 = rd_min_q25[j];
                        ind_max_min = j;
                    }
                }
                if min_max_q25 >= max_min_q25 {
                    break;
                }
                ind_sort[ind_max_min] = ind_sort[ind_min_max] ^ STATES;
                rd_q25[ind_max_min] = rd_q25[ind_min_max + STATES];
                prev_out_q10[ind_max_min] = prev_out_q10[ind_min_max + STATES];
                rd_min_q25[ind_max_min] = 0;
                rd_max_q25[ind_min_max] = i32::MAX;
                ind[ind_max_min] = ind[ind_min_max];
            }
            // Increment the index of states that came from the upper half
            for j in 0..STATES {
                ind[j][iu] += (ind_sort[j] >> STATES_LOG2) as i8;
            }
        } else {
            break;
        }

        if i == 0 {
            break;
        }
        i -= 1;
    }

    // Winner among all live hypotheses
    let mut win = 0usize;
    let mut min_q25 = i32::MAX;
    for j in 0..2 * n_states {
        if rd_q25[j] < min_q25 {
            min_q25 = rd_q25[j];
            win = j;
        }
    }
    for j in 0..order {
        indices[j] = ind[win & (STATES - 1)][j];
        debug_assert!(indices[j] >= -NLSF_QUANT_MAX_AMPLITUDE_EXT as i8);
        debug_assert!(indices[j] <= NLSF_QUANT_MAX_AMPLITUDE_EXT as i8);
    }
    indices[0] += (win >> STATES_LOG2) as i8;
    debug_assert!(indices[0] <= NLSF_QUANT_MAX_AMPLITUDE_EXT as i8);
    debug_assert!(min_q25 >= 0);
    min_q25
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::nlsf::NLSF_CB_NB_MB;

    fn run(x_q10: &[i16]) -> ([i8; 10], i32) {
        let cb = &NLSF_CB_NB_MB;
        let mut ec_ix = [0usize; 16];
        let mut pred = [0u8; 16];
        cb.unpack(0, &mut ec_ix, &mut pred);
        let w_q5 = [32i16; 10];
        let mut indices = [0i8; 10];
        let rd = nlsf_del_dec_quant(
            &mut indices,
            x_q10,
            &w_q5,
            &pred,
            &ec_ix,
            cb.ec_rates_q5,
            cb.quant_step_size_q16,
            cb.inv_quant_step_size_q6,
            1 << 14,
            10,
        );
        (indices, rd)
    }

    #[test]
    fn test_zero_residual_zero_indices() {
        let (indices, rd) = run(&[0i16; 10]);
        assert_eq!(indices, [0i8; 10]);
        assert!(rd >= 0);
    }

    #[test]
    fn test_large_residual_nonzero_indices() {
        let x = [800i16; 10];
        let (indices, _) = run(&x);
        assert!(indices.iter().any(|&v| v != 0));
        for &v in &indices {
            assert!(v.abs() <= NLSF_QUANT_MAX_AMPLITUDE_EXT as i8);
        }
    }

    #[test]
    fn test_rd_grows_with_residual() {
        let (_, rd_small) = run(&[50i16; 10]);
        let (_, rd_large) = run(&[2000i16; 10]);
        assert!(rd_large > rd_small);
    }
}
