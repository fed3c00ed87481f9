//! NLSF MSVQ encoding
//!
//! Stage 1 ranks the codebook vectors by weighted absolute predictive
//! error and keeps the best survivors; stage 2 runs the delayed-decision
//! residual quantizer on each survivor with weights adapted to that
//! vector; the winner minimizes distortion plus `mu`-weighted rate
//! including the stage-1 entropy cost. The chosen indices are immediately
//! decoded so the caller continues with the decoder's NLSF vector.

use crate::basic_ops::{div32_varq, lin2log, smulbb};
use crate::constants::MAX_NLSF_MSVQ_SURVIVORS;
use crate::nlsf::{nlsf_decode, nlsf_del_dec_quant, nlsf_stabilize};
use crate::tables::nlsf::NlsfCodebook;

/// Weighted absolute predictive quantizer error of every stage-1 vector
fn nlsf_vq(err_q24: &mut [i32], nlsf_q15: &[i16], cb: &NlsfCodebook) {
    debug_assert_eq!(cb.order & 1, 0);
    for i in 0..cb.n_vectors {
        let cb_row = &cb.cb1_q8[i * cb.order..(i + 1) * cb.order];
        let w_row = &cb.cb1_wght_q9[i * cb.order..(i + 1) * cb.order];
        let mut sum_error_q24 = 0i32;
        let mut pred_q24 = 0i32;
        for m in (0..cb.order).rev() {
            let diff_q15 = nlsf_q15[m] as i32 - ((cb_row[m] as i32) << 7);
            let diffw_q24 = smulbb(diff_q15, w_row[m] as i32);
            sum_error_q24 += (diffw_q24 - (pred_q24 >> 1)).abs();
            pred_q24 = diffw_q24;
        }
        err_q24[i] = sum_error_q24;
    }
}

/// Partial insertion sort: indices of the `k` smallest values, ascending
fn insertion_sort_increasing(values: &[i32], k: usize) -> Vec<usize> {
    let mut best: Vec<usize> = (0..k.min(values.len())).collect();
    best.sort_unstable_by_key(|&i| values[i]);
    for i in k..values.len() {
        if values[i] < values[best[k - 1]] {
            best[k - 1] = i;
            let mut j = k - 1;
            while j > 0 && values[best[j]] < values[best[j - 1]] {
                best.swap(j, j - 1);
                j -= 1;
            }
        }
    }
    best
}

/// Encode an NLSF vector with the multi-stage quantizer
///
/// On return `nlsf_q15` holds the decoded (reconstructed) vector and
/// `indices` the stage-1 index plus residual indices. Returns the winning
/// rate-distortion cost in Q25.
pub fn nlsf_encode(
    indices: &mut [i8],
    nlsf_q15: &mut [i16],
    cb: &NlsfCodebook,
    w_q2: &[i16],
    mu_q20: i32,
    n_survivors: usize,
    voiced: bool,
) -> i32 {
    let n_survivors = n_survivors.clamp(1, MAX_NLSF_MSVQ_SURVIVORS.min(cb.n_vectors));
    nlsf_stabilize(nlsf_q15, cb.delta_min_q15, cb.order);

    // First stage: rank codebook vectors
    let mut err_q24 = vec![0i32; cb.n_vectors];
    nlsf_vq(&mut err_q24, nlsf_q15, cb);
    let survivors = insertion_sort_increasing(&err_q24, n_survivors);

    // Second stage on each survivor
    let mut best_rd_q25 = i32::MAX;
    let mut best_survivor = 0usize;
    let mut best_res_indices = [0i8; 16];
    let mut res_q10 = [0i16; 16];
    let mut w_adj_q5 = [0i16; 16];
    let mut ec_ix = [0usize; 16];
    let mut pred_q8 = [0u8; 16];
    let mut try_indices = [0i8; 16];

    for &ind1 in &survivors {
        let cb_row = &cb.cb1_q8[ind1 * cb.order..(ind1 + 1) * cb.order];
        let w_row = &cb.cb1_wght_q9[ind1 * cb.order..(ind1 + 1) * cb.order];
        for i in 0..cb.order {
            // Residual in the weighted domain
            let diff_q15 = nlsf_q15[i] as i32 - ((cb_row[i] as i32) << 7);
            res_q10[i] = (smulbb(diff_q15, w_row[i] as i32) >> 14) as i16;
            // Adapt the error weights to the codebook weighting
            w_adj_q5[i] = div32_varq(
                w_q2[i] as i32,
                smulbb(w_row[i] as i32, w_row[i] as i32),
                21,
            ) as i16;
        }

        cb.unpack(ind1, &mut ec_ix, &mut pred_q8);
        let mut rd_q25 = nlsf_del_dec_quant(
            &mut try_indices,
            &res_q10,
            &w_adj_q5,
            &pred_q8,
            &ec_ix,
            cb.ec_rates_q5,
            cb.quant_step_size_q16,
            cb.inv_quant_step_size_q6,
            mu_q20,
            cb.order,
        );

        // Add the stage-1 entropy cost
        let icdf = cb.cb1_icdf(voiced);
        let prob_q8 = if ind1 == 0 {
            256 - icdf[0] as i32
        } else {
            icdf[ind1 - 1] as i32 - icdf[ind1] as i32
        };
        let bits_q7 = (8 << 7) - lin2log(prob_q8.max(1));
        rd_q25 += smulbb(bits_q7, mu_q20 >> 2);

        if rd_q25 < best_rd_q25 {
            best_rd_q25 = rd_q25;
            best_survivor = ind1;
            best_res_indices = try_indices;
        }
    }

    indices[0] = best_survivor as i8;
    indices[1..=cb.order].copy_from_slice(&best_res_indices[..cb.order]);

    // Decode the winner so downstream stages match the decoder
    nlsf_decode(nlsf_q15, indices, cb);
    best_rd_q25
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlsf::nlsf_vq_weights_laroia;
    use crate::tables::nlsf::{NLSF_CB_NB_MB, NLSF_CB_WB};

    fn encode_one(cb: &'static NlsfCodebook, nlsf_in: &[i16]) -> (Vec<i8>, Vec<i16>) {
        let mut nlsf = nlsf_in.to_vec();
        let mut w_q2 = vec![0i16; cb.order];
        nlsf_vq_weights_laroia(&mut w_q2, &nlsf, cb.order);
        let mut indices = vec![0i8; cb.order + 1];
        nlsf_encode(&mut indices, &mut nlsf, cb, &w_q2, 1 << 14, 4, true);
        (indices, nlsf)
    }

    #[test]
    fn test_codebook_vector_encodes_to_itself() {
        let cb = &NLSF_CB_NB_MB;
        let ind1 = 5usize;
        let nlsf_in: Vec<i16> = cb.cb1_q8[ind1 * 10..(ind1 + 1) * 10]
            .iter()
            .map(|&v| ((v as i32) << 7) as i16)
            .collect();
        let (indices, nlsf_out) = encode_one(cb, &nlsf_in);
        // Residuals essentially zero, reconstruction close to input
        for i in 0..10 {
            assert!((nlsf_out[i] as i32 - nlsf_in[i] as i32).abs() < 300, "coef {}", i);
        }
        assert!(indices[1..].iter().all(|&r| r.abs() <= 1));
    }

    #[test]
    fn test_output_monotone_and_spaced() {
        let cb = &NLSF_CB_WB;
        let nlsf_in: Vec<i16> = (0..16).map(|i| (1500 + i * 1900) as i16).collect();
        let (_, nlsf_out) = encode_one(cb, &nlsf_in);
        for i in 1..16 {
            assert!(
                nlsf_out[i] as i32 - nlsf_out[i - 1] as i32 >= cb.delta_min_q15[i] as i32,
                "spacing at {}",
                i
            );
        }
    }

    #[test]
    fn test_more_survivors_never_worse() {
        let cb = &NLSF_CB_NB_MB;
        let nlsf_in: Vec<i16> = (0..10).map(|i| (2500 + i * 2800) as i16).collect();
        let mut rd = Vec::new();
        for surv in [1usize, 4, 16] {
            let mut nlsf = nlsf_in.clone();
            let mut w_q2 = vec![0i16; 10];
            nlsf_vq_weights_laroia(&mut w_q2, &nlsf, 10);
            let mut indices = vec![0i8; 11];
            rd.push(nlsf_encode(&mut indices, &mut nlsf, cb, &w_q2, 1 << 14, surv, false));
        }
        assert!(rd[1] <= rd[0]);
        assert!(rd[2] <= rd[1]);
    }
}
