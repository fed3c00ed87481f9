//! LPC estimation with NLSF interpolation search
//!
//! Burg's method over the LTP residual of the whole frame; for 20 ms
//! frames at sufficient complexity, a second Burg pass over the last half
//! searches interpolation factors between the previous frame's NLSF vector
//! and the new one, keeping the factor whose two-half residual energy
//! beats the full-frame solution.

use crate::constants::MAX_LPC_ORDER;
use crate::math::{burg_modified, energy};
use crate::nlsf::{a2nlsf_flp, nlsf2a};
use crate::prediction::lpc_analysis_filter;

/// Outcome of the LPC analysis
#[derive(Debug, Clone)]
pub struct LpcResult {
    /// NLSF vector of the frame (second half when interpolating), Q15
    pub nlsf_q15: [i16; MAX_LPC_ORDER],
    /// Interpolation factor in Q2; 4 disables interpolation
    pub interp_index_q2: i8,
    /// Residual energy of the winning configuration
    pub res_nrg: f32,
}

/// Interpolate two NLSF vectors with factor `k/4`
pub fn interpolate_nlsf(
    out: &mut [i16],
    nlsf0: &[i16],
    nlsf1: &[i16],
    k_q2: i32,
    order: usize,
) {
    debug_assert!((0..=4).contains(&k_q2));
    for i in 0..order {
        out[i] = (nlsf0[i] as i32 + ((k_q2 * (nlsf1[i] as i32 - nlsf0[i] as i32)) >> 2)) as i16;
    }
}

/// Estimate the frame's LPC and NLSF representation
///
/// `x` holds `nb_subfr` blocks of `subfr_length + order` samples (the LTP
/// residual with per-subframe pre-roll). `prev_nlsf_q15` is the previous
/// frame's quantized NLSF vector for the interpolation search.
pub fn find_lpc(
    x: &[f32],
    subfr_length_with_order: usize,
    nb_subfr: usize,
    order: usize,
    min_inv_gain: f64,
    use_interpolated_nlsfs: bool,
    first_frame_after_reset: bool,
    prev_nlsf_q15: &[i16],
) -> LpcResult {
    let mut a = [0.0f32; MAX_LPC_ORDER];
    let mut result = LpcResult {
        nlsf_q15: [0i16; MAX_LPC_ORDER],
        interp_index_q2: 4,
        res_nrg: 0.0,
    };

    // Burg over the whole frame
    let mut res_nrg = burg_modified(
        &mut a,
        x,
        min_inv_gain,
        subfr_length_with_order,
        nb_subfr,
        order,
    );

    if use_interpolated_nlsfs && !first_frame_after_reset && nb_subfr == 4 {
        // Burg over the second half; its residual energy is subtracted so
        // the interpolation candidates compete on the first half only
        let mut a_tmp = [0.0f32; MAX_LPC_ORDER];
        let half = &x[2 * subfr_length_with_order..];
        res_nrg -= burg_modified(
            &mut a_tmp,
            half,
            min_inv_gain,
            subfr_length_with_order,
            2,
            order,
        );

        a2nlsf_flp(&mut result.nlsf_q15, &a_tmp[..order], order);

        // Search interpolation factors, coarse to fine, stopping once the
        // energies start climbing again
        let mut res_nrg_2nd = f32::MAX;
        let mut nlsf0 = [0i16; MAX_LPC_ORDER];
        let mut a_q12 = [0i16; MAX_LPC_ORDER];
        let mut lpc_res = vec![0.0f32; 2 * subfr_length_with_order];
        for k in (0..=3).rev() {
            interpolate_nlsf(&mut nlsf0, prev_nlsf_q15, &result.nlsf_q15, k, order);

            // Residual energy with interpolated coefficients on the first
            // two subframes
            nlsf2a(&mut a_q12, &nlsf0[..order], order);
            let a_interp: Vec<f32> = a_q12[..order].iter().map(|&v| v as f32 / 4096.0).collect();
            lpc_analysis_filter(
                &mut lpc_res,
                &a_interp,
                &x[..2 * subfr_length_with_order],
                order,
            );
            let res_nrg_interp = (energy(&lpc_res[order..subfr_length_with_order])
                + energy(
                    &lpc_res[order + subfr_length_with_order..2 * subfr_length_with_order],
                )) as f32;

            if res_nrg_interp < res_nrg {
                res_nrg = res_nrg_interp;
                result.interp_index_q2 = k as i8;
            } else if res_nrg_interp > res_nrg_2nd {
                // Energies will keep climbing
                break;
            }
            res_nrg_2nd = res_nrg_interp;
        }
    }

    if result.interp_index_q2 == 4 {
        // Interpolation off: NLSFs from the full-frame coefficients
        a2nlsf_flp(&mut result.nlsf_q15, &a[..order], order);
    }
    result.res_nrg = res_nrg.max(0.0);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ar1_signal(len: usize, pole: f32) -> Vec<f32> {
        let mut x = vec![0.0f32; len];
        let mut state = 100.0f32;
        let mut seed = 22_222u32;
        for v in x.iter_mut() {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let noise = ((seed >> 16) as i16 as f32) / 64.0;
            state = pole * state + noise;
            *v = state;
        }
        x
    }

    #[test]
    fn test_stationary_signal_no_interpolation_win() {
        // Same statistics in both halves: full-frame fit stays competitive
        let x = ar1_signal(4 * 90, 0.8);
        let prev = [1000i16; MAX_LPC_ORDER];
        let r = find_lpc(&x, 90, 4, 10, 1e-4, true, false, &prev);
        for i in 1..10 {
            assert!(r.nlsf_q15[i] > r.nlsf_q15[i - 1], "NLSF order at {}", i);
        }
        assert!(r.res_nrg >= 0.0);
    }

    #[test]
    fn test_interpolation_disabled_paths() {
        let x = ar1_signal(2 * 90, 0.8);
        let prev = [1000i16; MAX_LPC_ORDER];
        // 10 ms frames never interpolate
        let r = find_lpc(&x, 90, 2, 10, 1e-4, true, false, &prev);
        assert_eq!(r.interp_index_q2, 4);
        // Neither does the first frame after reset
        let x4 = ar1_signal(4 * 90, 0.8);
        let r = find_lpc(&x4, 90, 4, 10, 1e-4, true, true, &prev);
        assert_eq!(r.interp_index_q2, 4);
    }

    #[test]
    fn test_interp_index_in_range() {
        // Changing statistics between halves invites interpolation
        let mut x = ar1_signal(2 * 90, 0.5);
        x.extend(ar1_signal(2 * 90, 0.95));
        let mut prev = [0i16; MAX_LPC_ORDER];
        for i in 0..10 {
            prev[i] = (2900 * (i as i32 + 1)) as i16;
        }
        let r = find_lpc(&x, 90, 4, 10, 1e-4, true, false, &prev);
        assert!((0..=4).contains(&r.interp_index_q2));
    }
}
