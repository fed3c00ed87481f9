//! LTP coefficient estimation
//!
//! Builds, per subframe, the 5x5 correlation matrix of lag-shifted residual
//! vectors and their cross-correlation with the target, using the
//! symmetric incremental update that avoids recomputing full inner
//! products for the off-diagonals. Both are normalized by the regularized
//! target energy before quantization.

use crate::constants::{LTP_ORDER, MAX_NB_SUBFR};
use crate::math::{energy, inner_product};

/// Upper bound on the normalized LTP correlation used in the regularizer
const LTP_CORR_INV_MAX: f32 = 0.03;

/// Correlation matrix of the lagged basis vectors
///
/// `x` points such that `x[order-1]` is the first sample of column 0; the
/// first column is computed by inner product, subsequent diagonals by
/// edge updates.
fn corr_matrix(xx: &mut [f32], x: &[f32], base: usize, l: usize, order: usize) {
    // Diagonal
    let mut nrg = energy(&x[base..base + l]);
    xx[0] = nrg as f32;
    for j in 1..order {
        nrg += (x[base - j] as f64) * (x[base - j] as f64)
            - (x[base + l - j] as f64) * (x[base + l - j] as f64);
        xx[j * order + j] = nrg as f32;
    }
    // Off-diagonals, updated along each sub-diagonal
    for lag in 1..order {
        let mut e = inner_product(&x[base..base + l], &x[base - lag..base - lag + l]);
        xx[lag * order] = e as f32;
        xx[lag] = e as f32;
        for j in 1..order - lag {
            e += (x[base - j] as f64) * (x[base - lag - j] as f64)
                - (x[base + l - j] as f64) * (x[base + l - lag - j] as f64);
            xx[(lag + j) * order + j] = e as f32;
            xx[j * order + lag + j] = e as f32;
        }
    }
}

/// Cross-correlation of the lagged basis vectors with the target
fn corr_vector(xt: &mut [f32], x: &[f32], base: usize, t: usize, l: usize, order: usize) {
    for lag in 0..order {
        xt[lag] = inner_product(&x[base - lag..base - lag + l], &x[t..t + l]) as f32;
    }
}

/// Estimate normalized LTP correlations for all subframes
///
/// `residual` is the whitened buffer from the pitch search; `res_offset`
/// the index of the first sample of the first subframe. Outputs one 25-
/// entry matrix and one 5-entry vector per subframe.
pub fn find_ltp(
    xx: &mut [[f32; LTP_ORDER * LTP_ORDER]; MAX_NB_SUBFR],
    x_x: &mut [[f32; LTP_ORDER]; MAX_NB_SUBFR],
    residual: &[f32],
    res_offset: usize,
    lags: &[i32],
    subfr_length: usize,
    nb_subfr: usize,
) {
    for k in 0..nb_subfr {
        let target = res_offset + k * subfr_length;
        let lag_base = target as i32 - lags[k] - (LTP_ORDER as i32 / 2);
        if lag_base < LTP_ORDER as i32 - 1 {
            // Degenerate layout: leave this subframe zeroed
            xx[k] = [0.0; LTP_ORDER * LTP_ORDER];
            x_x[k] = [0.0; LTP_ORDER];
            continue;
        }
        // lag_base points at the first sample of basis column 0 minus
        // (order-1); the matrix helpers index columns backwards from it
        let base = lag_base as usize + LTP_ORDER - 1;
        corr_matrix(&mut xx[k], residual, base, subfr_length, LTP_ORDER);
        corr_vector(&mut x_x[k], residual, base, target, subfr_length, LTP_ORDER);

        // Regularized normalization
        let e = energy(&residual[target..target + subfr_length + LTP_ORDER]) as f32;
        let denom = e.max(LTP_CORR_INV_MAX * 0.5 * (xx[k][0] + xx[k][24]) + 1.0);
        let scale = 1.0 / denom;
        for v in xx[k].iter_mut() {
            *v *= scale;
        }
        for v in x_x[k].iter_mut() {
            *v *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_residual_high_correlation() {
        // Residual with period 64: the center tap correlation dominates
        let len = 640;
        let res: Vec<f32> = (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * i as f32 / 64.0).sin())
            .collect();
        let mut xx = [[0.0f32; 25]; 4];
        let mut x_x = [[0.0f32; 5]; 4];
        find_ltp(&mut xx, &mut x_x, &res, 320, &[64, 64, 64, 64], 80, 4);
        for k in 0..4 {
            // Center tap (index 2) carries the periodicity
            assert!(x_x[k][2] > 0.3, "subframe {}: {:?}", k, x_x[k]);
            // Matrix is symmetric
            for i in 0..5 {
                for j in 0..5 {
                    let d = (xx[k][i * 5 + j] - xx[k][j * 5 + i]).abs();
                    assert!(d < 1e-4, "asymmetry at {} {} {}", k, i, j);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_lag_zeroed() {
        let res = vec![1.0f32; 200];
        let mut xx = [[9.0f32; 25]; 4];
        let mut x_x = [[9.0f32; 5]; 4];
        // Lag larger than available history
        find_ltp(&mut xx, &mut x_x, &res, 40, &[300, 300], 80, 2);
        assert_eq!(x_x[0], [0.0; 5]);
        assert_eq!(xx[0][0], 0.0);
    }

    #[test]
    fn test_normalization_bounds_values() {
        let res: Vec<f32> = (0..640).map(|i| ((i * 37) % 101) as f32 - 50.0).collect();
        let mut xx = [[0.0f32; 25]; 4];
        let mut x_x = [[0.0f32; 5]; 4];
        find_ltp(&mut xx, &mut x_x, &res, 320, &[70, 75, 72, 68], 80, 4);
        for k in 0..4 {
            for &v in &xx[k] {
                assert!(v.abs() < 40.0);
            }
        }
    }
}
