//! Autocorrelation estimators
//!
//! Plain autocorrelation for the whitening and pitch LPC stages, and the
//! warped variant used by noise-shape analysis. The warped version runs the
//! input through a chain of first-order allpass sections with the warping
//! coefficient before correlating, which concentrates spectral resolution
//! at low frequencies the way the shaping filter needs it.

use super::inner_product::inner_product;
use crate::constants::MAX_SHAPE_LPC_ORDER;

/// Autocorrelation of `x` up to `order` lags (inclusive of lag 0)
///
/// `results[k] = sum_i x[i] * x[i - k]`, each lag accumulated with the
/// fixed-order inner product kernel.
pub fn autocorrelation(results: &mut [f32], x: &[f32], order: usize) {
    debug_assert!(results.len() > order);
    for k in 0..=order {
        results[k] = inner_product(&x[k..], &x[..x.len() - k]) as f32;
    }
}

/// Warped autocorrelation of `x` up to `order` lags
///
/// `warping` is the first-order allpass coefficient; `order` must be even.
/// State flows through a lattice of `order` allpass sections, accumulating
/// the correlations in float64 as the reference does.
pub fn warped_autocorrelation(corr: &mut [f32], x: &[f32], warping: f32, order: usize) {
    debug_assert!(order <= MAX_SHAPE_LPC_ORDER);
    debug_assert_eq!(order & 1, 0);

    let mut state = [0.0f64; MAX_SHAPE_LPC_ORDER + 1];
    let mut c = [0.0f64; MAX_SHAPE_LPC_ORDER + 1];
    let warping = warping as f64;

    for &sample in x {
        let mut tmp1 = sample as f64;
        // Loop over allpass sections, two at a time
        let mut i = 0;
        while i < order {
            let tmp2 = state[i] + warping * (state[i + 1] - tmp1);
            state[i] = tmp1;
            c[i] += state[0] * tmp1;
            let next = state[i + 1] + warping * (state[i + 2] - tmp2);
            state[i + 1] = tmp2;
            c[i + 1] += state[0] * tmp2;
            tmp1 = next;
            i += 2;
        }
        state[order] = tmp1;
        c[order] += state[0] * tmp1;
    }

    for k in 0..=order {
        corr[k] = c[k] as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autocorrelation_lag_zero_is_energy() {
        let x: Vec<f32> = (0..160).map(|i| (i as f32 * 0.21).sin()).collect();
        let mut r = [0.0f32; 17];
        autocorrelation(&mut r, &x, 16);
        let e: f32 = x.iter().map(|v| v * v).sum();
        assert!((r[0] - e).abs() / e < 1e-4);
        for k in 1..=16 {
            assert!(r[k].abs() <= r[0] * 1.0001, "lag {} exceeds energy", k);
        }
    }

    #[test]
    fn test_warped_reduces_to_plain_at_zero_warping() {
        let x: Vec<f32> = (0..120).map(|i| (i as f32 * 0.37).sin()).collect();
        let mut plain = [0.0f32; 9];
        let mut warped = [0.0f32; 9];
        autocorrelation(&mut plain, &x, 8);
        warped_autocorrelation(&mut warped, &x, 0.0, 8);
        for k in 0..=8 {
            let denom = plain[0].max(1.0);
            assert!(
                (plain[k] - warped[k]).abs() / denom < 1e-4,
                "lag {}: {} vs {}",
                k,
                plain[k],
                warped[k]
            );
        }
    }
}
