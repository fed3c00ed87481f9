//! LPC analysis filtering (float path)

/// Filter `x` through the prediction-error filter given by `a`
///
/// `out[n] = x[n] - sum_k a[k] * x[n - 1 - k]`; the first `order` output
/// samples carry no valid prediction and are set to zero, as the analysis
/// stages expect.
pub fn lpc_analysis_filter(out: &mut [f32], a: &[f32], x: &[f32], order: usize) {
    debug_assert!(out.len() >= x.len());
    debug_assert!(x.len() > order);
    for n in 0..order {
        out[n] = 0.0;
    }
    for n in order..x.len() {
        let mut pred = 0.0f32;
        for k in 0..order {
            pred += a[k] * x[n - 1 - k];
        }
        out[n] = x[n] - pred;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictor_zero_residual() {
        // x[n] = 0.5 x[n-1], a = [0.5]: residual exactly zero after warmup
        let mut x = vec![0.0f32; 50];
        x[0] = 1.0;
        for n in 1..50 {
            x[n] = 0.5 * x[n - 1];
        }
        let a = [0.5f32];
        let mut res = vec![0.0f32; 50];
        lpc_analysis_filter(&mut res, &a, &x, 1);
        for n in 1..50 {
            assert!(res[n].abs() < 1e-6, "res[{}] = {}", n, res[n]);
        }
    }

    #[test]
    fn test_zero_predictor_passthrough() {
        let x: Vec<f32> = (0..32).map(|i| i as f32).collect();
        let a = [0.0f32; 4];
        let mut res = vec![0.0f32; 32];
        lpc_analysis_filter(&mut res, &a, &x, 4);
        assert_eq!(&res[..4], &[0.0; 4]);
        assert_eq!(&res[4..], &x[4..]);
    }

    #[test]
    fn test_analysis_synthesis_round_trip() {
        // Synthesis with the same coefficients undoes the analysis filter
        let x: Vec<f32> = (0..200)
            .map(|i| (i as f32 * 0.13).sin() + 0.5 * (i as f32 * 0.29).sin())
            .collect();
        let a = [0.8f32, -0.3, 0.1, -0.05];
        let order = 4;
        let mut res = vec![0.0f32; 200];
        lpc_analysis_filter(&mut res, &a, &x, order);

        let mut y = vec![0.0f32; 200];
        y[..order].copy_from_slice(&x[..order]);
        for n in order..200 {
            let mut pred = 0.0f32;
            for k in 0..order {
                pred += a[k] * y[n - 1 - k];
            }
            y[n] = res[n] + pred;
        }
        for n in order..200 {
            assert!((y[n] - x[n]).abs() < 1e-3, "sample {}: {} vs {}", n, y[n], x[n]);
        }
    }
}
