//! Floating-point analysis kernels
//!
//! The analysis half of the encoder runs in float32 with float64
//! accumulation, mirroring the reference signal-processing routines. The
//! inner-product and energy kernels fix the reduction order (four parallel
//! float64 accumulators over float32 lanes) so results are reproducible
//! across builds; callers must not replace them with fused reductions.

mod autocorrelation;
mod burg;
mod inner_product;
mod schur;
mod sine_window;
mod bwexpander;

pub use autocorrelation::{autocorrelation, warped_autocorrelation};
pub use burg::burg_modified;
pub use bwexpander::{bwexpander_f32, bwexpander_q16};
pub use inner_product::{energy, inner_product};
pub use schur::{k2a, schur};
pub use sine_window::apply_sine_window;

/// Logistic sigmoid `1 / (1 + e^-x)`
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// log2 of a positive float
#[inline]
pub fn log2(x: f64) -> f64 {
    x.log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_limits() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(20.0) > 0.999);
        assert!(sigmoid(-20.0) < 0.001);
    }
}
