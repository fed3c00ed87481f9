//! Noise shaping analysis and gain processing
//!
//! Produces everything the noise-shaping quantizer consumes: warped AR
//! shaping coefficients, low-frequency and harmonic shaping, tilt,
//! subframe gains with their quantization indices, the quantization offset
//! type, and the rate-distortion weight lambda.

mod gain_quant;
mod noise_shape_analysis;
mod process_gains;

pub use gain_quant::{gains_dequant, gains_quant};
pub use noise_shape_analysis::{noise_shape_analysis, ShapeParams, ShapeSmoothState};
pub use process_gains::{process_gains, ProcessedGains};

/// Quantization offsets by (signal type class, offset type), Q10:
/// inactive/unvoiced row first, then the voiced row with smaller offsets
pub const QUANTIZATION_OFFSETS_Q10: [[i16; 2]; 2] = [[100, 240], [32, 100]];
