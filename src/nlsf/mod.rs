//! NLSF processing: conversion, stabilization, and quantization
//!
//! LPC coefficients travel through the normalized line spectral frequency
//! domain for quantization: `a2nlsf` finds the roots, the stabilizer
//! enforces ordering and minimum spacing, the MSVQ encoder picks a stage-1
//! vector plus residual indices with a four-state delayed-decision search,
//! and `nlsf2a` reconstructs the Q12 prediction filter the decoder will
//! use.

mod a2nlsf;
mod decode;
mod del_dec_quant;
mod encode;
mod nlsf2a;
mod stabilize;
mod vq_weights;

pub use a2nlsf::{a2nlsf, a2nlsf_flp};
pub use decode::nlsf_decode;
pub use del_dec_quant::nlsf_del_dec_quant;
pub use encode::nlsf_encode;
pub use nlsf2a::nlsf2a;
pub use stabilize::nlsf_stabilize;
pub use vq_weights::nlsf_vq_weights_laroia;
