//! # SILK-Core: SILK Speech Codec Analysis and Quantization Core
//!
//! A production-oriented implementation of the SILK encoder core specified by
//! RFC 6716 (the SILK half of Opus): the full analysis-and-quantization
//! pipeline that converts time-domain speech into the SILK index and pulse
//! stream, ready for range coding.
//!
//! ## Pipeline
//!
//! - **Pitch analysis**: three-stage coarse-to-fine open-loop pitch search
//!   with LPC whitening (4 kHz → 8 kHz → full rate)
//! - **LTP analysis**: 5-tap long-term predictor estimation and codebook
//!   quantization over three periodicity-indexed codebooks
//! - **LPC/NLSF analysis**: Burg's modified method, NLSF conversion and
//!   interpolation, multi-stage vector quantization with delayed decision
//! - **Noise-shape analysis**: warped AR shaping, low-frequency and harmonic
//!   shaping, tilt, and subframe gain quantization
//! - **Noise-shaping quantization (NSQ)**: single-state and delayed-decision
//!   excitation quantizers producing the shell-coded pulse stream
//!
//! The numerical contracts of every stage (Qn fixed-point scaling, rounding
//! policy, accumulation precision) follow the canonical SILK reference so
//! that a conforming decoder reconstructs the signal without divergence.
//!
//! ## Usage
//!
//! ```rust
//! use silk_core::encoder::SilkEncoder;
//! use silk_core::types::{Bandwidth, FrameDuration};
//! use silk_core::bitstream::BufferRangeEncoder;
//!
//! let mut encoder = SilkEncoder::new(Bandwidth::Wideband, FrameDuration::Ms20)?;
//! encoder.set_bitrate(24_000)?;
//! encoder.set_complexity(8)?;
//!
//! // One 20 ms frame at 16 kHz = 320 samples in [-1.0, 1.0]
//! let pcm = vec![0.0f32; 320];
//! let mut range_coder = BufferRangeEncoder::new();
//! let status = encoder.encode_frame(&pcm, &mut range_coder)?;
//! assert!(status.warnings.is_empty());
//! # Ok::<(), silk_core::error::SilkError>(())
//! ```
//!
//! ## Boundaries
//!
//! Range coding itself, packet framing, stereo mixing, resampling, and voice
//! activity detection are external collaborators. The crate speaks to the
//! range coder through the [`bitstream::RangeEncoder`] trait and consumes VAD
//! results through [`types::VadState`].
//!
//! ## Threading
//!
//! The core is strictly single-threaded per encoder instance. All ROM tables
//! are `const` data; any number of encoder instances may run on separate
//! threads with no shared mutable state.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod basic_ops;
pub mod bitstream;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod math;
pub mod nlsf;
pub mod nsq;
pub mod pitch;
pub mod prediction;
pub mod shape;
pub mod tables;
pub mod types;

// Re-export commonly used types and traits
pub use bitstream::{BufferRangeEncoder, RangeEncoder};
pub use encoder::SilkEncoder;
pub use error::{Result, SilkError};
pub use types::{Bandwidth, EncodeStatus, FrameDuration, SignalType, VadState};

#[cfg(test)]
mod tests;

/// Version information for the codec core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// SILK-internal sample rates recognized by the core, in Hz
pub const SUPPORTED_SAMPLE_RATES: &[u32] = &[8_000, 12_000, 16_000];

/// Initialize the codec core
///
/// Installs a default `tracing` subscriber if none is active. All lookup
/// tables are compile-time constants, so no further setup is required; the
/// function is safe to call multiple times.
pub fn init() {
    let _ = tracing_subscriber::fmt::try_init();
    tracing::info!("SILK-Core v{} initialized", VERSION);
    tracing::info!("Supported sample rates: {:?} Hz", SUPPORTED_SAMPLE_RATES);
}
