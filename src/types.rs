//! Core types for the SILK encoder
//!
//! Public configuration and result types, plus the per-frame signal
//! classification shared by every pipeline stage.

use crate::constants::{MAX_NB_SUBFR, SUB_FRAME_LENGTH_MS};
use crate::error::SilkError;

/// SILK-internal audio bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    /// 8 kHz sampling
    Narrowband,
    /// 12 kHz sampling
    Mediumband,
    /// 16 kHz sampling
    Wideband,
}

impl Bandwidth {
    /// Sample rate in Hz
    #[inline]
    pub const fn sample_rate(self) -> u32 {
        match self {
            Self::Narrowband => 8_000,
            Self::Mediumband => 12_000,
            Self::Wideband => 16_000,
        }
    }

    /// Sample rate in kHz (samples per millisecond)
    #[inline]
    pub const fn fs_khz(self) -> usize {
        match self {
            Self::Narrowband => 8,
            Self::Mediumband => 12,
            Self::Wideband => 16,
        }
    }

    /// LPC order: 10 at 8/12 kHz, 16 at 16 kHz
    #[inline]
    pub const fn lpc_order(self) -> usize {
        match self {
            Self::Wideband => 16,
            _ => 10,
        }
    }

    /// Noise shaping AR order: 12 at narrowband, 16 otherwise
    #[inline]
    pub const fn shape_lpc_order(self) -> usize {
        match self {
            Self::Narrowband => 12,
            _ => 16,
        }
    }
}

/// Frame duration: 10 ms (2 subframes) or 20 ms (4 subframes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDuration {
    /// 10 ms framing
    Ms10,
    /// 20 ms framing
    Ms20,
}

impl FrameDuration {
    /// Number of 5 ms subframes
    #[inline]
    pub const fn nb_subfr(self) -> usize {
        match self {
            Self::Ms10 => 2,
            Self::Ms20 => MAX_NB_SUBFR,
        }
    }

    /// Frame length in milliseconds
    #[inline]
    pub const fn ms(self) -> usize {
        self.nb_subfr() * SUB_FRAME_LENGTH_MS
    }
}

/// Per-frame signal classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalType {
    /// No speech activity
    #[default]
    Inactive = 0,
    /// Active but aperiodic
    Unvoiced = 1,
    /// Active and periodic; the LTP path is engaged
    Voiced = 2,
}

impl SignalType {
    /// Index used by signal-type conditioned tables
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for voiced frames
    #[inline]
    pub const fn is_voiced(self) -> bool {
        matches!(self, Self::Voiced)
    }
}

/// Voice activity information supplied by the external VAD
#[derive(Debug, Clone, Copy)]
pub struct VadState {
    /// Speech activity in Q8, 0..=256
    pub speech_activity_q8: i32,
    /// Input spectral tilt in Q15
    pub input_tilt_q15: i32,
    /// Per-band input quality in Q15, low to high
    pub quality_bands_q15: [i32; 4],
}

impl Default for VadState {
    fn default() -> Self {
        Self {
            speech_activity_q8: 0,
            input_tilt_q15: 0,
            quality_bands_q15: [1 << 14; 4],
        }
    }
}

/// Non-fatal conditions reported alongside an encoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeWarning {
    /// The range coder consumed more bits than the frame's target
    BitsExceeded,
    /// FEC was requested but the frame did not qualify for LBRR
    LbrrSkipped,
}

/// Result of encoding one frame
#[derive(Debug, Clone)]
pub struct EncodeStatus {
    /// Signal classification the encoder settled on
    pub signal_type: SignalType,
    /// Pitch lags per subframe (zeros when not voiced)
    pub pitch_lags: [i32; MAX_NB_SUBFR],
    /// Bits consumed by the frame, in Q3 (eighth-bit) resolution
    pub bits_used_q3: u32,
    /// Non-fatal conditions observed during the encode
    pub warnings: Vec<EncodeWarning>,
    /// True when an LBRR payload was produced for this frame
    pub lbrr_encoded: bool,
    /// The LBRR payload symbols, when produced
    pub lbrr_payload: Option<bytes::Bytes>,
}

impl EncodeStatus {
    pub(crate) fn new(signal_type: SignalType) -> Self {
        Self {
            signal_type,
            pitch_lags: [0; MAX_NB_SUBFR],
            bits_used_q3: 0,
            warnings: Vec::new(),
            lbrr_encoded: false,
            lbrr_payload: None,
        }
    }
}

/// Validate a PCM frame against the configured layout
pub(crate) fn check_frame_length(
    pcm: &[f32],
    bandwidth: Bandwidth,
    duration: FrameDuration,
) -> Result<(), SilkError> {
    let expected = bandwidth.fs_khz() * duration.ms();
    if pcm.len() != expected {
        return Err(SilkError::InvalidFrameSize {
            expected,
            actual: pcm.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bandwidth_parameters() {
        assert_eq!(Bandwidth::Narrowband.sample_rate(), 8_000);
        assert_eq!(Bandwidth::Mediumband.lpc_order(), 10);
        assert_eq!(Bandwidth::Wideband.lpc_order(), 16);
        assert_eq!(Bandwidth::Narrowband.shape_lpc_order(), 12);
        assert_eq!(Bandwidth::Wideband.shape_lpc_order(), 16);
    }

    #[test]
    fn test_frame_duration() {
        assert_eq!(FrameDuration::Ms10.nb_subfr(), 2);
        assert_eq!(FrameDuration::Ms20.nb_subfr(), 4);
        assert_eq!(FrameDuration::Ms20.ms(), 20);
    }

    #[test]
    fn test_signal_type_indices() {
        assert_eq!(SignalType::Inactive.index(), 0);
        assert_eq!(SignalType::Unvoiced.index(), 1);
        assert_eq!(SignalType::Voiced.index(), 2);
        assert!(SignalType::Voiced.is_voiced());
        assert!(!SignalType::Unvoiced.is_voiced());
    }

    #[test]
    fn test_frame_length_check() {
        let pcm = vec![0.0f32; 320];
        assert!(check_frame_length(&pcm, Bandwidth::Wideband, FrameDuration::Ms20).is_ok());
        assert!(check_frame_length(&pcm, Bandwidth::Narrowband, FrameDuration::Ms20).is_err());
        assert!(check_frame_length(&pcm, Bandwidth::Wideband, FrameDuration::Ms10).is_err());
    }
}
