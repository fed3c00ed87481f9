//! SILK encoder: state, control surface, and per-frame pipeline
//!
//! [`SilkEncoder`] owns all persistent state (sample history, NLSF memory,
//! gain accumulators, NSQ delay lines, shape smoothers, pitch history)
//! and exposes the idempotent control setters. Each `encode_frame` call
//! runs the full analysis-and-quantization pipeline synchronously and
//! drives the supplied range coder.

mod control;
mod frame;

use crate::constants::*;
use crate::error::{Result, SilkError};
use crate::nsq::NsqState;
use crate::shape::ShapeSmoothState;
use crate::types::{Bandwidth, FrameDuration, SignalType, VadState};

/// Maximum history buffer length: LTP memory + frame + shape look-ahead at
/// the highest internal rate
const X_BUF_LENGTH: usize =
    (LTP_MEM_LENGTH_MS + MAX_NB_SUBFR * SUB_FRAME_LENGTH_MS + LA_SHAPE_MS) * MAX_FS_KHZ;

/// Complexity-dependent mode settings
#[derive(Debug, Clone, Copy)]
pub(crate) struct ComplexityMode {
    pub n_states_delayed_decision: usize,
    pub nlsf_msvq_survivors: usize,
    pub use_interpolated_nlsfs: bool,
    pub warping_enabled: bool,
}

pub(crate) fn complexity_mode(complexity: u8) -> ComplexityMode {
    ComplexityMode {
        n_states_delayed_decision: match complexity {
            0 | 1 => 1,
            2 | 3 => 2,
            4 | 5 => 3,
            _ => MAX_DEL_DEC_STATES,
        },
        nlsf_msvq_survivors: match complexity {
            0 | 1 => 2,
            2 | 3 => 3,
            4 | 5 => 4,
            6 | 7 => 6,
            8 | 9 => 8,
            _ => 16,
        },
        use_interpolated_nlsfs: complexity >= 4,
        warping_enabled: complexity >= 3,
    }
}

/// SILK encoder instance for one mono stream
#[derive(Debug)]
pub struct SilkEncoder {
    // Configuration
    pub(crate) bandwidth: Bandwidth,
    pub(crate) duration: FrameDuration,
    pub(crate) bitrate: u32,
    pub(crate) complexity: u8,
    pub(crate) snr_db_q7: i32,
    pub(crate) vbr: bool,
    pub(crate) use_cbr: bool,
    pub(crate) fec_enabled: bool,
    pub(crate) packet_loss_percent: i32,
    pub(crate) vad: VadState,

    // Persistent inter-frame state
    pub(crate) x_buf: [f32; X_BUF_LENGTH],
    pub(crate) prev_nlsf_q15: [i16; MAX_LPC_ORDER],
    pub(crate) prev_gain_index: i8,
    pub(crate) prev_lag: i32,
    pub(crate) prev_signal_type: SignalType,
    pub(crate) prev_ltp_corr: f32,
    pub(crate) sum_log_gain_q7: i32,
    pub(crate) shape_smooth: ShapeSmoothState,
    pub(crate) nsq: NsqState,
    pub(crate) first_frame_after_reset: bool,
    pub(crate) frame_counter: u32,
    pub(crate) ec_prev_lag_index: i16,
    pub(crate) ec_prev_signal_type: SignalType,
    pub(crate) bits_exceeded_q3: i64,
}

impl SilkEncoder {
    /// Create an encoder for the given bandwidth and frame duration
    pub fn new(bandwidth: Bandwidth, duration: FrameDuration) -> Result<Self> {
        let mut enc = Self {
            bandwidth,
            duration,
            bitrate: 25_000,
            complexity: 8,
            snr_db_q7: 21 << 7,
            vbr: true,
            use_cbr: false,
            fec_enabled: false,
            packet_loss_percent: 0,
            vad: VadState::default(),
            x_buf: [0.0; X_BUF_LENGTH],
            prev_nlsf_q15: [0; MAX_LPC_ORDER],
            prev_gain_index: 0,
            prev_lag: 0,
            prev_signal_type: SignalType::Inactive,
            prev_ltp_corr: 0.0,
            sum_log_gain_q7: 0,
            shape_smooth: ShapeSmoothState::default(),
            nsq: NsqState::new(),
            first_frame_after_reset: true,
            frame_counter: 0,
            ec_prev_lag_index: 0,
            ec_prev_signal_type: SignalType::Inactive,
            bits_exceeded_q3: 0,
        };
        enc.reset();
        tracing::debug!(
            "Creating SILK encoder: {}Hz, {} ms frames",
            bandwidth.sample_rate(),
            duration.ms()
        );
        Ok(enc)
    }

    /// Reset all inter-frame state; idempotent
    pub fn reset(&mut self) {
        self.x_buf = [0.0; X_BUF_LENGTH];
        // Neutral NLSF memory: uniformly spaced
        let order = self.bandwidth.lpc_order();
        let step = (32_768 / (order as i32 + 1)) as i16;
        for i in 0..order {
            self.prev_nlsf_q15[i] = step * (i as i16 + 1);
        }
        self.prev_gain_index = 0;
        self.prev_lag = 0;
        self.prev_signal_type = SignalType::Inactive;
        self.prev_ltp_corr = 0.0;
        self.sum_log_gain_q7 = 0;
        self.shape_smooth.reset();
        self.nsq.reset();
        self.first_frame_after_reset = true;
        self.frame_counter = 0;
        self.ec_prev_lag_index = 0;
        self.ec_prev_signal_type = SignalType::Inactive;
        self.bits_exceeded_q3 = 0;
        tracing::debug!("SILK encoder reset");
    }

    /// Sample rate in kHz
    #[inline]
    pub(crate) fn fs_khz(&self) -> usize {
        self.bandwidth.fs_khz()
    }

    /// Frame length in samples
    #[inline]
    pub(crate) fn frame_length(&self) -> usize {
        self.fs_khz() * self.duration.ms()
    }

    /// Subframe length in samples
    #[inline]
    pub(crate) fn subfr_length(&self) -> usize {
        SUB_FRAME_LENGTH_MS * self.fs_khz()
    }

    /// LTP memory length in samples
    #[inline]
    pub(crate) fn ltp_mem_length(&self) -> usize {
        LTP_MEM_LENGTH_MS * self.fs_khz()
    }

    /// Validate an input frame against the configuration
    pub(crate) fn check_input(&self, pcm: &[f32]) -> Result<()> {
        crate::types::check_frame_length(pcm, self.bandwidth, self.duration)?;
        // Allow a little inter-sample headroom beyond +/-1.0
        if pcm.iter().any(|v| !v.is_finite() || v.abs() > 2.0) {
            return Err(SilkError::invalid_input(
                "samples must be finite and within [-1.0, 1.0]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_creation() {
        let enc = SilkEncoder::new(Bandwidth::Wideband, FrameDuration::Ms20).unwrap();
        assert_eq!(enc.frame_length(), 320);
        assert_eq!(enc.subfr_length(), 80);
        assert_eq!(enc.ltp_mem_length(), 320);
    }

    #[test]
    fn test_reset_idempotent() {
        let mut enc = SilkEncoder::new(Bandwidth::Narrowband, FrameDuration::Ms10).unwrap();
        enc.prev_lag = 99;
        enc.sum_log_gain_q7 = 1234;
        enc.reset();
        let lag_after_first = enc.prev_lag;
        enc.reset();
        assert_eq!(enc.prev_lag, lag_after_first);
        assert_eq!(enc.prev_lag, 0);
        assert_eq!(enc.sum_log_gain_q7, 0);
        assert!(enc.first_frame_after_reset);
        // NLSF memory seeded monotone
        for i in 1..10 {
            assert!(enc.prev_nlsf_q15[i] > enc.prev_nlsf_q15[i - 1]);
        }
    }

    #[test]
    fn test_complexity_modes() {
        let low = complexity_mode(0);
        assert_eq!(low.n_states_delayed_decision, 1);
        assert!(!low.use_interpolated_nlsfs);
        let high = complexity_mode(10);
        assert_eq!(high.n_states_delayed_decision, 4);
        assert_eq!(high.nlsf_msvq_survivors, 16);
        assert!(high.use_interpolated_nlsfs);
    }

    #[test]
    fn test_input_validation() {
        let enc = SilkEncoder::new(Bandwidth::Wideband, FrameDuration::Ms20).unwrap();
        assert!(enc.check_input(&vec![0.0; 320]).is_ok());
        assert!(enc.check_input(&vec![0.0; 160]).is_err());
        let mut bad = vec![0.0; 320];
        bad[7] = f32::NAN;
        assert!(enc.check_input(&bad).is_err());
    }
}
