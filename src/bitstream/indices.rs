//! Side-information index emission
//!
//! Writes the per-frame indices to the range coder in the exact order of
//! RFC 6716 Section 4.2.7: frame type, gains, NLSF stage-1 and residuals,
//! NLSF interpolation (20 ms only), pitch lag and contour, LTP filters and
//! scale, and the dither seed. Pulses follow via the shell coder.

use crate::constants::{CondCoding, MAX_LPC_ORDER, MAX_NB_SUBFR, NLSF_QUANT_MAX_AMPLITUDE};
use crate::bitstream::RangeEncoder;
use crate::tables::{frame::*, gains::*, ltp::*, nlsf::*, pitch::*};
use crate::types::{Bandwidth, FrameDuration, SignalType};

/// Per-frame side information produced by the analysis stages
#[derive(Debug, Clone)]
pub struct FrameIndices {
    /// Signal classification
    pub signal_type: SignalType,
    /// Quantization offset type (0 or 1)
    pub quant_offset_type: u8,
    /// Gain indices: absolute for subframe 0, deltas afterwards
    pub gain_indices: [i8; MAX_NB_SUBFR],
    /// Stage-1 NLSF index followed by per-coefficient residual indices
    pub nlsf_indices: [i8; MAX_LPC_ORDER + 1],
    /// NLSF interpolation factor, Q2 (4 = no interpolation)
    pub nlsf_interp_q2: i8,
    /// Primary pitch lag minus the minimum lag
    pub lag_index: i16,
    /// Pitch contour codebook index
    pub contour_index: i8,
    /// LTP periodicity bin
    pub per_index: i8,
    /// Per-subframe LTP filter indices within the bin
    pub ltp_indices: [i8; MAX_NB_SUBFR],
    /// LTP scaling index (independent coding only)
    pub ltp_scale_index: i8,
    /// 2-bit dither seed
    pub seed: i8,
}

impl Default for FrameIndices {
    fn default() -> Self {
        Self {
            signal_type: SignalType::Inactive,
            quant_offset_type: 0,
            gain_indices: [0; MAX_NB_SUBFR],
            nlsf_indices: [0; MAX_LPC_ORDER + 1],
            nlsf_interp_q2: 4,
            lag_index: 0,
            contour_index: 0,
            per_index: 0,
            ltp_indices: [0; MAX_NB_SUBFR],
            ltp_scale_index: 0,
            seed: 0,
        }
    }
}

/// Encode the frame-level header flags (VAD and LBRR), one bit each
pub fn encode_frame_header(rc: &mut dyn RangeEncoder, vad_flag: bool, lbrr_flag: bool) {
    rc.encode_bit_logp(vad_flag, 1);
    rc.encode_bit_logp(lbrr_flag, 1);
}

/// Encode all side-information indices of one frame
pub fn encode_indices(
    rc: &mut dyn RangeEncoder,
    ind: &FrameIndices,
    bandwidth: Bandwidth,
    duration: FrameDuration,
    cond_coding: CondCoding,
    prev_signal_type: SignalType,
    prev_lag_index: i16,
) {
    let nb_subfr = duration.nb_subfr();

    // Signal type and quantization offset, jointly
    let type_offset = 2 * ind.signal_type.index() + ind.quant_offset_type as usize;
    debug_assert!(type_offset < 6);
    if type_offset < 2 {
        rc.encode_icdf(type_offset, FRAME_TYPE_ICDF_INACTIVE);
    } else {
        rc.encode_icdf(type_offset - 2, FRAME_TYPE_ICDF_ACTIVE);
    }

    // Subframe gains: absolute MSB/LSB for the first, deltas afterwards
    let msb_icdf = match ind.signal_type {
        SignalType::Inactive => GAIN_ICDF_INACTIVE,
        SignalType::Unvoiced => GAIN_ICDF_UNVOICED,
        SignalType::Voiced => GAIN_ICDF_VOICED,
    };
    rc.encode_icdf((ind.gain_indices[0] >> 3) as usize, msb_icdf);
    rc.encode_icdf((ind.gain_indices[0] & 7) as usize, GAIN_ICDF_LSB);
    for k in 1..nb_subfr {
        rc.encode_icdf(ind.gain_indices[k] as usize, GAIN_ICDF_DELTA);
    }

    // NLSF stage-1 and residual indices
    let cb = match bandwidth {
        Bandwidth::Wideband => &NLSF_CB_WB,
        _ => &NLSF_CB_NB_MB,
    };
    rc.encode_icdf(
        ind.nlsf_indices[0] as usize,
        cb.cb1_icdf(ind.signal_type.is_voiced()),
    );
    let mut ec_ix = [0usize; MAX_LPC_ORDER];
    let mut pred = [0u8; MAX_LPC_ORDER];
    cb.unpack(ind.nlsf_indices[0] as usize, &mut ec_ix, &mut pred);
    for i in 0..cb.order {
        let ix = ind.nlsf_indices[i + 1] as i32;
        let row = &cb.ec_icdf[ec_ix[i]..ec_ix[i] + NLSF_EC_ALPHABET];
        if ix >= NLSF_QUANT_MAX_AMPLITUDE {
            rc.encode_icdf(2 * NLSF_QUANT_MAX_AMPLITUDE as usize, row);
            rc.encode_icdf((ix - NLSF_QUANT_MAX_AMPLITUDE) as usize, NLSF_EXT_ICDF);
        } else if ix <= -NLSF_QUANT_MAX_AMPLITUDE {
            rc.encode_icdf(0, row);
            rc.encode_icdf((-ix - NLSF_QUANT_MAX_AMPLITUDE) as usize, NLSF_EXT_ICDF);
        } else {
            rc.encode_icdf((ix + NLSF_QUANT_MAX_AMPLITUDE) as usize, row);
        }
    }

    // Interpolation index only exists for 20 ms frames
    if nb_subfr == MAX_NB_SUBFR {
        rc.encode_icdf(ind.nlsf_interp_q2 as usize, NLSF_INTERP_ICDF);
    }

    if ind.signal_type.is_voiced() {
        encode_pitch_and_ltp(rc, ind, bandwidth, duration, cond_coding, prev_signal_type, prev_lag_index);
    }

    rc.encode_icdf(ind.seed as usize, SEED_ICDF);
}

fn encode_pitch_and_ltp(
    rc: &mut dyn RangeEncoder,
    ind: &FrameIndices,
    bandwidth: Bandwidth,
    duration: FrameDuration,
    cond_coding: CondCoding,
    prev_signal_type: SignalType,
    prev_lag_index: i16,
) {
    // Lag: delta against the previous voiced frame when possible, with
    // symbol 0 escaping to absolute coding
    let mut encode_absolute = true;
    if cond_coding == CondCoding::Conditionally && prev_signal_type.is_voiced() {
        let delta = ind.lag_index as i32 - prev_lag_index as i32;
        if (-8..=11).contains(&delta) {
            rc.encode_icdf((delta + 9) as usize, PITCH_LAG_DELTA_ICDF);
            encode_absolute = false;
        } else {
            rc.encode_icdf(0, PITCH_LAG_DELTA_ICDF);
        }
    }
    if encode_absolute {
        let low_size = (bandwidth.fs_khz() / 2) as i32;
        let high = ind.lag_index as i32 / low_size;
        let low = ind.lag_index as i32 % low_size;
        rc.encode_icdf(high as usize, PITCH_LAG_HIGH_ICDF);
        let low_icdf = match bandwidth {
            Bandwidth::Narrowband => PITCH_LAG_LOW_ICDF_NB,
            Bandwidth::Mediumband => PITCH_LAG_LOW_ICDF_MB,
            Bandwidth::Wideband => PITCH_LAG_LOW_ICDF_WB,
        };
        rc.encode_icdf(low as usize, low_icdf);
    }

    // Contour
    let contour_icdf = match (bandwidth, duration) {
        (Bandwidth::Narrowband, FrameDuration::Ms10) => PITCH_CONTOUR_ICDF_NB_10MS,
        (Bandwidth::Narrowband, FrameDuration::Ms20) => PITCH_CONTOUR_ICDF_NB_20MS,
        (_, FrameDuration::Ms10) => PITCH_CONTOUR_ICDF_MBWB_10MS,
        (_, FrameDuration::Ms20) => PITCH_CONTOUR_ICDF_MBWB_20MS,
    };
    rc.encode_icdf(ind.contour_index as usize, contour_icdf);

    // LTP periodicity bin and per-subframe filter indices
    rc.encode_icdf(ind.per_index as usize, LTP_PERIODICITY_ICDF);
    let filter_icdf = LTP_FILTER_ICDF[ind.per_index as usize];
    for k in 0..duration.nb_subfr() {
        rc.encode_icdf(ind.ltp_indices[k] as usize, filter_icdf);
    }

    // LTP scale only in independent coding
    if cond_coding == CondCoding::Independently {
        rc.encode_icdf(ind.ltp_scale_index as usize, LTP_SCALE_ICDF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BufferRangeEncoder;

    fn voiced_indices() -> FrameIndices {
        FrameIndices {
            signal_type: SignalType::Voiced,
            quant_offset_type: 0,
            gain_indices: [30, 4, 5, 4],
            nlsf_indices: [7, 1, -1, 0, 0, 2, 0, 0, -3, 0, 1, 0, 0, 0, 0, 0, 0],
            nlsf_interp_q2: 4,
            lag_index: 100,
            contour_index: 3,
            per_index: 1,
            ltp_indices: [2, 0, 5, 1],
            ltp_scale_index: 0,
            seed: 2,
        }
    }

    #[test]
    fn test_inactive_frame_emits_minimal_indices() {
        let mut rc = BufferRangeEncoder::new();
        let ind = FrameIndices::default();
        encode_indices(
            &mut rc,
            &ind,
            Bandwidth::Wideband,
            FrameDuration::Ms20,
            CondCoding::Independently,
            SignalType::Inactive,
            0,
        );
        // type, MSB, LSB, 3 deltas, stage1, 16 residuals, interp, seed
        assert_eq!(rc.len(), 1 + 2 + 3 + 1 + 16 + 1 + 1);
    }

    #[test]
    fn test_voiced_frame_emits_pitch_block() {
        let mut rc = BufferRangeEncoder::new();
        let ind = voiced_indices();
        encode_indices(
            &mut rc,
            &ind,
            Bandwidth::Wideband,
            FrameDuration::Ms20,
            CondCoding::Independently,
            SignalType::Inactive,
            0,
        );
        // Inactive baseline plus lag high/low, contour, periodicity,
        // 4 filter indices, LTP scale
        assert_eq!(rc.len(), 25 + 2 + 1 + 1 + 4 + 1);
    }

    #[test]
    fn test_conditional_lag_delta_saves_symbols() {
        let mut rc = BufferRangeEncoder::new();
        let ind = voiced_indices();
        encode_indices(
            &mut rc,
            &ind,
            Bandwidth::Wideband,
            FrameDuration::Ms20,
            CondCoding::Conditionally,
            SignalType::Voiced,
            98,
        );
        // Delta of +2 fits the delta alphabet: one symbol instead of two,
        // and no LTP scale in conditional mode
        assert_eq!(rc.len(), 25 + 1 + 1 + 1 + 4);
    }

    #[test]
    fn test_ms10_frame_skips_interpolation_index() {
        let mut rc = BufferRangeEncoder::new();
        let mut ind = FrameIndices::default();
        ind.signal_type = SignalType::Unvoiced;
        encode_indices(
            &mut rc,
            &ind,
            Bandwidth::Narrowband,
            FrameDuration::Ms10,
            CondCoding::Independently,
            SignalType::Inactive,
            0,
        );
        // type, MSB, LSB, 1 delta, stage1, 10 residuals, seed
        assert_eq!(rc.len(), 1 + 2 + 1 + 1 + 10 + 1);
    }

    #[test]
    fn test_nlsf_extension_escape() {
        let mut rc = BufferRangeEncoder::new();
        let mut ind = FrameIndices::default();
        ind.nlsf_indices[1] = 7; // beyond the base alphabet
        encode_indices(
            &mut rc,
            &ind,
            Bandwidth::Wideband,
            FrameDuration::Ms20,
            CondCoding::Independently,
            SignalType::Inactive,
            0,
        );
        // One extra symbol for the extension
        assert_eq!(rc.len(), 25 + 1);
    }
}
