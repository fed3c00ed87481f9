//! Per-frame encode pipeline
//!
//! Runs the stages in dependency order: pitch analysis on the whitened
//! history, LTP estimation and quantization, Burg LPC with NLSF
//! interpolation and MSVQ, noise shape analysis with gain quantization,
//! noise shaping quantization, and finally index and pulse emission
//! through the range coder. The LBRR payload, when produced, re-encodes
//! the same indices and pulses into a secondary buffer.

use crate::basic_ops::sat16;
use crate::bitstream::{
    encode_frame_header, encode_indices, encode_pulses, BufferRangeEncoder, FrameIndices,
    RangeEncoder,
};
use crate::constants::*;
use crate::encoder::{complexity_mode, SilkEncoder};
use crate::error::Result;
use crate::nlsf::{nlsf2a, nlsf_encode, nlsf_vq_weights_laroia};
use crate::nsq::{nsq, nsq_del_dec, NsqInput};
use crate::prediction::{
    find_lpc, find_ltp, find_pitch_lags, interpolate_nlsf, ltp_scale_ctrl, quant_ltp_gains,
    LtpQuantResult,
};
use crate::shape::{gains_quant, noise_shape_analysis, process_gains};
use crate::tables::frame::LBRR_SPEECH_ACTIVITY_THRES_Q8;
use crate::tables::ltp::LTP_SCALES_Q14;
use crate::tables::nlsf::{NLSF_CB_NB_MB, NLSF_CB_WB};
use crate::types::{Bandwidth, EncodeStatus, EncodeWarning, SignalType};

/// Speech activity below which a frame is classified inactive, Q8
const SPEECH_ACTIVITY_DTX_THRES_Q8: i32 = 13; // 0.05

impl SilkEncoder {
    /// Encode one frame of PCM into the supplied range coder
    ///
    /// `pcm` holds float samples in [-1.0, 1.0] at the configured internal
    /// rate; its length must match the frame layout exactly. Returns the
    /// encode status with signal classification, bit usage, and warnings.
    pub fn encode_frame(
        &mut self,
        pcm: &[f32],
        rc: &mut dyn RangeEncoder,
    ) -> Result<EncodeStatus> {
        self.check_input(pcm)?;

        let fs_khz = self.fs_khz();
        let frame_length = self.frame_length();
        let subfr_length = self.subfr_length();
        let nb_subfr = self.duration.nb_subfr();
        let ltp_mem_length = self.ltp_mem_length();
        let la_shape = LA_SHAPE_MS * fs_khz;
        let lpc_order = self.bandwidth.lpc_order();
        let mode = complexity_mode(self.complexity);

        // Append the new frame to the look-ahead buffer, in int16 scale
        let in_pos = ltp_mem_length + la_shape;
        for (dst, &src) in self.x_buf[in_pos..in_pos + frame_length].iter_mut().zip(pcm) {
            *dst = sat16((src * 32_768.0) as i32) as f32;
        }

        // Initial classification from the external VAD
        let mut signal_type = if self.vad.speech_activity_q8 < SPEECH_ACTIVITY_DTX_THRES_Q8 {
            SignalType::Inactive
        } else {
            SignalType::Unvoiced
        };

        let mut indices = FrameIndices {
            seed: (self.frame_counter & 3) as i8,
            ..Default::default()
        };
        let mut pitch_lags = [0i32; MAX_NB_SUBFR];
        let mut ltp_corr = 0.0f32;
        let mut ltp_res: Option<Vec<f32>> = None;

        // ------------------------------------------------------------------
        // Pitch analysis
        // ------------------------------------------------------------------
        if signal_type != SignalType::Inactive {
            let lag_result = find_pitch_lags(
                &self.x_buf[..ltp_mem_length + frame_length + LA_PITCH_MS * fs_khz],
                fs_khz,
                nb_subfr,
                self.complexity as usize,
                self.vad.speech_activity_q8,
                self.vad.input_tilt_q15,
                self.prev_signal_type,
                self.prev_lag,
                self.prev_ltp_corr,
                self.first_frame_after_reset,
            );
            if lag_result.pitch.voiced {
                signal_type = SignalType::Voiced;
                pitch_lags[..nb_subfr].copy_from_slice(&lag_result.pitch.pitch_lags[..nb_subfr]);
                indices.lag_index = lag_result.pitch.lag_index;
                indices.contour_index = lag_result.pitch.contour_index;
                ltp_corr = lag_result.pitch.ltp_corr;
            }
            ltp_res = Some(lag_result.residual);
        }
        indices.signal_type = signal_type;

        let cond_coding = if self.first_frame_after_reset {
            CondCoding::Independently
        } else {
            CondCoding::Conditionally
        };

        // ------------------------------------------------------------------
        // Noise shape analysis
        // ------------------------------------------------------------------
        let warping_q16 = if mode.warping_enabled {
            (fs_khz as i32) * 983 // 0.015 in Q16 per kHz
        } else {
            0
        };
        let shape = noise_shape_analysis(
            &self.x_buf,
            ltp_mem_length,
            fs_khz,
            nb_subfr,
            self.bandwidth.shape_lpc_order(),
            warping_q16,
            self.snr_db_q7,
            self.use_cbr,
            &self.vad,
            signal_type,
            ltp_corr,
            &pitch_lags,
            &mut self.shape_smooth,
        );

        // ------------------------------------------------------------------
        // LTP analysis and quantization
        // ------------------------------------------------------------------
        let mut ltp_quant = LtpQuantResult::default();
        let mut ltp_pred_cod_gain_db = 0.0f32;
        if let (true, Some(residual)) = (signal_type.is_voiced(), ltp_res.as_ref()) {
            let mut xx = [[0.0f32; LTP_ORDER * LTP_ORDER]; MAX_NB_SUBFR];
            let mut x_x = [[0.0f32; LTP_ORDER]; MAX_NB_SUBFR];
            find_ltp(
                &mut xx,
                &mut x_x,
                residual,
                ltp_mem_length,
                &pitch_lags,
                subfr_length,
                nb_subfr,
            );
            ltp_quant = quant_ltp_gains(&xx, &x_x, subfr_length, nb_subfr, self.sum_log_gain_q7);
            self.sum_log_gain_q7 = ltp_quant.sum_log_gain_q7;
            ltp_pred_cod_gain_db = ltp_quant.pred_gain_db_q7 as f32 / 128.0;
            indices.per_index = ltp_quant.periodicity_index;
            indices.ltp_indices = ltp_quant.cbk_index;
            indices.ltp_scale_index = ltp_scale_ctrl(
                ltp_pred_cod_gain_db,
                self.packet_loss_percent,
                cond_coding,
            );
        }

        // ------------------------------------------------------------------
        // LPC analysis on the LTP residual, then NLSF quantization
        // ------------------------------------------------------------------
        let lpc_in_pre = self.build_lpc_input(signal_type, &ltp_quant, &pitch_lags, &shape.gains);
        let min_inv_gain = if self.first_frame_after_reset {
            MIN_INV_GAIN_FIRST_FRAME
        } else {
            MIN_INV_GAIN
        };
        let lpc = find_lpc(
            &lpc_in_pre,
            subfr_length + lpc_order,
            nb_subfr,
            lpc_order,
            min_inv_gain,
            mode.use_interpolated_nlsfs && nb_subfr == MAX_NB_SUBFR,
            self.first_frame_after_reset,
            &self.prev_nlsf_q15,
        );
        indices.nlsf_interp_q2 = lpc.interp_index_q2;

        let mut nlsf_q15 = lpc.nlsf_q15;
        let mut pred_coef_q12 = [[0i16; MAX_LPC_ORDER]; 2];
        self.process_nlsfs(&mut indices, &mut pred_coef_q12, &mut nlsf_q15, signal_type);

        // ------------------------------------------------------------------
        // Gains
        // ------------------------------------------------------------------
        let processed = process_gains(
            &shape,
            signal_type,
            nb_subfr,
            subfr_length,
            ltp_pred_cod_gain_db,
            self.vad.input_tilt_q15,
            self.vad.speech_activity_q8,
            self.snr_db_q7,
            mode.n_states_delayed_decision,
            0,
        );
        indices.quant_offset_type = processed.quant_offset_type;
        let mut gains_q16 = processed.gains_q16;
        let mut gain_indices = [0i8; MAX_NB_SUBFR];
        gains_quant(
            &mut gain_indices[..nb_subfr],
            &mut gains_q16[..nb_subfr],
            &mut self.prev_gain_index,
            cond_coding == CondCoding::Conditionally,
        );
        indices.gain_indices = gain_indices;

        // ------------------------------------------------------------------
        // Noise shaping quantization
        // ------------------------------------------------------------------
        let x16: Vec<i16> = self.x_buf[ltp_mem_length..ltp_mem_length + frame_length]
            .iter()
            .map(|&v| sat16(v as i32))
            .collect();
        let nsq_input = NsqInput {
            x16: &x16,
            pred_coef_q12,
            ltp_coef_q14: ltp_quant.b_q14,
            shape: &shape,
            gains_q16: {
                let mut g = [1 << 16; MAX_NB_SUBFR];
                g[..nb_subfr].copy_from_slice(&gains_q16[..nb_subfr]);
                g
            },
            pitch_lags,
            lambda_q10: processed.lambda_q10,
            ltp_scale_q14: LTP_SCALES_Q14[indices.ltp_scale_index as usize] as i32,
            subfr_length,
            nb_subfr,
            ltp_mem_length,
            predict_lpc_order: lpc_order,
            shaping_lpc_order: self.bandwidth.shape_lpc_order(),
            warping_q16,
        };
        let mut pulses = vec![0i8; frame_length];
        if mode.n_states_delayed_decision > 1 {
            nsq_del_dec(
                &mut self.nsq,
                &mut indices,
                &nsq_input,
                &mut pulses,
                mode.n_states_delayed_decision,
            );
        } else {
            nsq(&mut self.nsq, &indices, &nsq_input, &mut pulses);
        }

        // ------------------------------------------------------------------
        // Bitstream emission
        // ------------------------------------------------------------------
        let vad_flag = signal_type != SignalType::Inactive;
        let lbrr_active = self.fec_enabled
            && vad_flag
            && self.vad.speech_activity_q8 > LBRR_SPEECH_ACTIVITY_THRES_Q8;
        encode_frame_header(rc, vad_flag, lbrr_active);
        encode_indices(
            rc,
            &indices,
            self.bandwidth,
            self.duration,
            cond_coding,
            self.ec_prev_signal_type,
            self.ec_prev_lag_index,
        );
        encode_pulses(
            rc,
            signal_type,
            indices.quant_offset_type as usize,
            &pulses,
        );

        let mut status = EncodeStatus::new(signal_type);
        status.pitch_lags = pitch_lags;
        status.bits_used_q3 = rc.tell_bits_q3();

        // Rate budget feedback
        let target_bits_q3 = (self.bitrate * self.duration.ms() as u32 * 8 / 1000) as i64;
        let used_q3 = status.bits_used_q3 as i64;
        if used_q3 > target_bits_q3 {
            self.bits_exceeded_q3 += used_q3 - target_bits_q3;
            status.warnings.push(EncodeWarning::BitsExceeded);
        }

        // ------------------------------------------------------------------
        // LBRR payload
        // ------------------------------------------------------------------
        if lbrr_active {
            let mut lbrr_rc = BufferRangeEncoder::new();
            encode_indices(
                &mut lbrr_rc,
                &indices,
                self.bandwidth,
                self.duration,
                CondCoding::Independently,
                self.ec_prev_signal_type,
                self.ec_prev_lag_index,
            );
            encode_pulses(
                &mut lbrr_rc,
                signal_type,
                indices.quant_offset_type as usize,
                &pulses,
            );
            status.lbrr_encoded = true;
            tracing::trace!("LBRR payload: {} symbols", lbrr_rc.len());
            status.lbrr_payload = Some(lbrr_rc.finish());
        } else if self.fec_enabled && vad_flag {
            status.warnings.push(EncodeWarning::LbrrSkipped);
        }

        // ------------------------------------------------------------------
        // State propagation
        // ------------------------------------------------------------------
        self.prev_nlsf_q15[..lpc_order].copy_from_slice(&nlsf_q15[..lpc_order]);
        self.prev_signal_type = signal_type;
        self.ec_prev_signal_type = signal_type;
        if signal_type.is_voiced() {
            self.prev_lag = pitch_lags[nb_subfr - 1];
            self.ec_prev_lag_index = indices.lag_index;
            self.prev_ltp_corr = ltp_corr;
        } else {
            self.prev_lag = 0;
        }
        self.first_frame_after_reset = false;
        self.frame_counter = self.frame_counter.wrapping_add(1);

        // Slide the history buffer one frame to the left
        self.x_buf
            .copy_within(frame_length..ltp_mem_length + la_shape + frame_length, 0);

        tracing::trace!(
            "Encoded {:?} frame: {} bits, lags {:?}",
            signal_type,
            status.bits_used_q3 / 8,
            &status.pitch_lags[..nb_subfr]
        );
        Ok(status)
    }

    /// Build the Burg input: LTP residual for voiced frames, the plain
    /// (gain-normalized) input for unvoiced, as `nb_subfr` blocks of
    /// `subfr_length + lpc_order` samples
    fn build_lpc_input(
        &self,
        signal_type: SignalType,
        ltp_quant: &LtpQuantResult,
        pitch_lags: &[i32; MAX_NB_SUBFR],
        gains: &[f32; MAX_NB_SUBFR],
    ) -> Vec<f32> {
        let subfr_length = self.subfr_length();
        let nb_subfr = self.duration.nb_subfr();
        let lpc_order = self.bandwidth.lpc_order();
        let ltp_mem_length = self.ltp_mem_length();
        let block = subfr_length + lpc_order;
        let mut out = vec![0.0f32; nb_subfr * block];

        for k in 0..nb_subfr {
            let inv_gain = 1.0 / gains[k].max(1.0);
            // Block k covers [k*subfr - order, (k+1)*subfr) of the frame
            let x_start = ltp_mem_length + k * subfr_length - lpc_order;
            let dst = &mut out[k * block..(k + 1) * block];
            if signal_type.is_voiced() {
                let lag = pitch_lags[k];
                let b = &ltp_quant.b_q14[k];
                for i in 0..block {
                    let n = x_start + i;
                    let mut v = self.x_buf[n];
                    // Subtract long-term prediction around the lag center
                    for (j, &tap) in b.iter().enumerate() {
                        let tap_f = tap as f32 / 16_384.0;
                        let idx = n as i32 - lag + (LTP_ORDER as i32) / 2 - j as i32;
                        if idx >= 0 {
                            v -= tap_f * self.x_buf[idx as usize];
                        }
                    }
                    dst[i] = v * inv_gain;
                }
            } else {
                for i in 0..block {
                    dst[i] = self.x_buf[x_start + i] * inv_gain;
                }
            }
        }
        out
    }

    /// Quantize the NLSF vector and produce the Q12 coefficients of both
    /// frame halves
    fn process_nlsfs(
        &mut self,
        indices: &mut FrameIndices,
        pred_coef_q12: &mut [[i16; MAX_LPC_ORDER]; 2],
        nlsf_q15: &mut [i16; MAX_LPC_ORDER],
        signal_type: SignalType,
    ) {
        let lpc_order = self.bandwidth.lpc_order();
        let cb = match self.bandwidth {
            Bandwidth::Wideband => &NLSF_CB_WB,
            _ => &NLSF_CB_NB_MB,
        };
        let mode = complexity_mode(self.complexity);

        // Quantization strength follows speech activity
        let mu = 0.003 - 0.0015 * self.vad.speech_activity_q8 as f32 / 256.0;
        let mu_q20 = (mu * 1_048_576.0) as i32;

        let mut w_q2 = [0i16; MAX_LPC_ORDER];
        nlsf_vq_weights_laroia(&mut w_q2[..lpc_order], nlsf_q15, lpc_order);

        nlsf_encode(
            &mut indices.nlsf_indices,
            &mut nlsf_q15[..lpc_order],
            cb,
            &w_q2[..lpc_order],
            mu_q20,
            mode.nlsf_msvq_survivors,
            signal_type.is_voiced(),
        );

        // Second half always uses the frame's quantized NLSF vector
        nlsf2a(&mut pred_coef_q12[1][..lpc_order], &nlsf_q15[..lpc_order], lpc_order);

        if indices.nlsf_interp_q2 < 4 {
            // First half interpolates from the previous frame's vector
            let mut nlsf0 = [0i16; MAX_LPC_ORDER];
            interpolate_nlsf(
                &mut nlsf0,
                &self.prev_nlsf_q15,
                nlsf_q15,
                indices.nlsf_interp_q2 as i32,
                lpc_order,
            );
            nlsf2a(&mut pred_coef_q12[0][..lpc_order], &nlsf0[..lpc_order], lpc_order);
        } else {
            pred_coef_q12[0] = pred_coef_q12[1];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameDuration;

    #[test]
    fn test_encode_silence() {
        let mut enc = SilkEncoder::new(Bandwidth::Wideband, FrameDuration::Ms20).unwrap();
        let mut rc = BufferRangeEncoder::new();
        let pcm = vec![0.0f32; 320];
        let status = enc.encode_frame(&pcm, &mut rc).unwrap();
        assert_eq!(status.signal_type, SignalType::Inactive);
        assert_eq!(status.pitch_lags, [0; 4]);
        assert!(!rc.is_empty());
    }

    #[test]
    fn test_invalid_length_rejected_without_state_change() {
        let mut enc = SilkEncoder::new(Bandwidth::Wideband, FrameDuration::Ms20).unwrap();
        let mut rc = BufferRangeEncoder::new();
        let pcm = vec![0.0f32; 100];
        assert!(enc.encode_frame(&pcm, &mut rc).is_err());
        assert!(enc.first_frame_after_reset);
        assert_eq!(enc.frame_counter, 0);
    }

    #[test]
    fn test_frame_counter_advances() {
        let mut enc = SilkEncoder::new(Bandwidth::Narrowband, FrameDuration::Ms10).unwrap();
        let pcm = vec![0.0f32; 80];
        for i in 0..3 {
            let mut rc = BufferRangeEncoder::new();
            enc.encode_frame(&pcm, &mut rc).unwrap();
            assert_eq!(enc.frame_counter, i + 1);
        }
        assert!(!enc.first_frame_after_reset);
    }
}
