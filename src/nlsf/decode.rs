//! NLSF decoding
//!
//! Reconstructs the quantized NLSF vector from a stage-1 index and the
//! residual indices. The encoder runs this immediately after its own
//! quantization so every later stage sees exactly what the decoder will.

use crate::basic_ops::{smlawb, smulbb};
use crate::constants::NLSF_QUANT_LEVEL_ADJ_Q10;
use crate::nlsf::nlsf_stabilize;
use crate::tables::nlsf::NlsfCodebook;

/// Dequantize the backward prediction-residual chain
fn residual_dequant(
    x_q10: &mut [i16],
    indices: &[i8],
    pred_coef_q8: &[u8],
    quant_step_size_q16: i32,
    order: usize,
) {
    let mut out_q10 = 0i32;
    for i in (0..order).rev() {
        let pred_q10 = smulbb(out_q10, pred_coef_q8[i] as i32) >> 8;
        out_q10 = (indices[i] as i32) << 10;
        if out_q10 > 0 {
            out_q10 -= NLSF_QUANT_LEVEL_ADJ_Q10;
        } else if out_q10 < 0 {
            out_q10 += NLSF_QUANT_LEVEL_ADJ_Q10;
        }
        out_q10 = smlawb(pred_q10, out_q10, quant_step_size_q16);
        x_q10[i] = out_q10 as i16;
    }
}

/// Decode a Q15 NLSF vector from MSVQ indices
///
/// `indices[0]` is the stage-1 index; `indices[1..=order]` the residual
/// indices. The output is stabilized against the codebook spacing.
pub fn nlsf_decode(nlsf_q15: &mut [i16], indices: &[i8], cb: &NlsfCodebook) {
    let mut ec_ix = [0usize; 16];
    let mut pred_q8 = [0u8; 16];
    let ind1 = indices[0] as usize;
    cb.unpack(ind1, &mut ec_ix, &mut pred_q8);

    let mut res_q10 = [0i16; 16];
    residual_dequant(&mut res_q10, &indices[1..], &pred_q8, cb.quant_step_size_q16, cb.order);

    let cb_row = &cb.cb1_q8[ind1 * cb.order..(ind1 + 1) * cb.order];
    let w_row = &cb.cb1_wght_q9[ind1 * cb.order..(ind1 + 1) * cb.order];
    for i in 0..cb.order {
        // Residual is in the weighted domain; divide the weight back out
        let nlsf = ((cb_row[i] as i32) << 7)
            + ((res_q10[i] as i32) << 14) / w_row[i] as i32;
        nlsf_q15[i] = nlsf.clamp(0, 32_767) as i16;
    }

    nlsf_stabilize(nlsf_q15, cb.delta_min_q15, cb.order);
}
