//! LTP state scaling control
//!
//! In independent coding the decoder cannot rely on the previous frame's
//! excitation, so the LTP state is downscaled based on packet loss and the
//! prediction gain; conditionally coded frames always use full scaling.

use crate::constants::CondCoding;

/// Choose the LTP scaling index (0, 1 or 2)
pub fn ltp_scale_ctrl(
    ltp_pred_cod_gain_db: f32,
    packet_loss_percent: i32,
    cond_coding: CondCoding,
) -> i8 {
    if cond_coding == CondCoding::Independently {
        // Round up to the nearest fifth of the loss rate, weighted by how
        // much prediction gain is at stake
        let round_loss = packet_loss_percent.max(0) + 2;
        let scaled = (0.1 * round_loss as f32 * ltp_pred_cod_gain_db) as i32;
        scaled.clamp(0, 2) as i8
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditional_coding_no_scaling() {
        assert_eq!(ltp_scale_ctrl(10.0, 50, CondCoding::Conditionally), 0);
    }

    #[test]
    fn test_high_loss_high_gain_scales_down() {
        let ix = ltp_scale_ctrl(8.0, 30, CondCoding::Independently);
        assert_eq!(ix, 2);
    }

    #[test]
    fn test_no_loss_low_gain_keeps_full_scale() {
        let ix = ltp_scale_ctrl(0.5, 0, CondCoding::Independently);
        assert_eq!(ix, 0);
    }
}
