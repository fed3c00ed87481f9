//! Shell coding of the quantized excitation
//!
//! Pulses are coded in blocks of 16 samples: a rate level, the pulse count
//! of each block (with an escape chain for counts above 16), a binary tree
//! of half/half splits placing the pulses, LSBs when the magnitudes were
//! scaled down, and finally the signs of all non-zero samples (RFC 6716
//! Section 4.2.7.8).

use crate::bitstream::RangeEncoder;
use crate::constants::{
    N_RATE_LEVELS, SHELL_CODEC_FRAME_LENGTH, SILK_MAX_PULSES,
};
use crate::tables::{icdf_rate_q5, pulses::*};
use crate::types::SignalType;

/// Encode one frame of quantized pulses
///
/// `pulses` length must be a whole number of 16-sample shell blocks.
pub fn encode_pulses(
    rc: &mut dyn RangeEncoder,
    signal_type: SignalType,
    quant_offset_type: usize,
    pulses: &[i8],
) {
    debug_assert_eq!(pulses.len() % SHELL_CODEC_FRAME_LENGTH, 0);
    let n_blocks = pulses.len() / SHELL_CODEC_FRAME_LENGTH;

    // Scale down block magnitudes until each block's pulse count is
    // representable; LSBs are transmitted separately afterwards
    let mut abs_pulses: Vec<i32> = pulses.iter().map(|&p| (p as i32).abs()).collect();
    let mut sum_pulses = vec![0i32; n_blocks];
    let mut n_rshifts = vec![0u32; n_blocks];
    for i in 0..n_blocks {
        let block = &mut abs_pulses[i * SHELL_CODEC_FRAME_LENGTH..(i + 1) * SHELL_CODEC_FRAME_LENGTH];
        loop {
            let sum: i32 = block.iter().sum();
            if sum <= SILK_MAX_PULSES as i32 {
                sum_pulses[i] = sum;
                break;
            }
            n_rshifts[i] += 1;
            for v in block.iter_mut() {
                *v >>= 1;
            }
        }
    }

    // Choose the rate level minimizing the total pulse-count rate
    let voiced_ix = usize::from(signal_type.is_voiced());
    let mut rate_level = 0usize;
    let mut min_bits_q5 = i32::MAX;
    for k in 0..N_RATE_LEVELS - 1 {
        let mut bits_q5 = icdf_rate_q5(RATE_LEVEL_ICDF[voiced_ix], k);
        for i in 0..n_blocks {
            if n_rshifts[i] > 0 {
                bits_q5 += icdf_rate_q5(&PULSES_PER_BLOCK_ICDF[k], SILK_MAX_PULSES + 1);
            } else {
                bits_q5 += icdf_rate_q5(&PULSES_PER_BLOCK_ICDF[k], sum_pulses[i] as usize);
            }
        }
        if bits_q5 < min_bits_q5 {
            min_bits_q5 = bits_q5;
            rate_level = k;
        }
    }
    rc.encode_icdf(rate_level, RATE_LEVEL_ICDF[voiced_ix]);

    // Pulse counts, with the escape chain for scaled-down blocks
    for i in 0..n_blocks {
        if n_rshifts[i] == 0 {
            rc.encode_icdf(sum_pulses[i] as usize, &PULSES_PER_BLOCK_ICDF[rate_level]);
        } else {
            rc.encode_icdf(SILK_MAX_PULSES + 1, &PULSES_PER_BLOCK_ICDF[rate_level]);
            for _ in 0..n_rshifts[i] - 1 {
                rc.encode_icdf(SILK_MAX_PULSES + 1, &PULSES_PER_BLOCK_ICDF[N_RATE_LEVELS - 1]);
            }
            rc.encode_icdf(sum_pulses[i] as usize, &PULSES_PER_BLOCK_ICDF[N_RATE_LEVELS - 1]);
        }
    }

    // Position splits per block
    for i in 0..n_blocks {
        if sum_pulses[i] > 0 {
            shell_encoder(rc, &abs_pulses[i * SHELL_CODEC_FRAME_LENGTH..(i + 1) * SHELL_CODEC_FRAME_LENGTH]);
        }
    }

    // LSBs of scaled-down blocks
    for i in 0..n_blocks {
        if n_rshifts[i] > 0 {
            let block = &pulses[i * SHELL_CODEC_FRAME_LENGTH..(i + 1) * SHELL_CODEC_FRAME_LENGTH];
            let n_ls = n_rshifts[i] - 1;
            for &p in block {
                let abs_q = (p as i32).abs();
                let mut j = n_ls as i32;
                while j > 0 {
                    rc.encode_icdf(((abs_q >> j) & 1) as usize, PULSE_LSB_ICDF);
                    j -= 1;
                }
                rc.encode_icdf((abs_q & 1) as usize, PULSE_LSB_ICDF);
            }
        }
    }

    // Signs of all non-zero samples
    encode_signs(rc, pulses, signal_type, quant_offset_type, &sum_pulses);
}

/// Encode the half/half splits of one 16-sample block down the binary tree
fn shell_encoder(rc: &mut dyn RangeEncoder, abs_pulses: &[i32]) {
    debug_assert_eq!(abs_pulses.len(), SHELL_CODEC_FRAME_LENGTH);

    // Tree levels: 16 leaves up to the block total
    let p0 = abs_pulses;
    let mut p1 = [0i32; 8];
    let mut p2 = [0i32; 4];
    let mut p3 = [0i32; 2];
    for k in 0..8 {
        p1[k] = p0[2 * k] + p0[2 * k + 1];
    }
    for k in 0..4 {
        p2[k] = p1[2 * k] + p1[2 * k + 1];
    }
    for k in 0..2 {
        p3[k] = p2[2 * k] + p2[2 * k + 1];
    }
    let p4 = p3[0] + p3[1];

    // Walk down, left half first, in the canonical interleaved order
    encode_split(rc, p3[0], p4, &SHELL_CODE_TABLE_3);
    encode_split(rc, p2[0], p3[0], &SHELL_CODE_TABLE_2);
    encode_split(rc, p1[0], p2[0], &SHELL_CODE_TABLE_1);
    encode_split(rc, p0[0], p1[0], &SHELL_CODE_TABLE_0);
    encode_split(rc, p0[2], p1[1], &SHELL_CODE_TABLE_0);
    encode_split(rc, p1[2], p2[1], &SHELL_CODE_TABLE_1);
    encode_split(rc, p0[4], p1[2], &SHELL_CODE_TABLE_0);
    encode_split(rc, p0[6], p1[3], &SHELL_CODE_TABLE_0);
    encode_split(rc, p2[2], p3[1], &SHELL_CODE_TABLE_2);
    encode_split(rc, p1[4], p2[2], &SHELL_CODE_TABLE_1);
    encode_split(rc, p0[8], p1[4], &SHELL_CODE_TABLE_0);
    encode_split(rc, p0[10], p1[5], &SHELL_CODE_TABLE_0);
    encode_split(rc, p1[6], p2[3], &SHELL_CODE_TABLE_1);
    encode_split(rc, p0[12], p1[6], &SHELL_CODE_TABLE_0);
    encode_split(rc, p0[14], p1[7], &SHELL_CODE_TABLE_0);
}

#[inline]
fn encode_split(rc: &mut dyn RangeEncoder, child: i32, total: i32, table: &[u8; 152]) {
    if total > 0 {
        let total = total.min(SILK_MAX_PULSES as i32) as usize;
        let off = SHELL_CODE_TABLE_OFFSETS[total];
        rc.encode_icdf(child as usize, &table[off..off + total + 1]);
    }
}

/// Encode the sign of every non-zero pulse
fn encode_signs(
    rc: &mut dyn RangeEncoder,
    pulses: &[i8],
    signal_type: SignalType,
    quant_offset_type: usize,
    sum_pulses: &[i32],
) {
    for (i, &p_sum) in sum_pulses.iter().enumerate() {
        if p_sum <= 0 {
            continue;
        }
        let icdf = sign_icdf_entry(signal_type.index(), quant_offset_type, p_sum as usize);
        let block = &pulses[i * SHELL_CODEC_FRAME_LENGTH..(i + 1) * SHELL_CODEC_FRAME_LENGTH];
        for &q in block {
            if q != 0 {
                // Symbol 1 codes a positive pulse
                rc.encode_icdf(usize::from(q > 0), &icdf);
            }
        }
    }
}
