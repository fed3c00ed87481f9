//! Open-loop pitch analysis
//!
//! Three-stage coarse-to-fine search over the whitened residual: a 4 kHz
//! correlation sweep selects candidate lags, an 8 kHz contour search
//! refines them against the stage-2 codebooks with short-lag and
//! previous-lag biases, and (above 8 kHz) a full-rate stage-3 search picks
//! the final per-subframe lag contour. An unvoiced decision at any stage
//! yields zero lags and zero correlation; nothing here is fatal.

mod decimator;

pub use decimator::{resampler_down2, resampler_down2_3};

use crate::constants::*;
use crate::math::{energy, inner_product};
use crate::tables::pitch::*;

/// Result of the pitch search for one frame
#[derive(Debug, Clone, Default)]
pub struct PitchResult {
    /// True when the frame is voiced
    pub voiced: bool,
    /// Per-subframe integer lags at the full rate (zeros when unvoiced)
    pub pitch_lags: [i32; MAX_NB_SUBFR],
    /// Primary lag minus the minimum lag, for index coding
    pub lag_index: i16,
    /// Contour codebook index
    pub contour_index: i8,
    /// Normalized LTP correlation of the winning lag
    pub ltp_corr: f32,
}

/// Stage-2 noise floor in the correlation normalization (int16 scale)
const STAGE1_NOISE_FLOOR: f32 = 4000.0;

/// Run the open-loop pitch analysis on the whitened residual
///
/// `residual` must hold at least `(20 + nb_subfr * 5) * fs_khz` samples:
/// 20 ms of LTP memory followed by the frame. `search_thres1/2` control
/// the voicing decision, `prev_lag`/`prev_ltp_corr` bias the search toward
/// continuity.
pub fn pitch_analysis_core(
    residual: &[f32],
    fs_khz: usize,
    nb_subfr: usize,
    complexity: usize,
    search_thres1: f32,
    search_thres2: f32,
    prev_lag: i32,
    prev_ltp_corr: f32,
) -> PitchResult {
    debug_assert!(fs_khz == 8 || fs_khz == 12 || fs_khz == 16);
    debug_assert!(nb_subfr == 2 || nb_subfr == MAX_NB_SUBFR);
    debug_assert!(complexity <= 10);

    let mut out = PitchResult::default();

    let frame_length = (LTP_MEM_LENGTH_MS + nb_subfr * SUB_FRAME_LENGTH_MS) * fs_khz;
    if residual.len() < frame_length {
        return out;
    }
    let frame = &residual[..frame_length];
    let frame_length_8khz = (LTP_MEM_LENGTH_MS + nb_subfr * SUB_FRAME_LENGTH_MS) * 8;
    let frame_length_4khz = (LTP_MEM_LENGTH_MS + nb_subfr * SUB_FRAME_LENGTH_MS) * 4;
    let sf_length = SUB_FRAME_LENGTH_MS * fs_khz;
    let sf_length_8khz = SUB_FRAME_LENGTH_MS * 8;
    let min_lag = pitch_lag_min(fs_khz);
    let max_lag = pitch_lag_max(fs_khz);
    let min_lag_4khz = pitch_lag_min(4);
    let max_lag_4khz = pitch_lag_max(4);
    let min_lag_8khz = pitch_lag_min(8);
    let max_lag_8khz = pitch_lag_max(8);

    // Downsample to 8 kHz (int16 path) and again to 4 kHz
    let frame_i16: Vec<i16> = frame
        .iter()
        .map(|&v| v.clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect();
    let mut frame_8khz = vec![0i16; frame_length_8khz];
    match fs_khz {
        16 => {
            let mut s = [0i32; 2];
            resampler_down2(&mut s, &mut frame_8khz, &frame_i16);
        }
        12 => {
            let mut s = [0i32; 2];
            resampler_down2_3(&mut s, &mut frame_8khz, &frame_i16);
        }
        _ => frame_8khz.copy_from_slice(&frame_i16),
    }
    let mut frame_4khz = vec![0i16; frame_length_4khz];
    {
        let mut s = [0i32; 2];
        resampler_down2(&mut s, &mut frame_4khz, &frame_8khz);
    }
    // One-zero low pass at Nyquist: add adjacent samples
    let mut frame_4khz_f: Vec<f32> = frame_4khz.iter().map(|&v| v as f32).collect();
    for i in (1..frame_length_4khz).rev() {
        frame_4khz_f[i] += frame_4khz_f[i - 1];
    }

    // ------------------------------------------------------------------
    // Stage 1: coarse search at 4 kHz over pairs of subframes
    // ------------------------------------------------------------------
    let n_lags_4khz = (max_lag_4khz - min_lag_4khz + 1) as usize;
    let block_4khz = 2 * SUB_FRAME_LENGTH_MS * 4; // 10 ms at 4 kHz
    let mut c_stage1 = vec![0.0f32; n_lags_4khz];
    let mem_4khz = LTP_MEM_LENGTH_MS * 4;
    for k in 0..nb_subfr >> 1 {
        let target_ix = mem_4khz + k * block_4khz;
        let target = &frame_4khz_f[target_ix..target_ix + block_4khz];
        let target_energy = energy(target);
        for d in min_lag_4khz..=max_lag_4khz {
            let basis_ix = target_ix - d as usize;
            let basis = &frame_4khz_f[basis_ix..basis_ix + block_4khz];
            let cross = inner_product(target, basis);
            let slot = (d - min_lag_4khz) as usize;
            if cross > 0.0 {
                let basis_energy = energy(basis);
                c_stage1[slot] += (2.0 * cross
                    / (target_energy + basis_energy + block_4khz as f64 * STAGE1_NOISE_FLOOR as f64))
                    as f32;
            }
        }
    }

    // Short-lag bias
    for d in min_lag_4khz..=max_lag_4khz {
        let slot = (d - min_lag_4khz) as usize;
        c_stage1[slot] -= c_stage1[slot] * d as f32 / 4096.0;
    }

    // Keep the best 4 + 2*complexity candidates; non-finite correlations
    // (from pathological input) compare as equal instead of panicking
    let length_d_srch = 4 + 2 * complexity;
    let mut order: Vec<usize> = (0..n_lags_4khz).collect();
    order.sort_by(|&a, &b| {
        c_stage1[b]
            .partial_cmp(&c_stage1[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(length_d_srch);

    let c_max = c_stage1[order[0]];
    if c_max < PE_STAGE1_UNVOICED_THRESHOLD {
        return out;
    }

    // Candidate set at 8 kHz: surviving lags doubled, then broadened by a
    // two-pass convolution over the neighbour positions
    let threshold = search_thres1 * c_max;
    let mut d_comp = vec![0i32; (max_lag_8khz + 5) as usize];
    for &slot in &order {
        if c_stage1[slot] > threshold {
            let d_8khz = 2 * (slot as i32 + min_lag_4khz);
            if d_8khz < d_comp.len() as i32 {
                d_comp[d_8khz as usize] = 1;
            }
        }
    }
    for i in (min_lag_8khz as usize..(max_lag_8khz + 4) as usize).rev() {
        d_comp[i] += d_comp[i - 1] + d_comp[i - 2];
    }
    let mut d_srch: Vec<i32> = Vec::new();
    for i in min_lag_8khz..=max_lag_8khz {
        if d_comp[(i + 1) as usize] > 0 {
            d_srch.push(i);
        }
    }
    for i in (min_lag_8khz as usize..(max_lag_8khz + 4) as usize).rev() {
        d_comp[i] += d_comp[i - 1] + d_comp[i - 2] + d_comp[i - 3];
    }
    let mut d_comp_lags: Vec<i32> = Vec::new();
    for i in min_lag_8khz as usize..(max_lag_8khz + 4) as usize {
        if d_comp[i] > 0 {
            d_comp_lags.push(i as i32 - 2);
        }
    }

    // ------------------------------------------------------------------
    // Stage 2: contour search at 8 kHz
    // ------------------------------------------------------------------
    let frame_8khz_f: Vec<f32> = frame_8khz.iter().map(|&v| v as f32).collect();
    let mem_8khz = LTP_MEM_LENGTH_MS * 8;
    let n_lags_8khz = (max_lag_8khz + 2) as usize;
    let mut c_stage2 = vec![vec![0.0f32; n_lags_8khz]; nb_subfr];
    for k in 0..nb_subfr {
        let target_ix = mem_8khz + k * sf_length_8khz;
        let target = &frame_8khz_f[target_ix..target_ix + sf_length_8khz];
        let target_energy = energy(target);
        for &d in &d_comp_lags {
            if d < 1 || d as usize > target_ix {
                continue;
            }
            let basis_ix = target_ix - d as usize;
            let basis = &frame_8khz_f[basis_ix..basis_ix + sf_length_8khz];
            let cross = inner_product(target, basis);
            if cross > 0.0 {
                let basis_energy = energy(basis);
                c_stage2[k][d as usize] =
                    (2.0 * cross / (target_energy + basis_energy + 1.0)) as f32;
            }
        }
    }

    // Stage-2 codebook (always the NB contour tables at 8 kHz)
    let (stage2_cb, nb_cbk_search): (Vec<&[i8]>, usize) = if nb_subfr == MAX_NB_SUBFR {
        let searched = if fs_khz == 8 && complexity > 0 {
            PE_NB_CBKS_STAGE2_EXT
        } else {
            PE_NB_CBKS_STAGE2
        };
        (
            PITCH_CONTOUR_CB_NB_20MS.iter().map(|r| &r[..]).collect(),
            searched,
        )
    } else {
        (
            PITCH_CONTOUR_CB_NB_10MS.iter().map(|r| &r[..]).collect(),
            PE_NB_CBKS_STAGE2_10MS,
        )
    };

    let prev_lag_8khz = if prev_lag > 0 {
        (prev_lag * 8) / fs_khz as i32
    } else {
        0
    };
    let prev_lag_log2 = if prev_lag_8khz > 0 {
        (prev_lag_8khz as f32).log2()
    } else {
        0.0
    };

    let mut cc_max = 0.0f32;
    let mut cc_max_b = -1000.0f32;
    let mut cb_imax = 0usize;
    let mut lag: i32 = -1;
    for &d in &d_srch {
        let mut cc_best = -1000.0f32;
        let mut cb_best = 0usize;
        for j in 0..nb_cbk_search {
            let mut cc = 0.0f32;
            let mut valid = true;
            for k in 0..nb_subfr {
                let dd = d + stage2_cb[j][k] as i32;
                if dd < 1 || dd >= n_lags_8khz as i32 {
                    valid = false;
                    break;
                }
                cc += c_stage2[k][dd as usize];
            }
            if valid && cc > cc_best {
                cc_best = cc;
                cb_best = j;
            }
        }
        // Bias towards shorter lags and toward the previous frame's lag
        let lag_log2 = (d as f32).log2();
        let mut cc_new_b = cc_best - PE_SHORTLAG_BIAS * nb_subfr as f32 * lag_log2;
        if prev_lag_8khz > 0 {
            let delta = lag_log2 - prev_lag_log2;
            let delta_sqr = delta * delta;
            cc_new_b -= PE_PREVLAG_BIAS * nb_subfr as f32 * prev_ltp_corr * delta_sqr
                / (delta_sqr + 0.5);
        }
        if cc_new_b > cc_max_b && cc_best > nb_subfr as f32 * search_thres2 {
            cc_max_b = cc_new_b;
            cc_max = cc_best;
            cb_imax = cb_best;
            lag = d;
        }
    }
    if lag == -1 {
        return out;
    }
    out.ltp_corr = cc_max / nb_subfr as f32;

    // ------------------------------------------------------------------
    // Stage 3: refine at the full rate for 12/16 kHz
    // ------------------------------------------------------------------
    if fs_khz > 8 {
        // Rescale the 8 kHz lag to the full rate
        let mut lag_full = if fs_khz == 12 { (lag * 3) >> 1 } else { lag << 1 };
        lag_full = lag_full.clamp(min_lag, max_lag);
        let start_lag = (lag_full - 2).max(min_lag);
        let end_lag = (lag_full + 2).min(max_lag);

        let (stage3_cb, nb_cbk_search3): (Vec<&[i8]>, usize) = if nb_subfr == MAX_NB_SUBFR {
            let complexity_ix = match complexity {
                0..=3 => 0,
                4..=7 => 1,
                _ => 2,
            };
            (
                PITCH_CONTOUR_CB_MBWB_20MS.iter().map(|r| &r[..]).collect(),
                NB_CBK_SEARCHS_STAGE3[complexity_ix],
            )
        } else {
            (
                PITCH_CONTOUR_CB_MBWB_10MS.iter().map(|r| &r[..]).collect(),
                PE_NB_CBKS_STAGE3_10MS,
            )
        };

        let mem = LTP_MEM_LENGTH_MS * fs_khz;
        let energy_tmp = energy(&frame[mem..mem + nb_subfr * sf_length]) + 1.0;

        // Correlation and energy caches over the basis lag range
        let mut lag_lo = i32::MAX;
        let mut lag_hi = i32::MIN;
        for j in 0..nb_cbk_search3 {
            for k in 0..nb_subfr {
                lag_lo = lag_lo.min(start_lag + stage3_cb[j][k] as i32);
                lag_hi = lag_hi.max(end_lag + stage3_cb[j][k] as i32);
            }
        }
        let lag_lo = lag_lo.max(1);
        let span = (lag_hi - lag_lo + 1) as usize;
        let mut cross_cache = vec![vec![0.0f64; span]; nb_subfr];
        let mut energy_cache = vec![vec![0.0f64; span]; nb_subfr];
        for k in 0..nb_subfr {
            let target_ix = mem + k * sf_length;
            let target = &frame[target_ix..target_ix + sf_length];
            for (slot, l) in (lag_lo..=lag_hi).enumerate() {
                if l as usize > target_ix {
                    continue;
                }
                let basis_ix = target_ix - l as usize;
                let basis = &frame[basis_ix..basis_ix + sf_length];
                cross_cache[k][slot] = inner_product(target, basis);
                energy_cache[k][slot] = energy(basis);
            }
        }

        let contour_bias = PE_FLATCONTOUR_BIAS / lag_full as f32;
        let mut cc_max3 = -1000.0f32;
        let mut lag_new = lag_full;
        let mut cb_imax3 = 0usize;
        for d in start_lag..=end_lag {
            for j in 0..nb_cbk_search3 {
                let mut cross = 0.0f64;
                let mut nrg = energy_tmp;
                for k in 0..nb_subfr {
                    let slot = (d + stage3_cb[j][k] as i32 - lag_lo) as usize;
                    cross += cross_cache[k][slot];
                    nrg += energy_cache[k][slot];
                }
                let mut cc_new = if cross > 0.0 {
                    (2.0 * cross / nrg) as f32
                } else {
                    0.0
                };
                // Reduce depending on flatness of the contour
                cc_new *= 1.0 - contour_bias * j as f32;
                if cc_new > cc_max3 && d + stage3_cb[j][0] as i32 <= max_lag {
                    cc_max3 = cc_new;
                    lag_new = d;
                    cb_imax3 = j;
                }
            }
        }

        for k in 0..nb_subfr {
            out.pitch_lags[k] =
                (lag_new + stage3_cb[cb_imax3][k] as i32).clamp(min_lag, max_lag);
        }
        out.lag_index = (lag_new - min_lag) as i16;
        out.contour_index = cb_imax3 as i8;
    } else {
        for k in 0..nb_subfr {
            out.pitch_lags[k] =
                (lag + stage2_cb[cb_imax][k] as i32).clamp(min_lag_8khz, max_lag_8khz);
        }
        out.lag_index = (lag - min_lag_8khz) as i16;
        out.contour_index = cb_imax as i8;
    }
    out.voiced = true;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periodic_residual(fs_khz: usize, nb_subfr: usize, period: usize, amp: f32) -> Vec<f32> {
        let len = (LTP_MEM_LENGTH_MS + nb_subfr * SUB_FRAME_LENGTH_MS) * fs_khz;
        (0..len)
            .map(|i| {
                amp * (2.0 * std::f32::consts::PI * (i % period) as f32 / period as f32).sin()
            })
            .collect()
    }

    #[test]
    fn test_silence_is_unvoiced() {
        let residual = vec![0.0f32; (LTP_MEM_LENGTH_MS + 20) * 16];
        let r = pitch_analysis_core(&residual, 16, 4, 8, 0.7, 0.5, 0, 0.0);
        assert!(!r.voiced);
        assert_eq!(r.pitch_lags, [0; 4]);
        assert_eq!(r.ltp_corr, 0.0);
    }

    #[test]
    fn test_periodic_signal_found_near_period() {
        // 16 kHz, 20 ms, strong periodicity at 80 samples (200 Hz)
        let residual = periodic_residual(16, 4, 80, 4000.0);
        let r = pitch_analysis_core(&residual, 16, 4, 8, 0.7, 0.4, 0, 0.0);
        assert!(r.voiced);
        for k in 0..4 {
            let lag = r.pitch_lags[k];
            // Any multiple-free neighbourhood of the true period
            assert!(
                (lag - 80).abs() <= 3 || (lag - 160).abs() <= 4,
                "subframe {}: lag {}",
                k,
                lag
            );
        }
        assert!(r.ltp_corr > 0.5, "ltp_corr = {}", r.ltp_corr);
    }

    #[test]
    fn test_lags_within_range() {
        let residual = periodic_residual(8, 2, 50, 2500.0);
        let r = pitch_analysis_core(&residual, 8, 2, 5, 0.7, 0.4, 0, 0.0);
        if r.voiced {
            for k in 0..2 {
                assert!(r.pitch_lags[k] >= pitch_lag_min(8));
                assert!(r.pitch_lags[k] <= pitch_lag_max(8));
            }
        }
    }

    #[test]
    fn test_white_noise_mostly_unvoiced() {
        // Deterministic pseudo-noise
        let mut state = 0x12345678u32;
        let len = (LTP_MEM_LENGTH_MS + 20) * 16;
        let residual: Vec<f32> = (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ((state >> 16) as i16 as f32) / 8.0
            })
            .collect();
        let r = pitch_analysis_core(&residual, 16, 4, 8, 0.7, 0.6, 0, 0.0);
        // Uncorrelated noise: either unvoiced or low correlation
        assert!(!r.voiced || r.ltp_corr < 0.5);
    }
}
