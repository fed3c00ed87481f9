//! NLSF to LPC conversion
//!
//! Reconstructs the Q12 prediction filter from a Q15 NLSF vector by
//! expanding the root pairs into the symmetric/antisymmetric polynomials
//! on the shared cosine grid. The conversion order of the roots is
//! scrambled to maximize numerical accuracy of the polynomial expansion.
//! Coefficients that overflow Q12 are handled by repeated bandwidth
//! expansion.

use crate::basic_ops::{rshift_round, rshift_round64, sat16, smull, Word32};
use crate::math::bwexpander_q16;
use crate::tables::cosine::LSF_COS_TAB_Q12;

/// Internal precision of the polynomial expansion
const QA: u32 = 16;

/// Root ordering for order 16
const ORDERING_16: [usize; 16] = [0, 15, 8, 7, 4, 11, 12, 3, 2, 13, 10, 5, 6, 9, 14, 1];
/// Root ordering for order 10
const ORDERING_10: [usize; 10] = [0, 9, 6, 3, 4, 5, 8, 1, 2, 7];

/// Expand one polynomial from its cosine-domain roots
fn find_poly(out: &mut [Word32], c_lsf: &[Word32], dd: usize) {
    out[0] = 1 << QA;
    out[1] = -c_lsf[0];
    for k in 1..dd {
        let ftmp = c_lsf[2 * k]; // QA
        out[k + 1] = (out[k - 1] << 1) - rshift_round64(smull(ftmp, out[k]), QA) as Word32;
        for n in (2..=k).rev() {
            out[n] += out[n - 2] - rshift_round64(smull(ftmp, out[n - 1]), QA) as Word32;
        }
        out[1] -= ftmp;
    }
}

/// Convert a Q15 NLSF vector to Q12 prediction coefficients
pub fn nlsf2a(a_q12: &mut [i16], nlsf: &[i16], d: usize) {
    debug_assert!(d == 10 || d == 16);
    let ordering: &[usize] = if d == 16 {
        &ORDERING_16
    } else {
        &ORDERING_10
    };

    // Cosine values of the NLSFs, linearly interpolated on the grid, QA
    let mut c_lsf = [0 as Word32; 16];
    for k in 0..d {
        debug_assert!(nlsf[k] >= 0);
        let f_int = (nlsf[k] >> 8) as usize;
        let f_frac = (nlsf[k] as Word32) - ((f_int as Word32) << 8);
        let cos_val = LSF_COS_TAB_Q12[f_int] as Word32;
        let delta = LSF_COS_TAB_Q12[f_int + 1] as Word32 - cos_val;
        c_lsf[ordering[k]] = (cos_val << 8) + delta * f_frac; // Q12 << 8 = Q20 -> QA+4
    }
    // Scale down from Q20 to QA
    for v in c_lsf.iter_mut().take(d) {
        *v = rshift_round(*v, 20 - QA);
    }

    let dd = d >> 1;
    let mut p = [0 as Word32; 9];
    let mut q = [0 as Word32; 9];
    find_poly(&mut p, &c_lsf[0..], dd);
    find_poly(&mut q, &c_lsf[1..], dd);

    // Convert even and odd polynomials to the prediction coefficients
    let mut a32_qa1 = [0 as Word32; 16];
    for k in 0..dd {
        let ptmp = p[k + 1] + p[k];
        let qtmp = q[k + 1] - q[k];
        a32_qa1[k] = -qtmp - ptmp; // QA + 1
        a32_qa1[d - k - 1] = qtmp - ptmp;
    }

    // Fit to Q12, expanding bandwidth as long as any coefficient overflows
    for _ in 0..10 {
        let mut max_abs = 0i32;
        let mut idx = 0usize;
        for k in 0..d {
            let absval = a32_qa1[k].abs();
            if absval > max_abs {
                max_abs = absval;
                idx = k;
            }
        }
        max_abs = rshift_round(max_abs, QA + 1 - 12);
        if max_abs <= i16::MAX as i32 {
            break;
        }
        // Reduce magnitude of the prediction coefficients
        max_abs = max_abs.min(163_838); // (i32::MAX >> 14) + i16::MAX
        let chirp_q16 = 65_470
            - ((max_abs - i16::MAX as i32) << 14) / ((max_abs * (idx as i32 + 1)) >> 2);
        bwexpander_q16(&mut a32_qa1, d, chirp_q16);
    }
    for k in 0..d {
        a_q12[k] = sat16(rshift_round(a32_qa1[k], QA + 1 - 12));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlsf::a2nlsf_flp;

    #[test]
    fn test_uniform_nlsfs_give_near_zero_predictor() {
        // Evenly spaced NLSFs correspond to A(z) = 1
        let mut nlsf = [0i16; 10];
        let step = 32_768 / 11;
        for i in 0..10 {
            nlsf[i] = ((i as i32 + 1) * step) as i16;
        }
        let mut a = [0i16; 10];
        nlsf2a(&mut a, &nlsf, 10);
        for (k, &c) in a.iter().enumerate() {
            assert!(c.abs() < 200, "a[{}] = {} too large", k, c);
        }
    }

    #[test]
    fn test_round_trip_through_nlsf_domain() {
        // a -> NLSF -> a' keeps coefficients close for a stable filter
        let a_orig = [0.6f32, -0.3, 0.15, -0.05, 0.02, 0.0, 0.0, 0.0, 0.0, 0.0];
        let mut nlsf = [0i16; 10];
        a2nlsf_flp(&mut nlsf, &a_orig, 10);
        let mut a_rec = [0i16; 10];
        nlsf2a(&mut a_rec, &nlsf, 10);
        for k in 0..10 {
            let orig_q12 = (a_orig[k] * 4096.0).round() as i32;
            let diff = (a_rec[k] as i32 - orig_q12).abs();
            assert!(diff < 300, "a[{}]: {} vs {}", k, a_rec[k], orig_q12);
        }
    }

    #[test]
    fn test_output_bounded_for_tight_nlsfs() {
        // Tightly clustered NLSFs stress the expansion; output must stay
        // within Q12 i16 range by construction
        let mut nlsf = [0i16; 10];
        for i in 0..10 {
            nlsf[i] = 1000 + 300 * i as i16;
        }
        let mut a = [0i16; 10];
        nlsf2a(&mut a, &nlsf, 10);
        // No saturated coefficients after the fitting loop
        assert!(a.iter().all(|&c| c > i16::MIN && c < i16::MAX));
    }
}
