//! LPC to NLSF conversion
//!
//! Root finder over the 129-entry cosine grid: the prediction polynomial is
//! split into symmetric and antisymmetric halves, their trivial roots at
//! z = +/-1 divided out, and the remaining roots located by sign-change
//! scanning with three binary subdivision steps plus a linear
//! interpolation. Failure triggers progressively stronger bandwidth
//! expansion and a restart; the final fallback is a uniformly spaced
//! (white spectrum) NLSF set.

use crate::basic_ops::{rshift_round, smlaww, Word32};
use crate::constants::{BIN_DIV_STEPS_A2NLSF, MAX_ITERATIONS_A2NLSF};
use crate::math::bwexpander_q16;
use crate::tables::cosine::{LSF_COS_TAB_Q12, LSF_COS_TAB_SZ};

/// Transform a polynomial from cos(n*f) basis to powers of cos(f)
fn trans_poly(p: &mut [Word32], k: usize) {
    for i in 2..=k {
        for m in (i + 1..=k).rev() {
            p[m - 2] -= p[m];
        }
        p[i - 2] -= p[i] << 1;
    }
}

/// Evaluate a polynomial at `x` (Q12), coefficients in Q16
fn eval_poly(p: &[Word32], x: Word32, dd: usize) -> Word32 {
    let x_q16 = x << 4;
    let mut y32 = p[dd];
    for n in (0..dd).rev() {
        y32 = smlaww(p[n], y32, x_q16);
    }
    y32
}

/// Build the even/odd polynomials from the Q16 prediction coefficients
fn init_poly(a_q16: &[Word32], p: &mut [Word32], q: &mut [Word32], dd: usize) {
    p[dd] = 1 << 16;
    q[dd] = 1 << 16;
    for k in 0..dd {
        p[k] = -a_q16[dd - k - 1] - a_q16[dd + k];
        q[k] = -a_q16[dd - k - 1] + a_q16[dd + k];
    }
    // Divide out the roots at z = 1 (Q) and z = -1 (P)
    for k in (1..=dd).rev() {
        p[k - 1] -= p[k];
        q[k - 1] += q[k];
    }
    trans_poly(p, dd);
    trans_poly(q, dd);
}

/// Convert prediction coefficients in Q16 to NLSFs in Q15
///
/// `a_q16` is modified in place when bandwidth expansion restarts are
/// needed. `d` must be even.
pub fn a2nlsf(nlsf: &mut [i16], a_q16: &mut [Word32], d: usize) {
    debug_assert_eq!(d & 1, 0);
    let dd = d >> 1;

    let mut p = [0 as Word32; 13];
    let mut q = [0 as Word32; 13];
    init_poly(a_q16, &mut p, &mut q, dd);

    // Find roots, alternating between the two polynomials
    let mut use_p = true;
    let mut xlo = LSF_COS_TAB_Q12[0] as Word32;
    let mut ylo = eval_poly(&p, xlo, dd);
    let mut root_ix = 0usize;
    if ylo < 0 {
        // First NLSF is zero; continue with the other polynomial
        nlsf[0] = 0;
        use_p = false;
        ylo = eval_poly(&q, xlo, dd);
        root_ix = 1;
    }

    let mut k = 1usize;
    let mut i = 0usize;
    let mut thr: Word32 = 0;
    loop {
        let poly: &[Word32] = if use_p { &p } else { &q };
        let xhi = LSF_COS_TAB_Q12[k] as Word32;
        let yhi = eval_poly(poly, xhi, dd);

        if (ylo <= 0 && yhi >= thr) || (ylo >= 0 && yhi <= -thr) {
            thr = if yhi == 0 { 1 } else { 0 };
            // Binary subdivision
            let mut ffrac: Word32 = -256;
            let mut xlo_s = xlo;
            let mut xhi_s = xhi;
            let mut ylo_s = ylo;
            let mut yhi_s = yhi;
            for m in 0..BIN_DIV_STEPS_A2NLSF {
                let xmid = rshift_round(xlo_s + xhi_s, 1);
                let ymid = eval_poly(poly, xmid, dd);
                if (ylo_s <= 0 && ymid >= 0) || (ylo_s >= 0 && ymid <= 0) {
                    // Reduce frequency
                    xhi_s = xmid;
                    yhi_s = ymid;
                } else {
                    // Increase frequency
                    xlo_s = xmid;
                    ylo_s = ymid;
                    ffrac += 128 >> m;
                }
            }
            // Linear interpolation of the remaining fraction
            if ylo_s.abs() < 65_536 {
                let den = ylo_s - yhi_s;
                let nom = (ylo_s << (8 - BIN_DIV_STEPS_A2NLSF)) + (den >> 1);
                if den != 0 {
                    ffrac += nom / den;
                }
            } else {
                ffrac += ylo_s / ((ylo_s - yhi_s) >> (8 - BIN_DIV_STEPS_A2NLSF));
            }
            nlsf[root_ix] = (((k as Word32) << 8) + ffrac).min(i16::MAX as Word32) as i16;
            debug_assert!(nlsf[root_ix] >= 0);

            root_ix += 1;
            if root_ix >= d {
                return;
            }
            // Alternate polynomial and restart from the previous grid point
            use_p = (root_ix & 1) == 0;
            xlo = LSF_COS_TAB_Q12[k - 1] as Word32;
            ylo = (1 - ((root_ix as Word32) & 2)) << 12;
        } else {
            k += 1;
            xlo = xhi;
            ylo = yhi;
            thr = 0;

            if k > LSF_COS_TAB_SZ {
                i += 1;
                if i > MAX_ITERATIONS_A2NLSF {
                    // White spectrum fallback
                    nlsf[0] = ((1 << 15) / (d as i32 + 1)) as i16;
                    for n in 1..d {
                        nlsf[n] = nlsf[n - 1] + nlsf[0];
                    }
                    return;
                }
                // Progressively stronger bandwidth expansion and restart
                bwexpander_q16(a_q16, d, 65_536 - (1 << i));
                init_poly(a_q16, &mut p, &mut q, dd);
                use_p = true;
                xlo = LSF_COS_TAB_Q12[0] as Word32;
                ylo = eval_poly(&p, xlo, dd);
                if ylo < 0 {
                    nlsf[0] = 0;
                    use_p = false;
                    ylo = eval_poly(&q, xlo, dd);
                    root_ix = 1;
                } else {
                    root_ix = 0;
                }
                k = 1;
            }
        }
    }
}

/// Float wrapper: convert float32 prediction coefficients to Q15 NLSFs
pub fn a2nlsf_flp(nlsf_q15: &mut [i16], a: &[f32], d: usize) {
    let mut a_q16 = [0 as Word32; 16];
    for k in 0..d {
        let v = (a[k] as f64 * 65_536.0).round();
        a_q16[k] = v.clamp(i32::MIN as f64, i32::MAX as f64) as Word32;
    }
    a2nlsf(nlsf_q15, &mut a_q16[..d], d);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_predictor_gives_uniform_nlsfs() {
        // A(z) = 1: roots evenly spaced on the unit circle
        let mut a = [0.0f32; 10];
        let mut nlsf = [0i16; 10];
        a2nlsf_flp(&mut nlsf, &mut a, 10);
        for i in 1..10 {
            assert!(nlsf[i] > nlsf[i - 1], "not increasing at {}", i);
        }
        // Spacing close to 32768 / 11
        let expect = 32_768 / 11;
        for i in 0..10 {
            let target = (i as i32 + 1) * expect;
            assert!(
                (nlsf[i] as i32 - target).abs() < 400,
                "root {}: {} vs {}",
                i,
                nlsf[i],
                target
            );
        }
    }

    #[test]
    fn test_single_pole_monotone_output() {
        // x[n] = 0.9 x[n-1]: one strong low-frequency root
        let mut a = [0.0f32; 10];
        a[0] = 0.9;
        let mut nlsf = [0i16; 10];
        a2nlsf_flp(&mut nlsf, &mut a, 10);
        for i in 1..10 {
            assert!(nlsf[i] > nlsf[i - 1], "not increasing at {}", i);
        }
        assert!(nlsf[0] > 0);
    }

    #[test]
    fn test_wideband_order() {
        let mut a = [0.0f32; 16];
        a[0] = 0.5;
        a[1] = -0.2;
        let mut nlsf = [0i16; 16];
        a2nlsf_flp(&mut nlsf, &mut a, 16);
        for i in 1..16 {
            assert!(nlsf[i] > nlsf[i - 1]);
        }
    }
}
