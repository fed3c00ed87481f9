//! Burg's modified method for AR estimation
//!
//! Estimates the LPC vector over a set of concatenated subframes without
//! windowing, maintaining forward/backward correlation vectors
//! incrementally. The inverse prediction gain is tracked at every order;
//! when it would fall below `min_inv_gain`, the reflection coefficient at
//! the breaking step is clamped so the bound is hit exactly and all higher
//! orders are zeroed. Internal state is double precision; the output
//! coefficients are truncated to float32 exactly where the reference
//! truncates.

use crate::constants::FIND_LPC_COND_FAC;
use crate::math::inner_product::{energy, inner_product};

/// Maximum AR order handled by the recursion
const MAX_ORDER: usize = 24;

/// Run Burg's modified recursion over `nb_subfr` subframes of
/// `subfr_length` samples each, laid out consecutively in `x`
///
/// Writes `order` prediction coefficients into `a` (analysis convention,
/// i.e. residual = `x[n] - sum a[k] x[n-1-k]`) and returns the residual
/// energy of the branch taken (clamped or completed).
pub fn burg_modified(
    a: &mut [f32],
    x: &[f32],
    min_inv_gain: f64,
    subfr_length: usize,
    nb_subfr: usize,
    order: usize,
) -> f32 {
    debug_assert!(order <= MAX_ORDER);
    debug_assert!(x.len() >= nb_subfr * subfr_length);
    debug_assert!(subfr_length > order);

    let mut c0 = energy(&x[..nb_subfr * subfr_length]);

    let mut c_first_row = [0.0f64; MAX_ORDER];
    for s in 0..nb_subfr {
        let xs = &x[s * subfr_length..(s + 1) * subfr_length];
        for n in 1..=order {
            c_first_row[n - 1] += inner_product(&xs[..subfr_length - n], &xs[n..]);
        }
    }
    let mut c_last_row = c_first_row;

    let mut caf = [0.0f64; MAX_ORDER + 1];
    let mut cab = [0.0f64; MAX_ORDER + 1];
    caf[0] = c0 + FIND_LPC_COND_FAC * c0 + 1e-9;
    cab[0] = caf[0];

    let mut af = [0.0f64; MAX_ORDER];
    let mut inv_gain = 1.0f64;
    let mut reached_max_gain = false;

    for n in 0..order {
        // Update the first row (without first element), the last row (without
        // last element, reversed), and the C*Af / C*flipud(Af) products
        for s in 0..nb_subfr {
            let xs = &x[s * subfr_length..(s + 1) * subfr_length];
            let x1 = xs[n] as f64;
            let x2 = xs[subfr_length - n - 1] as f64;
            let mut tmp1 = x1;
            let mut tmp2 = x2;
            for k in 0..n {
                c_first_row[k] -= x1 * xs[n - k - 1] as f64;
                c_last_row[k] -= x2 * xs[subfr_length - n + k] as f64;
                let atmp = af[k];
                tmp1 += xs[n - k - 1] as f64 * atmp;
                tmp2 += xs[subfr_length - n + k] as f64 * atmp;
            }
            for k in 0..=n {
                caf[k] -= tmp1 * xs[n - k] as f64;
                cab[k] -= tmp2 * xs[subfr_length - n + k - 1] as f64;
            }
        }
        let mut tmp1 = c_first_row[n];
        let mut tmp2 = c_last_row[n];
        for k in 0..n {
            let atmp = af[k];
            tmp1 += c_last_row[n - k - 1] * atmp;
            tmp2 += c_first_row[n - k - 1] * atmp;
        }
        caf[n + 1] = tmp1;
        cab[n + 1] = tmp2;

        // Reflection coefficient
        let mut num = cab[n + 1];
        let mut nrg_b = cab[0];
        let mut nrg_f = caf[0];
        for k in 0..n {
            let atmp = af[k];
            num += cab[n - k] * atmp;
            nrg_b += cab[k + 1] * atmp;
            nrg_f += caf[k + 1] * atmp;
        }
        let mut rc = -2.0 * num / (nrg_f + nrg_b);
        debug_assert!(rc.is_finite());

        // Update inverse prediction gain, clamping the reflection
        // coefficient when the bound would be crossed
        let tmp_gain = inv_gain * (1.0 - rc * rc);
        if tmp_gain <= min_inv_gain {
            rc = (1.0 - min_inv_gain / inv_gain).sqrt();
            if num > 0.0 {
                rc = -rc;
            }
            inv_gain = min_inv_gain;
            reached_max_gain = true;
        } else {
            inv_gain = tmp_gain;
        }

        // Update AR coefficients
        for k in 0..(n + 1) >> 1 {
            let t1 = af[k];
            let t2 = af[n - k - 1];
            af[k] = t1 + rc * t2;
            af[n - k - 1] = t2 + rc * t1;
        }
        af[n] = rc;

        if reached_max_gain {
            // Coefficients of higher orders stay zero
            for coeff in af.iter_mut().take(order).skip(n + 1) {
                *coeff = 0.0;
            }
            break;
        }

        // Update C*Af and C*Ab
        for k in 0..=n + 1 {
            let t1 = caf[k];
            caf[k] += rc * cab[n - k + 1];
            cab[n - k + 1] += rc * t1;
        }
    }

    let nrg_f_out;
    if reached_max_gain {
        for k in 0..order {
            a[k] = (-af[k]) as f32;
        }
        // Subtract energy of the preceding samples from C0
        for s in 0..nb_subfr {
            c0 -= energy(&x[s * subfr_length..s * subfr_length + order]);
        }
        // Approximate residual energy from the hit gain bound
        nrg_f_out = c0 * inv_gain;
    } else {
        // Compute residual energy from the completed recursion
        let mut nrg_f = caf[0];
        let mut tmp1 = 1.0f64;
        for k in 0..order {
            let atmp = af[k];
            nrg_f += caf[k + 1] * atmp;
            tmp1 += atmp * atmp;
            a[k] = (-atmp) as f32;
        }
        nrg_f -= FIND_LPC_COND_FAC * c0 * tmp1;
        nrg_f_out = nrg_f;
    }

    nrg_f_out as f32
}
