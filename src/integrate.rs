//! Composite trapezoidal rule over one worker's share.

use crate::partition::WorkerShare;
use crate::problem::Integrand;

/// Trapezoidal estimate of the integral over `share`, with trapezoid base
/// length `h` taken from the global parameters.
///
/// Interior abscissae are generated by repeatedly adding `h` to the local
/// lower bound. Recomputing `lower + i*h` per point would round
/// differently; the running sum keeps the numerics identical across
/// worker counts for a given share.
///
/// An empty share contributes exactly `0.0`.
pub fn integrate_local(share: &WorkerShare, h: f64, f: &dyn Integrand) -> f64 {
    if share.subintervals == 0 {
        return 0.0;
    }

    let mut sum = (f.eval(share.lower) + f.eval(share.upper)) / 2.0;
    let mut x = share.lower;
    for _ in 1..share.subintervals {
        x += h;
        sum += f.eval(x);
    }
    sum * h
}
