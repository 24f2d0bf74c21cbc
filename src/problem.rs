//! Global integration parameters and the integrand abstraction.
//!
//! A `GlobalProblem` is what the designated worker broadcasts; after the
//! broadcast every worker holds a bit-identical copy and derives its own
//! share from it. The integrand is injected rather than hardwired so tests
//! can integrate functions with closed-form antiderivatives.

use crate::error::{Result, TrapezeError};

/// The definite integral to approximate: `∫ f(x) dx` over `[lower, upper]`
/// split into `subintervals` trapezoids.
///
/// `subintervals` stays signed until [`GlobalProblem::validate`] has run,
/// so a non-positive count coming from the command line is representable
/// and rejected with a `Config` error rather than wrapping silently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalProblem {
    pub lower: f64,
    pub upper: f64,
    pub subintervals: i64,
}

impl GlobalProblem {
    pub fn new(lower: f64, upper: f64, subintervals: i64) -> Self {
        Self {
            lower,
            upper,
            subintervals,
        }
    }

    /// Check the invariants the rest of the run relies on:
    /// `subintervals > 0` and `upper >= lower`.
    ///
    /// A zero-width interval (`lower == upper`) is legal and integrates
    /// to exactly zero.
    pub fn validate(&self) -> Result<()> {
        if self.subintervals <= 0 {
            return Err(TrapezeError::Config(format!(
                "subinterval count must be positive, got {}",
                self.subintervals
            )));
        }
        if !(self.upper >= self.lower) {
            return Err(TrapezeError::Config(format!(
                "upper bound {} is below lower bound {}",
                self.upper, self.lower
            )));
        }
        Ok(())
    }

    /// Uniform trapezoid base length, computed from the global parameters
    /// so it is identical on every worker. Only meaningful after
    /// [`validate`](Self::validate).
    pub fn step(&self) -> f64 {
        (self.upper - self.lower) / self.subintervals as f64
    }
}

/// The reduced total, materialized only on the designated worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalResult {
    pub value: f64,
}

/// A function to integrate.
///
/// Implemented for any `Fn(f64) -> f64 + Send + Sync` closure, so call
/// sites can pass `&|x| x * x` directly. `Send + Sync` because the
/// in-process worker pool evaluates the same integrand from every worker
/// thread.
pub trait Integrand: Send + Sync {
    fn eval(&self, x: f64) -> f64;
}

impl<F> Integrand for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn eval(&self, x: f64) -> f64 {
        self(x)
    }
}
