//! Result report formatting.

use crate::error::Result;
use crate::problem::{GlobalProblem, GlobalResult};
use std::io::Write;

/// Write the run summary.
///
/// Format:
/// ```text
/// With n = 1024 trapezoids, our estimate of the integral
/// from 0.000000 to 1.000000 = 0.333333
/// True value:     0.333333
/// Absolute error: 3.1789e-7
/// ```
/// The last two lines appear only when the integrand has a known
/// closed-form value over the interval.
pub fn write_report<W: Write>(
    writer: &mut W,
    problem: &GlobalProblem,
    result: &GlobalResult,
    exact: Option<f64>,
) -> Result<()> {
    writeln!(
        writer,
        "With n = {} trapezoids, our estimate of the integral",
        problem.subintervals
    )?;
    writeln!(
        writer,
        "from {:.6} to {:.6} = {:.6}",
        problem.lower, problem.upper, result.value
    )?;
    if let Some(exact) = exact {
        writeln!(writer, "True value:     {exact:.6}")?;
        writeln!(writer, "Absolute error: {:.4e}", (result.value - exact).abs())?;
    }
    Ok(())
}
