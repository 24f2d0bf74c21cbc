//! Run orchestration: validate, broadcast, integrate locally, reduce.
//!
//! Every worker calls [`run_integration`] with the same backend and the
//! same collective call order. The designated worker supplies the global
//! parameters and is the only one that ends the run holding the total;
//! everyone else derives its share, contributes its partial sum, and
//! returns empty-handed.

use crate::comm::CollectiveBackend;
use crate::error::{Result, TrapezeError};
use crate::integrate::integrate_local;
use crate::partition::partition;
use crate::problem::{GlobalProblem, GlobalResult, Integrand};

/// The worker that validates input, receives the reduced total, and
/// reports it.
pub const DESIGNATED_WORKER: usize = 0;

/// Abort status signalled when the global parameters are rejected.
pub const CONFIG_ABORT_STATUS: i32 = 1;

/// Approximate `∫ f` over the problem's interval, cooperatively.
///
/// `problem` must be `Some` on [`DESIGNATED_WORKER`] and is ignored
/// elsewhere. Returns `Some(GlobalResult)` on the designated worker and
/// `None` on the others. A rejected parameter set aborts the entire run:
/// the designated worker returns the `Config` error and every other
/// worker unwinds out of the broadcast instead of hanging in the
/// reduction waiting on a partner that never computes a share.
pub fn run_integration(
    comm: &dyn CollectiveBackend,
    problem: Option<GlobalProblem>,
    f: &dyn Integrand,
) -> Result<Option<GlobalResult>> {
    let rank = comm.rank();
    let workers = comm.num_workers();
    let _span = tracing::info_span!("integration", rank, workers).entered();

    if rank == DESIGNATED_WORKER {
        let candidate = problem.as_ref().ok_or_else(|| {
            TrapezeError::Comm("designated worker was given no problem".into())
        })?;
        if let Err(e) = candidate.validate() {
            tracing::error!(error = %e, "rejecting global parameters");
            comm.abort(CONFIG_ABORT_STATUS);
            return Err(e);
        }
    }

    let problem = comm.broadcast_problem(problem, DESIGNATED_WORKER)?;

    // The step comes from the global parameters, never the local bounds,
    // so it is bit-identical on every worker.
    let h = problem.step();
    let share = partition(
        problem.subintervals as u64,
        workers,
        rank,
        problem.lower,
        problem.upper,
    );
    let partial = integrate_local(&share, h, f);
    tracing::info!(
        subintervals = share.subintervals,
        lower = share.lower,
        upper = share.upper,
        partial,
        "local share integrated"
    );

    let total = comm.reduce_sum(partial, DESIGNATED_WORKER)?;
    Ok(total.map(|value| GlobalResult { value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SingleWorkerComm;
    use approx::assert_relative_eq;

    fn square(x: f64) -> f64 {
        x * x
    }

    #[test]
    fn single_worker_matches_direct_computation() {
        let problem = GlobalProblem::new(0.0, 1.0, 1024);
        let result = run_integration(&SingleWorkerComm, Some(problem), &square)
            .unwrap()
            .expect("designated worker holds the result");

        let direct = integrate_local(
            &partition(1024, 1, 0, 0.0, 1.0),
            problem.step(),
            &square,
        );
        assert_eq!(result.value, direct);
        assert_relative_eq!(result.value, 1.0 / 3.0, epsilon = 1e-4);
    }

    #[test]
    fn degenerate_interval_integrates_to_exactly_zero() {
        let problem = GlobalProblem::new(2.0, 2.0, 64);
        let result = run_integration(&SingleWorkerComm, Some(problem), &square)
            .unwrap()
            .unwrap();
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn non_positive_subinterval_count_is_a_config_error() {
        for n in [0, -5] {
            let problem = GlobalProblem::new(0.0, 1.0, n);
            let outcome = run_integration(&SingleWorkerComm, Some(problem), &square);
            assert!(matches!(outcome, Err(TrapezeError::Config(_))), "n={n}");
        }
    }

    #[test]
    fn inverted_bounds_are_a_config_error() {
        let problem = GlobalProblem::new(1.0, 0.0, 64);
        let outcome = run_integration(&SingleWorkerComm, Some(problem), &square);
        assert!(matches!(outcome, Err(TrapezeError::Config(_))));
    }

    #[test]
    fn designated_worker_without_problem_is_an_error() {
        let outcome = run_integration(&SingleWorkerComm, None, &square);
        assert!(matches!(outcome, Err(TrapezeError::Comm(_))));
    }
}
