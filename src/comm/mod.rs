//! Communication backend abstraction for the worker pool.
//!
//! Provides a trait for the two collective operations a run needs
//! (parameter broadcast, sum reduction onto a target worker) plus
//! whole-run abort, and a no-op single-worker implementation.

pub mod channels;
#[cfg(feature = "distributed")]
pub mod mpi;

use crate::error::{Result, TrapezeError};
use crate::problem::GlobalProblem;

/// Abstraction over inter-worker communication.
///
/// Implementations: `SingleWorkerComm` (no-op), `ChannelComm` (in-process
/// thread pool over crossbeam channels), `MpiComm` (via mpi crate, behind
/// the `distributed` feature).
///
/// Workers execute the same collective calls in the same order; both
/// collectives block until the caller's part of the exchange is complete.
pub trait CollectiveBackend: Send + Sync {
    /// This worker's rank in `[0, num_workers)`.
    fn rank(&self) -> usize;

    /// Total number of cooperating workers.
    fn num_workers(&self) -> usize;

    /// Distribute the global parameters from `root` to every worker.
    ///
    /// Only `root` supplies `Some(problem)`; every worker returns the
    /// root's copy. A worker that observes a run abort instead returns
    /// `RunAborted`.
    fn broadcast_problem(
        &self,
        problem: Option<GlobalProblem>,
        root: usize,
    ) -> Result<GlobalProblem>;

    /// Sum `local` across all workers onto `root`.
    ///
    /// Every contribution is folded in exactly once. Returns `Some(total)`
    /// on `root`, `None` elsewhere.
    fn reduce_sum(&self, local: f64, root: usize) -> Result<Option<f64>>;

    /// Tear the whole run down with `status`. Peers observe the abort at
    /// their next collective call or are terminated outright, depending
    /// on the backend.
    fn abort(&self, status: i32);
}

/// No-op communication backend for single-worker execution.
///
/// Broadcast and reduction pass through unchanged; there are no peers to
/// notify on abort.
pub struct SingleWorkerComm;

impl CollectiveBackend for SingleWorkerComm {
    fn rank(&self) -> usize {
        0
    }

    fn num_workers(&self) -> usize {
        1
    }

    fn broadcast_problem(
        &self,
        problem: Option<GlobalProblem>,
        _root: usize,
    ) -> Result<GlobalProblem> {
        problem.ok_or_else(|| {
            TrapezeError::Comm("broadcast source holds no global parameters".into())
        })
    }

    fn reduce_sum(&self, local: f64, _root: usize) -> Result<Option<f64>> {
        Ok(Some(local))
    }

    fn abort(&self, _status: i32) {
        // Single worker: no peers to stop.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_worker_rank_and_size() {
        let comm = SingleWorkerComm;
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.num_workers(), 1);
    }

    #[test]
    fn single_worker_broadcast_is_identity() {
        let comm = SingleWorkerComm;
        let problem = GlobalProblem::new(0.0, 1.0, 64);
        let received = comm.broadcast_problem(Some(problem), 0).unwrap();
        assert_eq!(received, problem);
    }

    #[test]
    fn single_worker_broadcast_without_problem_errors() {
        let comm = SingleWorkerComm;
        assert!(comm.broadcast_problem(None, 0).is_err());
    }

    #[test]
    fn single_worker_reduce_is_identity() {
        let comm = SingleWorkerComm;
        assert_eq!(comm.reduce_sum(42.0, 0).unwrap(), Some(42.0));
        assert_eq!(comm.reduce_sum(-1.5, 0).unwrap(), Some(-1.5));
    }
}
