//! MPI communication backend for multi-process runs.
//!
//! Requires the `distributed` feature flag and an MPI installation.
//! Implements `CollectiveBackend` with `MPI_Bcast`/`MPI_Reduce` via the
//! mpi crate; abort maps to `MPI_Abort`, which terminates every rank.
//!
//! # Usage
//!
//! The caller must initialize MPI before constructing `MpiComm`:
//!
//! ```ignore
//! let universe = mpi::initialize().expect("MPI init failed");
//! let comm = MpiComm::new();
//! ```

use mpi::collective::SystemOperation;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use super::CollectiveBackend;
use crate::error::Result;
use crate::problem::GlobalProblem;

/// MPI-based communication backend.
///
/// Wraps the MPI world communicator. Requires `mpi::initialize()` to have
/// been called before construction.
pub struct MpiComm;

impl MpiComm {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MpiComm {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectiveBackend for MpiComm {
    fn rank(&self) -> usize {
        SimpleCommunicator::world().rank() as usize
    }

    fn num_workers(&self) -> usize {
        SimpleCommunicator::world().size() as usize
    }

    fn broadcast_problem(
        &self,
        problem: Option<GlobalProblem>,
        root: usize,
    ) -> Result<GlobalProblem> {
        let world = SimpleCommunicator::world();
        let source = world.process_at_rank(root as i32);

        // Bounds and count travel as separate broadcasts; non-root
        // placeholders are overwritten with the root's values.
        let mut bounds = problem.map_or([0.0, 0.0], |p| [p.lower, p.upper]);
        let mut subintervals = problem.map_or(0, |p| p.subintervals);
        source.broadcast_into(&mut bounds[..]);
        source.broadcast_into(&mut subintervals);

        Ok(GlobalProblem::new(bounds[0], bounds[1], subintervals))
    }

    fn reduce_sum(&self, local: f64, root: usize) -> Result<Option<f64>> {
        let world = SimpleCommunicator::world();
        let target = world.process_at_rank(root as i32);

        if world.rank() == root as i32 {
            let mut total = 0.0f64;
            target.reduce_into_root(&local, &mut total, SystemOperation::sum());
            Ok(Some(total))
        } else {
            target.reduce_into(&local, SystemOperation::sum());
            Ok(None)
        }
    }

    fn abort(&self, status: i32) {
        SimpleCommunicator::world().abort(status);
    }
}
