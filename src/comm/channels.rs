//! In-process worker pool over crossbeam channels.
//!
//! Workers are OS threads that share nothing and talk only through a full
//! mesh of channels: one dedicated link per ordered worker pair. The
//! dedicated links let the reduction consume each peer's contribution
//! exactly once and fold in rank order, so the total is independent of
//! arrival order. An abort travels in-band and is observed by peers at
//! their next collective call.

use crossbeam::channel::{unbounded, Receiver, Sender};

use super::CollectiveBackend;
use crate::error::{Result, TrapezeError};
use crate::problem::GlobalProblem;

#[derive(Debug, Clone, Copy)]
enum Message {
    Problem(GlobalProblem),
    Partial(f64),
    Abort { rank: usize, status: i32 },
}

/// One worker's endpoint of the channel mesh.
pub struct ChannelComm {
    rank: usize,
    workers: usize,
    /// `outboxes[peer]`: dedicated link to `peer`; `None` at our own slot.
    outboxes: Vec<Option<Sender<Message>>>,
    /// `inboxes[peer]`: dedicated link from `peer`; `None` at our own slot.
    inboxes: Vec<Option<Receiver<Message>>>,
}

impl ChannelComm {
    /// Build a fully connected mesh of `workers` endpoints.
    ///
    /// Endpoint `r` of the returned vector belongs to rank `r`. Dropping
    /// an endpoint disconnects its links, which surfaces as a `Comm` error
    /// on peers instead of a hang.
    pub fn mesh(workers: usize) -> Vec<ChannelComm> {
        assert!(workers >= 1, "worker pool needs at least one worker");

        let mut outboxes: Vec<Vec<Option<Sender<Message>>>> =
            (0..workers).map(|_| vec![None; workers]).collect();
        let mut inboxes: Vec<Vec<Option<Receiver<Message>>>> =
            (0..workers).map(|_| (0..workers).map(|_| None).collect()).collect();

        for from in 0..workers {
            for to in 0..workers {
                if from == to {
                    continue;
                }
                let (tx, rx) = unbounded();
                outboxes[from][to] = Some(tx);
                inboxes[to][from] = Some(rx);
            }
        }

        outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| ChannelComm {
                rank,
                workers,
                outboxes,
                inboxes,
            })
            .collect()
    }

    fn send(&self, to: usize, message: Message) -> Result<()> {
        let link = self.outboxes[to].as_ref().ok_or_else(|| {
            TrapezeError::Comm(format!("worker {} has no link to itself", self.rank))
        })?;
        link.send(message)
            .map_err(|_| TrapezeError::Comm(format!("worker {to} hung up")))
    }

    fn recv(&self, from: usize) -> Result<Message> {
        let link = self.inboxes[from].as_ref().ok_or_else(|| {
            TrapezeError::Comm(format!("worker {} has no link to itself", self.rank))
        })?;
        link.recv()
            .map_err(|_| TrapezeError::Comm(format!("worker {from} hung up")))
    }
}

impl CollectiveBackend for ChannelComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn num_workers(&self) -> usize {
        self.workers
    }

    fn broadcast_problem(
        &self,
        problem: Option<GlobalProblem>,
        root: usize,
    ) -> Result<GlobalProblem> {
        if self.rank == root {
            let problem = problem.ok_or_else(|| {
                TrapezeError::Comm("broadcast source holds no global parameters".into())
            })?;
            for to in (0..self.workers).filter(|&to| to != root) {
                self.send(to, Message::Problem(problem))?;
            }
            Ok(problem)
        } else {
            match self.recv(root)? {
                Message::Problem(problem) => Ok(problem),
                Message::Abort { rank, status } => Err(TrapezeError::RunAborted { rank, status }),
                Message::Partial(_) => Err(TrapezeError::Comm(
                    "unexpected partial result during parameter broadcast".into(),
                )),
            }
        }
    }

    fn reduce_sum(&self, local: f64, root: usize) -> Result<Option<f64>> {
        if self.rank == root {
            // Fold in rank order over the dedicated links. Arrival order
            // cannot change the result, and a contribution meant for a
            // later reduction can never be consumed by this one.
            let mut total = local;
            for from in (0..self.workers).filter(|&from| from != root) {
                match self.recv(from)? {
                    Message::Partial(value) => total += value,
                    Message::Abort { rank, status } => {
                        return Err(TrapezeError::RunAborted { rank, status })
                    }
                    Message::Problem(_) => {
                        return Err(TrapezeError::Comm(
                            "unexpected parameter broadcast during reduction".into(),
                        ))
                    }
                }
            }
            Ok(Some(total))
        } else {
            self.send(root, Message::Partial(local))?;
            Ok(None)
        }
    }

    fn abort(&self, status: i32) {
        // Delivery is best effort; a peer that already exited is fine.
        for to in (0..self.workers).filter(|&to| to != self.rank) {
            if let Some(link) = self.outboxes[to].as_ref() {
                let _ = link.send(Message::Abort {
                    rank: self.rank,
                    status,
                });
            }
        }
    }
}

/// Run `job` once per worker on its own thread and collect the outcomes
/// in rank order.
///
/// This is the process-bootstrap collaborator for in-process runs: it
/// builds the mesh, spawns one named thread per rank, and joins them all.
pub fn run_workers<T, F>(workers: usize, job: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(ChannelComm) -> T + Send + Sync,
{
    let comms = ChannelComm::mesh(workers);

    std::thread::scope(|scope| {
        let job = &job;
        let mut handles = Vec::with_capacity(workers);
        for comm in comms {
            let handle = std::thread::Builder::new()
                .name(format!("trapeze-worker-{}", comm.rank()))
                .spawn_scoped(scope, move || job(comm))?;
            handles.push(handle);
        }

        let mut outcomes = Vec::with_capacity(workers);
        for handle in handles {
            outcomes.push(
                handle
                    .join()
                    .map_err(|_| TrapezeError::Comm("worker thread panicked".into()))?,
            );
        }
        Ok(outcomes)
    })
}
