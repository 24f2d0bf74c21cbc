use clap::Parser;
use std::io;
use std::time::Instant;
use trapeze::comm::channels::run_workers;
use trapeze::comm::CollectiveBackend;
use trapeze::coordinator::{self, DESIGNATED_WORKER};
use trapeze::output;
use trapeze::problem::{GlobalProblem, GlobalResult};
use trapeze::stats::Stats;

/// Distributed trapezoidal-rule integration
#[derive(Parser)]
#[command(name = "trapeze", version)]
struct Cli {
    /// Lower integration bound
    #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
    lower: f64,

    /// Upper integration bound
    #[arg(default_value_t = 1.0, allow_negative_numbers = true)]
    upper: f64,

    /// Number of trapezoids
    #[arg(default_value_t = 1024, allow_negative_numbers = true)]
    subintervals: i64,

    /// Function to integrate: square, cube, sin or exp
    #[arg(long, default_value = "square")]
    function: String,

    /// Worker count for the in-process pool (default: available cores)
    #[arg(long)]
    workers: Option<usize>,

    /// Run over MPI instead of the in-process pool (launch with mpirun)
    #[cfg(feature = "distributed")]
    #[arg(long)]
    mpi: bool,

    /// Print timing stats to stderr
    #[arg(long)]
    stats: bool,
}

/// A CLI-selectable integrand, with its antiderivative when one is known
/// in closed form (used to report the true value and absolute error).
struct NamedIntegrand {
    f: fn(f64) -> f64,
    antiderivative: Option<fn(f64) -> f64>,
}

impl NamedIntegrand {
    fn lookup(name: &str) -> Option<NamedIntegrand> {
        match name {
            "square" => Some(NamedIntegrand {
                f: |x| x * x,
                antiderivative: Some(|x| x * x * x / 3.0),
            }),
            "cube" => Some(NamedIntegrand {
                f: |x| x * x * x,
                antiderivative: Some(|x| x * x * x * x / 4.0),
            }),
            "sin" => Some(NamedIntegrand {
                f: f64::sin,
                antiderivative: Some(|x| -x.cos()),
            }),
            "exp" => Some(NamedIntegrand {
                f: f64::exp,
                antiderivative: Some(f64::exp),
            }),
            _ => None,
        }
    }

    fn exact_over(&self, problem: &GlobalProblem) -> Option<f64> {
        self.antiderivative
            .map(|av| av(problem.upper) - av(problem.lower))
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let integrand = NamedIntegrand::lookup(&cli.function).unwrap_or_else(|| {
        eprintln!(
            "Unknown function '{}' (expected square, cube, sin or exp)",
            cli.function
        );
        std::process::exit(2);
    });

    let problem = GlobalProblem::new(cli.lower, cli.upper, cli.subintervals);
    let stats = cli.stats.then(Stats::new);

    #[cfg(feature = "distributed")]
    if cli.mpi {
        run_mpi(problem, &integrand, stats);
        return;
    }

    run_pool(problem, &integrand, cli.workers, stats);
}

/// Run on the in-process worker pool and report from the designated worker.
fn run_pool(
    problem: GlobalProblem,
    integrand: &NamedIntegrand,
    workers: Option<usize>,
    mut stats: Option<Stats>,
) {
    let workers = workers.unwrap_or_else(num_cpus::get).max(1);
    if let Some(s) = stats.as_mut() {
        s.workers = workers;
        s.subintervals = problem.subintervals;
    }

    let start = Instant::now();
    let mut outcomes = run_workers(workers, |comm| {
        let on_designated = (comm.rank() == DESIGNATED_WORKER).then_some(problem);
        coordinator::run_integration(&comm, on_designated, &integrand.f)
    })
    .unwrap_or_else(|e| {
        eprintln!("Worker pool error: {e}");
        std::process::exit(1);
    });
    if let Some(s) = stats.as_mut() {
        s.add_phase("Integration:", start.elapsed());
    }

    let result = match outcomes.remove(DESIGNATED_WORKER) {
        Ok(Some(result)) => result,
        Ok(None) => {
            eprintln!("No result materialized on the designated worker");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Integration failed: {e}");
            std::process::exit(1);
        }
    };
    for outcome in &outcomes {
        if let Err(e) = outcome {
            eprintln!("Integration failed: {e}");
            std::process::exit(1);
        }
    }

    report(&problem, &result, integrand, stats);
}

/// Run as one rank of an MPI job; only rank 0 reports.
#[cfg(feature = "distributed")]
fn run_mpi(problem: GlobalProblem, integrand: &NamedIntegrand, mut stats: Option<Stats>) {
    use trapeze::comm::mpi::MpiComm;

    let _universe = mpi::initialize().unwrap_or_else(|| {
        eprintln!("MPI initialization failed");
        std::process::exit(1);
    });
    let comm = MpiComm::new();
    if let Some(s) = stats.as_mut() {
        s.workers = comm.num_workers();
        s.subintervals = problem.subintervals;
    }

    let start = Instant::now();
    let on_designated = (comm.rank() == DESIGNATED_WORKER).then_some(problem);
    let outcome = coordinator::run_integration(&comm, on_designated, &integrand.f);
    if let Some(s) = stats.as_mut() {
        s.add_phase("Integration:", start.elapsed());
    }

    match outcome {
        Ok(Some(result)) => report(&problem, &result, integrand, stats),
        Ok(None) => {} // non-designated rank, nothing to report
        Err(e) => {
            eprintln!("Integration failed: {e}");
            std::process::exit(1);
        }
    }
}

fn report(
    problem: &GlobalProblem,
    result: &GlobalResult,
    integrand: &NamedIntegrand,
    stats: Option<Stats>,
) {
    let exact = integrand.exact_over(problem);
    output::write_report(&mut io::stdout(), problem, result, exact).unwrap_or_else(|e| {
        eprintln!("Output error: {e}");
        std::process::exit(1);
    });

    if let Some(stats) = stats {
        stats.display();
    }
}
