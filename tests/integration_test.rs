//! End-to-end tests over the in-process worker pool.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use trapeze::comm::channels::run_workers;
use trapeze::comm::CollectiveBackend;
use trapeze::coordinator::{run_integration, DESIGNATED_WORKER};
use trapeze::error::TrapezeError;
use trapeze::integrate::integrate_local;
use trapeze::partition::partition;
use trapeze::problem::{GlobalProblem, GlobalResult};

/// Helper: run one full integration over a pool of `workers` threads and
/// return every worker's outcome in rank order.
fn pool_run(
    problem: GlobalProblem,
    workers: usize,
    f: fn(f64) -> f64,
) -> Vec<trapeze::error::Result<Option<GlobalResult>>> {
    run_workers(workers, |comm| {
        let on_designated = (comm.rank() == DESIGNATED_WORKER).then_some(problem);
        run_integration(&comm, on_designated, &f)
    })
    .expect("worker pool failed")
}

fn designated_value(outcomes: &[trapeze::error::Result<Option<GlobalResult>>]) -> f64 {
    outcomes[DESIGNATED_WORKER]
        .as_ref()
        .expect("designated worker failed")
        .as_ref()
        .expect("designated worker holds no result")
        .value
}

#[test]
fn quadratic_over_quarter_shares_sums_to_one_third() {
    let outcomes = pool_run(GlobalProblem::new(0.0, 1.0, 1024), 4, |x| x * x);

    assert_relative_eq!(designated_value(&outcomes), 1.0 / 3.0, epsilon = 1e-4);
    for outcome in &outcomes[1..] {
        assert!(outcome.as_ref().unwrap().is_none());
    }
}

#[test]
fn single_worker_pool_matches_direct_computation_exactly() {
    let problem = GlobalProblem::new(-1.0, 2.0, 500);
    let outcomes = pool_run(problem, 1, |x| x * x * x - x);

    let direct = integrate_local(
        &partition(500, 1, 0, -1.0, 2.0),
        problem.step(),
        &|x: f64| x * x * x - x,
    );
    assert_eq!(designated_value(&outcomes), direct);
}

#[test]
fn uneven_division_still_converges() {
    // 1000 = 7*142 + 6: six heavy workers, one light.
    let outcomes = pool_run(GlobalProblem::new(0.0, 2.0, 1000), 7, |x| x * x);
    assert_relative_eq!(designated_value(&outcomes), 8.0 / 3.0, epsilon = 1e-4);
}

#[test]
fn degenerate_interval_yields_exactly_zero() {
    let outcomes = pool_run(GlobalProblem::new(2.0, 2.0, 64), 3, |x| x * x);
    assert_eq!(designated_value(&outcomes), 0.0);
}

#[test]
fn more_workers_than_subintervals_is_not_an_error() {
    // Two subintervals over five workers: three workers hold empty shares.
    // The trapezoidal rule is exact for straight lines, so the empty
    // shares must contribute exactly nothing.
    let outcomes = pool_run(GlobalProblem::new(0.0, 1.0, 2), 5, |x| x);
    assert_abs_diff_eq!(designated_value(&outcomes), 0.5, epsilon = 1e-12);
}

#[test]
fn invalid_subinterval_count_aborts_every_worker() {
    for n in [0, -5] {
        let outcomes = pool_run(GlobalProblem::new(0.0, 1.0, n), 4, |x| x * x);

        assert!(
            matches!(outcomes[DESIGNATED_WORKER], Err(TrapezeError::Config(_))),
            "n={n}"
        );
        for outcome in &outcomes[1..] {
            assert!(
                matches!(outcome, Err(TrapezeError::RunAborted { rank: 0, status: 1 })),
                "n={n}"
            );
        }
    }
}

#[test]
fn reduction_is_order_independent_within_tolerance() {
    let (a, b, n, workers) = (0.0, std::f64::consts::PI, 1024u64, 8usize);
    let h = (b - a) / n as f64;
    let partials: Vec<f64> = (0..workers)
        .map(|r| integrate_local(&partition(n, workers, r, a, b), h, &f64::sin))
        .collect();

    let rank_order: f64 = partials.iter().sum();
    let reversed: f64 = partials.iter().rev().sum();
    let rotated: f64 = partials[3..].iter().chain(&partials[..3]).sum();

    assert_relative_eq!(rank_order, reversed, epsilon = 1e-4);
    assert_relative_eq!(rank_order, rotated, epsilon = 1e-4);
}
