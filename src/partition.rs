//! Domain decomposition of the global interval across workers.
//!
//! Splitting `n` subintervals over `p` workers leaves `n mod p` extras;
//! those go one apiece to the lowest-ranked workers instead of being
//! dropped or piled onto a single rank. Every worker computes its own
//! share from the same global parameters, so no coordination is needed
//! beyond the initial broadcast.

/// One worker's slice of the global problem.
///
/// Derived deterministically from the global parameters plus the worker's
/// rank; never mutated after construction. `subintervals` may be zero when
/// there are more workers than subintervals, in which case the interval
/// has zero width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerShare {
    pub rank: usize,
    pub lower: f64,
    pub upper: f64,
    pub subintervals: u64,
}

/// Compute worker `rank`'s share of `n` subintervals over `[a, b]`.
///
/// With `base = n / p` and `rem = n % p`, ranks below `rem` take `base + 1`
/// subintervals ("heavy"), the rest take `base` ("light"). A heavy rank
/// starts at `a + rank*(base+1)*h`; a light rank starts past the width
/// consumed by all heavy ranks, at `a + rank*base*h + rem*h`. The step
/// `h = (b - a) / n` comes from the global parameters, so adjacent shares
/// meet at shared boundary points and together tile `[a, b]` exactly.
///
/// `n == 0` yields a zero-width share for every rank rather than dividing
/// by zero.
pub fn partition(n: u64, workers: usize, rank: usize, a: f64, b: f64) -> WorkerShare {
    debug_assert!(workers >= 1);
    debug_assert!(rank < workers);

    let h = if n == 0 { 0.0 } else { (b - a) / n as f64 };
    let base = n / workers as u64;
    let rem = n % workers as u64;
    let r = rank as u64;

    let (local_n, local_a) = if r < rem {
        (base + 1, a + (r * (base + 1)) as f64 * h)
    } else {
        (base, a + (r * base) as f64 * h + rem as f64 * h)
    };
    let local_b = local_a + local_n as f64 * h;

    WorkerShare {
        rank,
        lower: local_a,
        upper: local_b,
        subintervals: local_n,
    }
}
