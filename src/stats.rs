//! Run timing collection for `--stats` output.

use std::time::{Duration, Instant};

/// Collects phase timings and run counters.
///
/// Created when `--stats` is passed, carried as `Option<Stats>`.
pub struct Stats {
    total_start: Instant,
    phases: Vec<(&'static str, Duration)>,
    pub workers: usize,
    pub subintervals: i64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            total_start: Instant::now(),
            phases: Vec::new(),
            workers: 0,
            subintervals: 0,
        }
    }

    /// Record a completed phase with its duration.
    pub fn add_phase(&mut self, name: &'static str, duration: Duration) {
        self.phases.push((name, duration));
    }

    /// Print the stats table to stderr.
    pub fn display(&self) {
        let total = self.total_start.elapsed();
        eprintln!();
        eprintln!("=== Trapeze Run Stats ===");
        eprintln!("  Workers:                {}", self.workers);
        eprintln!("  Subintervals:           {}", self.subintervals);
        for (name, dur) in &self.phases {
            eprintln!("  {:<24}{:>8.3}s", name, dur.as_secs_f64());
        }
        eprintln!("  ─────────────────────────────────");
        eprintln!("  Total:                  {:>8.3}s", total.as_secs_f64());
    }
}
