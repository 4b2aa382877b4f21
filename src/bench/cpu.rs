//! CPU benchmark
//!
//! Counts primes below a bound using deliberately naive trial division. The
//! O(n) divisor count per candidate is the workload being timed.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::progress::Progress;
use crate::utils;

/// Decide whether `n` is prime by counting all of its divisors in `[1, n]`
///
/// A prime has exactly two divisors. No square-root shortcut is taken.
pub fn is_prime(n: u64) -> bool {
    let mut divisors = 0u32;
    for d in 1..=n {
        if n % d == 0 {
            divisors += 1;
        }
    }
    divisors == 2
}

/// Primes found by one sweep, in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimeSet {
    primes: Vec<u64>,
}

impl PrimeSet {
    fn push(&mut self, prime: u64) {
        self.primes.push(prime);
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// Largest prime found; the sweep is ascending so this is the last one
    pub fn last(&self) -> Option<u64> {
        self.primes.last().copied()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.primes
    }
}

/// CPU benchmark results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuBenchmarkResult {
    /// Exclusive upper bound of the sweep
    pub upper_bound: u64,

    /// Number of primes found
    pub primes_found: usize,

    /// Last prime found, `None` when the sweep found nothing
    pub last_prime: Option<u64>,

    /// Wall-clock duration of the sweep
    pub elapsed_seconds: f64,
}

/// Runs the primality sweep
pub struct CpuBenchmark {
    upper_bound: u64,
}

impl CpuBenchmark {
    /// Create a benchmark sweeping `1..upper_bound`
    pub fn new(upper_bound: u64) -> Self {
        Self { upper_bound }
    }

    /// Check every integer in `1..upper_bound`, collecting the primes
    pub fn sweep(&self, progress: &mut dyn Progress) -> PrimeSet {
        let total = self.upper_bound.saturating_sub(1);
        let mut primes = PrimeSet::default();

        progress.start("Calculating primes", total);
        for n in 1..self.upper_bound {
            if is_prime(n) {
                primes.push(n);
            }
            progress.set_position(n);
        }
        progress.finish();

        primes
    }

    /// Run the benchmark
    pub fn run(&self, progress: &mut dyn Progress) -> CpuBenchmarkResult {
        info!(upper_bound = self.upper_bound, "Starting CPU benchmark");
        let start = Instant::now();

        let primes = self.sweep(progress);
        if primes.is_empty() {
            debug!(upper_bound = self.upper_bound, "No primes below bound");
        }

        let result = CpuBenchmarkResult {
            upper_bound: self.upper_bound,
            primes_found: primes.len(),
            last_prime: primes.last(),
            elapsed_seconds: utils::elapsed_seconds(start.elapsed()),
        };

        debug!(
            first_prime = ?primes.as_slice().first(),
            last_prime = ?result.last_prime,
            "Sweep finished"
        );
        info!(
            primes_found = result.primes_found,
            elapsed_secs = result.elapsed_seconds,
            "CPU benchmark complete"
        );

        result
    }
}
