use crate::report::{SimulationOutcome, SimulationResult};
use crate::stats::{mean, percentile, sample_std_dev};
use core_types::ReturnSeries;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;

pub const DEFAULT_NUM_SIMULATIONS: usize = 1000;
pub const DEFAULT_HORIZON_DAYS: usize = 252;
pub const DEFAULT_BATCHES: usize = 8;

/// Fewest return observations a simulation will run on.
const MIN_OBSERVATIONS: usize = 2;

/// Shape of a Monte Carlo run.
///
/// `batches` controls how the simulation axis is split across worker threads.
/// Results depend on it, so keep it fixed where reproducibility matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationParams {
    pub num_simulations: usize,
    pub days: usize,
    pub batches: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_NUM_SIMULATIONS,
            days: DEFAULT_HORIZON_DAYS,
            batches: DEFAULT_BATCHES,
        }
    }
}

/// Projects the distribution of valuations `days` ahead with independent random walks.
///
/// Daily returns are drawn from `Normal(mean(R), stdev(R))` and compounded
/// from `last_value`. Each path starts at `last_value` on day 0 and takes
/// `days - 1` steps. Paths are split into batches that run in parallel. Each
/// batch is seeded from `rng` in batch order, so the outcome is a pure function
/// of the generator state and `params`.
pub fn simulate<R: RngCore + ?Sized>(
    returns: &ReturnSeries,
    last_value: f64,
    params: &SimulationParams,
    rng: &mut R,
) -> SimulationOutcome {
    if returns.len() < MIN_OBSERVATIONS {
        return SimulationOutcome::InsufficientData;
    }

    let fractions: Vec<f64> = returns.fractions().collect();
    let (Some(mu), Some(sigma)) = (mean(&fractions), sample_std_dev(&fractions)) else {
        return SimulationOutcome::InsufficientData;
    };

    let num_simulations = params.num_simulations.max(1);
    let steps = params.days.max(1) - 1;
    let batch_sizes = split_batches(num_simulations, params.batches);
    let seeds: Vec<u64> = batch_sizes.iter().map(|_| rng.next_u64()).collect();

    tracing::debug!(
        mu,
        sigma,
        num_simulations,
        days = params.days,
        batches = batch_sizes.len(),
        "Running Monte Carlo simulation."
    );

    let walk = RandomWalk { start: last_value, mu, sigma, steps };
    let mut final_values: Vec<f64> = seeds
        .into_par_iter()
        .zip(batch_sizes.into_par_iter())
        .map(|(seed, paths)| walk.run_batch(seed, paths))
        .collect::<Vec<Vec<f64>>>()
        .into_iter()
        .flatten()
        .collect();

    let expected_value = mean(&final_values).unwrap_or(last_value);
    let finished_higher = final_values.iter().filter(|v| **v > last_value).count();
    let probability_positive = 100.0 * finished_higher as f64 / final_values.len() as f64;

    final_values.sort_by(f64::total_cmp);

    SimulationOutcome::Completed(SimulationResult {
        expected_value,
        probability_positive,
        lower_p5: percentile(&final_values, 5.0),
        upper_p95: percentile(&final_values, 95.0),
        last_value,
    })
}

#[derive(Debug, Clone, Copy)]
struct RandomWalk {
    start: f64,
    mu: f64,
    sigma: f64,
    steps: usize,
}

impl RandomWalk {
    /// Final values of `paths` independent walks. Days within a path are sequential.
    fn run_batch(&self, seed: u64, paths: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..paths)
            .map(|_| {
                let mut value = self.start;
                for _ in 0..self.steps {
                    let z: f64 = StandardNormal.sample(&mut rng);
                    value *= 1.0 + self.mu + self.sigma * z;
                }
                value
            })
            .collect()
    }
}

/// Splits `total` paths into at most `batches` near-equal, non-empty batches.
fn split_batches(total: usize, batches: usize) -> Vec<usize> {
    let batches = batches.clamp(1, total.max(1));
    let base = total / batches;
    let remainder = total % batches;
    (0..batches)
        .map(|i| base + usize::from(i < remainder))
        .collect()
}
