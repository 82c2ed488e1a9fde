//! Repeated draws over one prepared controller.

use crate::controller::{DrawController, DrawError};
use crate::rng::run_rng;
use paydraw_types::{Draw, DrawOutcome, Number};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// A controller plus every draw it accepted so far.
///
/// Accepted draws feed the similarity guard of later runs.
#[derive(Clone, Debug)]
pub struct DrawSession {
    controller: DrawController,
    accepted: Vec<Draw>,
}

impl DrawSession {
    pub fn new(controller: DrawController) -> Self {
        Self {
            controller,
            accepted: Vec::new(),
        }
    }

    pub fn controller(&self) -> &DrawController {
        &self.controller
    }

    pub fn accepted(&self) -> &[Draw] {
        &self.accepted
    }

    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<DrawOutcome, DrawError> {
        let outcome = self.controller.draw_excluding(rng, &self.accepted)?;
        self.accepted.push(outcome.draw.clone());
        Ok(outcome)
    }

    /// `runs` runs, run `i` reading ChaCha stream `i` of `seed`.
    pub fn run_many(&mut self, runs: u64, seed: u64) -> Vec<Result<DrawOutcome, DrawError>> {
        (0..runs)
            .map(|run| self.run(&mut run_rng(seed, run)))
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub runs: usize,
    pub accepted: usize,
    pub failed: usize,
    /// Mean payout percentage over accepted runs.
    pub average_prize_percentage: f64,
    /// Accepted draws with distinct number sets.
    pub unique_draws: usize,
    /// Distinct numbers across all accepted draws.
    pub unique_numbers: usize,
    pub total_attempts: u64,
}

pub fn summarize(results: &[Result<DrawOutcome, DrawError>]) -> SessionSummary {
    let mut summary = SessionSummary {
        runs: results.len(),
        ..SessionSummary::default()
    };
    let mut draws: HashSet<BTreeSet<Number>> = HashSet::new();
    let mut numbers: HashSet<Number> = HashSet::new();
    let mut percentage_sum = 0.0;

    for result in results {
        match result {
            Ok(outcome) => {
                summary.accepted += 1;
                summary.total_attempts += u64::from(outcome.attempts_used);
                percentage_sum += outcome.prize_percentage();
                draws.insert(outcome.draw.numbers().iter().copied().collect());
                numbers.extend(outcome.draw.numbers().iter().copied());
            }
            Err(err) => {
                summary.failed += 1;
                if let DrawError::NoValidDistribution { attempts, .. } = err {
                    summary.total_attempts += u64::from(*attempts);
                }
            }
        }
    }

    if summary.accepted > 0 {
        summary.average_prize_percentage = percentage_sum / summary.accepted as f64;
    }
    summary.unique_draws = draws.len();
    summary.unique_numbers = numbers.len();
    summary
}
