//! Rejection-sampling state machine for a single draw.
//!
//! ## Phases
//!
//! A run progresses through four phases:
//! 1. **Init** - configuration validated, sales, band and pool statistics ready
//! 2. **Attempting** - candidates are generated and scored, one per step
//! 3. **Accepted** - a candidate paid out inside the band (terminal)
//! 4. **Exhausted** - the attempt budget ran out (terminal)
//!
//! Everything a run needs from the pool is computed once when the
//! [`DrawController`] is built. A [`DrawRun`] only borrows it, so many runs can
//! share one controller.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paydraw_execution::{run_rng, DrawController};
//!
//! let controller = DrawController::new(config, pool)?;
//! let outcome = controller.draw(&mut run_rng(42, 0))?;
//! println!("{:?} pays {}", outcome.draw, outcome.total_payout());
//! ```

use crate::adjuster::{adjust, AdjustError};
use crate::cluster::ClusterIndex;
use crate::frequency::{analyze, FrequencyReport};
use crate::generator::{CandidateGenerator, GenerateError};
use crate::payout::PayoutEvaluator;
use paydraw_types::lottery::{
    AttemptDiagnostics, AttemptOutcome, AttemptRecord, BandPosition, GenerationStrategy,
};
use paydraw_types::{
    Band, ConfigError, Draw, DrawConfig, DrawOutcome, Evaluation, NumberDomain, PoolError,
    SourceError, TicketPool, TicketSource, TierMultipliers, ValidatedConfig,
};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Ticket input that could not be turned into a pool.
#[derive(Debug, Error)]
pub enum TicketDataError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("malformed ticket data: {0}")]
    MalformedTicketData(#[from] TicketDataError),
    #[error("no draw paid out inside the band after {attempts} attempts")]
    NoValidDistribution {
        attempts: u32,
        diagnostics: Box<AttemptDiagnostics>,
    },
    #[error("draw run already finished ({phase:?})")]
    RunFinished { phase: DrawPhase },
}

impl From<PoolError> for DrawError {
    fn from(err: PoolError) -> Self {
        Self::MalformedTicketData(TicketDataError::Pool(err))
    }
}

impl From<SourceError> for DrawError {
    fn from(err: SourceError) -> Self {
        Self::MalformedTicketData(TicketDataError::Source(err))
    }
}

/// Read a source into a validated pool.
pub fn load_pool<S: TicketSource + ?Sized>(
    source: &S,
    arity: usize,
    domain: NumberDomain,
) -> Result<TicketPool, DrawError> {
    let raw = source.read_tickets()?;
    Ok(TicketPool::new(raw, arity, domain)?)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawPhase {
    Init,
    Attempting,
    Accepted,
    Exhausted,
}

impl DrawPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Exhausted)
    }
}

/// A validated configuration bound to a ticket pool.
#[derive(Clone, Debug)]
pub struct DrawController {
    config: ValidatedConfig,
    pool: TicketPool,
    frequency: FrequencyReport,
    clusters: ClusterIndex,
    total_sales: f64,
    band: Band,
}

impl DrawController {
    /// Validate `config` and check every ticket of `pool` against it.
    pub fn new(config: DrawConfig, pool: TicketPool) -> Result<Self, DrawError> {
        Self::with_validated(config.validate()?, pool)
    }

    /// Validate `config`, then read and validate the pool from `source`.
    pub fn load<S: TicketSource + ?Sized>(config: DrawConfig, source: &S) -> Result<Self, DrawError> {
        let config = config.validate()?;
        let pool = load_pool(source, config.arity, config.domain)?;
        Self::with_validated(config, pool)
    }

    pub fn with_validated(config: ValidatedConfig, pool: TicketPool) -> Result<Self, DrawError> {
        pool.conform(config.arity, config.domain)?;

        let total_sales = config.total_sales(pool.len());
        let band = config.band(total_sales);
        let frequency = analyze(&pool);
        let clusters = match config.generation_strategy {
            GenerationStrategy::ClusterBiased(params) => ClusterIndex::build(&pool, params.window),
            _ => ClusterIndex::default(),
        };
        debug!(
            pool_size = pool.len(),
            total_sales,
            band_min = band.min,
            band_max = band.max,
            clusters = clusters.len(),
            "draw controller ready"
        );

        Ok(Self {
            config,
            pool,
            frequency,
            clusters,
            total_sales,
            band,
        })
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn pool(&self) -> &TicketPool {
        &self.pool
    }

    pub fn frequency(&self) -> &FrequencyReport {
        &self.frequency
    }

    pub fn clusters(&self) -> &ClusterIndex {
        &self.clusters
    }

    pub fn total_sales(&self) -> f64 {
        self.total_sales
    }

    pub fn band(&self) -> Band {
        self.band
    }

    /// Begin a run. `prior` feeds the similarity guard.
    pub fn start<'a>(&'a self, prior: &'a [Draw]) -> DrawRun<'a> {
        DrawRun {
            controller: self,
            generator: CandidateGenerator::new(&self.config, &self.pool, &self.frequency, &self.clusters),
            evaluator: PayoutEvaluator::new(&self.config),
            prior,
            phase: DrawPhase::Init,
            diagnostics: AttemptDiagnostics::default(),
        }
    }

    /// Run to completion with no prior draws.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DrawOutcome, DrawError> {
        self.draw_excluding(rng, &[])
    }

    /// Run to completion, keeping away from `prior` when the guard is enabled.
    pub fn draw_excluding<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        prior: &[Draw],
    ) -> Result<DrawOutcome, DrawError> {
        self.start(prior).finish(rng)
    }
}

/// Evaluation and multipliers of an accepted candidate.
type Accepted = (Evaluation, TierMultipliers);

/// One run of the attempt loop.
pub struct DrawRun<'a> {
    controller: &'a DrawController,
    generator: CandidateGenerator<'a>,
    evaluator: PayoutEvaluator<'a>,
    prior: &'a [Draw],
    phase: DrawPhase,
    diagnostics: AttemptDiagnostics,
}

impl DrawRun<'_> {
    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn diagnostics(&self) -> &AttemptDiagnostics {
        &self.diagnostics
    }

    /// Make one attempt.
    ///
    /// Returns `Ok(None)` after a rejection that leaves budget, the outcome on
    /// acceptance, and `NoValidDistribution` once the last attempt is rejected.
    /// Stepping a finished run is an error.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Option<DrawOutcome>, DrawError> {
        if self.phase.is_terminal() {
            return Err(DrawError::RunFinished { phase: self.phase });
        }
        self.phase = DrawPhase::Attempting;

        let index = self.diagnostics.attempts + 1;
        let (record, accepted) = self.attempt(index, rng);
        let draw = record.draw.clone();
        debug!(
            attempt = index,
            payout = record.total_payout,
            outcome = ?record.outcome,
            "draw attempt"
        );
        self.diagnostics.record(record, &self.controller.band);

        if let Some((evaluation, multipliers)) = accepted {
            self.phase = DrawPhase::Accepted;
            let outcome = DrawOutcome {
                draw,
                evaluation,
                multipliers,
                band: self.controller.band,
                total_sales: self.controller.total_sales,
                pool_size: self.controller.pool.len(),
                attempts_used: index,
                diagnostics: self.diagnostics.clone(),
            };
            info!(
                attempts = index,
                payout = outcome.total_payout(),
                winners = outcome.evaluation.winner_count(),
                band_min = outcome.band.min,
                band_max = outcome.band.max,
                "draw accepted"
            );
            return Ok(Some(outcome));
        }

        let budget = self.controller.config.max_attempts.get();
        if index >= budget {
            self.phase = DrawPhase::Exhausted;
            warn!(
                attempts = index,
                below = self.diagnostics.below_band,
                above = self.diagnostics.above_band,
                rejected = self.diagnostics.rejected(),
                "no draw inside the payout band"
            );
            return Err(DrawError::NoValidDistribution {
                attempts: index,
                diagnostics: Box::new(self.diagnostics.clone()),
            });
        }
        Ok(None)
    }

    /// Step until the run accepts or exhausts its budget.
    pub fn finish<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<DrawOutcome, DrawError> {
        loop {
            if let Some(outcome) = self.step(rng)? {
                return Ok(outcome);
            }
        }
    }

    fn attempt<R: Rng + ?Sized>(
        &self,
        index: u32,
        rng: &mut R,
    ) -> (AttemptRecord, Option<Accepted>) {
        let config = &self.controller.config;
        let pool = &self.controller.pool;
        let band = &self.controller.band;
        let reject = |draw: Draw, total_payout: f64, outcome: AttemptOutcome| -> (AttemptRecord, Option<Accepted>) {
            (
                AttemptRecord {
                    index,
                    draw,
                    total_payout,
                    outcome,
                },
                None,
            )
        };

        let draw = match self.generator.generate_guarded(rng, self.prior) {
            Ok(draw) => draw,
            Err(GenerateError::SimilarityExhausted { last, .. }) => {
                return reject(last, 0.0, AttemptOutcome::TooSimilar);
            }
        };

        let identity = TierMultipliers::identity(&config.tiers);
        let base = self.evaluator.evaluate(&draw, pool, &identity);

        if let Some(ceiling) = config.ticket_match_ceiling {
            if base.tickets_at_or_above(ceiling) > 0 {
                return reject(draw, base.total_payout, AttemptOutcome::TicketCeiling);
            }
        }
        if config.require_winner && base.winners.is_empty() {
            return reject(draw, base.total_payout, AttemptOutcome::NoWinner);
        }

        let (evaluation, multipliers) = if config.adjust_multipliers {
            // Nothing to rescale.
            if base.total_payout == 0.0 {
                return reject(draw, 0.0, AttemptOutcome::ZeroPayout);
            }
            match adjust(base.total_payout, band, &config.tiers) {
                Ok(multipliers) if multipliers.is_identity() => (base, multipliers),
                Ok(multipliers) => (self.evaluator.evaluate(&draw, pool, &multipliers), multipliers),
                Err(AdjustError::ZeroPayout(payout)) => {
                    return reject(draw, payout, AttemptOutcome::ZeroPayout);
                }
            }
        } else {
            (base, identity)
        };

        let total_payout = evaluation.total_payout;
        match band.position(total_payout) {
            BandPosition::Below => reject(draw, total_payout, AttemptOutcome::BelowBand),
            BandPosition::Above => reject(draw, total_payout, AttemptOutcome::AboveBand),
            BandPosition::Inside => (
                AttemptRecord {
                    index,
                    draw,
                    total_payout,
                    outcome: AttemptOutcome::Accepted,
                },
                Some((evaluation, multipliers)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{pool_from, random_pool, scenario_config, scenario_pool};
    use crate::rng::run_rng;
    use paydraw_types::lottery::{
        ClusterParams, FrequencyBias, SimilarityGuard, TicketSeedParams,
    };
    use paydraw_types::PrizeTier;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn two_block_pool() -> TicketPool {
        pool_from(&[&[1, 2, 3, 4, 5], &[6, 7, 8, 9, 10]], 5, NumberDomain::new(1, 10))
    }

    fn two_block_config() -> DrawConfig {
        DrawConfig {
            number_domain: NumberDomain::new(1, 10),
            ..scenario_config()
        }
    }

    #[test]
    fn test_scenario_setup() {
        let controller = DrawController::new(scenario_config(), scenario_pool()).unwrap();
        assert_eq!(controller.total_sales(), 50.0);
        assert_eq!(controller.band(), Band { min: 5.0, max: 7.5 });
        assert!(controller.clusters().is_empty());
        assert_eq!(controller.frequency().total(), 50);
    }

    #[test]
    fn test_unreachable_band_exhausts() {
        let config = DrawConfig {
            prize_tiers: vec![PrizeTier::fixed(1, 100.0)],
            ..scenario_config()
        };
        let controller = DrawController::new(config, scenario_pool()).unwrap();
        match controller.draw(&mut run_rng(3, 0)) {
            Err(DrawError::NoValidDistribution {
                attempts,
                diagnostics,
            }) => {
                assert_eq!(attempts, 100);
                assert_eq!(diagnostics.attempts, 100);
                assert_eq!(diagnostics.below_band + diagnostics.above_band, 100);
                assert!(diagnostics.closest.is_some());
                assert_eq!(diagnostics.last.as_ref().map(|last| last.index), Some(100));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_adjuster_lands_payout_in_band() {
        // Every 5-of-10 draw gives one of the two tickets at least 3 matches.
        let config = DrawConfig {
            adjust_multipliers: true,
            ..two_block_config()
        };
        let controller = DrawController::new(config, two_block_pool()).unwrap();
        let outcome = controller.draw(&mut run_rng(11, 0)).unwrap();
        assert_eq!(outcome.attempts_used, 1);
        assert!(outcome.band.contains(outcome.total_payout()));
        assert!(!outcome.multipliers.is_identity());
        assert!(outcome.winners().iter().any(|winner| winner.match_count >= 3));
    }

    #[test]
    fn test_adjuster_skips_zero_payout() {
        // Only a full match pays, so nearly every draw pays nothing.
        let config = DrawConfig {
            prize_tiers: vec![PrizeTier::fixed(5, 100.0)],
            adjust_multipliers: true,
            max_attempts: 10,
            ..scenario_config()
        };
        let controller = DrawController::new(config, scenario_pool()).unwrap();
        match controller.draw(&mut run_rng(6, 0)) {
            Err(DrawError::NoValidDistribution { diagnostics, .. }) => {
                assert_eq!(diagnostics.zero_payout, 10);
                assert_eq!(diagnostics.below_band, 0);
                let last = diagnostics.last.as_ref().unwrap();
                assert_eq!(last.outcome, AttemptOutcome::ZeroPayout);
                assert_eq!(last.total_payout, 0.0);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_band_accepts_zero_payout() {
        let config = DrawConfig {
            min_payout_percent: 0.0,
            max_payout_percent: 0.0,
            ..scenario_config()
        };
        let controller = DrawController::new(config, scenario_pool()).unwrap();
        let outcome = controller.draw(&mut run_rng(5, 0)).unwrap();
        assert_eq!(outcome.total_payout(), 0.0);
        assert!(outcome.winners().is_empty());

        let distinct: HashSet<_> = outcome.draw.numbers().iter().collect();
        assert_eq!(distinct.len(), 5);
    }

    #[test]
    fn test_same_seed_replays_outcome() {
        let config = DrawConfig {
            adjust_multipliers: true,
            ..scenario_config()
        };
        let controller = DrawController::new(config, scenario_pool()).unwrap();
        let first = controller.draw(&mut run_rng(99, 2)).unwrap();
        let second = controller.draw(&mut run_rng(99, 2)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ticket_ceiling_rejects_every_draw() {
        let config = DrawConfig {
            ticket_match_ceiling: Some(1),
            max_attempts: 5,
            ..two_block_config()
        };
        let controller = DrawController::new(config, two_block_pool()).unwrap();
        match controller.draw(&mut run_rng(1, 0)) {
            Err(DrawError::NoValidDistribution { diagnostics, .. }) => {
                assert_eq!(diagnostics.ticket_ceiling, 5);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_require_winner() {
        let base = DrawConfig {
            prize_tiers: vec![PrizeTier::fixed(5, 100.0)],
            min_payout_percent: 0.0,
            max_attempts: 10,
            ..scenario_config()
        };
        let open = DrawController::new(base.clone(), scenario_pool()).unwrap();
        assert!(open.draw(&mut run_rng(8, 0)).is_ok());

        let strict = DrawController::new(
            DrawConfig {
                require_winner: true,
                ..base
            },
            scenario_pool(),
        )
        .unwrap();
        match strict.draw(&mut run_rng(8, 0)) {
            Err(DrawError::NoValidDistribution { diagnostics, .. }) => {
                assert_eq!(diagnostics.no_winner, 10);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_similarity_guard_rejects_as_too_similar() {
        let domain = NumberDomain::new(1, 5);
        let config = DrawConfig {
            number_domain: domain,
            min_payout_percent: 0.0,
            max_payout_percent: 1000.0,
            max_attempts: 4,
            similarity_guard: SimilarityGuard {
                enabled: true,
                max_allowed_match_with_prior: 5,
                max_regenerations: 2,
            },
            ..scenario_config()
        };
        let pool = pool_from(&[&[1, 2, 3, 4, 5]], 5, domain);
        let controller = DrawController::new(config, pool).unwrap();
        let prior = vec![Draw::from_distinct(vec![1, 2, 3, 4, 5])];

        assert!(controller.draw(&mut run_rng(2, 0)).is_ok());
        match controller.draw_excluding(&mut run_rng(2, 0), &prior) {
            Err(DrawError::NoValidDistribution { diagnostics, .. }) => {
                assert_eq!(diagnostics.too_similar, 4);
                assert!(diagnostics.closest.is_none());
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_step_phases() {
        let config = DrawConfig {
            adjust_multipliers: true,
            ..two_block_config()
        };
        let controller = DrawController::new(config, two_block_pool()).unwrap();
        let mut run = controller.start(&[]);
        assert_eq!(run.phase(), DrawPhase::Init);

        let mut rng = run_rng(4, 0);
        assert!(run.step(&mut rng).unwrap().is_some());
        assert_eq!(run.phase(), DrawPhase::Accepted);
        assert!(matches!(
            run.step(&mut rng),
            Err(DrawError::RunFinished {
                phase: DrawPhase::Accepted
            })
        ));
    }

    #[test]
    fn test_setup_errors() {
        let inverted = DrawConfig {
            min_payout_percent: 0.5,
            max_payout_percent: 0.1,
            ..scenario_config()
        };
        assert!(matches!(
            DrawController::new(inverted, scenario_pool()),
            Err(DrawError::InvalidConfiguration(ConfigError::InvertedBand { .. }))
        ));

        // Scenario pool uses numbers up to 50.
        let narrow = DrawConfig {
            number_domain: NumberDomain::new(1, 40),
            ..scenario_config()
        };
        assert!(matches!(
            DrawController::new(narrow, scenario_pool()),
            Err(DrawError::MalformedTicketData(TicketDataError::Pool(
                PoolError::InvalidTicket { index: 8, .. }
            )))
        ));

        let empty: Vec<Vec<u16>> = Vec::new();
        assert!(matches!(
            DrawController::load(scenario_config(), &empty),
            Err(DrawError::MalformedTicketData(TicketDataError::Pool(PoolError::Empty)))
        ));
    }

    fn strategy(which: u8) -> GenerationStrategy {
        match which {
            0 => GenerationStrategy::Uniform,
            1 => GenerationStrategy::FrequencyBiased {
                bias: FrequencyBias::MostFrequent,
                seed_count: 2,
            },
            2 => GenerationStrategy::FrequencyBiased {
                bias: FrequencyBias::LeastFrequent,
                seed_count: 3,
            },
            3 => GenerationStrategy::ClusterBiased(ClusterParams::default()),
            _ => GenerationStrategy::TicketSeeded(TicketSeedParams::default()),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_accepted_draws_are_valid_and_in_band(
            seed in any::<u64>(),
            which in 0u8..5,
            adjust_multipliers in any::<bool>(),
        ) {
            let domain = NumberDomain::new(1, 20);
            let pool = random_pool(&mut run_rng(seed, 1), 60, 5, domain);
            let config = DrawConfig {
                number_domain: domain,
                prize_tiers: vec![
                    PrizeTier::fixed(4, 50.0),
                    PrizeTier::fixed(3, 10.0),
                    PrizeTier::fixed(2, 1.0),
                ],
                min_payout_percent: 0.05,
                max_payout_percent: 0.5,
                max_attempts: 20,
                generation_strategy: strategy(which),
                adjust_multipliers,
                ..scenario_config()
            };
            let controller = DrawController::new(config, pool).unwrap();

            if let Ok(outcome) = controller.draw(&mut run_rng(seed, 0)) {
                prop_assert!(outcome.band.contains(outcome.total_payout()));
                prop_assert!(outcome.attempts_used >= 1 && outcome.attempts_used <= 20);

                let numbers = outcome.draw.numbers();
                prop_assert_eq!(numbers.len(), 5);
                let distinct: HashSet<_> = numbers.iter().collect();
                prop_assert_eq!(distinct.len(), 5);
                prop_assert!(numbers.iter().all(|number| domain.contains(*number)));

                let sum: f64 = outcome.winners().iter().map(|winner| winner.prize).sum();
                prop_assert!((outcome.total_payout() - sum).abs() <= 1e-9 * sum.max(1.0));
            }
        }
    }
}
