//! Candidate draw generation.
//!
//! Each [`GenerationStrategy`] maps to a [`DrawStrategy`] implementation. Every
//! strategy collects numbers into a [`Draft`] that silently drops repeats and
//! finishes by sampling from the part of the domain not yet used, so a draft
//! always completes with `arity` distinct numbers once `arity <= domain size`.

use crate::cluster::ClusterIndex;
use crate::frequency::FrequencyReport;
use paydraw_types::lottery::{
    ClusterParams, FrequencyBias, GenerationStrategy, GuardSettings, TicketSeedParams,
};
use paydraw_types::{Draw, Number, NumberDomain, TicketPool, ValidatedConfig};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("candidate shares {overlap} numbers with a prior draw after {regenerations} regenerations")]
    SimilarityExhausted {
        last: Draw,
        overlap: usize,
        regenerations: u32,
    },
}

/// Pool statistics available to strategies.
pub struct StrategyContext<'a> {
    pub arity: usize,
    pub domain: NumberDomain,
    pub pool: &'a TicketPool,
    pub frequency: &'a FrequencyReport,
    pub clusters: &'a ClusterIndex,
}

/// A way of proposing one candidate draw.
pub trait DrawStrategy {
    fn propose<R: Rng + ?Sized>(&self, context: &StrategyContext<'_>, rng: &mut R) -> Draw;
}

/// Distinct numbers collected so far for a draw.
struct Draft {
    numbers: Vec<Number>,
    arity: usize,
    domain: NumberDomain,
}

impl Draft {
    fn new(context: &StrategyContext<'_>) -> Self {
        Self {
            numbers: Vec::with_capacity(context.arity),
            arity: context.arity,
            domain: context.domain,
        }
    }

    fn len(&self) -> usize {
        self.numbers.len()
    }

    fn contains(&self, number: Number) -> bool {
        self.numbers.contains(&number)
    }

    /// Add a number unless it is a repeat, out of range, or the draft is full.
    fn push(&mut self, number: Number) -> bool {
        if self.numbers.len() >= self.arity || !self.domain.contains(number) || self.contains(number) {
            return false;
        }
        self.numbers.push(number);
        true
    }

    /// Grow to `target` numbers with uniform picks among unused numbers.
    fn fill_uniform_to<R: Rng + ?Sized>(&mut self, target: usize, rng: &mut R) {
        let target = target.min(self.arity);
        if self.numbers.len() >= target {
            return;
        }
        let needed = target - self.numbers.len();
        let mut remaining: Vec<Number> = self
            .domain
            .iter()
            .filter(|number| !self.numbers.contains(number))
            .collect();
        let (chosen, _) = remaining.partial_shuffle(rng, needed);
        self.numbers.extend_from_slice(chosen);
    }

    fn finish<R: Rng + ?Sized>(mut self, rng: &mut R) -> Draw {
        self.fill_uniform_to(self.arity, rng);
        Draw::from_distinct(self.numbers)
    }
}

/// Every number uniform over the domain.
pub struct Uniform;

impl DrawStrategy for Uniform {
    fn propose<R: Rng + ?Sized>(&self, context: &StrategyContext<'_>, rng: &mut R) -> Draw {
        Draft::new(context).finish(rng)
    }
}

/// Seed with one end of the frequency ranking, then fill uniformly.
pub struct FrequencySeeded {
    pub bias: FrequencyBias,
    pub seed_count: usize,
}

impl DrawStrategy for FrequencySeeded {
    fn propose<R: Rng + ?Sized>(&self, context: &StrategyContext<'_>, rng: &mut R) -> Draw {
        let mut draft = Draft::new(context);
        let ranked = context.frequency.ranked();
        let count = self.seed_count.min(context.arity.saturating_sub(1));
        match self.bias {
            FrequencyBias::MostFrequent => {
                for frequency in ranked.iter().take(count) {
                    draft.push(frequency.number);
                }
            }
            FrequencyBias::LeastFrequent => {
                for frequency in ranked.iter().rev().take(count) {
                    draft.push(frequency.number);
                }
            }
        }
        draft.finish(rng)
    }
}

/// Seed from a co-occurring cluster, lean on popular numbers, fill uniformly.
pub struct ClusterSeeded(pub ClusterParams);

impl DrawStrategy for ClusterSeeded {
    fn propose<R: Rng + ?Sized>(&self, context: &StrategyContext<'_>, rng: &mut R) -> Draw {
        let params = &self.0;
        let mut draft = Draft::new(context);

        if !context.clusters.is_empty() && rng.gen_bool(params.probability) {
            if let Some(cluster) = context.clusters.largest(params.top_clusters).choose(rng) {
                for &number in cluster.iter().take(params.seed_size) {
                    draft.push(number);
                }
            }
        }

        let favourites = context.frequency.most_used(params.frequency_pool);
        let target = params.biased_fill.min(context.arity);
        while draft.len() < target {
            let open: Vec<Number> = favourites
                .iter()
                .map(|frequency| frequency.number)
                .filter(|number| !draft.contains(*number))
                .collect();
            if !open.is_empty() && rng.gen_bool(params.frequency_probability) {
                if let Some(&number) = open.choose(rng) {
                    draft.push(number);
                    continue;
                }
            }
            let next = draft.len() + 1;
            draft.fill_uniform_to(next, rng);
        }

        draft.finish(rng)
    }
}

/// Copy some slots of a sold ticket in place; other slots are uniform.
pub struct TicketSeeded(pub TicketSeedParams);

impl DrawStrategy for TicketSeeded {
    fn propose<R: Rng + ?Sized>(&self, context: &StrategyContext<'_>, rng: &mut R) -> Draw {
        let params = &self.0;
        let Some(ticket) = context.pool.tickets().choose(rng) else {
            return Uniform.propose(context, rng);
        };
        let target = rng.gen_range(params.min_copied..=params.max_copied);

        let mut slots: Vec<Option<Number>> = vec![None; context.arity];
        let mut copied = 0;
        for (slot, &number) in slots.iter_mut().zip(ticket.numbers()) {
            if copied < target && rng.gen_bool(params.copy_probability) {
                *slot = Some(number);
                copied += 1;
            }
        }

        let open = slots.iter().filter(|slot| slot.is_none()).count();
        let mut remaining: Vec<Number> = context
            .domain
            .iter()
            .filter(|number| !slots.contains(&Some(*number)))
            .collect();
        let (fill, _) = remaining.partial_shuffle(rng, open);
        let mut fill = fill.iter().copied();
        let numbers = slots
            .into_iter()
            .filter_map(|slot| slot.or_else(|| fill.next()))
            .collect();
        Draw::from_distinct(numbers)
    }
}

/// Produces candidates for the configured strategy, optionally guarded
/// against prior accepted draws.
pub struct CandidateGenerator<'a> {
    context: StrategyContext<'a>,
    strategy: GenerationStrategy,
    guard: Option<GuardSettings>,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(
        config: &ValidatedConfig,
        pool: &'a TicketPool,
        frequency: &'a FrequencyReport,
        clusters: &'a ClusterIndex,
    ) -> Self {
        Self {
            context: StrategyContext {
                arity: config.arity,
                domain: config.domain,
                pool,
                frequency,
                clusters,
            },
            strategy: config.generation_strategy,
            guard: config.similarity_guard,
        }
    }

    /// One candidate, without the similarity guard.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Draw {
        let context = &self.context;
        match self.strategy {
            GenerationStrategy::Uniform => Uniform.propose(context, rng),
            GenerationStrategy::FrequencyBiased { bias, seed_count } => {
                FrequencySeeded { bias, seed_count }.propose(context, rng)
            }
            GenerationStrategy::ClusterBiased(params) => ClusterSeeded(params).propose(context, rng),
            GenerationStrategy::TicketSeeded(params) => TicketSeeded(params).propose(context, rng),
        }
    }

    /// One candidate that shares fewer than the allowed number of values with
    /// every prior draw. Regenerates at most `max_regenerations` times.
    pub fn generate_guarded<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        prior: &[Draw],
    ) -> Result<Draw, GenerateError> {
        let mut candidate = self.generate(rng);
        let Some(guard) = self.guard else {
            return Ok(candidate);
        };
        let threshold = guard.max_allowed_match_with_prior as usize;
        let mut regenerations = 0;
        loop {
            let overlap = closest_prior(&candidate, prior);
            if overlap < threshold {
                return Ok(candidate);
            }
            if regenerations >= guard.max_regenerations.get() {
                return Err(GenerateError::SimilarityExhausted {
                    last: candidate,
                    overlap,
                    regenerations,
                });
            }
            regenerations += 1;
            debug!(regenerations, overlap, "candidate too similar to a prior draw");
            candidate = self.generate(rng);
        }
    }
}

/// Largest overlap between the candidate and any prior draw.
fn closest_prior(candidate: &Draw, prior: &[Draw]) -> usize {
    prior
        .iter()
        .map(|draw| draw.overlap(candidate.numbers()))
        .max()
        .unwrap_or(0)
}
