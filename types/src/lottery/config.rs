//! Draw configuration and its validation.
//!
//! [`DrawConfig`] is the serde-facing shape loaded from operator files. Every
//! rule the engine relies on is checked once by [`DrawConfig::validate`], which
//! yields a [`ValidatedConfig`]; nothing is re-checked while drawing.

use super::constants::{
    BAND_TOLERANCE, DEFAULT_BIASED_FILL, DEFAULT_CLUSTER_PROBABILITY, DEFAULT_CLUSTER_SEED,
    DEFAULT_CLUSTER_WINDOW, DEFAULT_COPY_PROBABILITY, DEFAULT_FREQUENCY_POOL,
    DEFAULT_FREQUENCY_PROBABILITY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_REGENERATIONS,
    DEFAULT_TOP_CLUSTERS,
};
use super::prize::{PrizeTier, TierTable};
use super::ticket::NumberDomain;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::num::NonZeroU32;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number (got {value})")]
    InvalidPositive { field: &'static str, value: f64 },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: usize },
    #[error("{field} must be within {min}..={max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
    #[error("number domain is empty ({min} > {max})")]
    EmptyDomain { min: u16, max: u16 },
    #[error("ticket arity {arity} exceeds the {domain_size} numbers of the domain")]
    ArityExceedsDomain { arity: usize, domain_size: usize },
    #[error("at least one prize tier is required")]
    EmptyTiers,
    #[error("prize tier for {match_count} matches is defined more than once")]
    DuplicateTier { match_count: u8 },
    #[error("prize tier for {match_count} matches is unreachable (max matches {max})")]
    UnreachableTier { match_count: u8, max: u8 },
    #[error("prize tier for {match_count} matches has invalid amount {value}")]
    InvalidTierAmount { match_count: u8, value: f64 },
    #[error("{field} must be a finite fraction >= 0 (got {value})")]
    InvalidPercent { field: &'static str, value: f64 },
    #[error("payout band is inverted (min {min} > max {max})")]
    InvertedBand { min: f64, max: f64 },
    #[error("{field} must be a probability in [0, 1] (got {value})")]
    InvalidProbability { field: &'static str, value: f64 },
}

/// How a ticket is compared with a draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    /// Count numbers present in both, ignoring position.
    #[default]
    Set,
    /// Count slots holding the same number at the same index.
    Positional,
}

/// Which end of the frequency ranking seeds a frequency-biased draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyBias {
    #[default]
    MostFrequent,
    LeastFrequent,
}

/// Tuning for cluster-biased generation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Following tickets each ticket is compared with.
    pub window: usize,
    /// Chance of seeding from a cluster at all.
    pub probability: f64,
    /// Largest clusters eligible as seeds.
    pub top_clusters: usize,
    /// Numbers taken from the chosen cluster.
    pub seed_size: usize,
    /// Draw size reached with biased picks before uniform filling.
    pub biased_fill: usize,
    /// Chance a biased pick comes from the frequency ranking.
    pub frequency_probability: f64,
    /// Most frequent numbers eligible for biased picks.
    pub frequency_pool: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_CLUSTER_WINDOW,
            probability: DEFAULT_CLUSTER_PROBABILITY,
            top_clusters: DEFAULT_TOP_CLUSTERS,
            seed_size: DEFAULT_CLUSTER_SEED,
            biased_fill: DEFAULT_BIASED_FILL,
            frequency_probability: DEFAULT_FREQUENCY_PROBABILITY,
            frequency_pool: DEFAULT_FREQUENCY_POOL,
        }
    }
}

/// Tuning for ticket-seeded generation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketSeedParams {
    pub min_copied: usize,
    pub max_copied: usize,
    pub copy_probability: f64,
}

impl Default for TicketSeedParams {
    fn default() -> Self {
        Self {
            min_copied: 2,
            max_copied: 3,
            copy_probability: DEFAULT_COPY_PROBABILITY,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationStrategy {
    /// Every number drawn uniformly from the domain.
    #[default]
    Uniform,
    /// Seed with `seed_count` numbers from one end of the frequency ranking.
    FrequencyBiased {
        #[serde(default)]
        bias: FrequencyBias,
        seed_count: usize,
    },
    /// Seed from numbers that co-occur across sold tickets.
    ClusterBiased(ClusterParams),
    /// Copy slots of a randomly chosen sold ticket.
    TicketSeeded(TicketSeedParams),
}

/// Rejects candidates too close to previously accepted draws.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityGuard {
    pub enabled: bool,
    /// A prior draw sharing at least this many numbers rejects the candidate.
    pub max_allowed_match_with_prior: u8,
    pub max_regenerations: u32,
}

impl Default for SimilarityGuard {
    fn default() -> Self {
        Self {
            enabled: false,
            max_allowed_match_with_prior: 4,
            max_regenerations: DEFAULT_MAX_REGENERATIONS,
        }
    }
}

/// Operator-facing draw configuration.
///
/// Payout percentages are fractions of total sales (`0.10` is ten percent).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawConfig {
    pub ticket_price: f64,
    pub ticket_arity: usize,
    #[serde(default)]
    pub number_domain: NumberDomain,
    pub prize_tiers: Vec<PrizeTier>,
    pub min_payout_percent: f64,
    pub max_payout_percent: f64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Match counts above this are clamped. Defaults to the highest tier's match count.
    #[serde(default)]
    pub max_matches: Option<u8>,
    /// Overrides `pool size * ticket price`.
    #[serde(default)]
    pub total_sales: Option<f64>,
    #[serde(default)]
    pub matching_mode: MatchingMode,
    #[serde(default)]
    pub generation_strategy: GenerationStrategy,
    /// Rescale tier prizes into the band instead of relying on redraws alone.
    #[serde(default)]
    pub adjust_multipliers: bool,
    /// Any ticket reaching this many matches rejects the draw.
    #[serde(default)]
    pub ticket_match_ceiling: Option<u8>,
    /// Reject draws nobody wins.
    #[serde(default)]
    pub require_winner: bool,
    #[serde(default)]
    pub similarity_guard: SimilarityGuard,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Settings of an enabled similarity guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardSettings {
    pub max_allowed_match_with_prior: u8,
    pub max_regenerations: NonZeroU32,
}

/// Acceptable total payout range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

/// Where a payout sits relative to a [`Band`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandPosition {
    Below,
    Inside,
    Above,
}

impl Band {
    pub fn from_sales(total_sales: f64, min_percent: f64, max_percent: f64) -> Self {
        Self {
            min: total_sales * min_percent,
            max: total_sales * max_percent,
        }
    }

    fn tolerance(&self) -> f64 {
        BAND_TOLERANCE * self.min.abs().max(self.max.abs()).max(1.0)
    }

    pub fn position(&self, payout: f64) -> BandPosition {
        let tolerance = self.tolerance();
        if payout < self.min - tolerance {
            BandPosition::Below
        } else if payout > self.max + tolerance {
            BandPosition::Above
        } else {
            BandPosition::Inside
        }
    }

    pub fn contains(&self, payout: f64) -> bool {
        self.position(payout) == BandPosition::Inside
    }

    /// Distance to the nearest bound; zero inside the band.
    pub fn distance(&self, payout: f64) -> f64 {
        match self.position(payout) {
            BandPosition::Below => self.min - payout,
            BandPosition::Above => payout - self.max,
            BandPosition::Inside => 0.0,
        }
    }
}

/// Configuration that passed every setup-time check.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedConfig {
    pub ticket_price: f64,
    pub arity: usize,
    pub domain: NumberDomain,
    pub tiers: TierTable,
    pub min_payout_percent: f64,
    pub max_payout_percent: f64,
    pub max_attempts: NonZeroU32,
    pub max_matches: u8,
    pub total_sales: Option<f64>,
    pub matching_mode: MatchingMode,
    pub generation_strategy: GenerationStrategy,
    pub adjust_multipliers: bool,
    pub ticket_match_ceiling: Option<u8>,
    pub require_winner: bool,
    pub similarity_guard: Option<GuardSettings>,
}

impl ValidatedConfig {
    /// Sales figure the band is computed from.
    pub fn total_sales(&self, pool_size: usize) -> f64 {
        self.total_sales
            .unwrap_or(pool_size as f64 * self.ticket_price)
    }

    pub fn band(&self, total_sales: f64) -> Band {
        Band::from_sales(total_sales, self.min_payout_percent, self.max_payout_percent)
    }
}

fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidPositive { field, value });
    }
    Ok(())
}

fn ensure_nonzero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(())
}

fn ensure_within(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn ensure_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidProbability { field, value });
    }
    Ok(())
}

fn ensure_percent(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidPercent { field, value });
    }
    Ok(())
}

fn validate_strategy(strategy: &GenerationStrategy, arity: usize) -> Result<(), ConfigError> {
    match strategy {
        GenerationStrategy::Uniform => Ok(()),
        GenerationStrategy::FrequencyBiased { seed_count, .. } => {
            ensure_within("seed_count", *seed_count, 0, arity - 1)
        }
        GenerationStrategy::ClusterBiased(params) => {
            ensure_nonzero("window", params.window)?;
            ensure_probability("probability", params.probability)?;
            ensure_nonzero("top_clusters", params.top_clusters)?;
            ensure_within("seed_size", params.seed_size, 0, arity)?;
            ensure_within("biased_fill", params.biased_fill, 0, arity)?;
            ensure_probability("frequency_probability", params.frequency_probability)?;
            ensure_nonzero("frequency_pool", params.frequency_pool)
        }
        GenerationStrategy::TicketSeeded(params) => {
            ensure_within("max_copied", params.max_copied, 0, arity)?;
            ensure_within("min_copied", params.min_copied, 0, params.max_copied)?;
            ensure_probability("copy_probability", params.copy_probability)
        }
    }
}

impl DrawConfig {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        ensure_positive("ticket_price", self.ticket_price)?;
        ensure_within("ticket_arity", self.ticket_arity, 1, u8::MAX as usize)?;
        let arity = self.ticket_arity;

        let domain = self.number_domain;
        if domain.min > domain.max {
            return Err(ConfigError::EmptyDomain {
                min: domain.min,
                max: domain.max,
            });
        }
        if arity > domain.size() {
            return Err(ConfigError::ArityExceedsDomain {
                arity,
                domain_size: domain.size(),
            });
        }

        let top_tier = self
            .prize_tiers
            .iter()
            .map(|tier| tier.match_count)
            .max()
            .ok_or(ConfigError::EmptyTiers)?;
        let max_matches = self.max_matches.unwrap_or(top_tier);
        ensure_within("max_matches", max_matches as usize, 1, arity)?;

        let mut seen = HashSet::with_capacity(self.prize_tiers.len());
        for tier in &self.prize_tiers {
            if !seen.insert(tier.match_count) {
                return Err(ConfigError::DuplicateTier {
                    match_count: tier.match_count,
                });
            }
            if tier.match_count == 0 || tier.match_count > max_matches {
                return Err(ConfigError::UnreachableTier {
                    match_count: tier.match_count,
                    max: max_matches,
                });
            }
            let value = tier.prize.raw_value();
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTierAmount {
                    match_count: tier.match_count,
                    value,
                });
            }
        }

        ensure_percent("min_payout_percent", self.min_payout_percent)?;
        ensure_percent("max_payout_percent", self.max_payout_percent)?;
        if self.min_payout_percent > self.max_payout_percent {
            return Err(ConfigError::InvertedBand {
                min: self.min_payout_percent,
                max: self.max_payout_percent,
            });
        }

        let max_attempts =
            NonZeroU32::new(self.max_attempts).ok_or(ConfigError::InvalidNonZero {
                field: "max_attempts",
                value: 0,
            })?;

        if let Some(total_sales) = self.total_sales {
            ensure_positive("total_sales", total_sales)?;
        }

        validate_strategy(&self.generation_strategy, arity)?;

        if let Some(ceiling) = self.ticket_match_ceiling {
            ensure_within("ticket_match_ceiling", ceiling as usize, 1, max_matches as usize)?;
        }

        let similarity_guard = if self.similarity_guard.enabled {
            let guard = self.similarity_guard;
            ensure_within(
                "max_allowed_match_with_prior",
                guard.max_allowed_match_with_prior as usize,
                1,
                arity,
            )?;
            let max_regenerations =
                NonZeroU32::new(guard.max_regenerations).ok_or(ConfigError::InvalidNonZero {
                    field: "max_regenerations",
                    value: 0,
                })?;
            Some(GuardSettings {
                max_allowed_match_with_prior: guard.max_allowed_match_with_prior,
                max_regenerations,
            })
        } else {
            None
        };

        Ok(ValidatedConfig {
            ticket_price: self.ticket_price,
            arity,
            domain,
            tiers: TierTable::new(self.prize_tiers, self.ticket_price),
            min_payout_percent: self.min_payout_percent,
            max_payout_percent: self.max_payout_percent,
            max_attempts,
            max_matches,
            total_sales: self.total_sales,
            matching_mode: self.matching_mode,
            generation_strategy: self.generation_strategy,
            adjust_multipliers: self.adjust_multipliers,
            ticket_match_ceiling: self.ticket_match_ceiling,
            require_winner: self.require_winner,
            similarity_guard,
        })
    }
}
