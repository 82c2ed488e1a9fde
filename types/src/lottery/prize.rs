use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a tier's prize amount is computed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeRule {
    /// A flat amount.
    Fixed(f64),
    /// `ticket price * multiplier`.
    Multiplier(f64),
}

impl PrizeRule {
    pub fn amount(&self, base_price: f64) -> f64 {
        match *self {
            Self::Fixed(amount) => amount,
            Self::Multiplier(multiplier) => base_price * multiplier,
        }
    }

    pub fn raw_value(&self) -> f64 {
        match *self {
            Self::Fixed(value) | Self::Multiplier(value) => value,
        }
    }
}

/// Prize paid to a ticket matching exactly `match_count` numbers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrizeTier {
    pub match_count: u8,
    pub prize: PrizeRule,
}

impl PrizeTier {
    pub const fn fixed(match_count: u8, amount: f64) -> Self {
        Self {
            match_count,
            prize: PrizeRule::Fixed(amount),
        }
    }

    pub const fn multiplier(match_count: u8, multiplier: f64) -> Self {
        Self {
            match_count,
            prize: PrizeRule::Multiplier(multiplier),
        }
    }
}

/// Disjoint tiers ordered by ascending match count.
///
/// Built by configuration validation, which rejects empty or overlapping tiers.
#[derive(Clone, Debug, PartialEq)]
pub struct TierTable {
    tiers: Vec<PrizeTier>,
    base_price: f64,
}

impl TierTable {
    pub(crate) fn new(mut tiers: Vec<PrizeTier>, base_price: f64) -> Self {
        tiers.sort_by_key(|tier| tier.match_count);
        Self { tiers, base_price }
    }

    pub fn tiers(&self) -> &[PrizeTier] {
        &self.tiers
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    pub fn tier(&self, match_count: u8) -> Option<&PrizeTier> {
        self.tiers
            .binary_search_by_key(&match_count, |tier| tier.match_count)
            .ok()
            .map(|index| &self.tiers[index])
    }

    pub fn match_counts(&self) -> impl Iterator<Item = u8> + '_ {
        self.tiers.iter().map(|tier| tier.match_count)
    }

    /// Unscaled prize for a match count; zero when no tier matches.
    pub fn base_amount(&self, match_count: u8) -> f64 {
        self.tier(match_count)
            .map(|tier| tier.prize.amount(self.base_price))
            .unwrap_or(0.0)
    }

    /// Prize for a match count after applying per-tier multipliers.
    pub fn amount(&self, match_count: u8, multipliers: &TierMultipliers) -> f64 {
        self.base_amount(match_count) * multipliers.get(match_count)
    }
}

/// Per-tier scale factors applied on top of the tier table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierMultipliers(BTreeMap<u8, f64>);

impl TierMultipliers {
    /// 1.0 for every tier.
    pub fn identity(table: &TierTable) -> Self {
        Self::uniform(table, 1.0)
    }

    pub fn uniform(table: &TierTable, factor: f64) -> Self {
        Self(table.match_counts().map(|count| (count, factor)).collect())
    }

    /// Factor for a tier; tiers without an entry are left unscaled.
    pub fn get(&self, match_count: u8) -> f64 {
        self.0.get(&match_count).copied().unwrap_or(1.0)
    }

    pub fn is_identity(&self) -> bool {
        self.0.values().all(|factor| *factor == 1.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.0.iter().map(|(count, factor)| (*count, *factor))
    }
}
