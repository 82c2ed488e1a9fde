use super::config::Band;
use super::prize::TierMultipliers;
use super::ticket::{Draw, Ticket};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A ticket that won a non-zero prize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WinnerRecord {
    /// Position of the ticket in sale order.
    pub ticket_index: usize,
    pub ticket: Ticket,
    pub match_count: u8,
    pub prize: f64,
}

/// Result of scoring every ticket of a pool against one draw.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub winners: Vec<WinnerRecord>,
    pub total_payout: f64,
    /// Winners per configured tier, zero entries included.
    pub tier_counts: BTreeMap<u8, usize>,
    /// Every ticket counted at its (clamped) match level.
    pub match_histogram: Vec<usize>,
}

impl Evaluation {
    pub fn winner_count(&self) -> usize {
        self.winners.len()
    }

    /// Tickets matching `match_count` numbers or more.
    pub fn tickets_at_or_above(&self, match_count: u8) -> usize {
        self.match_histogram
            .iter()
            .skip(match_count as usize)
            .sum()
    }

    /// Highest match level reached by any ticket.
    pub fn best_match(&self) -> u8 {
        self.match_histogram
            .iter()
            .rposition(|count| *count > 0)
            .unwrap_or(0) as u8
    }
}

/// Why an attempt ended the way it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Accepted,
    BelowBand,
    AboveBand,
    /// No prize at all, so there was nothing to rescale.
    ZeroPayout,
    /// The similarity guard ran out of regenerations.
    TooSimilar,
    /// A ticket reached the configured match ceiling.
    TicketCeiling,
    /// Winners were required and nobody won.
    NoWinner,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// One-based attempt number.
    pub index: u32,
    pub draw: Draw,
    pub total_payout: f64,
    pub outcome: AttemptOutcome,
}

/// Counters kept across the attempts of one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptDiagnostics {
    pub attempts: u32,
    pub below_band: u32,
    pub above_band: u32,
    pub zero_payout: u32,
    pub too_similar: u32,
    pub ticket_ceiling: u32,
    pub no_winner: u32,
    /// Evaluated rejection whose payout came closest to the band.
    pub closest: Option<AttemptRecord>,
    pub last: Option<AttemptRecord>,
}

impl AttemptDiagnostics {
    pub fn record(&mut self, record: AttemptRecord, band: &Band) {
        self.attempts += 1;
        match record.outcome {
            AttemptOutcome::Accepted => {}
            AttemptOutcome::BelowBand => self.below_band += 1,
            AttemptOutcome::AboveBand => self.above_band += 1,
            AttemptOutcome::ZeroPayout => self.zero_payout += 1,
            AttemptOutcome::TooSimilar => self.too_similar += 1,
            AttemptOutcome::TicketCeiling => self.ticket_ceiling += 1,
            AttemptOutcome::NoWinner => self.no_winner += 1,
        }
        let near_miss = !matches!(
            record.outcome,
            AttemptOutcome::Accepted | AttemptOutcome::TooSimilar
        );
        if near_miss {
            let closer = self.closest.as_ref().map_or(true, |closest| {
                band.distance(record.total_payout) < band.distance(closest.total_payout)
            });
            if closer {
                self.closest = Some(record.clone());
            }
        }
        self.last = Some(record);
    }

    pub fn rejected(&self) -> u32 {
        self.below_band
            + self.above_band
            + self.zero_payout
            + self.too_similar
            + self.ticket_ceiling
            + self.no_winner
    }
}

/// Structured result of an accepted draw, handed to reporting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawOutcome {
    pub draw: Draw,
    #[serde(flatten)]
    pub evaluation: Evaluation,
    /// Multipliers applied to the tier table (identity unless rescaled).
    pub multipliers: TierMultipliers,
    pub band: Band,
    pub total_sales: f64,
    pub pool_size: usize,
    pub attempts_used: u32,
    pub diagnostics: AttemptDiagnostics,
}

/// Share of tickets per tier and share of sales paid out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub match_rates: BTreeMap<u8, f64>,
    pub winner_count: usize,
    pub prize_percentage: f64,
}

impl DrawOutcome {
    pub fn total_payout(&self) -> f64 {
        self.evaluation.total_payout
    }

    pub fn winners(&self) -> &[WinnerRecord] {
        &self.evaluation.winners
    }

    /// Payout as a percentage of sales (`45.0` is forty-five percent).
    pub fn prize_percentage(&self) -> f64 {
        if self.total_sales == 0.0 {
            0.0
        } else {
            self.evaluation.total_payout / self.total_sales * 100.0
        }
    }

    pub fn summary(&self) -> DistributionSummary {
        let pool_size = self.pool_size.max(1) as f64;
        let match_rates = self
            .evaluation
            .tier_counts
            .iter()
            .map(|(tier, count)| (*tier, *count as f64 / pool_size))
            .collect();
        DistributionSummary {
            match_rates,
            winner_count: self.evaluation.winner_count(),
            prize_percentage: self.prize_percentage(),
        }
    }
}
