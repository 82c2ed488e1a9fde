//! Scoring a draw against every ticket of a pool.

use paydraw_types::{
    Draw, Evaluation, MatchingMode, Number, TicketPool, TierMultipliers, TierTable,
    ValidatedConfig, WinnerRecord,
};
use std::collections::BTreeMap;

/// Numbers a ticket shares with a draw under the given mode.
pub fn match_count(ticket: &[Number], draw: &[Number], mode: MatchingMode) -> usize {
    match mode {
        MatchingMode::Set => ticket.iter().filter(|number| draw.contains(number)).count(),
        MatchingMode::Positional => ticket
            .iter()
            .zip(draw)
            .filter(|(ticket, draw)| ticket == draw)
            .count(),
    }
}

/// Tier lookups for one validated configuration.
#[derive(Clone, Copy, Debug)]
pub struct PayoutEvaluator<'a> {
    tiers: &'a TierTable,
    mode: MatchingMode,
    max_matches: u8,
}

impl<'a> PayoutEvaluator<'a> {
    pub fn new(config: &'a ValidatedConfig) -> Self {
        Self {
            tiers: &config.tiers,
            mode: config.matching_mode,
            max_matches: config.max_matches,
        }
    }

    pub fn tiers(&self) -> &TierTable {
        self.tiers
    }

    /// Match count of one ticket, clamped to the configured maximum.
    pub fn score(&self, ticket: &[Number], draw: &Draw) -> u8 {
        let count = match_count(ticket, draw.numbers(), self.mode);
        count.min(self.max_matches as usize) as u8
    }

    /// Prize of every ticket and the total payout.
    ///
    /// Tickets whose match count has no tier are counted in the histogram but
    /// never listed as winners.
    pub fn evaluate(&self, draw: &Draw, pool: &TicketPool, multipliers: &TierMultipliers) -> Evaluation {
        let mut match_histogram = vec![0usize; self.max_matches as usize + 1];
        let mut tier_counts: BTreeMap<u8, usize> =
            self.tiers.match_counts().map(|count| (count, 0)).collect();
        let mut winners = Vec::new();
        let mut total_payout = 0.0;

        for (ticket_index, ticket) in pool.iter().enumerate() {
            let matched = self.score(ticket.numbers(), draw);
            match_histogram[matched as usize] += 1;
            if let Some(count) = tier_counts.get_mut(&matched) {
                *count += 1;
            }
            let prize = self.tiers.amount(matched, multipliers);
            if prize > 0.0 {
                total_payout += prize;
                winners.push(WinnerRecord {
                    ticket_index,
                    ticket: ticket.clone(),
                    match_count: matched,
                    prize,
                });
            }
        }

        Evaluation {
            winners,
            total_payout,
            tier_counts,
            match_histogram,
        }
    }
}
