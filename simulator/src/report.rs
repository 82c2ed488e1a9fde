//! Human and JSON renderings of draw results.

use paydraw_execution::{DrawError, SessionSummary};
use paydraw_types::lottery::AttemptDiagnostics;
use paydraw_types::{DrawOutcome, Number, NumberDomain, TierTable};
use serde::Serialize;
use std::fmt;

/// Zero-padded numbers separated by spaces.
pub fn format_numbers(numbers: &[Number], domain: NumberDomain) -> String {
    let width = domain.digits();
    numbers
        .iter()
        .map(|number| format!("{number:0width$}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text report of an accepted draw.
pub struct TextReport<'a> {
    pub outcome: &'a DrawOutcome,
    pub tiers: &'a TierTable,
    pub domain: NumberDomain,
    /// Winners listed before the rest are summarised.
    pub max_winners: usize,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.outcome;
        writeln!(f, "Draw: {}", format_numbers(outcome.draw.numbers(), self.domain))?;
        writeln!(
            f,
            "Sales: {:.2} over {} tickets, band {:.2}..={:.2}",
            outcome.total_sales, outcome.pool_size, outcome.band.min, outcome.band.max
        )?;
        writeln!(
            f,
            "Payout: {:.2} ({:.2}% of sales) after {} attempt(s)",
            outcome.total_payout(),
            outcome.prize_percentage(),
            outcome.attempts_used
        )?;

        let summary = outcome.summary();
        writeln!(f, "{:>7} {:>12} {:>8} {:>8}", "matches", "prize", "tickets", "rate")?;
        for tier in self.tiers.tiers().iter().rev() {
            let count = tier.match_count;
            writeln!(
                f,
                "{:>7} {:>12.2} {:>8} {:>7.2}%",
                count,
                self.tiers.amount(count, &outcome.multipliers),
                outcome.evaluation.tier_counts.get(&count).copied().unwrap_or(0),
                summary.match_rates.get(&count).copied().unwrap_or(0.0) * 100.0
            )?;
        }
        if !outcome.multipliers.is_identity() {
            let factors: Vec<String> = outcome
                .multipliers
                .iter()
                .map(|(count, factor)| format!("{count}:{factor:.4}"))
                .collect();
            writeln!(f, "Rescaled tiers: {}", factors.join(" "))?;
        }

        writeln!(f, "Winners: {}", summary.winner_count)?;
        for winner in outcome.winners().iter().take(self.max_winners) {
            writeln!(
                f,
                "  #{:<6} {}  {} matches  {:.2}",
                winner.ticket_index,
                format_numbers(winner.ticket.numbers(), self.domain),
                winner.match_count,
                winner.prize
            )?;
        }
        let hidden = summary.winner_count.saturating_sub(self.max_winners);
        if hidden > 0 {
            writeln!(f, "  ... and {hidden} more")?;
        }
        Ok(())
    }
}

/// Text report of a failed run.
pub struct FailureReport<'a> {
    pub error: &'a DrawError,
    pub domain: NumberDomain,
}

fn write_diagnostics(
    f: &mut fmt::Formatter<'_>,
    diagnostics: &AttemptDiagnostics,
    domain: NumberDomain,
) -> fmt::Result {
    writeln!(
        f,
        "  below band {}, above band {}, zero payout {}, too similar {}, ceiling {}, no winner {}",
        diagnostics.below_band,
        diagnostics.above_band,
        diagnostics.zero_payout,
        diagnostics.too_similar,
        diagnostics.ticket_ceiling,
        diagnostics.no_winner
    )?;
    if let Some(closest) = &diagnostics.closest {
        writeln!(
            f,
            "  closest: {} paying {:.2} (attempt {})",
            format_numbers(closest.draw.numbers(), domain),
            closest.total_payout,
            closest.index
        )?;
    }
    Ok(())
}

impl fmt::Display for FailureReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Draw failed: {}", self.error)?;
        if let DrawError::NoValidDistribution { diagnostics, .. } = self.error {
            write_diagnostics(f, diagnostics, self.domain)?;
        }
        Ok(())
    }
}

/// Text summary of a multi-run session.
pub struct SummaryReport<'a>(pub &'a SessionSummary);

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(
            f,
            "Runs: {} accepted, {} failed of {}",
            summary.accepted, summary.failed, summary.runs
        )?;
        writeln!(
            f,
            "Average payout: {:.2}% of sales",
            summary.average_prize_percentage
        )?;
        writeln!(
            f,
            "Unique draws: {}, unique numbers: {}, attempts: {}",
            summary.unique_draws, summary.unique_numbers, summary.total_attempts
        )
    }
}

pub fn outcome_json(outcome: &DrawOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}

/// A run that ended without an accepted draw.
#[derive(Serialize)]
struct FailedRun<'a> {
    /// Zero-based run index, matching the ChaCha stream it read.
    run: usize,
    error: String,
    attempts: Option<u32>,
    diagnostics: Option<&'a AttemptDiagnostics>,
}

impl<'a> FailedRun<'a> {
    fn new(run: usize, error: &'a DrawError) -> Self {
        let (attempts, diagnostics) = match error {
            DrawError::NoValidDistribution {
                attempts,
                diagnostics,
            } => (Some(*attempts), Some(diagnostics.as_ref())),
            _ => (None, None),
        };
        Self {
            run,
            error: error.to_string(),
            attempts,
            diagnostics,
        }
    }
}

#[derive(Serialize)]
struct SessionReport<'a> {
    runs: Vec<&'a DrawOutcome>,
    failures: Vec<FailedRun<'a>>,
    summary: &'a SessionSummary,
}

/// Every run of a session: accepted outcomes, failures with their attempt
/// diagnostics, and the summary.
pub fn session_json(
    results: &[Result<DrawOutcome, DrawError>],
    summary: &SessionSummary,
) -> serde_json::Result<String> {
    let mut report = SessionReport {
        runs: Vec::new(),
        failures: Vec::new(),
        summary,
    };
    for (run, result) in results.iter().enumerate() {
        match result {
            Ok(outcome) => report.runs.push(outcome),
            Err(error) => report.failures.push(FailedRun::new(run, error)),
        }
    }
    serde_json::to_string_pretty(&report)
}
