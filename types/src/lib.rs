//! Common types used throughout paydraw.
//!
//! Everything here is plain data: tickets and pools, draws, prize tiers,
//! the draw configuration with its validation, and the records produced by
//! evaluating and accepting a draw. The engine itself lives in
//! `paydraw-execution`.

pub mod lottery;

pub use lottery::{
    Band, ConfigError, Draw, DrawConfig, DrawOutcome, Evaluation, MatchingMode, Number,
    NumberDomain, PoolError, PrizeRule, PrizeTier, SourceError, Ticket, TicketPool, TicketSource,
    TierMultipliers, TierTable, ValidatedConfig, WinnerRecord,
};
