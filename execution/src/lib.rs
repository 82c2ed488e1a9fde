//! Paydraw execution layer.
//!
//! This crate contains the constrained draw engine: pool statistics, candidate
//! generation, payout scoring, prize rescaling and the attempt loop that ties
//! them together.
//!
//! ## Determinism requirements
//! - Every random choice reads the `rand::Rng` passed in by the caller.
//! - Do not use wall-clock time or process-wide randomness inside the engine.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! The primary entrypoint is [`DrawController`]; [`DrawSession`] repeats runs
//! over one controller.
//!
//! ## Minimal draw (example)
//! ```rust,ignore
//! use paydraw_execution::{run_rng, DrawController};
//! use paydraw_types::{DrawConfig, NumberDomain, TicketPool};
//!
//! # fn example(config: DrawConfig, raw: Vec<Vec<u16>>) -> Result<(), paydraw_execution::DrawError> {
//! let pool = TicketPool::new(raw, config.ticket_arity, config.number_domain)?;
//! let controller = DrawController::new(config, pool)?;
//! let outcome = controller.draw(&mut run_rng(42, 0))?;
//! assert!(outcome.band.contains(outcome.total_payout()));
//! # Ok(())
//! # }
//! ```

pub mod adjuster;
pub mod cluster;
pub mod controller;
pub mod frequency;
pub mod generator;
pub mod payout;
pub mod rng;
pub mod session;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use adjuster::{adjust, AdjustError};
pub use cluster::ClusterIndex;
pub use controller::{load_pool, DrawController, DrawError, DrawPhase, DrawRun, TicketDataError};
pub use frequency::{analyze, FrequencyReport, NumberFrequency};
pub use generator::{CandidateGenerator, DrawStrategy, GenerateError};
pub use payout::{match_count, PayoutEvaluator};
pub use rng::{run_rng, DrawRng};
pub use session::{summarize, DrawSession, SessionSummary};
