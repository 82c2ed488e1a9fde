//! File handling and reporting around the paydraw engine.
//!
//! The `paydraw` binary is a thin layer over this crate: it loads a YAML
//! [`DrawConfig`](paydraw_types::DrawConfig) and a ticket file, runs draws
//! through [`paydraw_execution::DrawSession`] and renders the results.

pub mod config;
pub mod generate;
pub mod report;
pub mod source;

pub use config::{load_config, parse_config};
pub use generate::{format_tokens, generate_tickets, write_tickets, GenerateTicketsError};
pub use report::{format_numbers, outcome_json, session_json, FailureReport, SummaryReport, TextReport};
pub use source::{
    load_pool, parse_json_tickets, parse_token_tickets, ticket_source, JsonTicketFile,
    TicketFormat, TokenTicketFile,
};
