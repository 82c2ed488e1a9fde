use super::ticket::Number;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ticket data is not valid: {0}")]
    Parse(String),
    #[error("line {line}: {token:?} is not a number")]
    InvalidToken { line: usize, token: String },
}

/// Anything that can hand the engine the raw numbers of sold tickets.
///
/// Implementations report malformed input as an error; they never return a
/// partially parsed pool.
pub trait TicketSource {
    fn read_tickets(&self) -> Result<Vec<Vec<Number>>, SourceError>;
}

impl TicketSource for Vec<Vec<Number>> {
    fn read_tickets(&self) -> Result<Vec<Vec<Number>>, SourceError> {
        Ok(self.clone())
    }
}
