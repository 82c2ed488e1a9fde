//! Ticket files.
//!
//! Two formats are read: a JSON array of tickets whose numbers may be written
//! as integers or numeric strings (`"07"`), and a token file with one ticket
//! per line of whitespace-separated, usually zero-padded, numbers.

use clap::ValueEnum;
use paydraw_execution::DrawError;
use paydraw_types::{Number, NumberDomain, SourceError, TicketPool, TicketSource};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TicketFormat {
    #[default]
    Json,
    Tokens,
}

impl TicketFormat {
    /// Guess from the file extension; anything but `.json` is a token file.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Tokens,
        }
    }
}

fn read(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_token(token: &str, line: usize) -> Result<Number, SourceError> {
    token
        .trim()
        .parse::<Number>()
        .map_err(|_| SourceError::InvalidToken {
            line,
            token: token.to_string(),
        })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonNumber {
    Number(Number),
    Text(String),
}

/// Parse a JSON ticket array. Bad tokens report their 1-based ticket position
/// as the line.
pub fn parse_json_tickets(contents: &str) -> Result<Vec<Vec<Number>>, SourceError> {
    let raw: Vec<Vec<JsonNumber>> =
        serde_json::from_str(contents).map_err(|err| SourceError::Parse(err.to_string()))?;
    raw.into_iter()
        .enumerate()
        .map(|(index, ticket)| {
            ticket
                .into_iter()
                .map(|value| match value {
                    JsonNumber::Number(number) => Ok(number),
                    JsonNumber::Text(text) => parse_token(&text, index + 1),
                })
                .collect()
        })
        .collect()
}

/// Parse a token file; blank lines are skipped.
pub fn parse_token_tickets(contents: &str) -> Result<Vec<Vec<Number>>, SourceError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            line.split_whitespace()
                .map(|token| parse_token(token, index + 1))
                .collect()
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct JsonTicketFile {
    path: PathBuf,
}

impl JsonTicketFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TicketSource for JsonTicketFile {
    fn read_tickets(&self) -> Result<Vec<Vec<Number>>, SourceError> {
        parse_json_tickets(&read(&self.path)?)
    }
}

#[derive(Clone, Debug)]
pub struct TokenTicketFile {
    path: PathBuf,
}

impl TokenTicketFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TicketSource for TokenTicketFile {
    fn read_tickets(&self) -> Result<Vec<Vec<Number>>, SourceError> {
        parse_token_tickets(&read(&self.path)?)
    }
}

pub fn ticket_source(path: &Path, format: TicketFormat) -> Box<dyn TicketSource> {
    match format {
        TicketFormat::Json => Box::new(JsonTicketFile::new(path)),
        TicketFormat::Tokens => Box::new(TokenTicketFile::new(path)),
    }
}

/// Read and validate a ticket file.
pub fn load_pool(
    path: &Path,
    format: TicketFormat,
    arity: usize,
    domain: NumberDomain,
) -> Result<TicketPool, DrawError> {
    paydraw_execution::load_pool(ticket_source(path, format).as_ref(), arity, domain)
}
