//! Synthetic ticket pools.

use crate::source::TicketFormat;
use paydraw_types::{Number, NumberDomain};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateTicketsError {
    #[error("ticket arity {arity} must be within 1..={domain_size}")]
    InvalidArity { arity: usize, domain_size: usize },
    #[error("{requested} unique tickets requested but only {available} combinations exist")]
    NotEnoughCombinations { requested: usize, available: usize },
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode tickets: {0}")]
    Encode(#[from] serde_json::Error),
}

/// `n choose k`, saturating at `usize::MAX`.
fn combinations(n: usize, k: usize) -> usize {
    let k = k.min(n - k);
    // acc is C(n, i) on entry, so the division is exact.
    (0..k)
        .try_fold(1usize, |acc, i| acc.checked_mul(n - i).map(|product| product / (i + 1)))
        .unwrap_or(usize::MAX)
}

/// `count` random tickets of `arity` distinct numbers.
///
/// With `unique`, no two tickets hold the same set of numbers.
pub fn generate_tickets<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    arity: usize,
    domain: NumberDomain,
    unique: bool,
) -> Result<Vec<Vec<Number>>, GenerateTicketsError> {
    let domain_size = domain.size();
    if arity == 0 || arity > domain_size {
        return Err(GenerateTicketsError::InvalidArity { arity, domain_size });
    }
    if unique {
        let available = combinations(domain_size, arity);
        if count > available {
            return Err(GenerateTicketsError::NotEnoughCombinations {
                requested: count,
                available,
            });
        }
    }

    let numbers: Vec<Number> = domain.iter().collect();
    let mut seen: HashSet<BTreeSet<Number>> = HashSet::new();
    let mut tickets = Vec::with_capacity(count);
    while tickets.len() < count {
        let ticket: Vec<Number> = numbers.choose_multiple(rng, arity).copied().collect();
        if unique && !seen.insert(ticket.iter().copied().collect()) {
            continue;
        }
        tickets.push(ticket);
    }
    Ok(tickets)
}

/// One ticket per line, numbers zero-padded to the width of the domain.
pub fn format_tokens(tickets: &[Vec<Number>], domain: NumberDomain) -> String {
    let width = domain.digits();
    let mut out = String::new();
    for ticket in tickets {
        let line: Vec<String> = ticket
            .iter()
            .map(|number| format!("{number:0width$}"))
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

pub fn write_tickets(
    path: &Path,
    tickets: &[Vec<Number>],
    format: TicketFormat,
    domain: NumberDomain,
) -> Result<(), GenerateTicketsError> {
    let contents = match format {
        TicketFormat::Json => serde_json::to_string(tickets)?,
        TicketFormat::Tokens => format_tokens(tickets, domain),
    };
    fs::write(path, contents).map_err(|source| GenerateTicketsError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{parse_json_tickets, parse_token_tickets};
    use paydraw_execution::run_rng;

    #[test]
    fn generates_distinct_numbers_in_domain() {
        let domain = NumberDomain::new(1, 20);
        let tickets = generate_tickets(&mut run_rng(1, 0), 50, 6, domain, false).unwrap();
        assert_eq!(tickets.len(), 50);
        for ticket in &tickets {
            let distinct: BTreeSet<_> = ticket.iter().collect();
            assert_eq!(distinct.len(), 6);
            assert!(ticket.iter().all(|n| domain.contains(*n)));
        }
    }

    #[test]
    fn unique_tickets_cover_small_domain() {
        // C(5, 3) = 10, so asking for all of them must return each set once.
        let domain = NumberDomain::new(1, 5);
        let tickets = generate_tickets(&mut run_rng(2, 0), 10, 3, domain, true).unwrap();
        let sets: HashSet<BTreeSet<Number>> =
            tickets.iter().map(|t| t.iter().copied().collect()).collect();
        assert_eq!(sets.len(), 10);

        assert!(matches!(
            generate_tickets(&mut run_rng(2, 0), 11, 3, domain, true),
            Err(GenerateTicketsError::NotEnoughCombinations {
                requested: 11,
                available: 10
            })
        ));
    }

    #[test]
    fn rejects_bad_arity() {
        let domain = NumberDomain::new(1, 5);
        assert!(matches!(
            generate_tickets(&mut run_rng(0, 0), 1, 6, domain, false),
            Err(GenerateTicketsError::InvalidArity { .. })
        ));
        assert!(matches!(
            generate_tickets(&mut run_rng(0, 0), 1, 0, domain, false),
            Err(GenerateTicketsError::InvalidArity { .. })
        ));
    }

    #[test]
    fn combinations_count() {
        assert_eq!(combinations(5, 3), 10);
        assert_eq!(combinations(99, 5), 71_523_144);
        assert_eq!(combinations(7, 7), 1);
        assert_eq!(combinations(60, 30), 118_264_581_564_861_424);
        assert_eq!(combinations(65_536, 10), usize::MAX);
    }

    #[test]
    fn written_files_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let domain = NumberDomain::new(1, 99);
        let tickets = vec![vec![1, 22, 3], vec![40, 5, 99]];

        let tokens = dir.path().join("tickets.txt");
        write_tickets(&tokens, &tickets, TicketFormat::Tokens, domain).unwrap();
        let contents = fs::read_to_string(&tokens).unwrap();
        assert_eq!(contents, "01 22 03\n40 05 99\n");
        assert_eq!(parse_token_tickets(&contents).unwrap(), tickets);

        let json = dir.path().join("tickets.json");
        write_tickets(&json, &tickets, TicketFormat::Json, domain).unwrap();
        assert_eq!(
            parse_json_tickets(&fs::read_to_string(&json).unwrap()).unwrap(),
            tickets
        );
    }
}
