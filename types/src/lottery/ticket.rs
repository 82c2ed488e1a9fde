use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// A lottery number. Tickets and draws are sequences of these.
pub type Number = u16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("expected {expected} numbers, got {got}")]
    WrongArity { expected: usize, got: usize },
    #[error("number {number} appears more than once")]
    DuplicateNumber { number: Number },
    #[error("number {number} is outside {min}..={max}")]
    OutOfDomain { number: Number, min: Number, max: Number },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("ticket pool is empty")]
    Empty,
    #[error("ticket {index} is invalid: {source}")]
    InvalidTicket {
        index: usize,
        #[source]
        source: TicketError,
    },
}

/// Inclusive range of numbers that may appear on tickets and draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberDomain {
    pub min: Number,
    pub max: Number,
}

impl NumberDomain {
    pub const fn new(min: Number, max: Number) -> Self {
        Self { min, max }
    }

    /// Count of numbers in the domain (zero when `min > max`).
    pub fn size(&self) -> usize {
        if self.min > self.max {
            0
        } else {
            (self.max - self.min) as usize + 1
        }
    }

    pub fn contains(&self, number: Number) -> bool {
        number >= self.min && number <= self.max
    }

    pub fn iter(&self) -> impl Iterator<Item = Number> {
        self.min..=self.max
    }

    /// Decimal width of the largest number, used when rendering zero-padded tokens.
    pub fn digits(&self) -> usize {
        self.max.to_string().len()
    }
}

impl Default for NumberDomain {
    fn default() -> Self {
        Self::new(1, 99)
    }
}

impl fmt::Display for NumberDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

fn check_numbers(numbers: &[Number], arity: usize, domain: NumberDomain) -> Result<(), TicketError> {
    if numbers.len() != arity {
        return Err(TicketError::WrongArity {
            expected: arity,
            got: numbers.len(),
        });
    }
    let mut seen = HashSet::with_capacity(numbers.len());
    for &number in numbers {
        if !domain.contains(number) {
            return Err(TicketError::OutOfDomain {
                number,
                min: domain.min,
                max: domain.max,
            });
        }
        if !seen.insert(number) {
            return Err(TicketError::DuplicateNumber { number });
        }
    }
    Ok(())
}

fn overlap(left: &[Number], right: &[Number]) -> usize {
    left.iter().filter(|n| right.contains(n)).count()
}

/// A sold combination. Immutable once part of a [`TicketPool`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(Vec<Number>);

impl Ticket {
    pub fn new(numbers: Vec<Number>, arity: usize, domain: NumberDomain) -> Result<Self, TicketError> {
        check_numbers(&numbers, arity, domain)?;
        Ok(Self(numbers))
    }

    pub fn numbers(&self) -> &[Number] {
        &self.0
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, number: Number) -> bool {
        self.0.contains(&number)
    }
}

/// A winning combination: `arity` distinct numbers of the domain.
///
/// Order is significant only under positional matching.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draw(Vec<Number>);

impl Draw {
    pub fn new(numbers: Vec<Number>, arity: usize, domain: NumberDomain) -> Result<Self, TicketError> {
        check_numbers(&numbers, arity, domain)?;
        Ok(Self(numbers))
    }

    /// Wrap numbers the caller already knows to be distinct and in range.
    pub fn from_distinct(numbers: Vec<Number>) -> Self {
        debug_assert_eq!(
            numbers.iter().collect::<HashSet<_>>().len(),
            numbers.len(),
            "draw numbers must be distinct"
        );
        Self(numbers)
    }

    pub fn numbers(&self) -> &[Number] {
        &self.0
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, number: Number) -> bool {
        self.0.contains(&number)
    }

    /// Count of numbers shared with `other`, ignoring position.
    pub fn overlap(&self, other: &[Number]) -> usize {
        overlap(&self.0, other)
    }

    /// Same numbers regardless of order.
    pub fn same_numbers(&self, other: &Draw) -> bool {
        self.arity() == other.arity() && self.overlap(other.numbers()) == self.arity()
    }
}

/// Tickets in sale order, all validated against one arity and domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketPool {
    tickets: Vec<Ticket>,
    arity: usize,
    domain: NumberDomain,
}

impl TicketPool {
    /// Build a pool, refusing empty input and any malformed ticket.
    pub fn new<I>(raw: I, arity: usize, domain: NumberDomain) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = Vec<Number>>,
    {
        let tickets = raw
            .into_iter()
            .enumerate()
            .map(|(index, numbers)| {
                Ticket::new(numbers, arity, domain)
                    .map_err(|source| PoolError::InvalidTicket { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if tickets.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self {
            tickets,
            arity,
            domain,
        })
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ticket> {
        self.tickets.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Ticket> {
        self.tickets.get(index)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn domain(&self) -> NumberDomain {
        self.domain
    }

    /// Check every ticket against another arity and domain.
    pub fn conform(&self, arity: usize, domain: NumberDomain) -> Result<(), PoolError> {
        for (index, ticket) in self.tickets.iter().enumerate() {
            check_numbers(ticket.numbers(), arity, domain)
                .map_err(|source| PoolError::InvalidTicket { index, source })?;
        }
        Ok(())
    }

    /// Revenue of the pool at a flat ticket price.
    pub fn total_sales(&self, ticket_price: f64) -> f64 {
        self.tickets.len() as f64 * ticket_price
    }
}

impl<'a> IntoIterator for &'a TicketPool {
    type Item = &'a Ticket;
    type IntoIter = std::slice::Iter<'a, Ticket>;

    fn into_iter(self) -> Self::IntoIter {
        self.tickets.iter()
    }
}
