//! Number frequency across a ticket pool.
//!
//! The ranking is by descending count. Ties keep the order in which numbers
//! were first seen while scanning the pool in sale order, so two runs over the
//! same pool always rank identically.

use paydraw_types::{Number, NumberDomain, TicketPool};
use serde::Serialize;
use std::collections::{hash_map::Entry, BTreeMap, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NumberFrequency {
    pub number: Number,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyReport {
    ranked: Vec<NumberFrequency>,
    table: BTreeMap<Number, usize>,
}

/// Count every number of every ticket and rank them.
pub fn analyze(pool: &TicketPool) -> FrequencyReport {
    let mut positions: HashMap<Number, usize> = HashMap::new();
    let mut ranked: Vec<NumberFrequency> = Vec::new();
    for ticket in pool {
        for &number in ticket.numbers() {
            match positions.entry(number) {
                Entry::Occupied(entry) => ranked[*entry.get()].count += 1,
                Entry::Vacant(entry) => {
                    entry.insert(ranked.len());
                    ranked.push(NumberFrequency { number, count: 1 });
                }
            }
        }
    }
    let table = ranked
        .iter()
        .map(|frequency| (frequency.number, frequency.count))
        .collect();

    // `sort_by` is stable: equal counts stay in first-seen order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    FrequencyReport { ranked, table }
}

impl FrequencyReport {
    /// Distinct numbers, most frequent first.
    pub fn ranked(&self) -> &[NumberFrequency] {
        &self.ranked
    }

    pub fn ranked_numbers(&self) -> impl Iterator<Item = Number> + '_ {
        self.ranked.iter().map(|frequency| frequency.number)
    }

    pub fn table(&self) -> &BTreeMap<Number, usize> {
        &self.table
    }

    pub fn count(&self, number: Number) -> usize {
        self.table.get(&number).copied().unwrap_or(0)
    }

    /// Sum of all counts (pool size times arity).
    pub fn total(&self) -> usize {
        self.table.values().sum()
    }

    pub fn most_used(&self, n: usize) -> &[NumberFrequency] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    /// The `n` least frequent numbers that were sold, least frequent first.
    pub fn least_used(&self, n: usize) -> Vec<NumberFrequency> {
        self.ranked.iter().rev().take(n).copied().collect()
    }

    /// Numbers of the domain that appear on no ticket.
    pub fn unused(&self, domain: NumberDomain) -> Vec<Number> {
        domain
            .iter()
            .filter(|number| !self.table.contains_key(number))
            .collect()
    }
}
