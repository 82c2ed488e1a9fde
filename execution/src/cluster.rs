//! Groups of numbers that co-occur on tickets sold close together.

use paydraw_types::{Number, TicketPool};

/// Shared-number sets of ticket pairs, largest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterIndex {
    clusters: Vec<Vec<Number>>,
}

impl ClusterIndex {
    /// Compare each ticket with the tickets sold after it, up to `window - 1`
    /// positions ahead, and keep every intersection of two or more numbers.
    pub fn build(pool: &TicketPool, window: usize) -> Self {
        let tickets = pool.tickets();
        let mut clusters = Vec::new();
        for (i, ticket) in tickets.iter().enumerate() {
            let end = i.saturating_add(window).min(tickets.len());
            for other in tickets.iter().take(end).skip(i + 1) {
                let shared: Vec<Number> = ticket
                    .numbers()
                    .iter()
                    .copied()
                    .filter(|number| other.contains(*number))
                    .collect();
                if shared.len() >= 2 {
                    clusters.push(shared);
                }
            }
        }
        clusters.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { clusters }
    }

    pub fn clusters(&self) -> &[Vec<Number>] {
        &self.clusters
    }

    /// The `n` largest clusters.
    pub fn largest(&self, n: usize) -> &[Vec<Number>] {
        &self.clusters[..n.min(self.clusters.len())]
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
