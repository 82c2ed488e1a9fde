//! Fixtures shared by tests and benchmarks.

use paydraw_types::lottery::{GenerationStrategy, SimilarityGuard, DEFAULT_MAX_ATTEMPTS};
use paydraw_types::{DrawConfig, MatchingMode, Number, NumberDomain, PrizeTier, TicketPool};
use rand::seq::SliceRandom;
use rand::Rng;

/// Price 5, arity 5 over 1..=99, tiers {4: 5000, 3: 10, 2: 5}, band 10%..15%.
pub fn scenario_config() -> DrawConfig {
    DrawConfig {
        ticket_price: 5.0,
        ticket_arity: 5,
        number_domain: NumberDomain::new(1, 99),
        prize_tiers: vec![
            PrizeTier::fixed(4, 5000.0),
            PrizeTier::fixed(3, 10.0),
            PrizeTier::fixed(2, 5.0),
        ],
        min_payout_percent: 0.10,
        max_payout_percent: 0.15,
        max_attempts: DEFAULT_MAX_ATTEMPTS,
        max_matches: None,
        total_sales: None,
        matching_mode: MatchingMode::Set,
        generation_strategy: GenerationStrategy::Uniform,
        adjust_multipliers: false,
        ticket_match_ceiling: None,
        require_winner: false,
        similarity_guard: SimilarityGuard::default(),
    }
}

/// Pool from literal tickets. Panics on malformed input.
pub fn pool_from(tickets: &[&[Number]], arity: usize, domain: NumberDomain) -> TicketPool {
    TicketPool::new(tickets.iter().map(|ticket| ticket.to_vec()), arity, domain)
        .expect("fixture tickets must be valid")
}

/// Ten tickets with disjoint numbers: 1..=5, 6..=10, and so on.
pub fn scenario_pool() -> TicketPool {
    let domain = NumberDomain::new(1, 99);
    let tickets = (0..10u16).map(|i| (1..=5).map(|n| i * 5 + n).collect::<Vec<Number>>());
    TicketPool::new(tickets, 5, domain).expect("fixture tickets must be valid")
}

/// `count` tickets of `arity` distinct numbers, uniform over `domain`.
pub fn random_pool<R: Rng>(rng: &mut R, count: usize, arity: usize, domain: NumberDomain) -> TicketPool {
    let numbers: Vec<Number> = domain.iter().collect();
    let tickets: Vec<Vec<Number>> = (0..count)
        .map(|_| numbers.choose_multiple(rng, arity).copied().collect())
        .collect();
    TicketPool::new(tickets, arity, domain).expect("random tickets must be valid")
}
