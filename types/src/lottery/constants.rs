/// Attempt budget for one draw when the configuration does not set one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Regeneration budget for the similarity guard.
pub const DEFAULT_MAX_REGENERATIONS: u32 = 32;

/// Number of following tickets each ticket is compared with when building clusters.
pub const DEFAULT_CLUSTER_WINDOW: usize = 100;

/// Chance of seeding a cluster-biased draw from a co-occurring cluster.
pub const DEFAULT_CLUSTER_PROBABILITY: f64 = 0.5;

/// How many of the largest clusters are eligible as seeds.
pub const DEFAULT_TOP_CLUSTERS: usize = 10;

/// Numbers copied out of the chosen cluster.
pub const DEFAULT_CLUSTER_SEED: usize = 2;

/// Draw size reached with frequency-biased picks before uniform filling.
pub const DEFAULT_BIASED_FILL: usize = 3;

/// Chance of picking from the most frequent numbers during biased filling.
pub const DEFAULT_FREQUENCY_PROBABILITY: f64 = 0.6;

/// How many of the most frequent numbers are eligible during biased filling.
pub const DEFAULT_FREQUENCY_POOL: usize = 20;

/// Chance of keeping a sold ticket's slot in a ticket-seeded draw.
pub const DEFAULT_COPY_PROBABILITY: f64 = 0.5;

/// Relative tolerance applied to band bounds.
pub const BAND_TOLERANCE: f64 = 1e-9;
