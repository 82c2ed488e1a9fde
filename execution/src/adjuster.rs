//! Rescales tier prizes so a payout lands inside the band.

use paydraw_types::{Band, TierMultipliers, TierTable};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum AdjustError {
    #[error("cannot rescale a payout of {0}")]
    ZeroPayout(f64),
}

/// Multipliers that move `current` onto the nearest band edge.
///
/// Below the band every tier is scaled by `min / current`, above it by
/// `max / current`; inside, the identity is returned. Only amounts change,
/// never which tickets win.
pub fn adjust(current: f64, band: &Band, tiers: &TierTable) -> Result<TierMultipliers, AdjustError> {
    if !current.is_finite() || current <= 0.0 {
        return Err(AdjustError::ZeroPayout(current));
    }
    let factor = if current < band.min {
        band.min / current
    } else if current > band.max {
        band.max / current
    } else {
        return Ok(TierMultipliers::identity(tiers));
    };
    Ok(TierMultipliers::uniform(tiers, factor))
}
