//! Balance policy tables: initial client balances and overdraft limits.

use crate::{
    error::{SimError, SimResult},
    rng::SimRng,
};
use serde::{Deserialize, Serialize};

/// Values in `[low, high)` receive `limit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdraftBand {
    pub low: f64,
    pub high: f64,
    pub limit: f64,
}

/// Maps a client's typical transaction size to an overdraft limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverdraftPolicy {
    pub bands: Vec<OverdraftBand>,
}

impl OverdraftPolicy {
    pub fn new(bands: Vec<OverdraftBand>) -> Self {
        Self { bands }
    }

    /// First band containing `typical_amount`; 0 when none does.
    pub fn limit_for(&self, typical_amount: f64) -> f64 {
        self.bands
            .iter()
            .find(|b| typical_amount >= b.low && typical_amount < b.high)
            .map(|b| b.limit)
            .unwrap_or(0.0)
    }

    pub fn validate(&self) -> SimResult<()> {
        for band in &self.bands {
            if !(band.limit >= 0.0) || band.high < band.low {
                return Err(SimError::config(format!("invalid overdraft band {band:?}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceBand {
    pub low: f64,
    pub high: f64,
    pub probability: f64,
}

/// Weighted balance ranges; a client's opening balance is uniform within
/// the picked range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitialBalancePolicy {
    pub bands: Vec<BalanceBand>,
}

impl InitialBalancePolicy {
    pub fn new(bands: Vec<BalanceBand>) -> Self {
        Self { bands }
    }

    pub fn pick(&self, rng: &mut SimRng) -> SimResult<f64> {
        let weights: Vec<f64> = self.bands.iter().map(|b| b.probability).collect();
        let band = &self.bands[rng.weighted_index(&weights)?];
        Ok(rng.uniform(band.low, band.high))
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.bands.is_empty() {
            return Err(SimError::config("initial balance table is empty"));
        }
        let mut total = 0.0;
        for band in &self.bands {
            if !(band.probability >= 0.0) || !band.probability.is_finite() || band.high < band.low {
                return Err(SimError::config(format!("invalid balance band {band:?}")));
            }
            total += band.probability;
        }
        if total <= 0.0 {
            return Err(SimError::config("initial balance probabilities sum to 0"));
        }
        Ok(())
    }
}
