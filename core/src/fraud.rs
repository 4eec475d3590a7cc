//! Transfer-draining heuristic.
//!
//! Each client carries its own `FraudBookkeeping`. The first
//! `MIN_TRANSFERS_FOR_FRAUD` transfer attempts only learn the client's
//! peak balance; after that an attempt is flagged when it would leave the
//! client far below that peak.

use serde::{Deserialize, Serialize};

pub const MIN_TRANSFERS_FOR_FRAUD: u32 = 3;

/// Drop below the peak, in multiples of the transfer limit, that flags.
pub const DRAIN_FACTOR: f64 = 2.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FraudBookkeeping {
    transfer_attempts: u32,
    max_balance_observed: f64,
}

impl FraudBookkeeping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfer_attempts(&self) -> u32 {
        self.transfer_attempts
    }

    pub fn max_balance_observed(&self) -> f64 {
        self.max_balance_observed
    }

    pub fn in_warm_up(&self) -> bool {
        self.transfer_attempts < MIN_TRANSFERS_FOR_FRAUD
    }

    /// Assess one transfer attempt of `amount` made at `balance`.
    /// Returns true when the attempt must be blocked.
    pub fn assess_transfer(&mut self, balance: f64, amount: f64, transfer_limit: f64) -> bool {
        if self.in_warm_up() {
            self.transfer_attempts += 1;
            self.max_balance_observed = self.max_balance_observed.max(balance);
            return false;
        }
        self.max_balance_observed - balance - amount > transfer_limit * DRAIN_FACTOR
    }
}
