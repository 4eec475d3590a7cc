//! The closed set of client action types.
//!
//! Dispatch is exhaustive over this enum; an unknown action name can only
//! appear in a data file, where it fails deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    CashIn,
    CashOut,
    Debit,
    Payment,
    Transfer,
    Deposit,
}

impl ActionType {
    pub const ALL: [ActionType; 6] = [
        Self::CashIn,
        Self::CashOut,
        Self::Debit,
        Self::Payment,
        Self::Transfer,
        Self::Deposit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashIn   => "CASH_IN",
            Self::CashOut  => "CASH_OUT",
            Self::Debit    => "DEBIT",
            Self::Payment  => "PAYMENT",
            Self::Transfer => "TRANSFER",
            Self::Deposit  => "DEPOSIT",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unsupported action type: {s}"))
    }
}
