//! Balance-holding actors.
//!
//! RULE: balances change only through `deposit` / `withdraw`.

use crate::types::ActorId;

/// Identifier and balance shared by every actor kind.
#[derive(Debug, Clone)]
pub struct Account {
    id: ActorId,
    balance: f64,
    overdraft_limit: f64,
}

impl Account {
    pub fn new(id: impl Into<ActorId>, balance: f64, overdraft_limit: f64) -> Self {
        Self {
            id: id.into(),
            balance,
            overdraft_limit: overdraft_limit.max(0.0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn overdraft_limit(&self) -> f64 {
        self.overdraft_limit
    }

    pub(crate) fn deposit(&mut self, amount: f64) {
        self.balance += amount;
    }

    /// Withdraw unless it would take the balance below `-overdraft_limit`.
    /// Returns true when the withdrawal was refused as an unauthorized
    /// overdraft; the balance is then unchanged.
    pub(crate) fn withdraw(&mut self, amount: f64) -> bool {
        if self.balance - amount < -self.overdraft_limit {
            return true;
        }
        self.balance -= amount;
        false
    }
}

#[derive(Debug, Clone)]
pub struct Merchant {
    account: Account,
}

impl Merchant {
    pub const IDENTIFIER: &'static str = "M";

    pub fn new(name: &str, balance: f64) -> Self {
        Self { account: Account::new(format!("{}{name}", Self::IDENTIFIER), balance, 0.0) }
    }

    pub fn name(&self) -> &str {
        self.account.id()
    }

    pub fn balance(&self) -> f64 {
        self.account.balance()
    }

    pub(crate) fn deposit(&mut self, amount: f64) {
        self.account.deposit(amount);
    }
}

#[derive(Debug, Clone)]
pub struct Bank {
    account: Account,
}

impl Bank {
    pub const IDENTIFIER: &'static str = "B";

    pub fn new(name: &str, balance: f64) -> Self {
        Self { account: Account::new(format!("{}{name}", Self::IDENTIFIER), balance, 0.0) }
    }

    pub fn name(&self) -> &str {
        self.account.id()
    }

    pub fn balance(&self) -> f64 {
        self.account.balance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdraw_respects_overdraft_limit() {
        let mut acct = Account::new("C1", 100.0, 500.0);
        assert!(!acct.withdraw(550.0));
        assert_eq!(acct.balance(), -450.0);
        assert!(acct.withdraw(60.0));
        assert_eq!(acct.balance(), -450.0);
        assert!(!acct.withdraw(50.0));
        assert_eq!(acct.balance(), -500.0);
    }

    #[test]
    fn negative_overdraft_limit_is_clamped() {
        let acct = Account::new("C1", 0.0, -10.0);
        assert_eq!(acct.overdraft_limit(), 0.0);
    }
}
