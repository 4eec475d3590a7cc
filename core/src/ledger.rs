//! Append-only transaction ledger for one run.

use crate::{
    action::ActionType,
    error::SimResult,
    transaction::{Transaction, OUTPUT_HEADER, OUTPUT_SEPARATOR},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fully built record. Records are never modified afterwards.
    pub fn record(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Records appended at or after position `from`.
    pub fn since(&self, from: usize) -> &[Transaction] {
        &self.transactions[from.min(self.transactions.len())..]
    }

    /// Drop every record from index `len` on.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.transactions.truncate(len);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// Header line followed by one row per record.
    pub fn write_csv<W: Write>(&self, mut out: W) -> SimResult<()> {
        writeln!(out, "{}", OUTPUT_HEADER.join(OUTPUT_SEPARATOR))?;
        for t in &self.transactions {
            writeln!(out, "{t}")?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary::default();
        for t in &self.transactions {
            let entry = summary.per_action.entry(t.action).or_default();
            entry.count += 1;
            entry.volume += t.amount;
            summary.total += 1;
            if t.is_fraud {
                summary.fraud += 1;
            }
            if t.is_flagged_fraud {
                summary.flagged_fraud += 1;
            }
            if t.is_unauthorized_overdraft {
                summary.unauthorized_overdraft += 1;
            }
            if t.is_failed() {
                summary.failed += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionTotals {
    pub count: u64,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total: u64,
    pub fraud: u64,
    pub flagged_fraud: u64,
    pub unauthorized_overdraft: u64,
    pub failed: u64,
    pub per_action: BTreeMap<ActionType, ActionTotals>,
}
