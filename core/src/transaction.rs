//! The labelled transaction record and its output row format.

use crate::{action::ActionType, rng::SimRng, types::Step};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const OUTPUT_SEPARATOR: &str = ",";
pub const PRECISION_OUTPUT: usize = 2;

pub const OUTPUT_HEADER: [&str; 14] = [
    "step",
    "action",
    "amount",
    "nameOrig",
    "place",
    "time",
    "oldBalanceOrig",
    "newBalanceOrig",
    "nameDest",
    "oldBalanceDest",
    "newBalanceDest",
    "isFraud",
    "isFlaggedFraud",
    "isUnauthorizedOverdraft",
];

/// Cosmetic location labels.
pub const PLACES: [&str; 4] = ["Paris", "New York", "Berlin", "Hamburg"];

/// Both sides of a balance movement, captured by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub name: String,
    pub old_balance: f64,
    pub new_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub step: Step,
    pub action: ActionType,
    pub amount: f64,
    pub name_orig: String,
    pub place: String,
    pub time: NaiveTime,
    pub old_balance_orig: f64,
    pub new_balance_orig: f64,
    pub name_dest: String,
    pub old_balance_dest: f64,
    pub new_balance_dest: f64,
    pub is_fraud: bool,
    pub is_flagged_fraud: bool,
    pub is_unauthorized_overdraft: bool,
}

impl Transaction {
    /// Build a record with all flags cleared. Place and minute are drawn
    /// from `labels`; the hour is `step mod 23`.
    pub fn new(
        step: Step,
        action: ActionType,
        amount: f64,
        orig: Leg,
        dest: Leg,
        labels: &mut SimRng,
    ) -> Self {
        let place = PLACES[labels.next_u64_below(PLACES.len() as u64) as usize];
        let hour = (step % 23) as u32;
        let minute = labels.next_u64_below(60) as u32;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();

        Self {
            step,
            action,
            amount,
            name_orig: orig.name,
            place: place.to_string(),
            time,
            old_balance_orig: orig.old_balance,
            new_balance_orig: orig.new_balance,
            name_dest: dest.name,
            old_balance_dest: dest.old_balance,
            new_balance_dest: dest.new_balance,
            is_fraud: false,
            is_flagged_fraud: false,
            is_unauthorized_overdraft: false,
        }
    }

    pub fn with_fraud(mut self, is_fraud: bool) -> Self {
        self.is_fraud = is_fraud;
        self
    }

    pub fn with_flagged_fraud(mut self, is_flagged_fraud: bool) -> Self {
        self.is_flagged_fraud = is_flagged_fraud;
        self
    }

    pub fn with_unauthorized_overdraft(mut self, is_unauthorized_overdraft: bool) -> Self {
        self.is_unauthorized_overdraft = is_unauthorized_overdraft;
        self
    }

    pub fn is_failed(&self) -> bool {
        self.is_flagged_fraud || self.is_unauthorized_overdraft
    }

    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    /// The ordered output fields.
    pub fn fields(&self) -> [String; 14] {
        [
            self.step.to_string(),
            self.action.as_str().to_string(),
            format_amount(self.amount),
            self.name_orig.clone(),
            self.place.clone(),
            self.time_label(),
            format_amount(self.old_balance_orig),
            format_amount(self.new_balance_orig),
            self.name_dest.clone(),
            format_amount(self.old_balance_dest),
            format_amount(self.new_balance_dest),
            format_bool(self.is_fraud).to_string(),
            format_bool(self.is_flagged_fraud).to_string(),
            format_bool(self.is_unauthorized_overdraft).to_string(),
        ]
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields().join(OUTPUT_SEPARATOR))
    }
}

pub fn format_amount(value: f64) -> String {
    format!("{value:.prec$}", prec = PRECISION_OUTPUT)
}

pub fn format_bool(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, RngSlot};

    fn sample(step: Step) -> Transaction {
        let mut labels = RngBank::new(9).for_slot(RngSlot::Labels);
        Transaction::new(
            step,
            ActionType::Payment,
            12.346,
            Leg { name: "C1".into(), old_balance: 100.0, new_balance: 87.654 },
            Leg { name: "M1".into(), old_balance: 0.0, new_balance: 12.346 },
            &mut labels,
        )
    }

    #[test]
    fn row_has_fourteen_fields_in_order() {
        let t = sample(25).with_unauthorized_overdraft(true);
        let row = t.to_string();
        let fields: Vec<&str> = row.split(OUTPUT_SEPARATOR).collect();
        assert_eq!(fields.len(), 14);
        assert_eq!(fields[0], "25");
        assert_eq!(fields[1], "PAYMENT");
        assert_eq!(fields[2], "12.35");
        assert_eq!(fields[3], "C1");
        assert!(PLACES.contains(&fields[4]));
        assert!(fields[5].starts_with("02:"));
        assert_eq!(fields[7], "87.65");
        assert_eq!(&fields[11..], ["0", "0", "1"]);
    }

    #[test]
    fn failed_iff_flagged_or_overdraft() {
        assert!(!sample(0).with_fraud(true).is_failed());
        assert!(sample(0).with_flagged_fraud(true).is_failed());
        assert!(sample(0).with_unauthorized_overdraft(true).is_failed());
    }
}
