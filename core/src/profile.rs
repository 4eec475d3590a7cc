//! Statistical profiles: per-client action mix and per-step population blend.

use crate::{
    action::ActionType,
    error::{SimError, SimResult},
    rng::SimRng,
    types::Step,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Population-wide statistics for one action type, as calibrated from
/// historical data. Each client samples its own target count from
/// `[min_count, max_count]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientActionProfile {
    pub action: ActionType,
    pub min_count: u64,
    pub max_count: u64,
    pub avg_amount: f64,
    pub std_amount: f64,
}

/// A client's own action mix, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientProfile {
    per_action: BTreeMap<ActionType, ClientActionProfile>,
    action_probability: BTreeMap<ActionType, f64>,
    target_count: u64,
}

impl ClientProfile {
    /// Draw a target count per action and derive selection probabilities.
    pub fn new(profiles: &[ClientActionProfile], rng: &mut SimRng) -> Self {
        let mut per_action = BTreeMap::new();
        let mut counts = BTreeMap::new();
        let mut target_count = 0u64;

        for profile in profiles {
            let count = rng.next_u64_between(profile.min_count, profile.max_count.max(profile.min_count));
            target_count += count;
            counts.insert(profile.action, count);
            per_action.insert(profile.action, profile.clone());
        }

        let action_probability = counts
            .into_iter()
            .map(|(action, count)| {
                let p = if target_count > 0 {
                    count as f64 / target_count as f64
                } else {
                    0.0
                };
                (action, p)
            })
            .collect();

        Self { per_action, action_probability, target_count }
    }

    /// Build a profile with explicit probabilities. `target_count` is the
    /// client's share numerator for its weight.
    pub fn from_parts(
        profiles: &[ClientActionProfile],
        probabilities: &[(ActionType, f64)],
        target_count: u64,
    ) -> Self {
        Self {
            per_action: profiles.iter().map(|p| (p.action, p.clone())).collect(),
            action_probability: probabilities.iter().copied().collect(),
            target_count,
        }
    }

    pub fn target_count(&self) -> u64 {
        self.target_count
    }

    pub fn action_probability(&self) -> &BTreeMap<ActionType, f64> {
        &self.action_probability
    }

    pub fn profile_for(&self, action: ActionType) -> Option<&ClientActionProfile> {
        self.per_action.get(&action)
    }

    /// Probability-weighted (mean, std) of a single transaction across all
    /// actions: `Σ avg·p` and `sqrt(Σ (std·p)²)`.
    pub fn typical_transaction(&self) -> (f64, f64) {
        let mut mean = 0.0;
        let mut variance = 0.0;
        for (action, p) in &self.action_probability {
            if let Some(profile) = self.per_action.get(action) {
                mean += profile.avg_amount * p;
                variance += (profile.std_amount * p).powi(2);
            }
        }
        (mean, variance.sqrt())
    }
}

/// One row of historical aggregates: what the population did with one
/// action type during one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepActionProfile {
    pub step: Step,
    pub action: ActionType,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub hour: u32,
    pub count: u64,
    #[serde(default)]
    pub sum: f64,
    pub avg_amount: f64,
    pub std_amount: f64,
}

/// The population-wide blend for the step being executed.
#[derive(Debug, Clone, Default)]
pub struct StepProfile {
    pub step: Step,
    pub target_count: u64,
    pub probabilities: BTreeMap<ActionType, f64>,
    pub amounts: BTreeMap<ActionType, StepActionProfile>,
}

impl StepProfile {
    pub fn probability(&self, action: ActionType) -> Option<f64> {
        self.probabilities.get(&action).copied()
    }

    pub fn amount_profile(&self, action: ActionType) -> Option<&StepActionProfile> {
        self.amounts.get(&action)
    }
}

/// All step profiles of a run, indexed by step.
#[derive(Debug, Clone, Default)]
pub struct StepsProfiles {
    steps: BTreeMap<Step, StepProfile>,
}

impl StepsProfiles {
    /// Aggregate historical rows. Step target counts are scaled by
    /// `multiplier` and rounded.
    pub fn from_records(records: &[StepActionProfile], multiplier: f64) -> SimResult<Self> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(SimError::config(format!("multiplier must be >= 0, got {multiplier}")));
        }

        let mut steps: BTreeMap<Step, StepProfile> = BTreeMap::new();
        for record in records {
            let entry = steps.entry(record.step).or_insert_with(|| StepProfile {
                step: record.step,
                ..StepProfile::default()
            });
            if entry.amounts.insert(record.action, record.clone()).is_some() {
                return Err(SimError::config(format!(
                    "duplicate aggregate row for step {} action {}",
                    record.step, record.action
                )));
            }
        }

        for profile in steps.values_mut() {
            let raw_count: u64 = profile.amounts.values().map(|r| r.count).sum();
            profile.probabilities = profile
                .amounts
                .iter()
                .map(|(action, r)| {
                    let p = if raw_count > 0 { r.count as f64 / raw_count as f64 } else { 0.0 };
                    (*action, p)
                })
                .collect();
            profile.target_count = (raw_count as f64 * multiplier).round() as u64;
        }

        Ok(Self { steps })
    }

    /// The profile for `step`; steps without history are empty (no activity).
    pub fn profile_for(&self, step: Step) -> StepProfile {
        self.steps.get(&step).cloned().unwrap_or_else(|| StepProfile {
            step,
            ..StepProfile::default()
        })
    }

    /// Sum of all step target counts; the denominator of client weights.
    pub fn total_target_count(&self) -> u64 {
        self.steps.values().map(|p| p.target_count).sum()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
