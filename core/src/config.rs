use crate::{
    action::ActionType,
    balances::{BalanceBand, InitialBalancePolicy, OverdraftBand, OverdraftPolicy},
    error::{SimError, SimResult},
    profile::{ClientActionProfile, StepActionProfile},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Run-level scalars from `parameters.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParameters {
    pub nb_steps: u64,
    pub multiplier: f64,
    pub nb_clients: usize,
    pub nb_merchants: usize,
    pub fraud_probability: f64,
    pub transfer_limit: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ClientProfilesFile {
    profiles: Vec<ClientActionProfile>,
}

#[derive(Debug, Clone, Deserialize)]
struct AggregatedTransactionsFile {
    steps: Vec<StepActionProfile>,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub parameters: SimParameters,
    pub client_profiles: Vec<ClientActionProfile>,
    pub step_records: Vec<StepActionProfile>,
    pub overdraft_limits: OverdraftPolicy,
    pub initial_balances: InitialBalancePolicy,
}

impl SimConfig {
    /// Load from the data/ directory.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let parameters: SimParameters = read_json(&format!("{data_dir}/parameters.json"))?;

        let profiles_file: ClientProfilesFile =
            read_json(&format!("{data_dir}/client_profiles.json"))?;

        let aggregated_file: AggregatedTransactionsFile =
            read_json(&format!("{data_dir}/aggregated_transactions.json"))?;

        let overdraft_limits: OverdraftPolicy =
            read_json(&format!("{data_dir}/overdraft_limits.json"))?;

        let initial_balances: InitialBalancePolicy =
            read_json(&format!("{data_dir}/initial_balances.json"))?;

        let config = Self {
            parameters,
            client_profiles: profiles_file.profiles,
            step_records: aggregated_file.steps,
            overdraft_limits,
            initial_balances,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run to completion.
    pub fn validate(&self) -> SimResult<()> {
        let p = &self.parameters;
        if !(p.transfer_limit > 0.0) || !p.transfer_limit.is_finite() {
            return Err(SimError::config(format!(
                "transfer_limit must be a positive number, got {}",
                p.transfer_limit
            )));
        }
        if p.nb_merchants == 0 {
            return Err(SimError::config("at least one merchant is required"));
        }
        if !(0.0..=1.0).contains(&p.fraud_probability) {
            return Err(SimError::config(format!(
                "fraud_probability must be in [0, 1], got {}",
                p.fraud_probability
            )));
        }
        if self.client_profiles.is_empty() {
            return Err(SimError::config("no client action profiles"));
        }

        let mut seen = BTreeSet::new();
        for profile in &self.client_profiles {
            if !seen.insert(profile.action) {
                return Err(SimError::config(format!("duplicate client profile for {}", profile.action)));
            }
            if profile.max_count < profile.min_count {
                return Err(SimError::config(format!(
                    "{}: max_count {} < min_count {}",
                    profile.action, profile.max_count, profile.min_count
                )));
            }
            if !profile.avg_amount.is_finite() || !profile.std_amount.is_finite() {
                return Err(SimError::config(format!("{}: non-finite amount statistics", profile.action)));
            }
        }

        self.overdraft_limits.validate()?;
        self.initial_balances.validate()?;
        Ok(())
    }

    /// Config with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        let profile = |action, min_count, max_count, avg_amount, std_amount| ClientActionProfile {
            action,
            min_count,
            max_count,
            avg_amount,
            std_amount,
        };
        let client_profiles = vec![
            profile(ActionType::CashIn, 2, 10, 150.0, 60.0),
            profile(ActionType::CashOut, 2, 10, 180.0, 90.0),
            profile(ActionType::Debit, 1, 4, 60.0, 30.0),
            profile(ActionType::Payment, 5, 20, 45.0, 25.0),
            profile(ActionType::Transfer, 1, 6, 1_800.0, 1_200.0),
            profile(ActionType::Deposit, 1, 4, 400.0, 150.0),
        ];

        let mut step_records = Vec::new();
        for step in 0..24u64 {
            let busy = if (8..20).contains(&(step % 24)) { 2 } else { 1 };
            for (action, count, avg, std) in [
                (ActionType::CashIn, 6, 160.0, 70.0),
                (ActionType::CashOut, 6, 170.0, 80.0),
                (ActionType::Debit, 2, 55.0, 25.0),
                (ActionType::Payment, 12, 40.0, 20.0),
                (ActionType::Transfer, 3, 2_000.0, 1_500.0),
            ] {
                let count = count * busy;
                step_records.push(StepActionProfile {
                    step,
                    action,
                    month: 1,
                    day: 1 + (step / 24) as u32,
                    hour: (step % 24) as u32,
                    count,
                    sum: avg * count as f64,
                    avg_amount: avg,
                    std_amount: std,
                });
            }
        }

        Self {
            parameters: SimParameters {
                nb_steps: 24,
                multiplier: 1.0,
                nb_clients: 40,
                nb_merchants: 5,
                fraud_probability: 0.05,
                transfer_limit: 1_000.0,
            },
            client_profiles,
            step_records,
            overdraft_limits: OverdraftPolicy::new(vec![
                OverdraftBand { low: 0.0, high: 100.0, limit: 0.0 },
                OverdraftBand { low: 100.0, high: 500.0, limit: 200.0 },
                OverdraftBand { low: 500.0, high: 1e12, limit: 1_000.0 },
            ]),
            initial_balances: InitialBalancePolicy::new(vec![
                BalanceBand { low: 0.0, high: 500.0, probability: 0.3 },
                BalanceBand { low: 500.0, high: 5_000.0, probability: 0.5 },
                BalanceBand { low: 5_000.0, high: 50_000.0, probability: 0.2 },
            ]),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
}
