//! Client actors and their per-step decision logic.
//!
//! A client step runs in three draws per action: how many actions
//! (binomial), which action (weighted), and how much (positive Gaussian).
//! The chosen action is then handed to `handlers::execute`.

use crate::{
    action::ActionType,
    actor::Account,
    balances::OverdraftPolicy,
    error::{SimError, SimResult},
    fraud::FraudBookkeeping,
    handlers,
    ledger::Ledger,
    population::Population,
    profile::{ClientActionProfile, ClientProfile, StepActionProfile, StepProfile},
    rng::SimRng,
    types::Step,
};

#[derive(Debug, Clone)]
pub struct Client {
    account: Account,
    profile: ClientProfile,
    weight: f64,
    fraud: FraudBookkeeping,
    is_fraud: bool,
}

impl Client {
    pub const IDENTIFIER: &'static str = "C";

    /// Assemble a client from an already-built profile.
    /// `weight` is the client's share of the population target count.
    pub fn new(name: &str, profile: ClientProfile, balance: f64, overdraft_limit: f64, weight: f64) -> Self {
        Self {
            account: Account::new(format!("{}{name}", Self::IDENTIFIER), balance, overdraft_limit),
            profile,
            weight: weight.clamp(0.0, 1.0),
            fraud: FraudBookkeeping::new(),
            is_fraud: false,
        }
    }

    /// Draw the client's profile and overdraft limit from the population
    /// profiles, in that order.
    pub fn generate(
        name: &str,
        action_profiles: &[ClientActionProfile],
        initial_balance: f64,
        total_target_count: u64,
        overdraft_policy: &OverdraftPolicy,
        rng: &mut SimRng,
    ) -> Self {
        let profile = ClientProfile::new(action_profiles, rng);
        let weight = if total_target_count > 0 {
            profile.target_count() as f64 / total_target_count as f64
        } else {
            0.0
        };
        let overdraft_limit = pick_overdraft_limit(&profile, overdraft_policy, rng);
        Self::new(name, profile, initial_balance, overdraft_limit, weight)
    }

    pub fn with_fraud_label(mut self, is_fraud: bool) -> Self {
        self.is_fraud = is_fraud;
        self
    }

    pub fn name(&self) -> &str {
        self.account.id()
    }

    pub fn balance(&self) -> f64 {
        self.account.balance()
    }

    pub fn overdraft_limit(&self) -> f64 {
        self.account.overdraft_limit()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn profile(&self) -> &ClientProfile {
        &self.profile
    }

    pub fn fraud_bookkeeping(&self) -> &FraudBookkeeping {
        &self.fraud
    }

    /// Whether this client's records carry the fraud label.
    pub fn is_fraud(&self) -> bool {
        self.is_fraud
    }

    pub(crate) fn deposit(&mut self, amount: f64) {
        self.account.deposit(amount);
    }

    pub(crate) fn withdraw(&mut self, amount: f64) -> bool {
        self.account.withdraw(amount)
    }

    /// Run the fraud heuristic for a transfer attempt. A flagged attempt
    /// labels the client as fraudulent for the rest of the run.
    pub(crate) fn assess_transfer(&mut self, amount: f64, transfer_limit: f64) -> bool {
        let flagged = self.fraud.assess_transfer(self.account.balance(), amount, transfer_limit);
        if flagged {
            self.is_fraud = true;
        }
        flagged
    }

    /// Number of actions this step: Binomial(target_count, weight).
    pub fn pick_count(&self, rng: &mut SimRng, target_count: u64) -> SimResult<u64> {
        rng.binomial(target_count, self.weight)
    }

    /// Blend client and step probabilities, then pick one action.
    pub fn pick_action(&self, rng: &mut SimRng, step_profile: &StepProfile) -> SimResult<ActionType> {
        let (actions, weights): (Vec<ActionType>, Vec<f64>) = self
            .profile
            .action_probability()
            .iter()
            .map(|(action, client_p)| {
                let p = match step_profile.probability(*action) {
                    Some(step_p) => (client_p + step_p) / 2.0,
                    None => *client_p,
                };
                (*action, p)
            })
            .unzip();

        if actions.is_empty() {
            return Err(SimError::config(format!("client {} has no action profile", self.name())));
        }
        Ok(actions[rng.weighted_index(&weights)?])
    }

    /// Draw a strictly positive amount for `action`.
    pub fn pick_amount(
        &self,
        rng: &mut SimRng,
        action: ActionType,
        step_amount: Option<&StepActionProfile>,
    ) -> SimResult<f64> {
        let client_amount = self.profile.profile_for(action).ok_or_else(|| {
            SimError::config(format!("client {} has no amount profile for {action}", self.name()))
        })?;

        let (mean, std) = match step_amount {
            Some(step) => (
                (client_amount.avg_amount + step.avg_amount) / 2.0,
                (client_amount.std_amount.powi(2) + step.std_amount.powi(2)).sqrt() / 2.0,
            ),
            None => (client_amount.avg_amount, client_amount.std_amount),
        };
        sample_positive(rng, action, mean, std)
    }
}

/// A draw from N(mean, std²) conditioned on being strictly positive.
///
/// A positive mean resamples plain Gaussian draws; otherwise the positive
/// tail is sampled directly. Only a distribution with no positive mass is
/// an error.
pub fn sample_positive(rng: &mut SimRng, action: ActionType, mean: f64, std: f64) -> SimResult<f64> {
    if !mean.is_finite() || !std.is_finite() || (std == 0.0 && mean <= 0.0) {
        return Err(SimError::DegenerateAmount { action, mean, std });
    }
    if mean > 0.0 {
        loop {
            let amount = rng.gaussian(mean, std);
            if amount > 0.0 {
                return Ok(amount);
            }
        }
    }
    let std = std.abs();
    loop {
        let amount = mean + std * rng.normal_tail(-mean / std)?;
        if amount > 0.0 {
            return Ok(amount);
        }
    }
}

fn pick_overdraft_limit(profile: &ClientProfile, policy: &OverdraftPolicy, rng: &mut SimRng) -> f64 {
    let (mean, std) = profile.typical_transaction();
    let typical = rng.gaussian(mean, std);
    policy.limit_for(typical)
}

/// What a client step may touch besides the population.
pub struct StepContext<'a> {
    pub step: Step,
    pub profile: &'a StepProfile,
    pub transfer_limit: f64,
    pub rng: &'a mut SimRng,
    pub labels: &'a mut SimRng,
    pub ledger: &'a mut Ledger,
}

/// Execute one step for the client at `index`. Returns the number of
/// actions performed.
pub fn step_client(population: &mut Population, index: usize, ctx: &mut StepContext<'_>) -> SimResult<u64> {
    let target_count = ctx.profile.target_count;
    if target_count == 0 {
        return Ok(0);
    }

    let count = population.client(index).pick_count(ctx.rng, target_count)?;
    for _ in 0..count {
        let client = population.client(index);
        let action = client.pick_action(ctx.rng, ctx.profile)?;
        let amount = client.pick_amount(ctx.rng, action, ctx.profile.amount_profile(action))?;
        handlers::execute(population, index, action, amount, ctx)?;
    }
    Ok(count)
}
