//! The simulation engine: scheduler, random streams, ledger and store.
//!
//! EXECUTION ORDER per step (fixed, never reordered):
//!   1. Resolve the step's population profile.
//!   2. Step every client in population order.
//!   3. Flush the step's new ledger records to the store.
//!   4. Emit StepCompleted.
//!
//! RULES:
//!   - Clients execute strictly one after another; a client sees every
//!     balance change made earlier in the same step.
//!   - All randomness flows through the RngBank streams.

use crate::{
    client::{step_client, StepContext},
    clock::SimClock,
    config::SimConfig,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    ledger::Ledger,
    population::Population,
    profile::StepsProfiles,
    rng::{RngBank, RngSlot, SimRng},
    store::SimStore,
    types::{RunId, Step},
};

/// Per-step outcome returned by `SimEngine::step`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: Step,
    pub target_count: u64,
    pub actions: u64,
    pub transactions: u64,
    pub flagged_fraud: u64,
    pub unauthorized_overdraft: u64,
}

pub struct SimEngine {
    pub run_id: RunId,
    pub clock: SimClock,
    pub store: SimStore,
    config: SimConfig,
    steps: StepsProfiles,
    population: Population,
    behaviour_rng: SimRng,
    label_rng: SimRng,
    ledger: Ledger,
    persisted: usize,
    halted_at: Option<Step>,
}

impl SimEngine {
    /// Build an engine from a validated config: aggregate step profiles,
    /// generate the population, register the run.
    pub fn new(run_id: RunId, seed: u64, store: SimStore, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let rng_bank = RngBank::new(seed);

        let steps = StepsProfiles::from_records(&config.step_records, config.parameters.multiplier)?;
        let mut population_rng = rng_bank.for_slot(RngSlot::Population);
        let population = Population::generate(&config, steps.total_target_count(), &mut population_rng)?;

        let resumed = store.run_exists(&run_id)?;
        if !resumed {
            store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;
        }

        let engine = Self {
            clock: SimClock::new(run_id.clone()),
            store,
            config,
            steps,
            population,
            behaviour_rng: rng_bank.for_slot(RngSlot::Behaviour),
            label_rng: rng_bank.for_slot(RngSlot::Labels),
            ledger: Ledger::new(),
            persisted: 0,
            halted_at: None,
            run_id,
        };
        if resumed {
            log::info!("run {} reopened with seed {seed}", engine.run_id);
        } else {
            engine.emit(
                0,
                &SimEvent::RunInitialized {
                    run_id: engine.run_id.clone(),
                    seed,
                    clients: engine.population.clients().len(),
                    merchants: engine.population.merchants().len(),
                },
            )?;
            log::info!("run {} initialized with seed {seed}", engine.run_id);
        }
        Ok(engine)
    }

    /// Load config from `data_dir` and open a fully wired engine.
    pub fn build(run_id: RunId, seed: u64, store: SimStore, data_dir: &str) -> SimResult<Self> {
        let config = SimConfig::load(data_dir)?;
        Self::new(run_id, seed, store, config)
    }

    /// In-memory store plus `SimConfig::default_test()`.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        Self::build_test_with(run_id, seed, SimConfig::default_test())
    }

    pub fn build_test_with(run_id: RunId, seed: u64, config: SimConfig) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        Self::new(run_id, seed, store, config)
    }

    /// Advance one step. This is the core simulation step.
    ///
    /// A failed step discards its partial records and halts the engine:
    /// balances were already moved, so no later step may run.
    pub fn step(&mut self) -> SimResult<StepReport> {
        if let Some(step) = self.halted_at {
            return Err(SimError::RunHalted { step });
        }
        let step = self.clock.advance();
        let profile = self.steps.profile_for(step);
        let first_new = self.ledger.len();

        let mut ctx = StepContext {
            step,
            profile: &profile,
            transfer_limit: self.config.parameters.transfer_limit,
            rng: &mut self.behaviour_rng,
            labels: &mut self.label_rng,
            ledger: &mut self.ledger,
        };

        let mut actions = 0;
        for index in 0..self.population.clients().len() {
            match step_client(&mut self.population, index, &mut ctx) {
                Ok(n) => actions += n,
                Err(e) => {
                    self.ledger.truncate(first_new);
                    self.halted_at = Some(step);
                    log::error!("step={step} halted: {e}");
                    return Err(e);
                }
            }
        }

        let new_records = self.ledger.since(first_new);
        let report = StepReport {
            step,
            target_count: profile.target_count,
            actions,
            transactions: new_records.len() as u64,
            flagged_fraud: new_records.iter().filter(|t| t.is_flagged_fraud).count() as u64,
            unauthorized_overdraft: new_records.iter().filter(|t| t.is_unauthorized_overdraft).count() as u64,
        };

        self.flush_ledger()?;
        self.emit(
            step,
            &SimEvent::StepCompleted {
                step,
                target_count: report.target_count,
                transactions: report.transactions,
                flagged_fraud: report.flagged_fraud,
                unauthorized_overdraft: report.unauthorized_overdraft,
            },
        )?;

        log::debug!(
            "step={step} target={} actions={} txns={} flagged={} overdraft={}",
            report.target_count,
            report.actions,
            report.transactions,
            report.flagged_fraud,
            report.unauthorized_overdraft
        );
        Ok(report)
    }

    /// Run n steps in a loop.
    pub fn run_steps(&mut self, n: u64) -> SimResult<Vec<StepReport>> {
        self.clock.resume();
        let mut reports = Vec::with_capacity(n as usize);
        for _ in 0..n {
            match self.step() {
                Ok(report) => reports.push(report),
                Err(e) => {
                    self.clock.pause();
                    return Err(e);
                }
            }
        }
        self.clock.pause();
        Ok(reports)
    }

    /// Run the configured number of steps.
    pub fn run(&mut self) -> SimResult<Vec<StepReport>> {
        let remaining = self.config.parameters.nb_steps.saturating_sub(self.clock.steps_run());
        self.run_steps(remaining)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Query events for a specific step from the store.
    pub fn store_events_for_step(&self, step: Step) -> SimResult<Vec<EventLogEntry>> {
        self.store.events_for_step(&self.run_id, step)
    }

    fn flush_ledger(&mut self) -> SimResult<()> {
        let pending = self.ledger.since(self.persisted);
        if !pending.is_empty() {
            self.store.insert_transactions(&self.run_id, pending)?;
        }
        self.persisted = self.ledger.len();
        Ok(())
    }

    fn emit(&self, step: Step, event: &SimEvent) -> SimResult<()> {
        let entry = EventLogEntry {
            id: None,
            run_id: self.run_id.clone(),
            step,
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
        };
        self.store.append_event(&entry)
    }
}
