//! Balance effects and labels of each action handler, driven directly
//! against a hand-built population.

use txnsim_core::{
    action::ActionType,
    actor::{Bank, Merchant},
    client::{Client, StepContext},
    error::SimResult,
    handlers,
    ledger::Ledger,
    population::Population,
    profile::{ClientActionProfile, ClientProfile, StepProfile},
    rng::{RngBank, RngSlot, SimRng},
    transaction::Transaction,
};

const LIMIT: f64 = 1_000.0;

struct Harness {
    population: Population,
    profile: StepProfile,
    rng: SimRng,
    labels: SimRng,
    ledger: Ledger,
}

impl Harness {
    /// One merchant, one bank, and clients with the given
    /// (balance, overdraft limit) pairs.
    fn new(clients: &[(f64, f64)]) -> Self {
        let profiles = [ClientActionProfile {
            action: ActionType::Payment,
            min_count: 1,
            max_count: 1,
            avg_amount: 100.0,
            std_amount: 10.0,
        }];
        let clients = clients
            .iter()
            .enumerate()
            .map(|(i, (balance, overdraft))| {
                let profile = ClientProfile::from_parts(&profiles, &[(ActionType::Payment, 1.0)], 1);
                Client::new(&i.to_string(), profile, *balance, *overdraft, 0.5)
            })
            .collect();
        let bank = RngBank::new(11);
        Self {
            population: Population::new(clients, vec![Merchant::new("0", 250.0)], Bank::new("0", 5_000.0)),
            profile: StepProfile::default(),
            rng: bank.for_slot(RngSlot::Behaviour),
            labels: bank.for_slot(RngSlot::Labels),
            ledger: Ledger::new(),
        }
    }

    fn act(&mut self, client: usize, action: ActionType, amount: f64) -> SimResult<()> {
        let mut ctx = StepContext {
            step: 5,
            profile: &self.profile,
            transfer_limit: LIMIT,
            rng: &mut self.rng,
            labels: &mut self.labels,
            ledger: &mut self.ledger,
        };
        handlers::execute(&mut self.population, client, action, amount, &mut ctx)
    }

    fn last(&self) -> &Transaction {
        self.ledger.transactions().last().expect("a transaction was recorded")
    }
}

#[test]
fn debit_beyond_overdraft_is_refused_and_balance_kept() {
    let mut h = Harness::new(&[(1_000.0, 0.0)]);
    h.act(0, ActionType::Debit, 1_500.0).unwrap();

    let t = h.last();
    assert_eq!(t.action, ActionType::Debit);
    assert_eq!(t.old_balance_orig, 1_000.0);
    assert_eq!(t.new_balance_orig, 1_000.0);
    assert!(t.is_unauthorized_overdraft);
    assert!(t.is_failed());
    assert_eq!(t.name_dest, "B0");
    assert_eq!(t.old_balance_dest, t.new_balance_dest);
    assert_eq!(h.population.client(0).balance(), 1_000.0);
}

#[test]
fn debit_within_overdraft_goes_negative() {
    let mut h = Harness::new(&[(100.0, 500.0)]);
    h.act(0, ActionType::Debit, 550.0).unwrap();
    let t = h.last();
    assert!(!t.is_unauthorized_overdraft);
    assert_eq!(t.new_balance_orig, -450.0);
}

#[test]
fn cash_out_overdraft_follows_the_same_refuse_policy() {
    let mut h = Harness::new(&[(200.0, 0.0)]);
    h.act(0, ActionType::CashOut, 300.0).unwrap();
    let t = h.last();
    assert!(t.is_unauthorized_overdraft);
    assert_eq!(t.new_balance_orig, 200.0);
    assert_eq!(t.name_dest, "M0");
    assert_eq!(t.new_balance_dest, 250.0);
}

#[test]
fn cash_out_leaves_merchant_untouched() {
    let mut h = Harness::new(&[(500.0, 0.0)]);
    h.act(0, ActionType::CashOut, 120.0).unwrap();
    let t = h.last();
    assert_eq!(t.new_balance_orig, 380.0);
    assert_eq!(t.old_balance_dest, 250.0);
    assert_eq!(t.new_balance_dest, 250.0);
}

#[test]
fn cash_in_credits_client_and_merchant() {
    let mut h = Harness::new(&[(500.0, 0.0)]);
    h.act(0, ActionType::CashIn, 75.0).unwrap();
    let t = h.last();
    assert_eq!(t.new_balance_orig, 575.0);
    assert_eq!(t.new_balance_dest, 325.0);
    assert_eq!(h.population.merchant(0).balance(), 325.0);
}

#[test]
fn payment_credits_merchant_only_when_authorized() {
    let mut h = Harness::new(&[(100.0, 0.0)]);

    h.act(0, ActionType::Payment, 60.0).unwrap();
    let t = h.last();
    assert!(!t.is_unauthorized_overdraft);
    assert_eq!(t.new_balance_orig, 40.0);
    assert_eq!(t.new_balance_dest, 310.0);

    h.act(0, ActionType::Payment, 60.0).unwrap();
    let t = h.last();
    assert!(t.is_unauthorized_overdraft);
    assert_eq!(t.old_balance_orig, 40.0);
    assert_eq!(t.new_balance_orig, 40.0);
    assert_eq!(t.old_balance_dest, 310.0);
    assert_eq!(t.new_balance_dest, 310.0);
}

#[test]
fn deposit_always_succeeds_and_leaves_bank_untouched() {
    let mut h = Harness::new(&[(-300.0, 0.0)]);
    h.act(0, ActionType::Deposit, 1_000.0).unwrap();
    let t = h.last();
    assert!(!t.is_failed());
    assert_eq!(t.new_balance_orig, 700.0);
    assert_eq!(t.name_dest, "B0");
    assert_eq!(t.old_balance_dest, 5_000.0);
    assert_eq!(t.new_balance_dest, 5_000.0);
}

#[test]
fn large_transfer_is_split_into_limit_sized_chunks() {
    let mut h = Harness::new(&[(10_000.0, 0.0), (0.0, 0.0)]);
    h.act(0, ActionType::Transfer, 2_500.0).unwrap();

    let amounts: Vec<f64> = h.ledger.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![1_000.0, 1_000.0, 500.0]);
    assert_eq!(amounts.iter().sum::<f64>(), 2_500.0);
    assert!(h.ledger.iter().all(|t| t.name_orig == "C0" && t.name_dest == "C1"));
    assert_eq!(h.population.client(0).balance(), 7_500.0);
    assert_eq!(h.population.client(1).balance(), 2_500.0);
}

#[test]
fn transfer_at_exactly_the_limit_is_one_chunk() {
    let mut h = Harness::new(&[(10_000.0, 0.0), (0.0, 0.0)]);
    h.act(0, ActionType::Transfer, LIMIT).unwrap();
    assert_eq!(h.ledger.len(), 1);
    assert_eq!(h.last().amount, LIMIT);
}

#[test]
fn failed_chunk_stops_the_split() {
    let mut h = Harness::new(&[(1_500.0, 0.0), (0.0, 0.0)]);
    h.act(0, ActionType::Transfer, 2_500.0).unwrap();

    assert_eq!(h.ledger.len(), 2, "no chunk may follow a failed one");
    let first = &h.ledger.transactions()[0];
    let second = &h.ledger.transactions()[1];
    assert!(!first.is_failed());
    assert!(second.is_unauthorized_overdraft);
    assert_eq!(second.old_balance_orig, 500.0);
    assert_eq!(second.new_balance_orig, 500.0);
    assert_eq!(second.new_balance_dest, 1_000.0);
    assert_eq!(h.population.client(1).balance(), 1_000.0);
}

#[test]
fn transfer_never_targets_self_and_needs_a_second_client() {
    let mut h = Harness::new(&[(1_000.0, 0.0)]);
    h.act(0, ActionType::Transfer, 100.0).unwrap();
    assert!(h.ledger.is_empty());
    assert_eq!(h.population.client(0).balance(), 1_000.0);
}

#[test]
fn warm_up_transfers_are_never_flagged() {
    let mut h = Harness::new(&[(10_000.0, 0.0), (0.0, 0.0)]);
    h.act(0, ActionType::Transfer, 1_000.0).unwrap();
    h.act(0, ActionType::Debit, 8_500.0).unwrap();
    // Peak is 10 000, balance 500: a huge drop, but only attempt #2.
    h.act(0, ActionType::Transfer, 400.0).unwrap();
    h.act(0, ActionType::Transfer, 50.0).unwrap();

    assert!(h.ledger.iter().all(|t| !t.is_flagged_fraud));
    assert_eq!(h.population.client(0).fraud_bookkeeping().transfer_attempts(), 3);
}

#[test]
fn draining_transfer_is_flagged_and_moves_nothing() {
    let mut h = Harness::new(&[(10_000.0, 0.0), (0.0, 0.0)]);
    for _ in 0..3 {
        h.act(0, ActionType::Transfer, 100.0).unwrap();
    }
    h.act(0, ActionType::Debit, 5_000.0).unwrap();
    assert_eq!(h.population.client(0).balance(), 4_700.0);
    assert!(!h.population.client(0).is_fraud());

    // 10 000 - 4 700 - 500 = 4 800 > 2.5 × 1 000
    h.act(0, ActionType::Transfer, 500.0).unwrap();
    let t = h.last().clone();
    assert!(t.is_flagged_fraud);
    assert!(t.is_fraud);
    assert!(!t.is_unauthorized_overdraft);
    assert!(t.is_failed());
    assert_eq!(t.amount, 500.0);
    assert_eq!(t.old_balance_orig, t.new_balance_orig);
    assert_eq!(t.old_balance_dest, t.new_balance_dest);
    assert_eq!(h.population.client(0).balance(), 4_700.0);
    assert_eq!(h.population.client(1).balance(), 300.0);

    // The label sticks to every later record of this client.
    h.act(0, ActionType::Deposit, 10.0).unwrap();
    assert!(h.last().is_fraud);
    assert!(!h.last().is_flagged_fraud);
    assert!(h.population.client(0).is_fraud());
}

#[test]
fn small_transfer_after_warm_up_is_not_flagged() {
    let mut h = Harness::new(&[(10_000.0, 0.0), (0.0, 0.0)]);
    for _ in 0..3 {
        h.act(0, ActionType::Transfer, 100.0).unwrap();
    }
    // 10 000 - 9 700 - 1 000 = -700
    h.act(0, ActionType::Transfer, 1_000.0).unwrap();
    let t = h.last();
    assert!(!t.is_flagged_fraud);
    assert!(!t.is_fraud);
    assert_eq!(t.new_balance_orig, 8_700.0);
}

#[test]
fn records_carry_step_and_time_labels() {
    let mut h = Harness::new(&[(1_000.0, 0.0)]);
    h.act(0, ActionType::Deposit, 1.0).unwrap();
    let t = h.last();
    assert_eq!(t.step, 5);
    assert!(t.time_label().starts_with("05:"));
}
