//! The population directory: every actor of a run plus counterparty
//! selection.
//!
//! RULE: handlers find counterparties only through `pick_random_merchant`
//! and `pick_random_client_excluding`.

use crate::{
    actor::{Bank, Merchant},
    client::Client,
    config::SimConfig,
    error::{SimError, SimResult},
    rng::SimRng,
};

#[derive(Debug, Clone)]
pub struct Population {
    clients: Vec<Client>,
    merchants: Vec<Merchant>,
    bank: Bank,
}

impl Population {
    pub fn new(clients: Vec<Client>, merchants: Vec<Merchant>, bank: Bank) -> Self {
        Self { clients, merchants, bank }
    }

    /// Build merchants, the bank and all clients from configuration.
    /// Draw order: per client, balance, profile, overdraft limit, fraud label.
    pub fn generate(config: &SimConfig, total_target_count: u64, rng: &mut SimRng) -> SimResult<Self> {
        let params = &config.parameters;

        let merchants = (0..params.nb_merchants)
            .map(|i| Merchant::new(&format!("{i:09}"), 0.0))
            .collect();
        let bank = Bank::new(&format!("{:09}", 0), 0.0);

        let mut clients = Vec::with_capacity(params.nb_clients);
        for i in 0..params.nb_clients {
            let balance = config.initial_balances.pick(rng)?;
            let client = Client::generate(
                &format!("{i:09}"),
                &config.client_profiles,
                balance,
                total_target_count,
                &config.overdraft_limits,
                rng,
            );
            let fraud_prone = rng.chance(params.fraud_probability);
            clients.push(client.with_fraud_label(fraud_prone));
        }

        log::info!(
            "population: {} clients, {} merchants, total target count {total_target_count}",
            clients.len(),
            params.nb_merchants,
        );

        Ok(Self::new(clients, merchants, bank))
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn merchants(&self) -> &[Merchant] {
        &self.merchants
    }

    pub fn client(&self, index: usize) -> &Client {
        &self.clients[index]
    }

    pub(crate) fn client_mut(&mut self, index: usize) -> &mut Client {
        &mut self.clients[index]
    }

    pub fn merchant(&self, index: usize) -> &Merchant {
        &self.merchants[index]
    }

    pub(crate) fn merchant_mut(&mut self, index: usize) -> &mut Merchant {
        &mut self.merchants[index]
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn client_by_name(&self, name: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.name() == name)
    }

    pub fn pick_random_merchant(&self, rng: &mut SimRng) -> SimResult<usize> {
        if self.merchants.is_empty() {
            return Err(SimError::NoCounterparty { kind: "merchant" });
        }
        Ok(rng.next_u64_below(self.merchants.len() as u64) as usize)
    }

    /// A uniformly chosen client other than `exclude`, or None when the
    /// population has no other client.
    pub fn pick_random_client_excluding(&self, rng: &mut SimRng, exclude: usize) -> Option<usize> {
        let n = self.clients.len();
        if n < 2 {
            return None;
        }
        let pick = rng.next_u64_below(n as u64 - 1) as usize;
        Some(if pick >= exclude { pick + 1 } else { pick })
    }

    /// Mutable access to two distinct clients.
    pub(crate) fn client_pair_mut(&mut self, a: usize, b: usize) -> (&mut Client, &mut Client) {
        assert_ne!(a, b, "client_pair_mut needs two distinct clients");
        if a < b {
            let (left, right) = self.clients.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.clients.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        action::ActionType,
        profile::{ClientActionProfile, ClientProfile},
        rng::{RngBank, RngSlot},
    };

    fn client(name: &str) -> Client {
        let profiles = [ClientActionProfile {
            action: ActionType::Debit,
            min_count: 1,
            max_count: 1,
            avg_amount: 10.0,
            std_amount: 1.0,
        }];
        let profile = ClientProfile::from_parts(&profiles, &[(ActionType::Debit, 1.0)], 1);
        Client::new(name, profile, 100.0, 0.0, 0.1)
    }

    #[test]
    fn excluded_client_is_never_picked() {
        let pop = Population::new(
            (0..5).map(|i| client(&i.to_string())).collect(),
            vec![Merchant::new("0", 0.0)],
            Bank::new("0", 0.0),
        );
        let mut rng = RngBank::new(5).for_slot(RngSlot::Behaviour);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let pick = pop.pick_random_client_excluding(&mut rng, 2).unwrap();
            assert_ne!(pick, 2);
            seen[pick] = true;
        }
        assert_eq!(seen, [true, true, false, true, true]);
    }

    #[test]
    fn lone_client_has_no_transfer_counterparty() {
        let pop = Population::new(vec![client("0")], vec![], Bank::new("0", 0.0));
        let mut rng = RngBank::new(5).for_slot(RngSlot::Behaviour);
        assert!(pop.pick_random_client_excluding(&mut rng, 0).is_none());
        assert!(pop.pick_random_merchant(&mut rng).is_err());
    }

    #[test]
    fn pair_access_returns_requested_order() {
        let mut pop = Population::new(
            vec![client("0"), client("1"), client("2")],
            vec![],
            Bank::new("0", 0.0),
        );
        let (a, b) = pop.client_pair_mut(2, 0);
        assert_eq!(a.name(), "C2");
        assert_eq!(b.name(), "C0");
    }
}
