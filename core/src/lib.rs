//! Synthetic, fraud-labelled financial transaction generator.
//!
//! A population of clients, merchants and one bank is stepped through
//! discrete time. Each client draws how many actions it performs, which
//! action and how much, mutates balances through the action handlers and
//! appends labelled records to the run's ledger.

pub mod action;
pub mod actor;
pub mod balances;
pub mod client;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod fraud;
pub mod handlers;
pub mod ledger;
pub mod population;
pub mod profile;
pub mod rng;
pub mod store;
pub mod transaction;
pub mod types;
