//! Action handlers.
//!
//! Every handler follows the same shape: pick the counterparty, capture
//! both old balances, mutate, capture both new balances, then append one
//! fully labelled Transaction to the ledger.
//!
//! Withdrawals follow the refuse policy everywhere: an unauthorized
//! overdraft leaves the client's balance unchanged and is only a label.

use crate::{
    action::ActionType,
    client::StepContext,
    error::SimResult,
    population::Population,
    transaction::{Leg, Transaction},
};

/// Dispatch one action for the client at `client`.
pub fn execute(
    population: &mut Population,
    client: usize,
    action: ActionType,
    amount: f64,
    ctx: &mut StepContext<'_>,
) -> SimResult<()> {
    match action {
        ActionType::CashIn   => cash_in(population, client, amount, ctx),
        ActionType::CashOut  => cash_out(population, client, amount, ctx),
        ActionType::Debit    => debit(population, client, amount, ctx),
        ActionType::Payment  => payment(population, client, amount, ctx),
        ActionType::Transfer => transfer(population, client, amount, ctx),
        ActionType::Deposit  => deposit(population, client, amount, ctx),
    }
}

/// Client and merchant are both credited.
fn cash_in(population: &mut Population, client: usize, amount: f64, ctx: &mut StepContext<'_>) -> SimResult<()> {
    let merchant = population.pick_random_merchant(ctx.rng)?;
    let old_orig = population.client(client).balance();
    let old_dest = population.merchant(merchant).balance();

    population.client_mut(client).deposit(amount);
    population.merchant_mut(merchant).deposit(amount);

    let orig = population.client(client);
    let dest = population.merchant(merchant);
    let t = Transaction::new(
        ctx.step,
        ActionType::CashIn,
        amount,
        Leg { name: orig.name().to_string(), old_balance: old_orig, new_balance: orig.balance() },
        Leg { name: dest.name().to_string(), old_balance: old_dest, new_balance: dest.balance() },
        ctx.labels,
    )
    .with_fraud(orig.is_fraud());
    ctx.ledger.record(t);
    Ok(())
}

/// Merchant is recorded as destination only.
fn cash_out(population: &mut Population, client: usize, amount: f64, ctx: &mut StepContext<'_>) -> SimResult<()> {
    let merchant = population.pick_random_merchant(ctx.rng)?;
    let old_orig = population.client(client).balance();
    let old_dest = population.merchant(merchant).balance();

    let unauthorized = population.client_mut(client).withdraw(amount);

    let orig = population.client(client);
    let dest = population.merchant(merchant);
    let t = Transaction::new(
        ctx.step,
        ActionType::CashOut,
        amount,
        Leg { name: orig.name().to_string(), old_balance: old_orig, new_balance: orig.balance() },
        Leg { name: dest.name().to_string(), old_balance: old_dest, new_balance: dest.balance() },
        ctx.labels,
    )
    .with_unauthorized_overdraft(unauthorized)
    .with_fraud(orig.is_fraud());
    ctx.ledger.record(t);
    Ok(())
}

fn debit(population: &mut Population, client: usize, amount: f64, ctx: &mut StepContext<'_>) -> SimResult<()> {
    let old_orig = population.client(client).balance();
    let old_dest = population.bank().balance();

    let unauthorized = population.client_mut(client).withdraw(amount);

    let orig = population.client(client);
    let bank = population.bank();
    let t = Transaction::new(
        ctx.step,
        ActionType::Debit,
        amount,
        Leg { name: orig.name().to_string(), old_balance: old_orig, new_balance: orig.balance() },
        Leg { name: bank.name().to_string(), old_balance: old_dest, new_balance: bank.balance() },
        ctx.labels,
    )
    .with_unauthorized_overdraft(unauthorized)
    .with_fraud(orig.is_fraud());
    ctx.ledger.record(t);
    Ok(())
}

/// The merchant is credited only when the withdrawal was authorized.
fn payment(population: &mut Population, client: usize, amount: f64, ctx: &mut StepContext<'_>) -> SimResult<()> {
    let merchant = population.pick_random_merchant(ctx.rng)?;
    let old_orig = population.client(client).balance();
    let old_dest = population.merchant(merchant).balance();

    let unauthorized = population.client_mut(client).withdraw(amount);
    if !unauthorized {
        population.merchant_mut(merchant).deposit(amount);
    }

    let orig = population.client(client);
    let dest = population.merchant(merchant);
    let t = Transaction::new(
        ctx.step,
        ActionType::Payment,
        amount,
        Leg { name: orig.name().to_string(), old_balance: old_orig, new_balance: orig.balance() },
        Leg { name: dest.name().to_string(), old_balance: old_dest, new_balance: dest.balance() },
        ctx.labels,
    )
    .with_unauthorized_overdraft(unauthorized)
    .with_fraud(orig.is_fraud());
    ctx.ledger.record(t);
    Ok(())
}

/// The bank is recorded as source; its balance is untouched.
fn deposit(population: &mut Population, client: usize, amount: f64, ctx: &mut StepContext<'_>) -> SimResult<()> {
    let old_orig = population.client(client).balance();
    let old_dest = population.bank().balance();

    population.client_mut(client).deposit(amount);

    let orig = population.client(client);
    let bank = population.bank();
    let t = Transaction::new(
        ctx.step,
        ActionType::Deposit,
        amount,
        Leg { name: orig.name().to_string(), old_balance: old_orig, new_balance: orig.balance() },
        Leg { name: bank.name().to_string(), old_balance: old_dest, new_balance: bank.balance() },
        ctx.labels,
    )
    .with_fraud(orig.is_fraud());
    ctx.ledger.record(t);
    Ok(())
}

/// Split `amount` into transfer-limit chunks and submit them to one
/// counterparty until a chunk fails.
fn transfer(population: &mut Population, client: usize, amount: f64, ctx: &mut StepContext<'_>) -> SimResult<()> {
    let Some(counterparty) = population.pick_random_client_excluding(ctx.rng, client) else {
        log::warn!(
            "step={} transfer of {amount:.2} by {} skipped: no other client",
            ctx.step,
            population.client(client).name()
        );
        return Ok(());
    };

    let limit = ctx.transfer_limit;
    let mut remaining = amount;
    let mut last_failed = false;
    while remaining > limit && !last_failed {
        last_failed = transfer_chunk(population, client, counterparty, limit, ctx);
        remaining -= limit;
    }
    if remaining > 0.0 && !last_failed {
        transfer_chunk(population, client, counterparty, remaining, ctx);
    }
    Ok(())
}

/// One transfer attempt. Returns true when the attempt failed, either
/// flagged as fraud or refused as an unauthorized overdraft.
fn transfer_chunk(
    population: &mut Population,
    client: usize,
    counterparty: usize,
    amount: f64,
    ctx: &mut StepContext<'_>,
) -> bool {
    let limit = ctx.transfer_limit;
    let (orig, dest) = population.client_pair_mut(client, counterparty);
    let old_orig = orig.balance();
    let old_dest = dest.balance();

    let flagged = orig.assess_transfer(amount, limit);
    let unauthorized = if flagged {
        false
    } else {
        let refused = orig.withdraw(amount);
        if !refused {
            dest.deposit(amount);
        }
        refused
    };

    let t = Transaction::new(
        ctx.step,
        ActionType::Transfer,
        amount,
        Leg { name: orig.name().to_string(), old_balance: old_orig, new_balance: orig.balance() },
        Leg { name: dest.name().to_string(), old_balance: old_dest, new_balance: dest.balance() },
        ctx.labels,
    )
    .with_flagged_fraud(flagged)
    .with_unauthorized_overdraft(unauthorized)
    .with_fraud(orig.is_fraud());

    if flagged {
        log::debug!("step={} transfer {amount:.2} from {} flagged", ctx.step, orig.name());
    }
    ctx.ledger.record(t);
    flagged || unauthorized
}
