//! sim-runner: headless runner for the transaction generator.
//!
//! Usage:
//!   sim-runner --seed 12345 --data-dir ./data --output transactions.csv
//!   sim-runner --seed 12345 --steps 48 --db run.db

use anyhow::{Context, Result};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use txnsim_core::{action::ActionType, engine::SimEngine, store::SimStore};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let steps: Option<u64> = args
        .windows(2)
        .find(|w| w[0] == "--steps")
        .and_then(|w| w[1].parse().ok());
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let output = string_arg(&args, "--output").unwrap_or("transactions.csv");

    println!("txnsim sim-runner");
    println!("  seed:      {seed}");
    println!("  data_dir:  {data_dir}");
    println!("  db:        {db}");
    println!("  output:    {output}");
    println!();

    let store = if db == ":memory:" {
        SimStore::in_memory()?
    } else {
        SimStore::open(db)?
    };
    store.migrate()?;

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4().simple());
    let mut engine = SimEngine::build(run_id.clone(), seed, store, data_dir)?;

    match steps {
        Some(n) => engine.run_steps(n)?,
        None => engine.run()?,
    };

    let file = File::create(output).with_context(|| format!("Cannot create {output}"))?;
    engine.ledger().write_csv(BufWriter::new(file))?;
    log::info!("wrote {} transactions to {output}", engine.ledger().len());

    print_summary(&engine)?;
    Ok(())
}

fn print_summary(engine: &SimEngine) -> Result<()> {
    let summary = engine.ledger().summary();
    let stored = engine.store.txn_count_total(&engine.run_id)?;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:           {}", engine.run_id);
    println!("  steps run:        {}", engine.clock.steps_run());
    println!("  clients:          {}", engine.population().clients().len());
    println!("  merchants:        {}", engine.population().merchants().len());
    println!("  transactions:     {} ({stored} stored)", summary.total);
    println!("  fraud-labelled:   {}", summary.fraud);
    println!("  flagged fraud:    {}", summary.flagged_fraud);
    println!("  overdraft refused:{:>5}", summary.unauthorized_overdraft);
    println!("  failed:           {}", summary.failed);

    println!();
    println!("=== PER ACTION ===");
    for action in ActionType::ALL {
        if let Some(totals) = summary.per_action.get(&action) {
            println!(
                "  {:<9} | count: {:>7} | volume: {:>16.2}",
                action.as_str(),
                totals.count,
                totals.volume
            );
        }
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
