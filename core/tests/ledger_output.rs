//! The comma-separated ledger output and its summary.

use txnsim_core::{
    action::ActionType,
    engine::SimEngine,
    ledger::Ledger,
    rng::{RngBank, RngSlot},
    transaction::{Leg, Transaction, OUTPUT_HEADER},
};

fn leg(name: &str, old_balance: f64, new_balance: f64) -> Leg {
    Leg { name: name.to_string(), old_balance, new_balance }
}

#[test]
fn csv_has_header_and_one_row_per_record() {
    let mut engine = SimEngine::build_test("csv".into(), 21).unwrap();
    engine.run_steps(6).unwrap();

    let mut out = Vec::new();
    engine.ledger().write_csv(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], OUTPUT_HEADER.join(","));
    assert_eq!(lines.len(), engine.ledger().len() + 1);
    for line in &lines[1..] {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), OUTPUT_HEADER.len(), "bad row: {line}");
        assert!(ActionType::ALL.iter().any(|a| a.as_str() == fields[1]), "bad action: {line}");
        for flag in &fields[11..] {
            assert!(*flag == "0" || *flag == "1", "bad flag: {line}");
        }
    }
}

#[test]
fn row_renders_every_field_in_order() {
    let mut labels = RngBank::new(3).for_slot(RngSlot::Labels);
    let t = Transaction::new(
        30,
        ActionType::Payment,
        19.999,
        leg("C000000001", 100.0, 80.001),
        leg("M000000002", 0.0, 19.999),
        &mut labels,
    )
    .with_fraud(true);

    let fields = t.fields();
    assert_eq!(fields[0], "30");
    assert_eq!(fields[1], "PAYMENT");
    assert_eq!(fields[2], "20.00");
    assert_eq!(fields[3], "C000000001");
    assert!(["Paris", "New York", "Berlin", "Hamburg"].contains(&fields[4].as_str()));
    assert!(fields[5].starts_with("07:"), "30 mod 23 = 7, got {}", fields[5]);
    assert_eq!(fields[6], "100.00");
    assert_eq!(fields[7], "80.00");
    assert_eq!(fields[8], "M000000002");
    assert_eq!(fields[9], "0.00");
    assert_eq!(fields[10], "20.00");
    assert_eq!(&fields[11..], &["1", "0", "0"]);
    assert_eq!(t.to_string(), fields.join(","));
}

#[test]
fn summary_counts_labels_and_volume() {
    let mut labels = RngBank::new(4).for_slot(RngSlot::Labels);
    let mut ledger = Ledger::new();
    ledger.record(Transaction::new(0, ActionType::Debit, 10.0, leg("C1", 5.0, 5.0), leg("B0", 0.0, 0.0), &mut labels)
        .with_unauthorized_overdraft(true));
    ledger.record(Transaction::new(0, ActionType::Transfer, 40.0, leg("C1", 5.0, 5.0), leg("C2", 0.0, 0.0), &mut labels)
        .with_flagged_fraud(true)
        .with_fraud(true));
    ledger.record(Transaction::new(1, ActionType::Transfer, 2.5, leg("C2", 3.0, 0.5), leg("C1", 5.0, 7.5), &mut labels));

    let summary = ledger.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.fraud, 1);
    assert_eq!(summary.flagged_fraud, 1);
    assert_eq!(summary.unauthorized_overdraft, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.per_action[&ActionType::Transfer].count, 2);
    assert_eq!(summary.per_action[&ActionType::Transfer].volume, 42.5);
    assert_eq!(summary.per_action[&ActionType::Debit].count, 1);
    assert!(!summary.per_action.contains_key(&ActionType::CashIn));

    assert_eq!(ledger.since(2).len(), 1);
    assert!(ledger.since(10).is_empty());
}
