#![no_main]

use arbitrary::Arbitrary;
use chronovyan_core::{Debt, ResourceKind, Resources};
use chronovyan_debt::{strategy_for, DebtTracker, StrategyKind, TrackerConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzDebt {
    aethel: bool,
    amount: f64,
    interest_rate: f64,
    age: u8,
    critical: bool,
}

#[derive(Debug, Arbitrary)]
struct Input {
    debts: Vec<FuzzDebt>,
    chronons: f64,
    aethel: f64,
    strategy: u8,
}

fuzz_target!(|input: Input| {
    let kind = StrategyKind::ALL[input.strategy as usize % StrategyKind::ALL.len()];

    let debts: Vec<Debt> = input
        .debts
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let kind = if d.aethel {
                ResourceKind::Aethel
            } else {
                ResourceKind::Chronon
            };
            let mut debt = Debt::new(format!("f{i}"), kind, d.amount)
                .with_interest(d.interest_rate)
                .with_age(d.age as u32);
            debt.is_critical = d.critical;
            debt
        })
        .collect();

    // Planning is pure and must respect the budget for any input
    let budget = Resources::new(input.chronons, input.aethel);
    let plan = strategy_for(kind).plan(&debts, budget);
    let total = plan.total();
    let within = |spent: f64, available: f64| {
        !available.is_finite() || spent <= available.max(0.0) * (1.0 + 1e-9) + 1e-6
    };
    assert!(within(total.chronons, input.chronons));
    assert!(within(total.aethel, input.aethel));

    // Executing against a ledger must never abort or go negative
    let mut tracker = DebtTracker::with_config(TrackerConfig::lenient());
    tracker.ledger_mut().set_chronons(input.chronons.abs().min(1e12));
    tracker.ledger_mut().set_aethel(input.aethel.abs().min(1e12));
    for debt in debts {
        let _ = tracker.add_debt(debt);
    }
    let outcome = tracker.apply_repayment_strategy_detailed(kind);
    assert!(!outcome.aborted);
    assert!(tracker.ledger().chronons() >= 0.0);
    assert!(tracker.ledger().aethel() >= 0.0);
    assert!((0.0..=1.0).contains(&tracker.stability()));
});
