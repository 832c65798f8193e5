//! Standard benchmark scenarios
//!
//! Each fixture debt carries both a chronon and an aethel component. It is
//! installed as two single-kind debts, `<id>-c` and `<id>-a`.

use chronovyan_core::{ChronovyanError, ChronovyanResult, Debt, DebtId, ResourceKind};
use chronovyan_debt::{DebtTracker, StabilityModel};

/// A two-component fixture debt
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixtureDebt {
    pub id: &'static str,
    pub chronons: f64,
    pub aethel: f64,
    pub interest_rate: f64,
    pub age_in_cycles: u32,
    pub is_critical: bool,
}

const fn fixture(
    id: &'static str,
    chronons: f64,
    aethel: f64,
    interest_rate: f64,
    age_in_cycles: u32,
    is_critical: bool,
) -> FixtureDebt {
    FixtureDebt {
        id,
        chronons,
        aethel,
        interest_rate,
        age_in_cycles,
        is_critical,
    }
}

impl FixtureDebt {
    /// Split into single-kind debts, skipping empty components
    pub fn split(&self) -> Vec<Debt> {
        let base = DebtId::new(self.id);
        [
            (ResourceKind::Chronon, "c", self.chronons),
            (ResourceKind::Aethel, "a", self.aethel),
        ]
        .into_iter()
        .filter(|(_, _, amount)| *amount > 0.0)
        .map(|(kind, suffix, amount)| {
            let mut debt = Debt::new(base.component(suffix), kind, amount)
                .with_interest(self.interest_rate)
                .with_age(self.age_in_cycles);
            debt.is_critical = self.is_critical;
            debt
        })
        .collect()
    }
}

/// A named debt and resource configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub debts: &'static [FixtureDebt],
    pub chronons: f64,
    pub aethel: f64,
}

impl Scenario {
    /// Look up a standard scenario by name
    pub fn find(name: &str) -> ChronovyanResult<&'static Scenario> {
        let name = match name {
            "critical" => "critical_heavy",
            other => other,
        };
        STANDARD_SCENARIOS
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ChronovyanError::UnknownScenario(name.to_string()))
    }

    /// Names of every standard scenario
    pub fn names() -> impl Iterator<Item = &'static str> {
        STANDARD_SCENARIOS.iter().map(|s| s.name)
    }

    /// Single-kind debts in fixture order
    pub fn debts(&self) -> Vec<Debt> {
        self.debts.iter().flat_map(FixtureDebt::split).collect()
    }

    pub fn total_debt(&self) -> f64 {
        self.debts.iter().map(|d| d.chronons + d.aethel).sum()
    }

    /// Replace the tracker's debts and resources with this scenario
    pub fn install(&self, tracker: &mut DebtTracker) -> ChronovyanResult<()> {
        install(tracker, self.debts(), self.chronons, self.aethel)
    }
}

/// Reset a tracker to the given debts and balances
///
/// Stability is seeded from the debt load against the tracker's limit.
pub(crate) fn install(
    tracker: &mut DebtTracker,
    debts: Vec<Debt>,
    chronons: f64,
    aethel: f64,
) -> ChronovyanResult<()> {
    tracker.clear_all_debts();
    for debt in debts {
        tracker.add_debt(debt)?;
    }
    tracker.ledger_mut().set_chronons(chronons);
    tracker.ledger_mut().set_aethel(aethel);

    let baseline = StabilityModel::baseline(tracker.book().total(), tracker.config().debt_limit);
    tracker.set_stability(baseline);
    Ok(())
}

const BALANCED: [FixtureDebt; 5] = [
    fixture("op1", 80.0, 20.0, 0.05, 5, false),
    fixture("op2", 150.0, 50.0, 0.07, 3, true),
    fixture("op3", 100.0, 50.0, 0.03, 8, false),
    fixture("op4", 200.0, 100.0, 0.09, 2, true),
    fixture("op5", 120.0, 130.0, 0.06, 4, false),
];

const CRITICAL_HEAVY: [FixtureDebt; 5] = [
    fixture("op1", 100.0, 50.0, 0.08, 3, true),
    fixture("op2", 150.0, 50.0, 0.09, 2, true),
    fixture("op3", 200.0, 50.0, 0.07, 4, true),
    fixture("op4", 80.0, 20.0, 0.04, 7, false),
    fixture("op5", 90.0, 30.0, 0.05, 6, false),
];

const HIGH_INTEREST: [FixtureDebt; 5] = [
    fixture("op1", 80.0, 20.0, 0.03, 6, false),
    fixture("op2", 100.0, 50.0, 0.12, 4, false),
    fixture("op3", 150.0, 50.0, 0.08, 5, true),
    fixture("op4", 90.0, 30.0, 0.15, 3, false),
    fixture("op5", 120.0, 60.0, 0.06, 7, true),
];

const MIXED_AGE: [FixtureDebt; 5] = [
    fixture("op1", 80.0, 20.0, 0.05, 10, false),
    fixture("op2", 100.0, 50.0, 0.07, 7, false),
    fixture("op3", 150.0, 50.0, 0.06, 4, false),
    fixture("op4", 90.0, 30.0, 0.08, 2, true),
    fixture("op5", 120.0, 60.0, 0.09, 1, true),
];

const RESOURCE_LIMITED: [FixtureDebt; 7] = [
    fixture("op1", 100.0, 50.0, 0.06, 5, false),
    fixture("op2", 150.0, 50.0, 0.08, 4, true),
    fixture("op3", 200.0, 50.0, 0.05, 6, false),
    fixture("op4", 200.0, 100.0, 0.09, 3, true),
    fixture("op5", 120.0, 60.0, 0.07, 5, false),
    fixture("op6", 160.0, 60.0, 0.08, 4, true),
    fixture("op7", 180.0, 90.0, 0.06, 5, false),
];

/// Every standard scenario, in report order
pub static STANDARD_SCENARIOS: [Scenario; 5] = [
    Scenario {
        name: "balanced",
        description: "Mix of debts with varied characteristics",
        debts: &BALANCED,
        chronons: 400.0,
        aethel: 200.0,
    },
    Scenario {
        name: "critical_heavy",
        description: "Many critical debts competing for resources",
        debts: &CRITICAL_HEAVY,
        chronons: 350.0,
        aethel: 120.0,
    },
    Scenario {
        name: "high_interest",
        description: "Debts with widely varying interest rates",
        debts: &HIGH_INTEREST,
        chronons: 300.0,
        aethel: 150.0,
    },
    Scenario {
        name: "mixed_age",
        description: "Debts of very different ages",
        debts: &MIXED_AGE,
        chronons: 320.0,
        aethel: 130.0,
    },
    Scenario {
        name: "resource_limited",
        description: "Large debt load with scarce resources",
        debts: &RESOURCE_LIMITED,
        chronons: 500.0,
        aethel: 200.0,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_scenarios() {
        for name in Scenario::names() {
            assert_eq!(Scenario::find(name).unwrap().name, name);
        }
        assert_eq!(Scenario::find("critical").unwrap().name, "critical_heavy");
        assert_eq!(
            Scenario::find("nonexistent"),
            Err(ChronovyanError::UnknownScenario("nonexistent".to_string()))
        );
    }

    #[test]
    fn test_split_components() {
        let debts = Scenario::find("balanced").unwrap().debts();
        assert_eq!(debts.len(), 10);
        assert_eq!(debts[0].id.as_str(), "op1-c");
        assert_eq!(debts[0].kind, ResourceKind::Chronon);
        assert_eq!(debts[1].id.as_str(), "op1-a");
        assert_eq!(debts[1].amount, 20.0);
        assert!(debts[2].is_critical && debts[3].is_critical);
    }

    #[test]
    fn test_install_seeds_baseline() {
        let scenario = Scenario::find("resource_limited").unwrap();
        let mut tracker = DebtTracker::new();
        tracker.set_stability(0.1);
        scenario.install(&mut tracker).unwrap();

        assert_eq!(tracker.all_debts().len(), 14);
        assert_eq!(tracker.ledger().chronons(), 500.0);
        assert_eq!(tracker.ledger().aethel(), 200.0);
        assert!((tracker.book().total() - scenario.total_debt()).abs() < 1e-9);
        let expected = StabilityModel::baseline(1570.0, tracker.config().debt_limit);
        assert!((tracker.stability() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_every_scenario_fits_default_limit() {
        for scenario in &STANDARD_SCENARIOS {
            let mut tracker = DebtTracker::new();
            assert!(scenario.install(&mut tracker).is_ok(), "{}", scenario.name);
        }
    }
}
