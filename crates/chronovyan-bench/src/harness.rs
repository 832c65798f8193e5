//! Strategy benchmark harness
//!
//! Runs every repayment strategy against an identical starting state and
//! ranks them by a weighted score:
//!
//! ```text
//! score = 0.5 · improvement + 0.3 · efficiency + 0.2 · debts_fully_paid
//! ```

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chronovyan_core::{ChronovyanResult, Debt, DebtBook};
use chronovyan_debt::{DebtTracker, RepaymentOutcome, StrategyKind, TrackerConfig, TrackerSnapshot};

use crate::{GeneratedScenario, Scenario};

const IMPROVEMENT_WEIGHT: f64 = 0.5;
const EFFICIENCY_WEIGHT: f64 = 0.3;
const FULLY_PAID_WEIGHT: f64 = 0.2;

/// Outcome of benchmarking one strategy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub strategy: StrategyKind,
    pub initial_stability: f64,
    pub final_stability: f64,
    pub stability_improvement: f64,
    /// Chronons plus aethel spent
    pub resources_used: f64,
    /// Improvement per resource spent
    pub efficiency: f64,
    pub duration: Duration,
    pub debts_fully_paid: usize,
    pub debts_partially_paid: usize,
    pub debts_unpaid: usize,
    /// Set when the repayment pass was aborted; the run then reports no
    /// stability change even if some steps were applied
    pub error: Option<String>,
}

impl BenchmarkResult {
    /// Weighted ranking score
    pub fn score(&self) -> f64 {
        IMPROVEMENT_WEIGHT * self.stability_improvement
            + EFFICIENCY_WEIGHT * self.efficiency
            + FULLY_PAID_WEIGHT * self.debts_fully_paid as f64
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Equal in everything but wall-clock duration
    pub fn same_outcome(&self, other: &BenchmarkResult) -> bool {
        BenchmarkResult {
            duration: Duration::ZERO,
            ..self.clone()
        } == BenchmarkResult {
            duration: Duration::ZERO,
            ..other.clone()
        }
    }
}

/// Fully, partially and un-paid debt counts between two books
fn payment_counts(before: &DebtBook, after: &DebtBook) -> (usize, usize, usize) {
    let mut fully = 0;
    let mut partially = 0;
    let mut unpaid = 0;
    for debt in before {
        match after.get(&debt.id) {
            None => fully += 1,
            Some(remaining) if remaining.amount < debt.amount => partially += 1,
            Some(_) => unpaid += 1,
        }
    }
    (fully, partially, unpaid)
}

/// Benchmark one strategy on a tracker, leaving the tracker in its post-run state
fn run_on(tracker: &mut DebtTracker, kind: StrategyKind) -> BenchmarkResult {
    run_pass(tracker, kind, |tracker, kind| {
        tracker.apply_repayment_strategy_detailed(kind)
    })
}

fn run_pass<F>(tracker: &mut DebtTracker, kind: StrategyKind, pass: F) -> BenchmarkResult
where
    F: FnOnce(&mut DebtTracker, StrategyKind) -> RepaymentOutcome,
{
    let initial_stability = tracker.stability();
    let book_before = tracker.book().snapshot();

    let start = Instant::now();
    let outcome = pass(tracker, kind);
    let duration = start.elapsed();

    let (debts_fully_paid, debts_partially_paid, debts_unpaid) =
        payment_counts(&book_before, tracker.book());
    let final_stability = tracker.stability();

    let mut result = BenchmarkResult {
        strategy: kind,
        initial_stability,
        final_stability,
        stability_improvement: final_stability - initial_stability,
        resources_used: outcome.total_repaid(),
        efficiency: 0.0,
        duration,
        debts_fully_paid,
        debts_partially_paid,
        debts_unpaid,
        error: None,
    };

    if outcome.aborted {
        warn!(strategy = %kind, "Benchmark run aborted");
        result.final_stability = initial_stability;
        result.stability_improvement = 0.0;
        result.error = Some(format!(
            "{} aborted after {} steps",
            kind, outcome.steps_applied
        ));
    } else if result.resources_used > 0.0 {
        result.efficiency = result.stability_improvement / result.resources_used;
    }
    result
}

/// Best strategy by score; ties go to the earlier strategy
pub fn optimal_strategy(results: &[BenchmarkResult]) -> Option<StrategyKind> {
    let mut best: Option<&BenchmarkResult> = None;
    for result in results {
        match best {
            Some(current) if result.score() <= current.score() => {}
            _ => best = Some(result),
        }
    }
    best.map(|r| r.strategy)
}

/// Strategy benchmark harness
pub struct DebtBenchmark {
    tracker: DebtTracker,
    scenario: Option<String>,
}

impl DebtBenchmark {
    /// Create a new benchmark with default tracker configuration
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    /// Create a new benchmark with custom tracker configuration
    pub fn with_config(config: TrackerConfig) -> Self {
        DebtBenchmark {
            tracker: DebtTracker::with_config(config),
            scenario: None,
        }
    }

    pub fn tracker(&self) -> &DebtTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DebtTracker {
        &mut self.tracker
    }

    /// Name of the loaded standard scenario
    pub fn scenario(&self) -> Option<&str> {
        self.scenario.as_deref()
    }

    /// Load a standard scenario; returns false for unknown names
    pub fn setup_standard_scenario(&mut self, name: &str) -> bool {
        match self.load_scenario(name) {
            Ok(()) => true,
            Err(err) => {
                warn!(scenario = name, error = %err, "Scenario setup failed");
                false
            }
        }
    }

    /// Load a standard scenario by name
    pub fn load_scenario(&mut self, name: &str) -> ChronovyanResult<()> {
        let scenario = Scenario::find(name)?;
        scenario.install(&mut self.tracker)?;
        self.scenario = Some(scenario.name.to_string());
        info!(
            scenario = scenario.name,
            debts = self.tracker.all_debts().len(),
            "Loaded scenario"
        );
        Ok(())
    }

    /// Load a generated scenario
    pub fn load_generated(&mut self, scenario: &GeneratedScenario) -> ChronovyanResult<()> {
        scenario.install(&mut self.tracker)?;
        self.scenario = None;
        Ok(())
    }

    /// Add a single debt to the benchmark state
    pub fn add_debt(&mut self, debt: Debt) -> ChronovyanResult<()> {
        self.tracker.add_debt(debt)
    }

    /// Clear debts
    pub fn clear_debts(&mut self) {
        self.tracker.clear_all_debts();
        self.scenario = None;
    }

    pub fn set_available_resources(&mut self, chronons: f64, aethel: f64) {
        self.tracker.ledger_mut().set_chronons(chronons);
        self.tracker.ledger_mut().set_aethel(aethel);
    }

    /// Benchmark one strategy against the current state
    ///
    /// The state is left as the strategy left it.
    pub fn run_strategy_benchmark(&mut self, kind: StrategyKind) -> BenchmarkResult {
        logged(run_on(&mut self.tracker, kind))
    }

    /// Benchmark every strategy from the same starting state
    ///
    /// The starting state is restored afterwards.
    pub fn run_all_strategies(&mut self) -> Vec<BenchmarkResult> {
        self.run_all_with(|tracker, kind| tracker.apply_repayment_strategy_detailed(kind))
    }

    /// Run `pass` once per strategy, each from the same starting state
    pub(crate) fn run_all_with<F>(&mut self, pass: F) -> Vec<BenchmarkResult>
    where
        F: Fn(&mut DebtTracker, StrategyKind) -> RepaymentOutcome,
    {
        let initial = self.tracker.snapshot();
        let results = StrategyKind::ALL
            .iter()
            .map(|&kind| {
                self.tracker.restore(initial.clone());
                logged(run_pass(&mut self.tracker, kind, &pass))
            })
            .collect();
        self.tracker.restore(initial);
        results
    }

    /// Benchmark every strategy in parallel, each on its own copy of the state
    pub fn run_all_strategies_parallel(&self) -> Vec<BenchmarkResult> {
        let initial: TrackerSnapshot = self.tracker.snapshot();
        let config = self.tracker.config().clone();

        StrategyKind::ALL
            .par_iter()
            .map(|&kind| {
                let mut tracker = DebtTracker::from_snapshot(config.clone(), initial.clone());
                run_on(&mut tracker, kind)
            })
            .collect()
    }

    /// Run every strategy and pick the best
    pub fn find_optimal_strategy(&mut self) -> Option<StrategyKind> {
        optimal_strategy(&self.run_all_strategies())
    }

    /// Score difference between two strategies on the current state
    ///
    /// Positive when `a` beats `b`. The state is restored afterwards.
    pub fn compare_strategies(&mut self, a: StrategyKind, b: StrategyKind) -> f64 {
        let initial = self.tracker.snapshot();
        let first = self.run_strategy_benchmark(a);
        self.tracker.restore(initial.clone());
        let second = self.run_strategy_benchmark(b);
        self.tracker.restore(initial);
        first.score() - second.score()
    }
}

fn logged(result: BenchmarkResult) -> BenchmarkResult {
    info!(
        strategy = %result.strategy,
        improvement = result.stability_improvement,
        resources = result.resources_used,
        "Benchmarked strategy"
    );
    result
}

impl Default for DebtBenchmark {
    fn default() -> Self {
        Self::new()
    }
}
