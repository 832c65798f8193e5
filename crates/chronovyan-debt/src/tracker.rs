//! Debt tracker - owns the ledger and the debt book and executes repayment
//!
//! A repayment pass reads the ledger balances as its budget, asks the
//! strategy for a plan, and applies it step by step: each step first spends
//! from the ledger, then pays down the debt. Settled debts are evicted and
//! the stability delta is folded into the tracker's stability.
//!
//! A failing step aborts the rest of the plan. The pass still reports the
//! partial result; it never panics or propagates the error.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chronovyan_core::{
    ChronovyanError, ChronovyanResult, Debt, DebtBook, DebtId, OperationType, ParadoxRiskModel,
    ResourceKind, ResourceLedger, Resources, RiskCoefficients,
};

use crate::{
    strategy_for, AlertHub, AlertLevel, AlertThresholds, DebtAlert, DebtFigures, MinimumPayments,
    RepaymentPlan, RepaymentStrategy, StabilityModel, StabilityWeights, StrategyKind,
    DEFAULT_MAX_ALERT_HISTORY,
};

/// Debts at or below this balance count as small for strategy recommendation
const SMALL_DEBT_THRESHOLD: f64 = 50.0;

/// Resources below this share of outstanding debt count as scarce
const SCARCE_RESOURCE_SHARE: f64 = 0.2;

/// One kind dominates when its debt exceeds the other by this factor
const DOMINANCE_FACTOR: f64 = 2.0;

// Terms for debt incurred by operations
const BASE_INTEREST_RATE: f64 = 0.05;
const AMOUNT_RATE_SCALE: f64 = 10_000.0;
const AMOUNT_RATE_CAP: f64 = 0.05;
const CRITICAL_RATE_PREMIUM: f64 = 0.02;
const SEVERITY_RATE_STEP: f64 = 0.01;
const REPEAT_RATE_STEP: f64 = 0.005;
const BASE_TERM_CYCLES: f64 = 10.0;
const AMOUNT_PER_TERM_CYCLE: f64 = 100.0;
const CRITICAL_TERM_CUT: f64 = 3.0;

/// Per-cycle interest rate for debt incurred by `count` runs of `operation`
///
/// Larger balances, critical debts, severe operations and repetition all
/// raise the rate. The balance contribution is capped.
pub fn incurred_interest_rate(
    amount: f64,
    critical: bool,
    operation: OperationType,
    count: u32,
) -> f64 {
    let severity = f64::from(operation.severity());
    let critical_premium = if critical { CRITICAL_RATE_PREMIUM } else { 0.0 };
    BASE_INTEREST_RATE
        + (amount / AMOUNT_RATE_SCALE).clamp(0.0, AMOUNT_RATE_CAP)
        + critical_premium
        + SEVERITY_RATE_STEP * severity
        + REPEAT_RATE_STEP * severity * f64::from(count.saturating_sub(1))
}

/// Cycles until debt incurred by `operation` falls due, at least one
///
/// Larger balances get longer terms; critical debts and severe operations
/// shorter ones.
pub fn incurred_term(amount: f64, critical: bool, operation: OperationType) -> u64 {
    let critical_cut = if critical { CRITICAL_TERM_CUT } else { 0.0 };
    let term = BASE_TERM_CYCLES + (amount / AMOUNT_PER_TERM_CYCLE).floor()
        - critical_cut
        - f64::from(operation.severity());
    term.max(1.0) as u64
}

/// Tracker configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum total outstanding debt
    pub debt_limit: f64,
    /// Debts at or below this balance are evicted as settled
    pub settle_epsilon: f64,
    /// Installment fraction for minimum payments
    pub min_payment_fraction: f64,
    /// Stability delta weights
    pub weights: StabilityWeights,
    /// Debt ratio alert thresholds
    pub thresholds: AlertThresholds,
    /// Paradox risk growth coefficients
    pub risk: RiskCoefficients,
    /// Alerts retained in the hub's history
    pub max_alert_history: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            debt_limit: 2_000.0,
            settle_epsilon: 1e-9,
            min_payment_fraction: crate::DEFAULT_MIN_PAYMENT_FRACTION,
            weights: StabilityWeights::default(),
            thresholds: AlertThresholds::default(),
            risk: RiskCoefficients::default(),
            max_alert_history: DEFAULT_MAX_ALERT_HISTORY,
        }
    }
}

impl TrackerConfig {
    /// Tight limit, early alerts, larger installments
    pub fn strict() -> Self {
        TrackerConfig {
            debt_limit: 1_000.0,
            min_payment_fraction: 0.2,
            thresholds: AlertThresholds {
                low: 0.2,
                medium: 0.4,
                high: 0.6,
                critical: 0.8,
            },
            ..Default::default()
        }
    }

    /// Generous limit for stress scenarios
    pub fn lenient() -> Self {
        TrackerConfig {
            debt_limit: 100_000.0,
            min_payment_fraction: 0.05,
            ..Default::default()
        }
    }
}

/// Result of a single repayment pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    pub strategy: StrategyKind,
    pub chronons_repaid: f64,
    pub aethel_repaid: f64,
    pub debts_cleared: usize,
    pub stability_delta: f64,
    pub steps_applied: usize,
    /// A step failed and the remaining steps were skipped
    pub aborted: bool,
}

impl RepaymentOutcome {
    fn new(strategy: StrategyKind) -> Self {
        RepaymentOutcome {
            strategy,
            chronons_repaid: 0.0,
            aethel_repaid: 0.0,
            debts_cleared: 0,
            stability_delta: 0.0,
            steps_applied: 0,
            aborted: false,
        }
    }

    pub fn total_repaid(&self) -> f64 {
        self.chronons_repaid + self.aethel_repaid
    }
}

/// Result of advancing one cycle
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub interest_accrued: f64,
    /// Debts that became past due this cycle
    pub newly_past_due: Vec<DebtId>,
    pub debt_ratio: f64,
    pub alert_level: AlertLevel,
}

/// Restorable tracker state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub book: DebtBook,
    pub ledger: ResourceLedger,
    pub stability: f64,
    pub cycle: u64,
}

/// Debt tracker
#[derive(Debug)]
pub struct DebtTracker {
    config: TrackerConfig,
    book: DebtBook,
    ledger: ResourceLedger,
    /// Current stability in [0, 1]
    stability: f64,
    cycle: u64,
    stability_model: StabilityModel,
    risk_model: ParadoxRiskModel,
    alerts: AlertHub,
    /// Level of the last debt-ratio alert, to raise only on escalation
    alert_level: AlertLevel,
}

impl DebtTracker {
    /// Create a new tracker with default configuration
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    /// Create a new tracker with custom configuration
    pub fn with_config(config: TrackerConfig) -> Self {
        DebtTracker {
            stability_model: StabilityModel::with_weights(config.weights),
            risk_model: ParadoxRiskModel::with_coefficients(config.risk),
            alerts: AlertHub::with_max_history(config.max_alert_history),
            config,
            book: DebtBook::new(),
            ledger: ResourceLedger::new(),
            stability: 1.0,
            cycle: 0,
            alert_level: AlertLevel::None,
        }
    }

    /// Create a tracker starting from a snapshot
    pub fn from_snapshot(config: TrackerConfig, snapshot: TrackerSnapshot) -> Self {
        let mut tracker = Self::with_config(config);
        tracker.restore(snapshot);
        tracker
    }

    /// Get configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Get the resource ledger
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Get mutable access to the resource ledger
    pub fn ledger_mut(&mut self) -> &mut ResourceLedger {
        &mut self.ledger
    }

    /// Get the debt book
    pub fn book(&self) -> &DebtBook {
        &self.book
    }

    /// Get the alert hub
    pub fn alerts(&self) -> &AlertHub {
        &self.alerts
    }

    /// Get mutable access to the alert hub (for registering callbacks)
    pub fn alerts_mut(&mut self) -> &mut AlertHub {
        &mut self.alerts
    }

    /// Get current stability
    pub fn stability(&self) -> f64 {
        self.stability
    }

    /// Seed stability, clamped to [0, 1]
    pub fn set_stability(&mut self, value: f64) {
        self.stability = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
    }

    /// Get current cycle
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// All outstanding debts in insertion order
    pub fn all_debts(&self) -> &[Debt] {
        self.book.all()
    }

    /// Add a debt, enforcing the debt limit
    ///
    /// Invalid and duplicate debts are rejected before the limit is checked.
    pub fn add_debt(&mut self, debt: Debt) -> ChronovyanResult<()> {
        debt.validate()?;
        if self.book.contains(&debt.id) {
            return Err(ChronovyanError::DuplicateDebt(debt.id));
        }
        self.check_limit(&debt.id, debt.amount)?;

        self.book.add(debt)?;
        self.check_debt_ratio();
        Ok(())
    }

    /// Incur debt from an operation and credit the borrowed resources
    ///
    /// The interest rate and due cycle are derived from the amount,
    /// criticality and the operation's severity. Running the same operation
    /// again under the same id and kind grows the existing debt and reprices
    /// it for the new operation count; criticality stays as first incurred.
    /// An id already used by a different operation or kind is a duplicate.
    pub fn incur_debt(
        &mut self,
        operation: OperationType,
        id: impl Into<DebtId>,
        kind: ResourceKind,
        amount: f64,
        critical: bool,
    ) -> ChronovyanResult<()> {
        let id = id.into();
        if !(amount.is_finite() && amount > 0.0) {
            return Err(ChronovyanError::InvalidAmount(amount));
        }

        let existing = self.book.get(&id).map(|d| {
            let repeat = d.kind == kind && d.origin == Some(operation);
            (repeat, d.is_critical, d.amount, d.operation_count)
        });
        if let Some((false, ..)) = existing {
            return Err(ChronovyanError::DuplicateDebt(id));
        }
        self.check_limit(&id, amount)?;

        match existing {
            Some((_, is_critical, balance, count)) => {
                let count = count.saturating_add(1);
                let rate = incurred_interest_rate(balance + amount, is_critical, operation, count);
                self.book.record_repeat(&id, amount, rate)?;
            }
            None => {
                let rate = incurred_interest_rate(amount, critical, operation, 1);
                let due = self
                    .cycle
                    .saturating_add(incurred_term(amount, critical, operation));
                let mut debt = Debt::new(id.clone(), kind, amount)
                    .with_interest(rate)
                    .with_due_cycle(due)
                    .with_origin(operation);
                debt.is_critical = critical;
                self.book.add(debt)?;
            }
        }

        let credit = Resources::of(kind, amount);
        self.ledger.allocate(credit.chronons, credit.aethel)?;
        debug!(
            operation = %operation,
            debt = %id,
            kind = %kind,
            amount,
            "Incurred debt"
        );
        self.check_debt_ratio();
        Ok(())
    }

    /// Reject `amount` more debt when it would pass the limit, raising a critical alert
    fn check_limit(&mut self, id: &DebtId, amount: f64) -> ChronovyanResult<()> {
        let requested = self.book.total() + amount;
        if requested <= self.config.debt_limit {
            return Ok(());
        }
        let ratio = requested / self.config.debt_limit;
        let message = format!(
            "Debt {} rejected: total {:.2} would exceed limit {:.2}",
            id, requested, self.config.debt_limit
        );
        self.alerts
            .raise(DebtAlert::new(AlertLevel::Critical, message, ratio).for_debt(id.clone()));
        Err(ChronovyanError::DebtLimitExceeded {
            requested,
            limit: self.config.debt_limit,
        })
    }

    /// Remove every debt and reset stability
    pub fn clear_all_debts(&mut self) {
        self.book.clear();
        self.stability = 1.0;
        self.alert_level = AlertLevel::None;
    }

    /// Apply a strategy using all available resources
    ///
    /// Returns the stability delta of the pass.
    pub fn apply_repayment_strategy(&mut self, kind: StrategyKind) -> f64 {
        self.apply_repayment_strategy_detailed(kind).stability_delta
    }

    /// Apply a strategy using all available resources
    pub fn apply_repayment_strategy_detailed(&mut self, kind: StrategyKind) -> RepaymentOutcome {
        self.apply_with_budget(kind, self.ledger.balances())
    }

    /// Apply a strategy within `budget`, clamped to the ledger balances
    pub fn apply_with_budget(&mut self, kind: StrategyKind, budget: Resources) -> RepaymentOutcome {
        let budget = Resources::new(budget.chronons.max(0.0), budget.aethel.max(0.0))
            .min(&self.ledger.balances());
        let plan = self.plan(kind, budget);
        self.execute_plan(plan)
    }

    /// Build a plan without executing it
    pub fn plan(&self, kind: StrategyKind, budget: Resources) -> RepaymentPlan {
        match kind {
            StrategyKind::MinimumPayments => {
                MinimumPayments::with_fraction(self.config.min_payment_fraction)
                    .plan(self.book.all(), budget)
            }
            _ => strategy_for(kind).plan(self.book.all(), budget),
        }
    }

    /// Execute a plan step by step against the ledger and the book
    ///
    /// A step the ledger cannot fund, or that names an unknown debt, aborts
    /// the remaining steps. Steps already applied stay applied and their
    /// stability delta is folded in.
    pub fn execute_plan(&mut self, plan: RepaymentPlan) -> RepaymentOutcome {
        let mut outcome = RepaymentOutcome::new(plan.strategy);
        let before = DebtFigures::of(&self.book);

        for step in &plan.steps {
            if let Err(err) = self.ledger.expend(step.chronons, step.aethel) {
                warn!(
                    strategy = %plan.strategy,
                    debt = %step.debt_id,
                    error = %err,
                    "Repayment aborted"
                );
                outcome.aborted = true;
                break;
            }
            if let Err(err) = self.book.apply_payment(&step.debt_id, step.amount()) {
                // Return the spent resources; allocate only fails on invalid amounts
                if let Err(refund) = self.ledger.allocate(step.chronons, step.aethel) {
                    warn!(error = %refund, "Refund failed");
                }
                warn!(
                    strategy = %plan.strategy,
                    debt = %step.debt_id,
                    error = %err,
                    "Repayment aborted"
                );
                outcome.aborted = true;
                break;
            }
            outcome.chronons_repaid += step.chronons;
            outcome.aethel_repaid += step.aethel;
            outcome.steps_applied += 1;
        }

        outcome.debts_cleared = self.book.remove_settled(self.config.settle_epsilon).len();

        let after = DebtFigures::of(&self.book);
        outcome.stability_delta = self.stability_model.delta(&before, &after);
        self.stability = StabilityModel::apply(self.stability, outcome.stability_delta);

        debug!(
            strategy = %plan.strategy,
            steps = outcome.steps_applied,
            chronons = outcome.chronons_repaid,
            aethel = outcome.aethel_repaid,
            "Applied repayment plan"
        );
        info!(
            strategy = %plan.strategy,
            cleared = outcome.debts_cleared,
            delta = outcome.stability_delta,
            stability = self.stability,
            "Repayment pass complete"
        );

        self.check_debt_ratio();
        outcome
    }

    /// Apply the recommended strategy to a fraction of available resources
    pub fn apply_maximum_repayment(
        &mut self,
        chronon_fraction: f64,
        aethel_fraction: f64,
    ) -> RepaymentOutcome {
        let kind = self.recommended_strategy();
        let budget = self
            .ledger
            .balances()
            .scaled(chronon_fraction, aethel_fraction);
        self.apply_with_budget(kind, budget)
    }

    /// Strategy suggested by the current debt and resource mix
    pub fn recommended_strategy(&self) -> StrategyKind {
        if self.book.is_empty() {
            return StrategyKind::Balanced;
        }
        if self.book.critical_count() > 0 {
            return StrategyKind::CriticalFirst;
        }

        let owed = self.book.outstanding();
        if owed.chronons > owed.aethel * DOMINANCE_FACTOR {
            return StrategyKind::ChrononPriority;
        }
        if owed.aethel > owed.chronons * DOMINANCE_FACTOR {
            return StrategyKind::AethelPriority;
        }

        let available = self.ledger.balances();
        if available.chronons < owed.chronons * SCARCE_RESOURCE_SHARE
            && available.aethel < owed.aethel * SCARCE_RESOURCE_SHARE
        {
            return StrategyKind::MinimumPayments;
        }

        let small = self
            .book
            .iter()
            .filter(|d| d.amount < SMALL_DEBT_THRESHOLD)
            .count();
        if small >= self.book.len() / 2 {
            return StrategyKind::Snowball;
        }

        StrategyKind::Balanced
    }

    /// Repay a single debt from the ledger
    ///
    /// The payment is clamped to the debt's balance. Returns the amount paid.
    pub fn repay_debt(&mut self, id: &DebtId, amount: f64) -> ChronovyanResult<f64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ChronovyanError::InvalidAmount(amount));
        }
        let debt = self
            .book
            .get(id)
            .ok_or_else(|| ChronovyanError::UnknownDebt(id.clone()))?;
        let kind = debt.kind;
        let payment = amount.min(debt.amount);

        let before = DebtFigures::of(&self.book);
        let cost = Resources::of(kind, payment);
        self.ledger.expend(cost.chronons, cost.aethel)?;
        let paid = self.book.apply_payment(id, payment)?;
        self.book.remove_settled(self.config.settle_epsilon);

        let delta = self
            .stability_model
            .delta(&before, &DebtFigures::of(&self.book));
        self.stability = StabilityModel::apply(self.stability, delta);
        Ok(paid)
    }

    /// Advance one cycle: accrue interest, age debts and raise alerts
    pub fn advance_cycle(&mut self) -> CycleReport {
        let was_past_due: Vec<DebtId> = self
            .book
            .past_due(self.cycle)
            .into_iter()
            .map(|d| d.id.clone())
            .collect();

        self.cycle += 1;
        let interest_accrued = self.book.accrue_interest();

        let newly_past_due: Vec<DebtId> = self
            .book
            .past_due(self.cycle)
            .into_iter()
            .filter(|d| !was_past_due.contains(&d.id))
            .map(|d| d.id.clone())
            .collect();

        for id in &newly_past_due {
            let message = format!("Debt {} is past due at cycle {}", id, self.cycle);
            let alert =
                DebtAlert::new(AlertLevel::High, message, self.debt_ratio()).for_debt(id.clone());
            self.alerts.raise(alert);
        }

        let alert_level = self.check_debt_ratio();
        debug!(
            cycle = self.cycle,
            interest = interest_accrued,
            past_due = newly_past_due.len(),
            "Advanced cycle"
        );

        CycleReport {
            cycle: self.cycle,
            interest_accrued,
            newly_past_due,
            debt_ratio: self.debt_ratio(),
            alert_level,
        }
    }

    /// Raise a ratio alert when the level escalates; returns the current level
    fn check_debt_ratio(&mut self) -> AlertLevel {
        let ratio = self.debt_ratio();
        let level = self.config.thresholds.level(ratio);
        if level > self.alert_level {
            let message = format!(
                "Debt ratio {:.2} reached {} level ({:.2} of {:.2})",
                ratio,
                level,
                self.book.total(),
                self.config.debt_limit
            );
            self.alerts.raise(DebtAlert::new(level, message, ratio));
        }
        self.alert_level = level;
        level
    }

    /// Total outstanding debt over the debt limit
    pub fn debt_ratio(&self) -> f64 {
        if self.config.debt_limit > 0.0 {
            self.book.total() / self.config.debt_limit
        } else {
            0.0
        }
    }

    pub fn total_outstanding(&self, kind: ResourceKind) -> f64 {
        self.book.total_outstanding(kind)
    }

    /// Outstanding debt per kind after `cycles` more cycles of interest
    pub fn project_future_debt(&self, cycles: u32) -> Resources {
        self.book
            .iter()
            .fold(Resources::ZERO, |acc, d| {
                acc + Resources::of(d.kind, d.projected(cycles))
            })
    }

    /// Resources needed to clear every critical debt
    pub fn minimum_safe_repayment(&self) -> Resources {
        self.book.critical_outstanding()
    }

    /// Projected paradox risk of a hypothetical operation
    pub fn project_paradox_risk(&self, operation: OperationType, cycles: u32, count: u32) -> f64 {
        self.risk_model.project_risk(operation, cycles, count)
    }

    /// Capture book, ledger, stability and cycle
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            book: self.book.snapshot(),
            ledger: self.ledger.snapshot(),
            stability: self.stability,
            cycle: self.cycle,
        }
    }

    /// Restore a captured state
    pub fn restore(&mut self, snapshot: TrackerSnapshot) {
        self.book.restore(snapshot.book);
        self.ledger.restore(snapshot.ledger);
        self.stability = snapshot.stability;
        self.cycle = snapshot.cycle;
        self.alert_level = self.config.thresholds.level(self.debt_ratio());
    }
}

impl Default for DebtTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe tracker handle
///
/// Serialises access so at most one repayment pass runs at a time.
#[derive(Clone, Debug, Default)]
pub struct SharedDebtTracker {
    inner: Arc<Mutex<DebtTracker>>,
}

impl SharedDebtTracker {
    pub fn new(tracker: DebtTracker) -> Self {
        SharedDebtTracker {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Lock the tracker for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, DebtTracker> {
        self.inner.lock()
    }

    pub fn add_debt(&self, debt: Debt) -> ChronovyanResult<()> {
        self.inner.lock().add_debt(debt)
    }

    pub fn incur_debt(
        &self,
        operation: OperationType,
        id: impl Into<DebtId>,
        kind: ResourceKind,
        amount: f64,
        critical: bool,
    ) -> ChronovyanResult<()> {
        self.inner
            .lock()
            .incur_debt(operation, id, kind, amount, critical)
    }

    pub fn clear_all_debts(&self) {
        self.inner.lock().clear_all_debts();
    }

    pub fn apply_repayment_strategy(&self, kind: StrategyKind) -> f64 {
        self.inner.lock().apply_repayment_strategy(kind)
    }

    pub fn stability(&self) -> f64 {
        self.inner.lock().stability()
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.inner.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanStep;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tracker_with(chronons: f64, aethel: f64) -> DebtTracker {
        let mut tracker = DebtTracker::new();
        tracker.ledger_mut().set_chronons(chronons);
        tracker.ledger_mut().set_aethel(aethel);
        tracker
    }

    #[test]
    fn test_oldest_first_pays_single_debt() {
        let mut tracker = tracker_with(300.0, 0.0);
        tracker
            .add_debt(Debt::chronon("c1", 100.0).with_interest(0.05).with_age(5))
            .unwrap();

        let delta = tracker.apply_repayment_strategy(StrategyKind::OldestFirst);

        assert!(tracker.all_debts().is_empty());
        assert_eq!(tracker.ledger().chronons(), 200.0);
        assert!(delta > 0.0);
    }

    #[test]
    fn test_full_payoff_every_strategy() {
        for kind in StrategyKind::ALL {
            let mut tracker = tracker_with(0.0, 500.0);
            tracker
                .add_debt(Debt::aethel("a1", 120.0).with_interest(0.07).critical())
                .unwrap();
            let outcome = tracker.apply_repayment_strategy_detailed(kind);
            assert!(tracker.all_debts().is_empty(), "{kind} left debt behind");
            assert_eq!(outcome.debts_cleared, 1);
            assert!((outcome.aethel_repaid - 120.0).abs() < 1e-9);
            assert!(!outcome.aborted);
        }
    }

    #[test]
    fn test_zero_resources_is_noop() {
        let mut tracker = tracker_with(0.0, 0.0);
        tracker.add_debt(Debt::chronon("c1", 50.0)).unwrap();
        tracker.add_debt(Debt::aethel("a1", 50.0)).unwrap();
        let before = tracker.all_debts().to_vec();

        let delta = tracker.apply_repayment_strategy(StrategyKind::Balanced);
        assert_eq!(delta, 0.0);
        assert_eq!(tracker.all_debts(), &before[..]);

        // A starved critical debt costs stability
        tracker.add_debt(Debt::chronon("c2", 10.0).critical()).unwrap();
        let delta = tracker.apply_repayment_strategy(StrategyKind::CriticalFirst);
        assert!(delta < 0.0);
    }

    #[test]
    fn test_clear_all_debts_resets_stability() {
        let mut tracker = DebtTracker::new();
        tracker.set_stability(0.4);
        tracker.add_debt(Debt::chronon("c1", 10.0)).unwrap();
        tracker.clear_all_debts();
        assert!(tracker.all_debts().is_empty());
        assert_eq!(tracker.stability(), 1.0);
    }

    #[test]
    fn test_budget_clamped_to_ledger() {
        let mut tracker = tracker_with(40.0, 0.0);
        tracker.add_debt(Debt::chronon("c1", 100.0)).unwrap();

        let outcome =
            tracker.apply_with_budget(StrategyKind::HighestInterest, Resources::new(1e6, 1e6));
        assert_eq!(outcome.chronons_repaid, 40.0);
        assert_eq!(tracker.ledger().chronons(), 0.0);
        assert_eq!(tracker.all_debts()[0].amount, 60.0);
    }

    #[test]
    fn test_debt_limit_rejection() {
        let mut tracker = DebtTracker::with_config(TrackerConfig::strict());
        let raised = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&raised);
        tracker
            .alerts_mut()
            .subscribe(AlertLevel::Critical, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        tracker.add_debt(Debt::chronon("c1", 600.0)).unwrap();
        let err = tracker.add_debt(Debt::aethel("a1", 500.0)).unwrap_err();
        assert_eq!(
            err,
            ChronovyanError::DebtLimitExceeded {
                requested: 1100.0,
                limit: 1000.0,
            }
        );
        assert_eq!(tracker.all_debts().len(), 1);
        assert_eq!(raised.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_add_debt_validates_before_limit() {
        let mut tracker = DebtTracker::with_config(TrackerConfig::strict());
        tracker.add_debt(Debt::chronon("c1", 600.0)).unwrap();
        let alerts_before = tracker.alerts().history().len();

        assert_eq!(
            tracker.add_debt(Debt::chronon("c1", 500.0)),
            Err(ChronovyanError::DuplicateDebt(DebtId::new("c1")))
        );
        assert!(matches!(
            tracker.add_debt(Debt::aethel("a1", f64::INFINITY)),
            Err(ChronovyanError::InvalidAmount(_))
        ));
        assert!(matches!(
            tracker.add_debt(Debt::aethel("a1", 900.0).with_interest(f64::NAN)),
            Err(ChronovyanError::InvalidAmount(_))
        ));
        assert_eq!(tracker.alerts().history().len(), alerts_before);
        assert_eq!(tracker.all_debts().len(), 1);
    }

    #[test]
    fn test_incurred_terms() {
        let rate = incurred_interest_rate(200.0, false, OperationType::TimeLoop, 1);
        assert!((rate - 0.08).abs() < 1e-12);
        let rate = incurred_interest_rate(50.0, true, OperationType::ParadoxInsertion, 1);
        assert!((rate - 0.125).abs() < 1e-12);
        // Balance contribution is capped
        let capped = incurred_interest_rate(1e9, false, OperationType::TimeLoop, 1);
        assert!((capped - 0.11).abs() < 1e-12);
        assert!(
            incurred_interest_rate(100.0, false, OperationType::TimelineFracture, 3)
                > incurred_interest_rate(100.0, false, OperationType::TimelineFracture, 2)
        );

        assert_eq!(incurred_term(1000.0, false, OperationType::TimeLoop), 19);
        assert_eq!(incurred_term(50.0, true, OperationType::ParadoxInsertion), 2);
        assert!(incurred_term(0.1, true, OperationType::ParadoxInsertion) >= 1);
    }

    #[test]
    fn test_incur_debt_credits_ledger() {
        let mut tracker = DebtTracker::new();
        tracker.advance_cycle();
        tracker
            .incur_debt(OperationType::TimeLoop, "loop1", ResourceKind::Chronon, 200.0, false)
            .unwrap();

        let debt = tracker.book().get(&DebtId::new("loop1")).unwrap();
        assert_eq!(debt.kind, ResourceKind::Chronon);
        assert_eq!(debt.amount, 200.0);
        assert!((debt.interest_rate - 0.08).abs() < 1e-12);
        assert_eq!(debt.due_cycle, Some(12));
        assert_eq!(debt.origin, Some(OperationType::TimeLoop));
        assert_eq!(debt.operation_count, 1);
        assert!(!debt.is_critical);
        assert_eq!(tracker.ledger().chronons(), 200.0);
        assert_eq!(tracker.ledger().aethel(), 0.0);
    }

    #[test]
    fn test_incur_debt_merges_repeats() {
        let mut tracker = DebtTracker::new();
        tracker
            .incur_debt(OperationType::TimeLoop, "loop1", ResourceKind::Chronon, 200.0, false)
            .unwrap();
        tracker
            .incur_debt(OperationType::TimeLoop, "loop1", ResourceKind::Chronon, 100.0, true)
            .unwrap();

        assert_eq!(tracker.all_debts().len(), 1);
        let debt = &tracker.all_debts()[0];
        assert_eq!(debt.amount, 300.0);
        assert_eq!(debt.operation_count, 2);
        assert!((debt.interest_rate - 0.095).abs() < 1e-12);
        assert!(!debt.is_critical);
        assert_eq!(tracker.ledger().chronons(), 300.0);
    }

    #[test]
    fn test_incur_debt_rejections() {
        let mut tracker = DebtTracker::with_config(TrackerConfig::strict());
        tracker
            .incur_debt(OperationType::TimeLoop, "op1", ResourceKind::Aethel, 100.0, false)
            .unwrap();
        tracker.add_debt(Debt::chronon("manual", 10.0)).unwrap();

        // Same id, different operation or kind
        for (operation, kind) in [
            (OperationType::EntropyManipulation, ResourceKind::Aethel),
            (OperationType::TimeLoop, ResourceKind::Chronon),
        ] {
            assert_eq!(
                tracker.incur_debt(operation, "op1", kind, 5.0, false),
                Err(ChronovyanError::DuplicateDebt(DebtId::new("op1")))
            );
        }
        assert_eq!(
            tracker.incur_debt(OperationType::TimeLoop, "manual", ResourceKind::Chronon, 5.0, false),
            Err(ChronovyanError::DuplicateDebt(DebtId::new("manual")))
        );
        assert!(matches!(
            tracker.incur_debt(OperationType::TimeLoop, "op2", ResourceKind::Aethel, 0.0, false),
            Err(ChronovyanError::InvalidAmount(_))
        ));

        let ledger = tracker.ledger().clone();
        assert!(matches!(
            tracker.incur_debt(OperationType::TimeLoop, "op1", ResourceKind::Aethel, 950.0, false),
            Err(ChronovyanError::DebtLimitExceeded { .. })
        ));
        assert_eq!(tracker.ledger(), &ledger);
        assert_eq!(tracker.book().get(&DebtId::new("op1")).unwrap().amount, 100.0);
        assert_eq!(tracker.alerts().highest_pending(), AlertLevel::Critical);
    }

    #[test]
    fn test_execute_plan_aborts_on_overdraw() {
        let mut tracker = tracker_with(100.0, 0.0);
        tracker.add_debt(Debt::chronon("c1", 50.0)).unwrap();
        tracker.add_debt(Debt::chronon("c2", 80.0)).unwrap();
        tracker.add_debt(Debt::chronon("c3", 20.0)).unwrap();
        tracker.set_stability(0.5);

        let step = |id: &str, chronons: f64| PlanStep {
            debt_id: DebtId::new(id),
            chronons,
            aethel: 0.0,
        };
        let plan = RepaymentPlan {
            strategy: StrategyKind::OldestFirst,
            steps: vec![step("c1", 50.0), step("c2", 80.0), step("c3", 20.0)],
        };
        let outcome = tracker.execute_plan(plan);

        assert!(outcome.aborted);
        assert_eq!(outcome.steps_applied, 1);
        assert_eq!(outcome.chronons_repaid, 50.0);
        assert_eq!(outcome.debts_cleared, 1);
        assert_eq!(tracker.ledger().chronons(), 50.0);
        assert_eq!(tracker.book().get(&DebtId::new("c2")).unwrap().amount, 80.0);
        assert_eq!(tracker.book().get(&DebtId::new("c3")).unwrap().amount, 20.0);

        // Only the first payment counts: 0.4 · 50 / 150
        assert!((outcome.stability_delta - 0.4 / 3.0).abs() < 1e-12);
        assert!((tracker.stability() - (0.5 + 0.4 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_execute_plan_unknown_debt_refunds() {
        let mut tracker = tracker_with(100.0, 0.0);
        tracker.add_debt(Debt::chronon("c1", 50.0)).unwrap();

        let plan = RepaymentPlan {
            strategy: StrategyKind::Snowball,
            steps: vec![PlanStep {
                debt_id: DebtId::new("ghost"),
                chronons: 10.0,
                aethel: 0.0,
            }],
        };
        let outcome = tracker.execute_plan(plan);

        assert!(outcome.aborted);
        assert_eq!(outcome.steps_applied, 0);
        assert_eq!(outcome.stability_delta, 0.0);
        assert_eq!(tracker.ledger().chronons(), 100.0);
        assert_eq!(tracker.all_debts()[0].amount, 50.0);
    }

    #[test]
    fn test_alert_history_limit_from_config() {
        let config = TrackerConfig {
            max_alert_history: 2,
            ..TrackerConfig::strict()
        };
        let mut tracker = DebtTracker::with_config(config);
        assert_eq!(tracker.alerts().max_history(), 2);

        for i in 0..5 {
            let _ = tracker.add_debt(Debt::chronon(format!("big{i}"), 5_000.0));
        }
        assert_eq!(tracker.alerts().history().len(), 2);
    }

    #[test]
    fn test_ratio_alerts_escalate_once() {
        let mut tracker = DebtTracker::new();
        tracker.add_debt(Debt::chronon("c1", 700.0)).unwrap();
        tracker.add_debt(Debt::chronon("c2", 10.0)).unwrap();

        let levels: Vec<AlertLevel> = tracker
            .alerts()
            .history()
            .iter()
            .map(|r| r.alert.level)
            .collect();
        assert_eq!(levels, vec![AlertLevel::Low]);
    }

    #[test]
    fn test_advance_cycle() {
        let mut tracker = DebtTracker::new();
        tracker
            .add_debt(Debt::chronon("c1", 100.0).with_interest(0.1).with_due_cycle(0))
            .unwrap();

        let report = tracker.advance_cycle();
        assert_eq!(report.cycle, 1);
        assert!((report.interest_accrued - 10.0).abs() < 1e-9);
        assert_eq!(report.newly_past_due, vec![DebtId::new("c1")]);
        assert_eq!(tracker.all_debts()[0].age_in_cycles, 1);

        let report = tracker.advance_cycle();
        assert!(report.newly_past_due.is_empty());
    }

    #[test]
    fn test_projection_and_safe_repayment() {
        let mut tracker = DebtTracker::new();
        tracker
            .add_debt(Debt::chronon("c1", 100.0).with_interest(0.1).critical())
            .unwrap();
        tracker.add_debt(Debt::aethel("a1", 50.0)).unwrap();

        let projected = tracker.project_future_debt(2);
        assert!((projected.chronons - 121.0).abs() < 1e-9);
        assert_eq!(projected.aethel, 50.0);
        let far = tracker.project_future_debt(u32::MAX);
        assert!(far.chronons >= projected.chronons);
        assert_eq!(far.aethel, 50.0);
        assert_eq!(tracker.minimum_safe_repayment(), Resources::new(100.0, 0.0));
        assert!((tracker.debt_ratio() - 150.0 / 2000.0).abs() < 1e-12);
    }

    #[test]
    fn test_recommended_strategy() {
        let mut tracker = tracker_with(500.0, 500.0);
        assert_eq!(tracker.recommended_strategy(), StrategyKind::Balanced);

        tracker.add_debt(Debt::chronon("c1", 300.0)).unwrap();
        assert_eq!(tracker.recommended_strategy(), StrategyKind::ChrononPriority);

        tracker.add_debt(Debt::aethel("a1", 200.0)).unwrap();
        assert_eq!(tracker.recommended_strategy(), StrategyKind::Balanced);

        tracker.add_debt(Debt::aethel("a2", 10.0)).unwrap();
        assert_eq!(tracker.recommended_strategy(), StrategyKind::Snowball);

        tracker.ledger_mut().set_chronons(1.0);
        tracker.ledger_mut().set_aethel(1.0);
        assert_eq!(tracker.recommended_strategy(), StrategyKind::MinimumPayments);

        tracker.add_debt(Debt::chronon("c2", 5.0).critical()).unwrap();
        assert_eq!(tracker.recommended_strategy(), StrategyKind::CriticalFirst);
    }

    #[test]
    fn test_apply_maximum_repayment() {
        let mut tracker = tracker_with(100.0, 100.0);
        tracker.add_debt(Debt::chronon("c1", 500.0).critical()).unwrap();

        let outcome = tracker.apply_maximum_repayment(0.3, 0.3);
        assert_eq!(outcome.strategy, StrategyKind::CriticalFirst);
        assert!((outcome.chronons_repaid - 30.0).abs() < 1e-9);
        assert!((tracker.ledger().chronons() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_repay_debt() {
        let mut tracker = tracker_with(100.0, 0.0);
        tracker.add_debt(Debt::chronon("c1", 40.0)).unwrap();

        assert_eq!(tracker.repay_debt(&DebtId::new("c1"), 100.0).unwrap(), 40.0);
        assert!(tracker.all_debts().is_empty());
        assert_eq!(tracker.ledger().chronons(), 60.0);
        assert_eq!(
            tracker.repay_debt(&DebtId::new("c1"), 1.0),
            Err(ChronovyanError::UnknownDebt(DebtId::new("c1")))
        );
    }

    #[test]
    fn test_snapshot_restore() {
        let mut tracker = tracker_with(100.0, 100.0);
        tracker.add_debt(Debt::chronon("c1", 80.0)).unwrap();
        tracker.set_stability(0.5);
        let snapshot = tracker.snapshot();

        tracker.apply_repayment_strategy(StrategyKind::Snowball);
        tracker.advance_cycle();
        assert_ne!(tracker.snapshot(), snapshot);

        tracker.restore(snapshot.clone());
        assert_eq!(tracker.snapshot(), snapshot);

        let copy = DebtTracker::from_snapshot(TrackerConfig::default(), snapshot.clone());
        assert_eq!(copy.snapshot(), snapshot);
    }

    #[test]
    fn test_paradox_risk_passthrough() {
        let tracker = DebtTracker::new();
        let risk = tracker.project_paradox_risk(OperationType::TimeLoop, 0, 0);
        assert!((risk - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_shared_tracker_serialises_passes() {
        let shared = SharedDebtTracker::new(tracker_with(1000.0, 0.0));
        for i in 0..8 {
            shared
                .add_debt(Debt::chronon(format!("c{i}"), 100.0))
                .unwrap();
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.apply_repayment_strategy(StrategyKind::Snowball))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let tracker = shared.lock();
        assert!(tracker.all_debts().is_empty());
        assert!((tracker.ledger().chronons() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_shared_tracker_clear_and_incur() {
        let shared = SharedDebtTracker::new(DebtTracker::new());
        shared
            .incur_debt(OperationType::EntropyManipulation, "e1", ResourceKind::Aethel, 40.0, false)
            .unwrap();
        shared.add_debt(Debt::chronon("c1", 10.0)).unwrap();
        shared.lock().set_stability(0.3);

        shared.clear_all_debts();
        let tracker = shared.lock();
        assert!(tracker.all_debts().is_empty());
        assert_eq!(tracker.stability(), 1.0);
        assert_eq!(tracker.ledger().aethel(), 40.0);
    }

    fn debt() -> impl Strategy<Value = (f64, f64, bool, bool)> {
        (1.0f64..200.0, 0.0f64..0.2, prop::bool::ANY, prop::bool::ANY)
    }

    proptest! {
        #[test]
        fn prop_repayment_never_increases_debt(
            debts in proptest::collection::vec(debt(), 1..10),
            chronons in 0.0f64..800.0,
            aethel in 0.0f64..800.0,
            strategy in 0usize..10,
        ) {
            let mut tracker = tracker_with(chronons, aethel);
            for (i, (amount, rate, is_aethel, critical)) in debts.into_iter().enumerate() {
                let mut debt = if is_aethel {
                    Debt::aethel(format!("d{i}"), amount)
                } else {
                    Debt::chronon(format!("d{i}"), amount)
                };
                debt = debt.with_interest(rate);
                debt.is_critical = critical;
                tracker.add_debt(debt).unwrap();
            }

            let before = tracker.snapshot();
            let outcome = tracker.apply_repayment_strategy_detailed(StrategyKind::ALL[strategy]);

            prop_assert!(!outcome.aborted);
            prop_assert!(tracker.ledger().chronons() >= 0.0);
            prop_assert!(tracker.ledger().aethel() >= 0.0);
            for debt in tracker.all_debts() {
                let prior = before.book.get(&debt.id).unwrap();
                prop_assert!(debt.amount <= prior.amount);
            }
            let spent = before.ledger.balances().total() - tracker.ledger().balances().total();
            prop_assert!((spent - outcome.total_repaid()).abs() < 1e-6);
        }
    }
}
