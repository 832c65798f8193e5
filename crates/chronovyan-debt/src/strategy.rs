//! Repayment strategies
//!
//! A strategy is a pure planner: given the outstanding debts and a budget it
//! produces a [`RepaymentPlan`] without touching any state. Planning runs in
//! two phases:
//!
//! 1. Order the debts (strategy key, ties broken by id ascending)
//! 2. Apportion the budget from the front, matching resource kinds
//!
//! No plan ever requests more of a kind than the budget holds.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use chronovyan_core::{ChronovyanError, Debt, DebtId, ResourceKind, Resources};

/// Weight added to critical debts by the stability-optimized ordering
const CRITICALITY_WEIGHT: f64 = 1.0;

/// Default installment fraction for minimum payments
pub const DEFAULT_MIN_PAYMENT_FRACTION: f64 = 0.1;

/// Repayment policies, in benchmark order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    OldestFirst,
    HighestInterest,
    CriticalFirst,
    Balanced,
    MinimumPayments,
    Snowball,
    Avalanche,
    StabilityOptimized,
    ChrononPriority,
    AethelPriority,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 10] = [
        StrategyKind::OldestFirst,
        StrategyKind::HighestInterest,
        StrategyKind::CriticalFirst,
        StrategyKind::Balanced,
        StrategyKind::MinimumPayments,
        StrategyKind::Snowball,
        StrategyKind::Avalanche,
        StrategyKind::StabilityOptimized,
        StrategyKind::ChrononPriority,
        StrategyKind::AethelPriority,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::OldestFirst => "Oldest First",
            StrategyKind::HighestInterest => "Highest Interest",
            StrategyKind::CriticalFirst => "Critical First",
            StrategyKind::Balanced => "Balanced",
            StrategyKind::MinimumPayments => "Minimum Payments",
            StrategyKind::Snowball => "Snowball",
            StrategyKind::Avalanche => "Avalanche",
            StrategyKind::StabilityOptimized => "Stability Optimized",
            StrategyKind::ChrononPriority => "Chronon Priority",
            StrategyKind::AethelPriority => "Aethel Priority",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::OldestFirst => {
                "Repays the oldest debts first, prioritizing by creation time."
            }
            StrategyKind::HighestInterest => {
                "Repays debts with the highest interest rates first to minimize total interest paid."
            }
            StrategyKind::CriticalFirst => {
                "Prioritizes repayment of critical debts to maintain timeline stability."
            }
            StrategyKind::Balanced => {
                "Distributes repayment across all debts in proportion to their relative size."
            }
            StrategyKind::MinimumPayments => {
                "Makes minimum payments on all debts to prevent default, preserving resources."
            }
            StrategyKind::Snowball => {
                "Repays the smallest debts first to clear as many obligations as possible."
            }
            StrategyKind::Avalanche => {
                "Clears the highest-rate debts in full before moving on, larger balances first."
            }
            StrategyKind::StabilityOptimized => {
                "Repays the debts with the most stability gained per resource spent."
            }
            StrategyKind::ChrononPriority => {
                "Prioritizes chronon debt to restore temporal processing capacity."
            }
            StrategyKind::AethelPriority => {
                "Prioritizes aethel debt to restore parallel timeline management."
            }
        }
    }

    /// Position in [`StrategyKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = ChronovyanError;

    /// Accepts display names ("Oldest First") and identifiers ("oldest_first")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        StrategyKind::ALL
            .iter()
            .copied()
            .find(|kind| {
                kind.name()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .map(|c| c.to_ascii_lowercase())
                    .eq(key.chars())
            })
            .ok_or_else(|| ChronovyanError::UnknownStrategy(s.to_string()))
    }
}

/// One planned payment against a single debt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub debt_id: DebtId,
    pub chronons: f64,
    pub aethel: f64,
}

impl PlanStep {
    pub fn new(debt: &Debt, amount: f64) -> Self {
        let r = Resources::of(debt.kind, amount);
        PlanStep {
            debt_id: debt.id.clone(),
            chronons: r.chronons,
            aethel: r.aethel,
        }
    }

    /// Payment as a resource pair
    pub fn resources(&self) -> Resources {
        Resources::new(self.chronons, self.aethel)
    }

    /// Total payment across both kinds
    pub fn amount(&self) -> f64 {
        self.chronons + self.aethel
    }
}

/// Ordered payments produced by a strategy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepaymentPlan {
    pub strategy: StrategyKind,
    pub steps: Vec<PlanStep>,
}

impl RepaymentPlan {
    pub fn empty(strategy: StrategyKind) -> Self {
        RepaymentPlan {
            strategy,
            steps: Vec::new(),
        }
    }

    /// Sum of all planned payments
    pub fn total(&self) -> Resources {
        self.steps
            .iter()
            .fold(Resources::ZERO, |acc, step| acc + step.resources())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanStep> {
        self.steps.iter()
    }
}

/// A repayment policy
pub trait RepaymentStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Plan payments for `debts` within `budget`
    fn plan(&self, debts: &[Debt], budget: Resources) -> RepaymentPlan;
}

/// Sort-then-pay-in-full strategy
pub struct Greedy {
    kind: StrategyKind,
    order: fn(&Debt, &Debt) -> Ordering,
}

impl Greedy {
    pub const fn new(kind: StrategyKind, order: fn(&Debt, &Debt) -> Ordering) -> Self {
        Greedy { kind, order }
    }
}

impl RepaymentStrategy for Greedy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn plan(&self, debts: &[Debt], budget: Resources) -> RepaymentPlan {
        let mut ordered: Vec<&Debt> = debts.iter().collect();
        ordered.sort_by(|a, b| (self.order)(a, b).then_with(|| a.id.cmp(&b.id)));

        let mut remaining = clean_budget(budget);
        let mut plan = RepaymentPlan::empty(self.kind);
        for debt in ordered {
            let available = remaining.get_mut(debt.kind);
            // Exhausted kinds skip; the other kind may still pay
            let amount = debt.amount.min(*available);
            if amount > 0.0 {
                *available -= amount;
                plan.steps.push(PlanStep::new(debt, amount));
            }
        }
        plan
    }
}

/// Proportional apportionment by outstanding share
pub struct Balanced;

impl RepaymentStrategy for Balanced {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Balanced
    }

    fn plan(&self, debts: &[Debt], budget: Resources) -> RepaymentPlan {
        let budget = clean_budget(budget);
        let outstanding = debts
            .iter()
            .fold(Resources::ZERO, |acc, d| acc + d.as_resources());

        let mut remaining = budget;
        let mut plan = RepaymentPlan::empty(StrategyKind::Balanced);
        for debt in debts {
            let total = outstanding.get(debt.kind);
            if total <= 0.0 {
                continue;
            }
            let share = budget.get(debt.kind) * debt.amount / total;
            let available = remaining.get_mut(debt.kind);
            let amount = share.min(debt.amount).min(*available);
            if amount > 0.0 {
                *available -= amount;
                plan.steps.push(PlanStep::new(debt, amount));
            }
        }
        plan
    }
}

/// Installments on every debt
///
/// Each debt receives the larger of `fraction · amount` and an even split of
/// its kind's budget across that kind's debts, clamped to the debt balance and
/// to what is left of the budget.
pub struct MinimumPayments {
    fraction: f64,
}

impl MinimumPayments {
    pub const fn new() -> Self {
        MinimumPayments {
            fraction: DEFAULT_MIN_PAYMENT_FRACTION,
        }
    }

    pub fn with_fraction(fraction: f64) -> Self {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            DEFAULT_MIN_PAYMENT_FRACTION
        };
        MinimumPayments { fraction }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }
}

impl Default for MinimumPayments {
    fn default() -> Self {
        Self::new()
    }
}

impl RepaymentStrategy for MinimumPayments {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MinimumPayments
    }

    fn plan(&self, debts: &[Debt], budget: Resources) -> RepaymentPlan {
        let budget = clean_budget(budget);
        let count = |kind: ResourceKind| debts.iter().filter(|d| d.kind == kind).count();
        let counts = [count(ResourceKind::Chronon), count(ResourceKind::Aethel)];

        let mut remaining = budget;
        let mut plan = RepaymentPlan::empty(StrategyKind::MinimumPayments);
        for debt in debts {
            let n = counts[debt.kind as usize].max(1) as f64;
            let even_split = budget.get(debt.kind) / n;
            let installment = (self.fraction * debt.amount).max(even_split);
            let available = remaining.get_mut(debt.kind);
            let amount = installment.min(debt.amount).min(*available);
            if amount > 0.0 {
                *available -= amount;
                plan.steps.push(PlanStep::new(debt, amount));
            }
        }
        plan
    }
}

fn clean_budget(budget: Resources) -> Resources {
    let clean = |x: f64| if x.is_finite() && x > 0.0 { x } else { 0.0 };
    Resources::new(clean(budget.chronons), clean(budget.aethel))
}

// Orderings

fn rate_desc(a: &Debt, b: &Debt) -> Ordering {
    b.interest_rate.total_cmp(&a.interest_rate)
}

fn oldest_first(a: &Debt, b: &Debt) -> Ordering {
    b.age_in_cycles
        .cmp(&a.age_in_cycles)
        .then_with(|| match (a.due_cycle, b.due_cycle) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

fn critical_first(a: &Debt, b: &Debt) -> Ordering {
    b.is_critical
        .cmp(&a.is_critical)
        .then_with(|| rate_desc(a, b))
}

fn smallest_first(a: &Debt, b: &Debt) -> Ordering {
    a.amount.total_cmp(&b.amount)
}

fn avalanche(a: &Debt, b: &Debt) -> Ordering {
    rate_desc(a, b).then_with(|| b.amount.total_cmp(&a.amount))
}

fn stability_score(debt: &Debt) -> f64 {
    let weight = if debt.is_critical { CRITICALITY_WEIGHT } else { 0.0 };
    (weight + debt.interest_rate) / debt.amount
}

fn stability_optimized(a: &Debt, b: &Debt) -> Ordering {
    stability_score(b).total_cmp(&stability_score(a))
}

fn kind_first(kind: ResourceKind, a: &Debt, b: &Debt) -> Ordering {
    (b.kind == kind)
        .cmp(&(a.kind == kind))
        .then_with(|| rate_desc(a, b))
}

fn chronon_first(a: &Debt, b: &Debt) -> Ordering {
    kind_first(ResourceKind::Chronon, a, b)
}

fn aethel_first(a: &Debt, b: &Debt) -> Ordering {
    kind_first(ResourceKind::Aethel, a, b)
}

static OLDEST_FIRST: Greedy = Greedy::new(StrategyKind::OldestFirst, oldest_first);
static HIGHEST_INTEREST: Greedy = Greedy::new(StrategyKind::HighestInterest, rate_desc);
static CRITICAL_FIRST: Greedy = Greedy::new(StrategyKind::CriticalFirst, critical_first);
static BALANCED: Balanced = Balanced;
static MINIMUM_PAYMENTS: MinimumPayments = MinimumPayments::new();
static SNOWBALL: Greedy = Greedy::new(StrategyKind::Snowball, smallest_first);
static AVALANCHE: Greedy = Greedy::new(StrategyKind::Avalanche, avalanche);
static STABILITY_OPTIMIZED: Greedy =
    Greedy::new(StrategyKind::StabilityOptimized, stability_optimized);
static CHRONON_PRIORITY: Greedy = Greedy::new(StrategyKind::ChrononPriority, chronon_first);
static AETHEL_PRIORITY: Greedy = Greedy::new(StrategyKind::AethelPriority, aethel_first);

/// Look up the planner for a strategy
pub fn strategy_for(kind: StrategyKind) -> &'static dyn RepaymentStrategy {
    match kind {
        StrategyKind::OldestFirst => &OLDEST_FIRST,
        StrategyKind::HighestInterest => &HIGHEST_INTEREST,
        StrategyKind::CriticalFirst => &CRITICAL_FIRST,
        StrategyKind::Balanced => &BALANCED,
        StrategyKind::MinimumPayments => &MINIMUM_PAYMENTS,
        StrategyKind::Snowball => &SNOWBALL,
        StrategyKind::Avalanche => &AVALANCHE,
        StrategyKind::StabilityOptimized => &STABILITY_OPTIMIZED,
        StrategyKind::ChrononPriority => &CHRONON_PRIORITY,
        StrategyKind::AethelPriority => &AETHEL_PRIORITY,
    }
}
