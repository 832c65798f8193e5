//! Stability model
//!
//! Stability is a scalar health metric in [0, 1]. A repayment pass moves it
//! by
//!
//! ```text
//! delta = w_resolved · critical_resolved / critical_before
//!       + w_reduction · debt_reduced / debt_before
//!       - w_starvation · critical_amount_after / critical_amount_before
//! ```
//!
//! Terms with a zero denominator contribute nothing.

use serde::{Deserialize, Serialize};

use chronovyan_core::DebtBook;

/// Debt ratio at which baseline stability reaches its floor contribution
const BASELINE_LOAD_FACTOR: f64 = 0.8;

/// Stability delta weights
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StabilityWeights {
    /// Reward for critical debts fully resolved
    pub resolved: f64,
    /// Reward for overall debt reduction
    pub reduction: f64,
    /// Penalty for critical debt left outstanding
    pub starvation: f64,
}

impl Default for StabilityWeights {
    fn default() -> Self {
        StabilityWeights {
            resolved: 0.5,
            reduction: 0.4,
            starvation: 0.1,
        }
    }
}

/// Debt-book figures the stability delta is computed from
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DebtFigures {
    pub total: f64,
    pub critical_count: usize,
    pub critical_amount: f64,
}

impl DebtFigures {
    pub fn of(book: &DebtBook) -> Self {
        DebtFigures {
            total: book.total(),
            critical_count: book.critical_count(),
            critical_amount: book.critical_total(),
        }
    }
}

/// Stability model
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StabilityModel {
    weights: StabilityWeights,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl StabilityModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: StabilityWeights) -> Self {
        StabilityModel { weights }
    }

    pub fn weights(&self) -> StabilityWeights {
        self.weights
    }

    /// Stability change between two states of the debt book
    pub fn delta(&self, before: &DebtFigures, after: &DebtFigures) -> f64 {
        let w = &self.weights;
        let resolved = before.critical_count.saturating_sub(after.critical_count) as f64;
        let reduced = (before.total - after.total).max(0.0);

        w.resolved * ratio(resolved, before.critical_count as f64)
            + w.reduction * ratio(reduced, before.total)
            - w.starvation * ratio(after.critical_amount, before.critical_amount)
    }

    /// Fold a delta into a stability value
    pub fn apply(current: f64, delta: f64) -> f64 {
        (current + delta).clamp(0.0, 1.0)
    }

    /// Load-derived stability for a debt total against a limit
    pub fn baseline(total_debt: f64, debt_limit: f64) -> f64 {
        if debt_limit <= 0.0 {
            return if total_debt > 0.0 { 0.0 } else { 1.0 };
        }
        (1.0 - BASELINE_LOAD_FACTOR * total_debt / debt_limit).clamp(0.0, 1.0)
    }
}
