//! Temporal debts and the debt book

use serde::{Deserialize, Serialize};

use crate::{ChronovyanError, ChronovyanResult, DebtId, OperationType, ResourceKind, Resources};

/// A single outstanding obligation against one resource kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: DebtId,
    pub kind: ResourceKind,
    /// Principal plus accrued interest
    pub amount: f64,
    /// Fractional growth per cycle
    pub interest_rate: f64,
    pub age_in_cycles: u32,
    /// Absolute cycle after which the debt is past due
    pub due_cycle: Option<u64>,
    pub is_critical: bool,
    /// Operation that incurred the debt
    pub origin: Option<OperationType>,
    /// Times the originating operation has been repeated into this debt
    pub operation_count: u32,
}

impl Debt {
    pub fn new(id: impl Into<DebtId>, kind: ResourceKind, amount: f64) -> Self {
        Debt {
            id: id.into(),
            kind,
            amount,
            interest_rate: 0.0,
            age_in_cycles: 0,
            due_cycle: None,
            is_critical: false,
            origin: None,
            operation_count: 1,
        }
    }

    pub fn chronon(id: impl Into<DebtId>, amount: f64) -> Self {
        Self::new(id, ResourceKind::Chronon, amount)
    }

    pub fn aethel(id: impl Into<DebtId>, amount: f64) -> Self {
        Self::new(id, ResourceKind::Aethel, amount)
    }

    pub fn with_interest(mut self, rate: f64) -> Self {
        self.interest_rate = rate;
        self
    }

    pub fn with_age(mut self, cycles: u32) -> Self {
        self.age_in_cycles = cycles;
        self
    }

    pub fn with_due_cycle(mut self, cycle: u64) -> Self {
        self.due_cycle = Some(cycle);
        self
    }

    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }

    pub fn with_origin(mut self, operation: OperationType) -> Self {
        self.origin = Some(operation);
        self
    }

    /// Past due when the due cycle lies strictly before `current_cycle`
    pub fn is_past_due(&self, current_cycle: u64) -> bool {
        matches!(self.due_cycle, Some(due) if due < current_cycle)
    }

    pub fn is_settled(&self, epsilon: f64) -> bool {
        self.amount <= epsilon
    }

    /// Balance after `cycles` more cycles of compound interest
    pub fn projected(&self, cycles: u32) -> f64 {
        self.amount * (1.0 + self.interest_rate).powf(f64::from(cycles))
    }

    /// Amount as a per-kind resource pair
    pub fn as_resources(&self) -> Resources {
        Resources::of(self.kind, self.amount)
    }

    /// Amount must be finite and positive, rate finite and non-negative
    pub fn validate(&self) -> ChronovyanResult<()> {
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(ChronovyanError::InvalidAmount(self.amount));
        }
        if !(self.interest_rate.is_finite() && self.interest_rate >= 0.0) {
            return Err(ChronovyanError::InvalidAmount(self.interest_rate));
        }
        Ok(())
    }
}

/// Insertion-ordered collection of debts keyed by id
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtBook {
    debts: Vec<Debt>,
}

impl DebtBook {
    pub fn new() -> Self {
        DebtBook::default()
    }

    /// Add a debt; ids must be unique within the book
    pub fn add(&mut self, debt: Debt) -> ChronovyanResult<()> {
        debt.validate()?;
        if self.contains(&debt.id) {
            return Err(ChronovyanError::DuplicateDebt(debt.id));
        }
        self.debts.push(debt);
        Ok(())
    }

    pub fn remove(&mut self, id: &DebtId) -> ChronovyanResult<Debt> {
        let index = self.position(id)?;
        Ok(self.debts.remove(index))
    }

    /// Evict debts whose balance is at or below `epsilon`
    pub fn remove_settled(&mut self, epsilon: f64) -> Vec<Debt> {
        let (settled, open): (Vec<Debt>, Vec<Debt>) = std::mem::take(&mut self.debts)
            .into_iter()
            .partition(|d| d.is_settled(epsilon));
        self.debts = open;
        settled
    }

    pub fn clear(&mut self) {
        self.debts.clear();
    }

    /// Fold a repeated operation into an existing debt
    ///
    /// Adds `amount` to the balance, bumps the operation count and replaces the
    /// interest rate. Nothing changes on error.
    pub fn record_repeat(
        &mut self,
        id: &DebtId,
        amount: f64,
        interest_rate: f64,
    ) -> ChronovyanResult<&Debt> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(ChronovyanError::InvalidAmount(amount));
        }
        if !(interest_rate.is_finite() && interest_rate >= 0.0) {
            return Err(ChronovyanError::InvalidAmount(interest_rate));
        }
        let index = self.position(id)?;
        let debt = &mut self.debts[index];
        debt.amount += amount;
        debt.interest_rate = interest_rate;
        debt.operation_count = debt.operation_count.saturating_add(1);
        Ok(debt)
    }

    /// Reduce a debt's balance, returning the amount actually applied
    pub fn apply_payment(&mut self, id: &DebtId, amount: f64) -> ChronovyanResult<f64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ChronovyanError::InvalidAmount(amount));
        }
        let index = self.position(id)?;
        let debt = &mut self.debts[index];
        let applied = amount.min(debt.amount);
        debt.amount -= applied;
        Ok(applied)
    }

    /// Grow every debt by its interest rate and age it one cycle
    ///
    /// Returns the total interest accrued across the book.
    pub fn accrue_interest(&mut self) -> f64 {
        let mut accrued = 0.0;
        for debt in &mut self.debts {
            let interest = debt.amount * debt.interest_rate;
            debt.amount += interest;
            debt.age_in_cycles = debt.age_in_cycles.saturating_add(1);
            accrued += interest;
        }
        accrued
    }

    pub fn get(&self, id: &DebtId) -> Option<&Debt> {
        self.debts.iter().find(|d| &d.id == id)
    }

    pub fn contains(&self, id: &DebtId) -> bool {
        self.get(id).is_some()
    }

    fn position(&self, id: &DebtId) -> ChronovyanResult<usize> {
        self.debts
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| ChronovyanError::UnknownDebt(id.clone()))
    }

    /// All debts in insertion order
    pub fn all(&self) -> &[Debt] {
        &self.debts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Debt> {
        self.debts.iter()
    }

    pub fn iter_by_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Debt> + '_ {
        self.debts.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    pub fn total_outstanding(&self, kind: ResourceKind) -> f64 {
        self.iter_by_kind(kind).map(|d| d.amount).sum()
    }

    /// Outstanding totals for both kinds
    pub fn outstanding(&self) -> Resources {
        Resources::new(
            self.total_outstanding(ResourceKind::Chronon),
            self.total_outstanding(ResourceKind::Aethel),
        )
    }

    pub fn total(&self) -> f64 {
        self.debts.iter().map(|d| d.amount).sum()
    }

    pub fn critical_count(&self) -> usize {
        self.debts.iter().filter(|d| d.is_critical).count()
    }

    pub fn critical_total(&self) -> f64 {
        self.debts
            .iter()
            .filter(|d| d.is_critical)
            .map(|d| d.amount)
            .sum()
    }

    /// Outstanding critical amounts per kind
    pub fn critical_outstanding(&self) -> Resources {
        self.debts
            .iter()
            .filter(|d| d.is_critical)
            .fold(Resources::ZERO, |acc, d| acc + d.as_resources())
    }

    pub fn past_due(&self, current_cycle: u64) -> Vec<&Debt> {
        self.debts
            .iter()
            .filter(|d| d.is_past_due(current_cycle))
            .collect()
    }

    /// Deep copy of the book
    pub fn snapshot(&self) -> DebtBook {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: DebtBook) {
        *self = snapshot;
    }
}

impl<'a> IntoIterator for &'a DebtBook {
    type Item = &'a Debt;
    type IntoIter = std::slice::Iter<'a, Debt>;

    fn into_iter(self) -> Self::IntoIter {
        self.debts.iter()
    }
}
