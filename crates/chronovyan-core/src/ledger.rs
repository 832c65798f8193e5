//! Resource ledger - chronon and aethel balances
//!
//! The ledger is the single owner of resource balances. Only four operations
//! mutate it in the normal course of a session:
//!
//! - `allocate` - external grant, always succeeds for valid amounts
//! - `expend` - all-or-nothing spend, fails on insufficient balance
//! - `borrow` - one outstanding borrow per resource kind
//! - `repay` - pays down an outstanding borrow
//!
//! Every operation validates all of its inputs before touching state, so a
//! failed call leaves the ledger exactly as it was. `set_chronons` and
//! `set_aethel` exist for scenario setup only.

use serde::{Deserialize, Serialize};

use crate::{ChronovyanError, ChronovyanResult, ResourceKind, Resources};

/// Outstanding borrow at or below this amount counts as fully repaid
const BORROW_EPSILON: f64 = 1e-9;

/// Borrow state for one resource kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
struct BorrowState {
    active: bool,
    outstanding: f64,
}

/// Resource ledger
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    balances: Resources,
    chronon_borrow: BorrowState,
    aethel_borrow: BorrowState,
}

fn validate(amount: f64) -> ChronovyanResult<f64> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(ChronovyanError::InvalidAmount(amount))
    }
}

impl ResourceLedger {
    pub fn new() -> Self {
        ResourceLedger::default()
    }

    /// Create a ledger holding the given balances
    pub fn with_balances(chronons: f64, aethel: f64) -> ChronovyanResult<Self> {
        let mut ledger = ResourceLedger::new();
        ledger.allocate(chronons, aethel)?;
        Ok(ledger)
    }

    #[inline]
    pub fn chronons(&self) -> f64 {
        self.balances.chronons
    }

    #[inline]
    pub fn aethel(&self) -> f64 {
        self.balances.aethel
    }

    #[inline]
    pub fn balance(&self, kind: ResourceKind) -> f64 {
        self.balances.get(kind)
    }

    /// Both balances
    pub fn balances(&self) -> Resources {
        self.balances
    }

    pub fn chronons_borrowed(&self) -> bool {
        self.chronon_borrow.active
    }

    pub fn aethel_borrowed(&self) -> bool {
        self.aethel_borrow.active
    }

    pub fn is_borrowed(&self, kind: ResourceKind) -> bool {
        self.borrow_state(kind).active
    }

    /// Outstanding borrowed amount for a kind
    pub fn borrowed(&self, kind: ResourceKind) -> f64 {
        self.borrow_state(kind).outstanding
    }

    fn borrow_state(&self, kind: ResourceKind) -> &BorrowState {
        match kind {
            ResourceKind::Chronon => &self.chronon_borrow,
            ResourceKind::Aethel => &self.aethel_borrow,
        }
    }

    fn borrow_state_mut(&mut self, kind: ResourceKind) -> &mut BorrowState {
        match kind {
            ResourceKind::Chronon => &mut self.chronon_borrow,
            ResourceKind::Aethel => &mut self.aethel_borrow,
        }
    }

    /// Add to both balances
    pub fn allocate(&mut self, chronons: f64, aethel: f64) -> ChronovyanResult<()> {
        let grant = Resources::new(validate(chronons)?, validate(aethel)?);
        self.balances += grant;
        Ok(())
    }

    /// Spend from both balances, all-or-nothing
    pub fn expend(&mut self, chronons: f64, aethel: f64) -> ChronovyanResult<()> {
        let request = Resources::new(validate(chronons)?, validate(aethel)?);
        self.check_available(&request)?;
        self.balances = self.balances - request;
        Ok(())
    }

    /// Borrow resources; at most one outstanding borrow per kind
    pub fn borrow(&mut self, chronons: f64, aethel: f64) -> ChronovyanResult<()> {
        let request = Resources::new(validate(chronons)?, validate(aethel)?);

        for kind in ResourceKind::ALL {
            if request.get(kind) > 0.0 && self.is_borrowed(kind) {
                return Err(ChronovyanError::AlreadyBorrowed(kind));
            }
        }

        for kind in ResourceKind::ALL {
            let amount = request.get(kind);
            if amount > 0.0 {
                *self.balances.get_mut(kind) += amount;
                let state = self.borrow_state_mut(kind);
                state.active = true;
                state.outstanding = amount;
            }
        }
        Ok(())
    }

    /// Repay outstanding borrows
    ///
    /// Amounts above the outstanding borrow are clamped to it. A kind whose
    /// outstanding borrow reaches zero has its borrowed flag cleared.
    pub fn repay(&mut self, chronons: f64, aethel: f64) -> ChronovyanResult<()> {
        let request = Resources::new(validate(chronons)?, validate(aethel)?);

        let mut payment = Resources::ZERO;
        for kind in ResourceKind::ALL {
            let amount = request.get(kind);
            if amount > 0.0 {
                let state = self.borrow_state(kind);
                if !state.active {
                    return Err(ChronovyanError::NothingBorrowed(kind));
                }
                *payment.get_mut(kind) = amount.min(state.outstanding);
            }
        }
        self.check_available(&payment)?;

        self.balances = self.balances - payment;
        for kind in ResourceKind::ALL {
            let paid = payment.get(kind);
            if paid > 0.0 {
                let state = self.borrow_state_mut(kind);
                state.outstanding -= paid;
                if state.outstanding <= BORROW_EPSILON {
                    *state = BorrowState::default();
                }
            }
        }
        Ok(())
    }

    fn check_available(&self, request: &Resources) -> ChronovyanResult<()> {
        for kind in ResourceKind::ALL {
            let requested = request.get(kind);
            let available = self.balance(kind);
            if requested > available {
                return Err(ChronovyanError::InsufficientResources {
                    kind,
                    requested,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Reset the chronon balance (scenario setup)
    pub fn set_chronons(&mut self, chronons: f64) {
        self.balances.chronons = chronons.max(0.0);
    }

    /// Reset the aethel balance (scenario setup)
    pub fn set_aethel(&mut self, aethel: f64) {
        self.balances.aethel = aethel.max(0.0);
    }

    /// Copy of the full ledger state
    pub fn snapshot(&self) -> ResourceLedger {
        self.clone()
    }

    /// Restore a state captured by [`snapshot`](Self::snapshot)
    pub fn restore(&mut self, snapshot: ResourceLedger) {
        *self = snapshot;
    }
}
