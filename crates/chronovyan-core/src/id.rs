//! Identity types for the temporal debt engine
//!
//! Debts are keyed by caller-chosen string identifiers. Ordering on
//! [`DebtId`] is lexical and is the deterministic tie-break used by every
//! repayment strategy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Debt identity - unique within a debt book
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebtId(String);

impl DebtId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        DebtId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a component id, e.g. `op1` + `c` -> `op1-c`
    pub fn component(&self, suffix: &str) -> Self {
        DebtId(format!("{}-{}", self.0, suffix))
    }
}

impl fmt::Debug for DebtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Debt({})", self.0)
    }
}

impl fmt::Display for DebtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DebtId {
    fn from(id: &str) -> Self {
        DebtId::new(id)
    }
}

impl From<String> for DebtId {
    fn from(id: String) -> Self {
        DebtId(id)
    }
}

impl AsRef<str> for DebtId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
