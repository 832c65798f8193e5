//! Error types for the temporal debt engine

use thiserror::Error;

use crate::{DebtId, ResourceKind};

/// Core Chronovyan errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChronovyanError {
    // Ledger errors
    #[error("Insufficient {kind}: requested {requested}, available {available}")]
    InsufficientResources {
        kind: ResourceKind,
        requested: f64,
        available: f64,
    },

    #[error("{0} already borrowed")]
    AlreadyBorrowed(ResourceKind),

    #[error("Nothing borrowed for {0}")]
    NothingBorrowed(ResourceKind),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    // Debt book errors
    #[error("Unknown debt: {0}")]
    UnknownDebt(DebtId),

    #[error("Duplicate debt: {0}")]
    DuplicateDebt(DebtId),

    #[error("Debt limit exceeded: total would be {requested}, limit {limit}")]
    DebtLimitExceeded { requested: f64, limit: f64 },

    // Lookup errors
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Unknown repayment strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown operation type: {0}")]
    UnknownOperation(String),

    #[error("Unknown resource kind: {0}")]
    UnknownResource(String),
}

/// Result type for Chronovyan operations
pub type ChronovyanResult<T> = Result<T, ChronovyanError>;
