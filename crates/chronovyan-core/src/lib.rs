//! Chronovyan Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the temporal debt engine:
//! - Identifiers (DebtId)
//! - Resource kinds (chronons, aethel) and the resource ledger
//! - Temporal debts and the debt book
//! - Paradox risk projection
//! - Error types

pub mod id;
pub mod resource;
pub mod ledger;
pub mod debt;
pub mod risk;
pub mod error;

pub use id::*;
pub use resource::*;
pub use ledger::*;
pub use debt::*;
pub use risk::*;
pub use error::*;
