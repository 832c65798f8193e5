//! Chronovyan Debt - Temporal debt repayment engine
//!
//! This crate schedules repayment of outstanding temporal debts:
//! - Repayment strategies (pure planners over the debt book)
//! - Stability model (scoring the effect of a repayment pass)
//! - Debt tracker (ledger + book ownership, plan execution, cycles)
//! - Debt ratio alerts

pub mod strategy;
pub mod stability;
pub mod tracker;
pub mod alert;

pub use strategy::*;
pub use stability::*;
pub use tracker::*;
pub use alert::*;
