//! Chronovyan Bench - Repayment strategy benchmarking
//!
//! This crate provides:
//! - Standard debt scenarios
//! - Seeded random scenario generation
//! - The strategy benchmark harness (sequential and parallel)
//! - Text and JSON reports

pub mod scenario;
pub mod generator;
pub mod harness;
pub mod report;

pub use scenario::*;
pub use generator::*;
pub use harness::*;
pub use report::*;
