//! Benchmark reports

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use chronovyan_debt::StrategyKind;

use crate::{optimal_strategy, BenchmarkResult};

const RULE: &str = "===============================================";
const THIN_RULE: &str = "-----------------------------------------------";

/// Human-readable block for a single result
pub fn format_benchmark_result(result: &BenchmarkResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Strategy: {}", result.strategy);
    let _ = writeln!(
        out,
        "Stability: {:.2} -> {:.2} ({:+.2})",
        result.initial_stability, result.final_stability, result.stability_improvement
    );
    let _ = writeln!(out, "Resources Used: {:.2}", result.resources_used);
    let _ = writeln!(
        out,
        "Efficiency: {:.4} stability per resource",
        result.efficiency
    );
    let _ = writeln!(out, "Execution Time: {} us", result.duration.as_micros());
    let _ = writeln!(
        out,
        "Debts: {} fully paid, {} partially paid, {} unpaid",
        result.debts_fully_paid, result.debts_partially_paid, result.debts_unpaid
    );
    if let Some(error) = &result.error {
        let _ = writeln!(out, "Error: {}", error);
    }
    out
}

/// Full report: summary table, per-strategy detail and the optimal strategy
pub fn generate_benchmark_report(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "TEMPORAL DEBT REPAYMENT STRATEGY BENCHMARK");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);

    let mut ranked: Vec<&BenchmarkResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.stability_improvement.total_cmp(&a.stability_improvement));

    let _ = writeln!(out, "SUMMARY (sorted by stability improvement):");
    let _ = writeln!(out, "{THIN_RULE}");
    let _ = writeln!(
        out,
        "{:<25}{:>15}{:>15}{:>10}",
        "Strategy", "Stability +", "Efficiency", "Paid Off"
    );
    let _ = writeln!(out, "{THIN_RULE}");
    for result in &ranked {
        let _ = writeln!(
            out,
            "{:<25}{:>15.2}{:>15.4}{:>10}",
            result.strategy.name(),
            result.stability_improvement,
            result.efficiency,
            result.debts_fully_paid
        );
    }
    let _ = writeln!(out, "{THIN_RULE}");
    let _ = writeln!(out);

    let _ = writeln!(out, "DETAILED RESULTS:");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);
    for result in results {
        out.push_str(&format_benchmark_result(result));
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{RULE}");
    match optimal_strategy(results) {
        Some(kind) => {
            let _ = writeln!(out, "OPTIMAL STRATEGY: {}", kind);
        }
        None => {
            let _ = writeln!(out, "OPTIMAL STRATEGY: none (no results)");
        }
    }
    let _ = writeln!(out, "{RULE}");
    out
}

/// Serializable benchmark report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub scenario: Option<String>,
    pub optimal: Option<StrategyKind>,
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub fn new(scenario: Option<String>, results: Vec<BenchmarkResult>) -> Self {
        BenchmarkReport {
            scenario,
            optimal: optimal_strategy(&results),
            results,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Text rendering of the report
    pub fn render(&self) -> String {
        match &self.scenario {
            Some(name) => format!(
                "Scenario: {}\n{}",
                name,
                generate_benchmark_report(&self.results)
            ),
            None => generate_benchmark_report(&self.results),
        }
    }
}
