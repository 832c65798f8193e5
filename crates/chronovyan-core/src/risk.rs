//! Paradox risk projection
//!
//! Risk of a hypothetical operation grows with the number of cycles it is
//! sustained for and the number of times it is repeated:
//!
//! ```text
//! risk = clamp(base_weight · (1 + k1·cycles) · (1 + k2·count), 0, 1)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ChronovyanError;

/// Hypothetical operations that may destabilize the timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    TimeLoop,
    EntropyManipulation,
    TimelineFracture,
    CausalityInversion,
    ParadoxInsertion,
}

impl OperationType {
    const ALL: [OperationType; 5] = [
        OperationType::TimeLoop,
        OperationType::EntropyManipulation,
        OperationType::TimelineFracture,
        OperationType::CausalityInversion,
        OperationType::ParadoxInsertion,
    ];

    /// All operation types, least to most dangerous
    pub fn all() -> &'static [OperationType] {
        &Self::ALL
    }

    pub fn name(self) -> &'static str {
        match self {
            OperationType::TimeLoop => "time_loop",
            OperationType::EntropyManipulation => "entropy_manipulation",
            OperationType::TimelineFracture => "timeline_fracture",
            OperationType::CausalityInversion => "causality_inversion",
            OperationType::ParadoxInsertion => "paradox_insertion",
        }
    }

    /// Base risk weight for a single occurrence
    pub fn base_weight(self) -> f64 {
        match self {
            OperationType::TimeLoop => 0.10,
            OperationType::EntropyManipulation => 0.15,
            OperationType::TimelineFracture => 0.20,
            OperationType::CausalityInversion => 0.25,
            OperationType::ParadoxInsertion => 0.30,
        }
    }

    /// Severity rank, 1 (mildest) to 5
    pub fn severity(self) -> u8 {
        match self {
            OperationType::TimeLoop => 1,
            OperationType::EntropyManipulation => 2,
            OperationType::TimelineFracture => 3,
            OperationType::CausalityInversion => 4,
            OperationType::ParadoxInsertion => 5,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationType {
    type Err = ChronovyanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == normalized || op.name().replace('_', "") == normalized)
            .ok_or_else(|| ChronovyanError::UnknownOperation(s.to_string()))
    }
}

/// Growth coefficients for risk projection
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskCoefficients {
    /// Growth per sustained cycle
    pub per_cycle: f64,
    /// Growth per repetition
    pub per_repetition: f64,
}

impl Default for RiskCoefficients {
    fn default() -> Self {
        RiskCoefficients {
            per_cycle: 0.05,
            per_repetition: 0.10,
        }
    }
}

/// Pure paradox risk model
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParadoxRiskModel {
    coefficients: RiskCoefficients,
}

impl ParadoxRiskModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coefficients(coefficients: RiskCoefficients) -> Self {
        ParadoxRiskModel { coefficients }
    }

    pub fn coefficients(&self) -> RiskCoefficients {
        self.coefficients
    }

    /// Projected risk in [0, 1]
    pub fn project_risk(&self, operation: OperationType, cycles: u32, count: u32) -> f64 {
        let k = &self.coefficients;
        let risk = operation.base_weight()
            * (1.0 + k.per_cycle * cycles as f64)
            * (1.0 + k.per_repetition * count as f64);
        if risk.is_nan() {
            return 1.0;
        }
        risk.clamp(0.0, 1.0)
    }

    /// Risk trajectory for cycles `1..=cycles`
    pub fn project_over_cycles(&self, operation: OperationType, cycles: u32, count: u32) -> Vec<f64> {
        (1..=cycles)
            .map(|cycle| self.project_risk(operation, cycle, count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base_risk() {
        let model = ParadoxRiskModel::new();
        assert!((model.project_risk(OperationType::TimeLoop, 0, 0) - 0.10).abs() < 1e-12);
        // 0.30 · 1.5 · 2.0
        assert!(
            (model.project_risk(OperationType::ParadoxInsertion, 10, 10) - 0.90).abs() < 1e-12
        );
        assert_eq!(model.project_risk(OperationType::ParadoxInsertion, 100, 100), 1.0);
    }

    #[test]
    fn test_trajectory() {
        let model = ParadoxRiskModel::new();
        let trajectory = model.project_over_cycles(OperationType::TimelineFracture, 5, 1);
        assert_eq!(trajectory.len(), 5);
        assert!(trajectory.windows(2).all(|w| w[0] <= w[1]));
        assert!(model.project_over_cycles(OperationType::TimeLoop, 0, 1).is_empty());
    }

    #[test]
    fn test_parse_names() {
        for op in OperationType::all() {
            assert_eq!(op.name().parse::<OperationType>().unwrap(), *op);
        }
        assert_eq!(
            "TimeLoop".parse::<OperationType>().unwrap(),
            OperationType::TimeLoop
        );
        assert_eq!(
            "causality-inversion".parse::<OperationType>().unwrap(),
            OperationType::CausalityInversion
        );
        assert!(matches!(
            "wormhole".parse::<OperationType>(),
            Err(ChronovyanError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_custom_coefficients() {
        let model = ParadoxRiskModel::with_coefficients(RiskCoefficients {
            per_cycle: 0.0,
            per_repetition: 0.0,
        });
        assert_eq!(model.project_risk(OperationType::TimeLoop, 50, 50), 0.10);
    }

    fn operation() -> impl Strategy<Value = OperationType> {
        (0usize..5).prop_map(|i| OperationType::all()[i])
    }

    proptest! {
        #[test]
        fn prop_risk_monotonic(op in operation(), cycles in 0u32..500, count in 0u32..500) {
            let model = ParadoxRiskModel::new();
            let risk = model.project_risk(op, cycles, count);
            prop_assert!((0.0..=1.0).contains(&risk));
            prop_assert!(model.project_risk(op, cycles + 1, count) >= risk);
            prop_assert!(model.project_risk(op, cycles, count + 1) >= risk);
        }

        #[test]
        fn prop_paradox_insertion_dominates(cycles in 0u32..500, count in 0u32..500) {
            let model = ParadoxRiskModel::new();
            prop_assert!(
                model.project_risk(OperationType::ParadoxInsertion, cycles, count)
                    >= model.project_risk(OperationType::TimeLoop, cycles, count)
            );
        }
    }
}
