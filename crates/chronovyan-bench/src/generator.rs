//! Random scenario generator
//!
//! Produces reproducible debt books and budgets from a seed, for stress
//! benchmarks and property tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use chronovyan_core::{ChronovyanResult, Debt, OperationType, ResourceKind};
use chronovyan_debt::DebtTracker;

/// Generator configuration
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Number of debts to generate
    pub debt_count: usize,
    /// Debt amount range
    pub min_amount: f64,
    pub max_amount: f64,
    /// Maximum per-cycle interest rate
    pub max_interest_rate: f64,
    /// Maximum debt age in cycles
    pub max_age: u32,
    /// Probability a debt is critical
    pub critical_prob: f64,
    /// Probability a debt is owed in aethel
    pub aethel_prob: f64,
    /// Budget as a fraction of the outstanding debt of each kind
    pub funding_ratio: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            debt_count: 20,
            min_amount: 10.0,
            max_amount: 300.0,
            max_interest_rate: 0.15,
            max_age: 10,
            critical_prob: 0.25,
            aethel_prob: 0.4,
            funding_ratio: 0.5,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Small scenarios for quick tests
    pub fn light() -> Self {
        GeneratorConfig {
            debt_count: 6,
            max_amount: 100.0,
            ..Default::default()
        }
    }

    /// Large, underfunded scenarios
    pub fn heavy() -> Self {
        GeneratorConfig {
            debt_count: 200,
            max_amount: 500.0,
            critical_prob: 0.4,
            funding_ratio: 0.25,
            ..Default::default()
        }
    }
}

/// A generated debt and resource configuration
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedScenario {
    pub debts: Vec<Debt>,
    pub chronons: f64,
    pub aethel: f64,
}

impl GeneratedScenario {
    pub fn total_debt(&self) -> f64 {
        self.debts.iter().map(|d| d.amount).sum()
    }

    /// Replace the tracker's debts and resources with this scenario
    pub fn install(&self, tracker: &mut DebtTracker) -> ChronovyanResult<()> {
        crate::scenario::install(tracker, self.debts.clone(), self.chronons, self.aethel)
    }
}

/// Seeded scenario generator
pub struct ScenarioGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    generated: u64,
}

impl ScenarioGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        ScenarioGenerator {
            config,
            rng,
            generated: 0,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the next scenario
    pub fn generate(&mut self) -> GeneratedScenario {
        let cfg = self.config.clone();
        let round = self.generated;
        self.generated += 1;

        let (low, high) = if cfg.min_amount < cfg.max_amount {
            (cfg.min_amount.max(f64::MIN_POSITIVE), cfg.max_amount)
        } else {
            (1.0, 2.0)
        };

        let mut debts = Vec::with_capacity(cfg.debt_count);
        let mut owed = [0.0f64; 2];
        for i in 0..cfg.debt_count {
            let kind = if self.rng.gen_bool(cfg.aethel_prob.clamp(0.0, 1.0)) {
                ResourceKind::Aethel
            } else {
                ResourceKind::Chronon
            };
            let amount = self.rng.gen_range(low..high);
            let rate = self.rng.gen_range(0.0..=cfg.max_interest_rate.max(0.0));
            let age = self.rng.gen_range(0..=cfg.max_age);

            let mut debt = Debt::new(format!("g{round}-{i}"), kind, amount)
                .with_interest(rate)
                .with_age(age);
            if self.rng.gen_bool(cfg.critical_prob.clamp(0.0, 1.0)) {
                debt.is_critical = true;
                let ops = OperationType::all();
                debt.origin = Some(ops[self.rng.gen_range(0..ops.len())]);
            }

            owed[kind as usize] += amount;
            debts.push(debt);
        }

        let funding = cfg.funding_ratio.max(0.0);
        GeneratedScenario {
            debts,
            chronons: owed[ResourceKind::Chronon as usize] * funding,
            aethel: owed[ResourceKind::Aethel as usize] * funding,
        }
    }
}

impl Iterator for ScenarioGenerator {
    type Item = GeneratedScenario;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }
}
