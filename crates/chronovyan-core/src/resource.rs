//! Resource kinds and per-kind amounts

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ChronovyanError;

/// The two fungible resources managed by the ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Chronon,
    Aethel,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Chronon, ResourceKind::Aethel];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Chronon => "chronons",
            ResourceKind::Aethel => "aethel",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = ChronovyanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chronon" | "chronons" => Ok(ResourceKind::Chronon),
            "aethel" => Ok(ResourceKind::Aethel),
            other => Err(ChronovyanError::UnknownResource(other.to_string())),
        }
    }
}

/// A pair of chronon and aethel amounts
///
/// Used for budgets, balances and repayment totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub chronons: f64,
    pub aethel: f64,
}

impl Resources {
    pub const ZERO: Resources = Resources {
        chronons: 0.0,
        aethel: 0.0,
    };

    pub fn new(chronons: f64, aethel: f64) -> Self {
        Resources { chronons, aethel }
    }

    /// Amount of a single kind
    #[inline]
    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Chronon => self.chronons,
            ResourceKind::Aethel => self.aethel,
        }
    }

    /// Mutable amount of a single kind
    #[inline]
    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Chronon => &mut self.chronons,
            ResourceKind::Aethel => &mut self.aethel,
        }
    }

    /// Resources holding `amount` of one kind only
    pub fn of(kind: ResourceKind, amount: f64) -> Self {
        let mut r = Resources::ZERO;
        *r.get_mut(kind) = amount;
        r
    }

    pub fn total(&self) -> f64 {
        self.chronons + self.aethel
    }

    pub fn is_zero(&self) -> bool {
        self.chronons == 0.0 && self.aethel == 0.0
    }

    /// Component-wise minimum
    pub fn min(&self, other: &Resources) -> Resources {
        Resources {
            chronons: self.chronons.min(other.chronons),
            aethel: self.aethel.min(other.aethel),
        }
    }

    /// Scale each component by its own fraction, clamped to [0, 1]
    pub fn scaled(&self, chronon_fraction: f64, aethel_fraction: f64) -> Resources {
        Resources {
            chronons: self.chronons * chronon_fraction.clamp(0.0, 1.0),
            aethel: self.aethel * aethel_fraction.clamp(0.0, 1.0),
        }
    }
}

impl std::ops::Add for Resources {
    type Output = Resources;

    fn add(self, rhs: Resources) -> Resources {
        Resources {
            chronons: self.chronons + rhs.chronons,
            aethel: self.aethel + rhs.aethel,
        }
    }
}

impl std::ops::Sub for Resources {
    type Output = Resources;

    fn sub(self, rhs: Resources) -> Resources {
        Resources {
            chronons: self.chronons - rhs.chronons,
            aethel: self.aethel - rhs.aethel,
        }
    }
}

impl std::ops::AddAssign for Resources {
    fn add_assign(&mut self, rhs: Resources) {
        self.chronons += rhs.chronons;
        self.aethel += rhs.aethel;
    }
}
