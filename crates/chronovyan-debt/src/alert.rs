//! Debt alerts
//!
//! Alerts are raised against the debt ratio (total outstanding / debt limit)
//! and delivered to registered callbacks. Recent alerts are also kept in a
//! bounded in-memory history for acknowledgement.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chronovyan_core::DebtId;

/// Alert severity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    pub fn name(self) -> &'static str {
        match self {
            AlertLevel::None => "none",
            AlertLevel::Low => "low",
            AlertLevel::Medium => "medium",
            AlertLevel::High => "high",
            AlertLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Debt ratio thresholds for each alert level
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds {
            low: 0.3,
            medium: 0.5,
            high: 0.7,
            critical: 0.9,
        }
    }
}

impl AlertThresholds {
    /// Alert level for a debt ratio
    pub fn level(&self, debt_ratio: f64) -> AlertLevel {
        if debt_ratio >= self.critical {
            AlertLevel::Critical
        } else if debt_ratio >= self.high {
            AlertLevel::High
        } else if debt_ratio >= self.medium {
            AlertLevel::Medium
        } else if debt_ratio >= self.low {
            AlertLevel::Low
        } else {
            AlertLevel::None
        }
    }
}

/// A raised alert
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebtAlert {
    pub level: AlertLevel,
    pub message: String,
    /// Debt that triggered the alert, if any
    pub debt_id: Option<DebtId>,
    pub debt_ratio: f64,
}

impl DebtAlert {
    pub fn new(level: AlertLevel, message: impl Into<String>, debt_ratio: f64) -> Self {
        DebtAlert {
            level,
            message: message.into(),
            debt_id: None,
            debt_ratio,
        }
    }

    pub fn for_debt(mut self, id: DebtId) -> Self {
        self.debt_id = Some(id);
        self
    }
}

/// Alert in the hub's history
#[derive(Clone, Debug, PartialEq)]
pub struct AlertRecord {
    pub id: u64,
    pub alert: DebtAlert,
    pub acknowledged: bool,
}

type AlertCallback = Box<dyn Fn(&DebtAlert) + Send + Sync>;

struct Subscriber {
    min_level: AlertLevel,
    callback: AlertCallback,
}

/// Alerts kept in history by default
pub const DEFAULT_MAX_ALERT_HISTORY: usize = 256;

/// Alert dispatch and bounded history
///
/// Once the history holds `max_history` records the oldest is dropped for
/// each new alert.
pub struct AlertHub {
    subscribers: Vec<Subscriber>,
    history: VecDeque<AlertRecord>,
    max_history: usize,
    next_id: u64,
}

impl AlertHub {
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_ALERT_HISTORY)
    }

    pub fn with_max_history(max_history: usize) -> Self {
        AlertHub {
            subscribers: Vec::new(),
            history: VecDeque::new(),
            max_history,
            next_id: 1,
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Register a callback for every alert
    pub fn register<F>(&mut self, callback: F)
    where
        F: Fn(&DebtAlert) + Send + Sync + 'static,
    {
        self.subscribe(AlertLevel::Low, callback);
    }

    /// Register a callback for alerts at or above `min_level`
    pub fn subscribe<F>(&mut self, min_level: AlertLevel, callback: F)
    where
        F: Fn(&DebtAlert) + Send + Sync + 'static,
    {
        self.subscribers.push(Subscriber {
            min_level,
            callback: Box::new(callback),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Record and dispatch an alert, returning its history id
    pub fn raise(&mut self, alert: DebtAlert) -> u64 {
        match alert.level {
            AlertLevel::High | AlertLevel::Critical => warn!(
                level = %alert.level,
                ratio = alert.debt_ratio,
                "{}",
                alert.message
            ),
            _ => info!(
                level = %alert.level,
                ratio = alert.debt_ratio,
                "{}",
                alert.message
            ),
        }

        for subscriber in &self.subscribers {
            if alert.level >= subscriber.min_level {
                (subscriber.callback)(&alert);
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.history.push_back(AlertRecord {
            id,
            alert,
            acknowledged: false,
        });
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
        id
    }

    /// Mark an alert as handled; returns false for unknown ids
    pub fn acknowledge(&mut self, id: u64) -> bool {
        match self.history.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.acknowledged = true;
                true
            }
            None => false,
        }
    }

    pub fn acknowledge_all(&mut self) {
        for record in &mut self.history {
            record.acknowledged = true;
        }
    }

    /// Retained alerts, oldest first
    pub fn history(&self) -> &VecDeque<AlertRecord> {
        &self.history
    }

    pub fn unacknowledged(&self) -> impl Iterator<Item = &AlertRecord> + '_ {
        self.history.iter().filter(|r| !r.acknowledged)
    }

    /// Highest level among unacknowledged alerts
    pub fn highest_pending(&self) -> AlertLevel {
        self.unacknowledged()
            .map(|r| r.alert.level)
            .max()
            .unwrap_or_default()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for AlertHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AlertHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertHub")
            .field("subscribers", &self.subscribers.len())
            .field("history", &self.history.len())
            .field("max_history", &self.max_history)
            .finish()
    }
}
