//! Threshold/scope sensitivity analysis.
//!
//! For every candidate minimum gap between two rentals of the same car, how
//! many rentals the policy would touch, how much revenue they carry and how
//! many past conflicts it would have prevented.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cleaning::CleanedRentals;
use crate::conflicts::detect_conflicts;

pub const DEFAULT_THRESHOLDS: [u32; 8] = [30, 60, 90, 120, 180, 360, 720, 1440];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LadderError {
    #[error("threshold ladder is empty")]
    Empty,
    #[error("thresholds must be positive, got {0}")]
    NotPositive(u32),
    #[error("thresholds must be strictly increasing ({prev} then {next})")]
    NotIncreasing { prev: u32, next: u32 },
}

/// Ordered candidate thresholds, in minutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdLadder(Vec<u32>);

impl ThresholdLadder {
    pub fn new(thresholds: Vec<u32>) -> Result<Self, LadderError> {
        if thresholds.is_empty() {
            return Err(LadderError::Empty);
        }
        if let Some(&t) = thresholds.iter().find(|t| **t == 0) {
            return Err(LadderError::NotPositive(t));
        }
        for w in thresholds.windows(2) {
            if w[1] <= w[0] {
                return Err(LadderError::NotIncreasing { prev: w[0], next: w[1] });
            }
        }
        Ok(Self(thresholds))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn contains(&self, threshold: u32) -> bool {
        self.0.binary_search(&threshold).is_ok()
    }
}

impl Default for ThresholdLadder {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLDS.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Connect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdImpactRow {
    pub threshold_minutes: u32,
    pub affected_all: usize,
    pub affected_connect: usize,
    /// Both affected percentages are over all rentals.
    pub affected_all_pct: f64,
    pub affected_connect_pct: f64,
    pub revenue_impact_ratio: f64,
    pub revenue_impact_pct: f64,
    pub resolved_all: usize,
    pub resolved_connect: usize,
    /// Over all conflicts.
    pub resolved_all_pct: f64,
    /// Over connect conflicts.
    pub resolved_connect_pct: f64,
}

/// A row seen through one scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopedImpact {
    pub threshold_minutes: u32,
    pub scope: Scope,
    pub affected: usize,
    pub affected_pct: f64,
    pub resolved: usize,
    pub resolved_pct: f64,
    pub revenue_impact_pct: f64,
}

impl ThresholdImpactRow {
    pub fn scoped(&self, scope: Scope) -> ScopedImpact {
        let (affected, affected_pct, resolved, resolved_pct) = match scope {
            Scope::All => (
                self.affected_all,
                self.affected_all_pct,
                self.resolved_all,
                self.resolved_all_pct,
            ),
            Scope::Connect => (
                self.affected_connect,
                self.affected_connect_pct,
                self.resolved_connect,
                self.resolved_connect_pct,
            ),
        };
        ScopedImpact {
            threshold_minutes: self.threshold_minutes,
            scope,
            affected,
            affected_pct,
            resolved,
            resolved_pct,
            revenue_impact_pct: self.revenue_impact_pct,
        }
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// One row per ladder threshold, in ladder order.
///
/// Every rental is valued at the same `mean_price_per_day` (the pricing table
/// is never joined per car), so the revenue ratio equals the affected share.
pub fn sweep(
    table: &CleanedRentals,
    ladder: &ThresholdLadder,
    mean_price_per_day: f64,
) -> Vec<ThresholdImpactRow> {
    let conflicts = detect_conflicts(table);
    let total = table.len();
    let total_revenue = total as f64 * mean_price_per_day;
    let conflicts_all = conflicts.len() as f64;
    let conflicts_connect = conflicts.connect_count() as f64;

    ladder
        .as_slice()
        .iter()
        .map(|&threshold_minutes| {
            let t = f64::from(threshold_minutes);
            let (affected_all, affected_connect) = table
                .records()
                .filter(|r| r.time_delta_with_previous_rental_in_minutes.is_some_and(|d| d <= t))
                .fold((0usize, 0usize), |(all, connect), r| {
                    (all + 1, connect + usize::from(r.is_connect()))
                });
            let affected_revenue = affected_all as f64 * mean_price_per_day;
            let revenue_impact_ratio = ratio(affected_revenue, total_revenue);
            let resolved_all = conflicts.resolved_by(t, false);
            let resolved_connect = conflicts.resolved_by(t, true);

            ThresholdImpactRow {
                threshold_minutes,
                affected_all,
                affected_connect,
                affected_all_pct: ratio(affected_all as f64, total as f64) * 100.0,
                affected_connect_pct: ratio(affected_connect as f64, total as f64) * 100.0,
                revenue_impact_ratio,
                revenue_impact_pct: revenue_impact_ratio * 100.0,
                resolved_all,
                resolved_connect,
                resolved_all_pct: ratio(resolved_all as f64, conflicts_all) * 100.0,
                resolved_connect_pct: ratio(resolved_connect as f64, conflicts_connect) * 100.0,
            }
        })
        .collect()
}
