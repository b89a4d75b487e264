use serde::Serialize;

use crate::cleaning::CleanedRentals;
use crate::model::{Lateness, RentalRecord};

/// Rentals whose previous driver returned the car after their scheduled
/// check-in. Records missing either the gap or the delay are never members.
#[derive(Debug, Clone)]
pub struct ConflictSet<'a> {
    records: Vec<&'a RentalRecord>,
}

pub fn is_conflict(record: &RentalRecord) -> bool {
    record.delta_minus_late_checkout().is_some_and(|d| d < 0.0)
}

pub fn detect_conflicts(table: &CleanedRentals) -> ConflictSet<'_> {
    ConflictSet {
        records: table.records().filter(|r| is_conflict(r)).collect(),
    }
}

impl<'a> ConflictSet<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a RentalRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn connect_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_connect()).count()
    }

    /// Conflicts a mandatory gap of `threshold` minutes would have absorbed.
    pub fn resolved_by(&self, threshold: f64, connect_only: bool) -> usize {
        self.records
            .iter()
            .filter(|r| !connect_only || r.is_connect())
            .filter(|r| r.delay_at_checkout_in_minutes.is_some_and(|d| d <= threshold))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GapStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// How late checkouts affect the next driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictSummary {
    pub conflicts: usize,
    pub connect_conflicts: usize,
    pub late_checkouts: usize,
    /// Conflicts per 100 late checkouts; 0 when nobody was late.
    pub problematic_rate_pct: f64,
    pub mean_conflict_delay: Option<f64>,
    pub mean_late_delay: Option<f64>,
    pub previous_rental_gap: GapStats,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub fn summarize(table: &CleanedRentals) -> ConflictSummary {
    let set = detect_conflicts(table);
    let late_checkouts = table
        .rows()
        .iter()
        .filter(|r| r.category.lateness() == Lateness::Late)
        .count();
    let problematic_rate_pct = if late_checkouts == 0 {
        0.0
    } else {
        set.len() as f64 * 100.0 / late_checkouts as f64
    };

    let gaps: Vec<f64> = table
        .records()
        .filter_map(|r| r.time_delta_with_previous_rental_in_minutes)
        .collect();
    let previous_rental_gap = GapStats {
        count: gaps.len(),
        mean: mean(gaps.iter().copied()),
        min: gaps.iter().copied().reduce(f64::min),
        max: gaps.iter().copied().reduce(f64::max),
    };

    ConflictSummary {
        conflicts: set.len(),
        connect_conflicts: set.connect_count(),
        late_checkouts,
        problematic_rate_pct,
        mean_conflict_delay: mean(set.iter().filter_map(|r| r.delay_at_checkout_in_minutes)),
        mean_late_delay: mean(
            table
                .records()
                .filter_map(|r| r.delay_at_checkout_in_minutes)
                .filter(|d| *d > 0.0),
        ),
        previous_rental_gap,
    }
}
