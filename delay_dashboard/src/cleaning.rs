use serde::Serialize;

use crate::model::{categorize_delay, DelayCategory, RentalRecord};

/// A rental that survived outlier removal, with its delay bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRental {
    pub record: RentalRecord,
    pub category: DelayCategory,
}

/// Parameters of the one-shot 3-sigma filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierStats {
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub removed: usize,
}

impl OutlierStats {
    /// Absent delays are always kept; so is everything when the bounds are
    /// undefined. Both bounds are inclusive.
    pub fn retains(&self, delay: Option<f64>) -> bool {
        match (delay, self.lower_bound, self.upper_bound) {
            (Some(d), Some(lo), Some(hi)) if !d.is_nan() => d >= lo && d <= hi,
            _ => true,
        }
    }
}

/// The cleaned rentals table. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRentals {
    rows: Vec<CleanRental>,
    outliers: OutlierStats,
}

/// Mean and sample standard deviation (n - 1).
pub fn mean_and_std(values: &[f64]) -> (Option<f64>, Option<f64>) {
    if values.is_empty() {
        return (None, None);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (Some(mean), None);
    }
    let var = values.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);
    (Some(mean), Some(var.sqrt()))
}

impl CleanedRentals {
    /// Drops every record whose checkout delay lies outside
    /// `[mean - 3 std, mean + 3 std]`. Records without a delay are kept: they
    /// carry the canceled rentals. Bounds are computed once, before removal.
    pub fn clean(raw: Vec<RentalRecord>) -> Self {
        let delays: Vec<f64> = raw
            .iter()
            .filter_map(|r| r.delay_at_checkout_in_minutes)
            .filter(|d| d.is_finite())
            .collect();
        let (mean, std_dev) = mean_and_std(&delays);
        let bounds = match (mean, std_dev) {
            (Some(m), Some(s)) => Some((m - 3.0 * s, m + 3.0 * s)),
            _ => None,
        };

        let mut outliers = OutlierStats {
            mean,
            std_dev,
            lower_bound: bounds.map(|b| b.0),
            upper_bound: bounds.map(|b| b.1),
            removed: 0,
        };

        let before = raw.len();
        let rows: Vec<CleanRental> = raw
            .into_iter()
            .filter(|r| outliers.retains(r.delay_at_checkout_in_minutes))
            .map(|record| CleanRental {
                category: categorize_delay(record.delay_at_checkout_in_minutes),
                record,
            })
            .collect();
        let removed = before - rows.len();
        outliers.removed = removed;

        tracing::info!(
            kept = rows.len(),
            removed,
            mean = ?mean,
            std_dev = ?std_dev,
            "checkout delay outliers removed"
        );

        Self { rows, outliers }
    }

    pub fn rows(&self) -> &[CleanRental] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn outliers(&self) -> &OutlierStats {
        &self.outliers
    }

    pub fn records(&self) -> impl Iterator<Item = &RentalRecord> {
        self.rows.iter().map(|r| &r.record)
    }
}
