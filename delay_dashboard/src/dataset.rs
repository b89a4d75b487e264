use serde::Serialize;

use crate::cleaning::{CleanedRentals, OutlierStats};
use crate::conflicts::{self, ConflictSummary};
use crate::distribution::{self, GroupedShare, Share};
use crate::loader::{self, LoadError};
use crate::model::{PricingRecord, RentalRecord};
use crate::sweep::{self, Scope, ScopedImpact, ThresholdImpactRow, ThresholdLadder};

/// Everything the dashboard serves, built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    rentals: CleanedRentals,
    raw_rentals: usize,
    pricing_rows: usize,
    mean_price_per_day: f64,
    ladder: ThresholdLadder,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub raw_rentals: usize,
    pub rentals: usize,
    pub outliers: OutlierStats,
    pub pricing_rows: usize,
    pub mean_price_per_day: f64,
    pub checkin_types: Vec<Share>,
    pub states: Vec<Share>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DelaysView {
    pub distribution: Vec<Share>,
    pub by_checkin_type: Vec<GroupedShare>,
    pub lateness: Vec<Share>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepView {
    pub mean_price_per_day: f64,
    pub thresholds: Vec<u32>,
    pub rows: Vec<ThresholdImpactRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ThresholdView {
    Full(ThresholdImpactRow),
    Scoped(ScopedImpact),
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub overview: Overview,
    pub delays: DelaysView,
    pub conflicts: ConflictSummary,
    pub thresholds: SweepView,
}

impl Dataset {
    pub fn new(
        rentals: Vec<RentalRecord>,
        pricing: &[PricingRecord],
        ladder: ThresholdLadder,
    ) -> Result<Self, LoadError> {
        let mean_price_per_day = loader::mean_price_per_day(pricing)?;
        let raw_rentals = rentals.len();
        Ok(Self {
            rentals: CleanedRentals::clean(rentals),
            raw_rentals,
            pricing_rows: pricing.len(),
            mean_price_per_day,
            ladder,
        })
    }

    /// Fetches and cleans both tables. Any failure here is fatal for the
    /// caller: there is no degraded mode.
    pub async fn load(
        client: &reqwest::Client,
        rentals_source: &str,
        pricing_source: &str,
        ladder: ThresholdLadder,
    ) -> Result<Self, LoadError> {
        let (rentals, pricing) = tokio::try_join!(
            loader::load_rentals(client, rentals_source),
            loader::load_pricing(client, pricing_source),
        )?;
        Self::new(rentals, &pricing, ladder)
    }

    pub fn rentals(&self) -> &CleanedRentals {
        &self.rentals
    }

    pub fn ladder(&self) -> &ThresholdLadder {
        &self.ladder
    }

    pub fn mean_price_per_day(&self) -> f64 {
        self.mean_price_per_day
    }

    pub fn overview(&self) -> Overview {
        Overview {
            raw_rentals: self.raw_rentals,
            rentals: self.rentals.len(),
            outliers: *self.rentals.outliers(),
            pricing_rows: self.pricing_rows,
            mean_price_per_day: self.mean_price_per_day,
            checkin_types: distribution::checkin_split(&self.rentals),
            states: distribution::state_split(&self.rentals),
        }
    }

    pub fn delays(&self) -> DelaysView {
        DelaysView {
            distribution: distribution::delay_distribution(&self.rentals),
            by_checkin_type: distribution::delay_by_checkin(&self.rentals),
            lateness: distribution::lateness_split(&self.rentals),
        }
    }

    pub fn conflicts(&self) -> ConflictSummary {
        conflicts::summarize(&self.rentals)
    }

    pub fn thresholds(&self) -> SweepView {
        SweepView {
            mean_price_per_day: self.mean_price_per_day,
            thresholds: self.ladder.as_slice().to_vec(),
            rows: sweep::sweep(&self.rentals, &self.ladder, self.mean_price_per_day),
        }
    }

    /// `None` when `minutes` is not on the ladder.
    pub fn threshold(&self, minutes: u32, scope: Option<Scope>) -> Option<ThresholdView> {
        if !self.ladder.contains(minutes) {
            return None;
        }
        let single = ThresholdLadder::new(vec![minutes]).ok()?;
        let row = sweep::sweep(&self.rentals, &single, self.mean_price_per_day)
            .into_iter()
            .next()?;
        Some(match scope {
            Some(scope) => ThresholdView::Scoped(row.scoped(scope)),
            None => ThresholdView::Full(row),
        })
    }

    pub fn report(&self) -> Report {
        Report {
            overview: self.overview(),
            delays: self.delays(),
            conflicts: self.conflicts(),
            thresholds: self.thresholds(),
        }
    }
}
