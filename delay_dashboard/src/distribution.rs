use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

use crate::cleaning::CleanedRentals;
use crate::model::{CheckinType, DelayCategory, Lateness, RentalState};

/// One bar or pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

/// One bar of the delay-by-check-in chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedShare {
    pub category: String,
    pub checkin_type: String,
    pub count: usize,
    pub percentage: f64,
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn tally<K: Eq + Hash>(keys: impl Iterator<Item = K>) -> HashMap<K, usize> {
    let mut counts = HashMap::new();
    for k in keys {
        *counts.entry(k).or_insert(0) += 1;
    }
    counts
}

fn shares<K: Eq + Hash + Copy>(
    order: &[K],
    label: impl Fn(&K) -> &'static str,
    counts: &HashMap<K, usize>,
    total: usize,
) -> Vec<Share> {
    order
        .iter()
        .map(|k| {
            let count = counts.get(k).copied().unwrap_or(0);
            Share {
                label: label(k).to_string(),
                count,
                percentage: pct(count, total),
            }
        })
        .collect()
}

pub fn checkin_split(table: &CleanedRentals) -> Vec<Share> {
    let counts = tally(table.records().map(|r| r.checkin_type));
    shares(&CheckinType::ALL, CheckinType::label, &counts, table.len())
}

pub fn state_split(table: &CleanedRentals) -> Vec<Share> {
    let counts = tally(table.records().map(|r| r.state));
    shares(&RentalState::ALL, RentalState::label, &counts, table.len())
}

/// Every bucket in display order, empty ones included.
pub fn delay_distribution(table: &CleanedRentals) -> Vec<Share> {
    let counts = tally(table.rows().iter().map(|r| r.category));
    shares(&DelayCategory::ORDERED, DelayCategory::label, &counts, table.len())
}

pub fn lateness_split(table: &CleanedRentals) -> Vec<Share> {
    let counts = tally(table.rows().iter().map(|r| r.category.lateness()));
    shares(&Lateness::ALL, Lateness::label, &counts, table.len())
}

/// Buckets crossed with check-in type; percentages over the whole table.
/// Pairs with no rental are left out.
pub fn delay_by_checkin(table: &CleanedRentals) -> Vec<GroupedShare> {
    let counts = tally(
        table
            .rows()
            .iter()
            .map(|r| (r.category, r.record.checkin_type)),
    );
    let mut out = Vec::new();
    for cat in DelayCategory::ORDERED {
        for checkin in CheckinType::ALL {
            if let Some(&count) = counts.get(&(cat, checkin)) {
                out.push(GroupedShare {
                    category: cat.label().to_string(),
                    checkin_type: checkin.label().to_string(),
                    count,
                    percentage: pct(count, table.len()),
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RentalRecord;

    fn rental(checkin: CheckinType, state: RentalState, delay: Option<f64>) -> RentalRecord {
        RentalRecord {
            rental_id: "r".into(),
            car_id: "c".into(),
            checkin_type: checkin,
            state,
            delay_at_checkout_in_minutes: delay,
            previous_ended_rental_id: None,
            time_delta_with_previous_rental_in_minutes: None,
        }
    }

    fn table() -> CleanedRentals {
        CleanedRentals::clean(vec![
            rental(CheckinType::Mobile, RentalState::Ended, Some(-10.0)),
            rental(CheckinType::Mobile, RentalState::Ended, Some(30.0)),
            rental(CheckinType::Connect, RentalState::Ended, Some(45.0)),
            rental(CheckinType::Mobile, RentalState::Canceled, None),
        ])
    }

    #[test]
    fn splits_sum_to_table_size() {
        let t = table();
        let checkin = checkin_split(&t);
        assert_eq!(checkin[0].label, "mobile");
        assert_eq!(checkin[0].count, 3);
        assert_eq!(checkin[1].percentage, 25.0);
        let state = state_split(&t);
        assert_eq!(state.iter().map(|s| s.count).sum::<usize>(), 4);
        assert_eq!(state[1].label, "canceled");
    }

    #[test]
    fn delay_distribution_keeps_axis_order() {
        let d = delay_distribution(&table());
        assert_eq!(d.len(), 9);
        assert_eq!(d[0].label, "Early or in time");
        assert_eq!(d[1].count, 2);
        assert_eq!(d[2].count, 0);
        assert_eq!(d[8].label, "Unknown");
        assert_eq!(d[8].percentage, 25.0);
    }

    #[test]
    fn lateness_groups() {
        let l = lateness_split(&table());
        assert_eq!(
            l.iter().map(|s| (s.label.as_str(), s.count)).collect::<Vec<_>>(),
            vec![("Early or in time", 1), ("Late", 2), ("Unknown", 1)]
        );
    }

    #[test]
    fn grouped_skips_empty_pairs() {
        let g = delay_by_checkin(&table());
        assert_eq!(g.len(), 4);
        let under_hour: Vec<_> = g.iter().filter(|s| s.category == "< 1 hour").collect();
        assert_eq!(under_hour.len(), 2);
        assert_eq!(g.iter().map(|s| s.percentage).sum::<f64>(), 100.0);
    }

    #[test]
    fn empty_table_has_zero_percentages() {
        let t = CleanedRentals::clean(vec![]);
        assert!(delay_distribution(&t).iter().all(|s| s.percentage == 0.0));
        assert!(delay_by_checkin(&t).is_empty());
    }
}
