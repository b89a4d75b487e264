//! Property-based checks for the delay analysis.
//!
//! 1. **Categorization totality**: every delay, absent included, lands in
//!    exactly one bucket, and the bucket's bounds contain the delay.
//!
//! 2. **Outlier filter**: absent delays always survive; everything that
//!    survives lies within the inclusive 3-sigma bounds; everything removed
//!    lies outside them.
//!
//! 3. **Threshold monotonicity**: every sweep quantity is non-decreasing
//!    along the ladder.
//!
//! 4. **Revenue degeneracy**: the revenue ratio equals the affected share.

use delay_dashboard::cleaning::CleanedRentals;
use delay_dashboard::conflicts::{detect_conflicts, is_conflict};
use delay_dashboard::model::{
    categorize_delay, CheckinType, DelayCategory, RentalRecord, RentalState,
};
use delay_dashboard::sweep::{sweep, ThresholdLadder};
use proptest::prelude::*;

fn arb_delay() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (-600.0f64..3000.0).prop_map(Some),
        1 => prop::sample::select(vec![0.0, 60.0, 120.0, 180.0, 360.0, 720.0, 1440.0]).prop_map(Some),
    ]
}

fn arb_rental() -> impl Strategy<Value = RentalRecord> {
    (
        any::<bool>(),
        any::<bool>(),
        arb_delay(),
        prop::option::of(0.0f64..1500.0),
    )
        .prop_map(|(connect, ended, delay, delta)| RentalRecord {
            rental_id: "r".into(),
            car_id: "c".into(),
            checkin_type: if connect { CheckinType::Connect } else { CheckinType::Mobile },
            state: if ended { RentalState::Ended } else { RentalState::Canceled },
            delay_at_checkout_in_minutes: delay,
            previous_ended_rental_id: None,
            time_delta_with_previous_rental_in_minutes: delta,
        })
}

fn bounds(cat: DelayCategory) -> (f64, f64) {
    match cat {
        DelayCategory::EarlyOrInTime => (f64::NEG_INFINITY, 0.0),
        DelayCategory::UnderOneHour => (0.0, 60.0),
        DelayCategory::OneToTwoHours => (60.0, 120.0),
        DelayCategory::TwoToThreeHours => (120.0, 180.0),
        DelayCategory::ThreeToSixHours => (180.0, 360.0),
        DelayCategory::SixToTwelveHours => (360.0, 720.0),
        DelayCategory::TwelveToTwentyFourHours => (720.0, 1440.0),
        DelayCategory::OneDayOrMore => (1440.0, f64::INFINITY),
        DelayCategory::Unknown => (f64::NAN, f64::NAN),
    }
}

proptest! {
    #[test]
    fn categorization_is_total(delay in arb_delay()) {
        let cat = categorize_delay(delay);
        prop_assert!(DelayCategory::ORDERED.contains(&cat));
        match delay {
            None => prop_assert_eq!(cat, DelayCategory::Unknown),
            Some(d) => {
                prop_assert_ne!(cat, DelayCategory::Unknown);
                let (lo, hi) = bounds(cat);
                if cat == DelayCategory::EarlyOrInTime {
                    prop_assert!(d <= hi);
                } else if cat == DelayCategory::OneDayOrMore {
                    prop_assert!(d >= lo);
                } else if cat == DelayCategory::UnderOneHour {
                    prop_assert!(d > lo && d < hi);
                } else {
                    prop_assert!(d >= lo && d < hi);
                }
            }
        }
    }

    #[test]
    fn outlier_filter_respects_bounds(raw in prop::collection::vec(arb_rental(), 0..60)) {
        let absent = raw.iter().filter(|r| r.delay_at_checkout_in_minutes.is_none()).count();
        let cleaned = CleanedRentals::clean(raw.clone());
        let stats = *cleaned.outliers();

        let kept_absent = cleaned.records().filter(|r| r.delay_at_checkout_in_minutes.is_none()).count();
        prop_assert_eq!(kept_absent, absent);
        prop_assert_eq!(cleaned.len() + stats.removed, raw.len());

        for r in &raw {
            let kept = stats.retains(r.delay_at_checkout_in_minutes);
            if let (Some(d), Some(lo), Some(hi)) =
                (r.delay_at_checkout_in_minutes, stats.lower_bound, stats.upper_bound)
            {
                prop_assert_eq!(kept, d >= lo && d <= hi);
            } else {
                prop_assert!(kept);
            }
        }
    }

    #[test]
    fn sweep_is_monotonic(raw in prop::collection::vec(arb_rental(), 0..80), price in 1.0f64..500.0) {
        let table = CleanedRentals::clean(raw);
        let rows = sweep(&table, &ThresholdLadder::default(), price);
        for w in rows.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            prop_assert!(a.threshold_minutes < b.threshold_minutes);
            prop_assert!(a.affected_all <= b.affected_all);
            prop_assert!(a.affected_connect <= b.affected_connect);
            prop_assert!(a.revenue_impact_ratio <= b.revenue_impact_ratio);
            prop_assert!(a.resolved_all <= b.resolved_all);
            prop_assert!(a.resolved_connect <= b.resolved_connect);
        }
        for r in &rows {
            prop_assert!(r.affected_connect <= r.affected_all);
            prop_assert!(r.resolved_connect <= r.resolved_all);
            prop_assert!(r.resolved_all <= detect_conflicts(&table).len());
        }
    }

    #[test]
    fn revenue_ratio_equals_affected_share(raw in prop::collection::vec(arb_rental(), 1..80), price in 1.0f64..500.0) {
        let table = CleanedRentals::clean(raw);
        for r in sweep(&table, &ThresholdLadder::default(), price) {
            let share = r.affected_all as f64 / table.len() as f64;
            prop_assert!((r.revenue_impact_ratio - share).abs() < 1e-12);
        }
    }

    #[test]
    fn conflict_iff_overrun(delta in 0.0f64..1500.0, delay in -600.0f64..3000.0) {
        let r = RentalRecord {
            rental_id: "r".into(),
            car_id: "c".into(),
            checkin_type: CheckinType::Mobile,
            state: RentalState::Ended,
            delay_at_checkout_in_minutes: Some(delay),
            previous_ended_rental_id: None,
            time_delta_with_previous_rental_in_minutes: Some(delta),
        };
        prop_assert_eq!(is_conflict(&r), delay > delta);
    }
}
