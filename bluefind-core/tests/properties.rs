//! Property tests for the estimation invariants

#![cfg(test)]

use bluefind_core::{
    DeviceSignalTracker, DistanceEstimator, HeadingSmoother, MovementTrend, RelativeDirection,
    SignalSample,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn distance_always_within_clamp(rssi in any::<i32>()) {
        let estimate = DistanceEstimator::default().estimate(rssi);
        prop_assert!(estimate.distance_m >= 0.1 && estimate.distance_m <= 50.0);
        prop_assert!(estimate.confidence >= 0.0 && estimate.confidence <= 1.0);
    }

    #[test]
    fn distance_monotone_in_rssi(a in -100i32..=-30, b in -100i32..=-30) {
        let estimator = DistanceEstimator::default();
        let (weaker, stronger) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(estimator.distance_m(weaker) >= estimator.distance_m(stronger));
    }

    #[test]
    fn history_keeps_most_recent_twenty(rssis in proptest::collection::vec(-110i32..-20, 1..60)) {
        let mut tracker = DeviceSignalTracker::default();
        for (i, rssi) in rssis.iter().enumerate() {
            let t = i as u64 * 100;
            tracker.record(&SignalSample::new("tag", *rssi, t), 0.0, t);
        }

        let kept: Vec<i32> = tracker
            .history("tag")
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.rssi)
            .collect();
        let expected = &rssis[rssis.len().saturating_sub(20)..];
        prop_assert_eq!(kept.as_slice(), expected);
    }

    #[test]
    fn steady_decline_is_receding(
        start in -60i32..-30,
        steps in proptest::collection::vec(3i32..8, 2..19),
    ) {
        let mut tracker = DeviceSignalTracker::default();
        let mut rssi = start;
        tracker.record(&SignalSample::new("tag", rssi, 0), 0.0, 0);
        for (i, step) in steps.iter().enumerate() {
            rssi -= step;
            let t = (i as u64 + 1) * 100;
            tracker.record(&SignalSample::new("tag", rssi, t), 0.0, t);
        }
        prop_assert_eq!(tracker.trend("tag"), MovementTrend::Receding);
    }

    #[test]
    fn smoothed_heading_between_extremes(headings in proptest::collection::vec(0.0f32..359.0, 3..10)) {
        let mut smoother = HeadingSmoother::default();
        let mut last = 0.0;
        for heading in &headings {
            last = smoother.push_raw_heading(*heading);
        }

        let min = headings.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = headings.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        prop_assert!(last >= min - 1e-3 && last <= max + 1e-3);
        if max - min > 1.0 {
            prop_assert!(last > min && last < max);
        }
    }

    #[test]
    fn octants_total_and_periodic(whole in -720i32..720) {
        // half-degree offsets keep the arithmetic exact
        let offset = whole as f32 + 0.5;
        let direction = RelativeDirection::from_offset(offset);
        prop_assert!(!direction.text().is_empty());
        prop_assert_eq!(direction, RelativeDirection::from_offset(offset + 360.0));
    }

    #[test]
    fn same_bearing_is_ahead(heading in 0.0f32..360.0) {
        prop_assert_eq!(RelativeDirection::between(heading, heading), RelativeDirection::Ahead);
    }
}
