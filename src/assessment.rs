use std::num::NonZeroU32;

use serde::Serialize;

use crate::data::{Alert, AlertReason, ClassifierVerdict, CrowdLevel, JourneyInsight};

/// Below this displayed occupancy a MEDIUM verdict is downgraded to LOW.
pub const DOWNGRADE_BELOW_PCT: f64 = 20.0;

/// A HIGH crowd level above this raw occupancy is an overcrowding risk.
pub const OVERCROWDING_ABOVE_PCT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub crowd_level: CrowdLevel,
    /// Capped at 100 and rounded to two decimals.
    pub occupancy_pct: f64,
    pub raw_occupancy_pct: f64,
    pub alert: Alert,
    pub alert_reason: AlertReason,
    pub journey_insight: JourneyInsight,
    /// The model said MEDIUM but the bus is nearly empty.
    pub downgraded: bool,
}

/// Reconciles the model verdict with live occupancy.
///
/// Pure: no side effects, identical inputs give identical results.
pub fn assess(
    verdict: ClassifierVerdict,
    ticket_count: u32,
    capacity: NonZeroU32,
    journey_insight: JourneyInsight,
) -> AssessmentResult {
    let raw_occupancy_pct = 100.0 * f64::from(ticket_count) / f64::from(capacity.get());
    let occupancy_pct = round_to_hundredths(raw_occupancy_pct.min(100.0));

    let downgraded = verdict == CrowdLevel::Medium && occupancy_pct < DOWNGRADE_BELOW_PCT;
    let crowd_level = if downgraded { CrowdLevel::Low } else { verdict };

    // Compare ticket counts for the capacity edges, not floats.
    let alert_reason = match ticket_count.cmp(&capacity.get()) {
        std::cmp::Ordering::Greater => AlertReason::Overcapacity,
        std::cmp::Ordering::Equal if crowd_level == CrowdLevel::Low => AlertReason::FullButCalm,
        _ if crowd_level == CrowdLevel::High && raw_occupancy_pct > OVERCROWDING_ABOVE_PCT => {
            AlertReason::OvercrowdingRisk
        }
        _ if crowd_level == CrowdLevel::Medium => AlertReason::ModerateCrowd,
        _ => AlertReason::Normal,
    };

    AssessmentResult {
        crowd_level,
        occupancy_pct,
        raw_occupancy_pct,
        alert: alert_reason.severity(),
        alert_reason,
        journey_insight,
        downgraded,
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    fn run(verdict: CrowdLevel, tickets: u32, cap: u32) -> AssessmentResult {
        assess(verdict, tickets, capacity(cap), JourneyInsight::Stable)
    }

    #[test]
    fn overcapacity_high_verdict() {
        let result = run(CrowdLevel::High, 60, 50);
        assert_eq!(result.raw_occupancy_pct, 120.0);
        assert_eq!(result.occupancy_pct, 100.0);
        assert_eq!(result.crowd_level, CrowdLevel::High);
        assert_eq!(result.alert, Alert::Critical);
        assert_eq!(result.alert_reason, AlertReason::Overcapacity);
    }

    #[test]
    fn nearly_empty_medium_is_downgraded() {
        let result = run(CrowdLevel::Medium, 5, 50);
        assert_eq!(result.raw_occupancy_pct, 10.0);
        assert_eq!(result.occupancy_pct, 10.0);
        assert_eq!(result.crowd_level, CrowdLevel::Low);
        assert!(result.downgraded);
        assert_eq!(result.alert, Alert::Normal);
    }

    #[test]
    fn full_but_calm_is_critical() {
        let result = run(CrowdLevel::Low, 50, 50);
        assert_eq!(result.raw_occupancy_pct, 100.0);
        assert_eq!(result.occupancy_pct, 100.0);
        assert_eq!(result.alert, Alert::Critical);
        assert_eq!(result.alert_reason, AlertReason::FullButCalm);
    }

    #[test]
    fn full_with_other_verdicts() {
        assert_eq!(
            run(CrowdLevel::Medium, 50, 50).alert_reason,
            AlertReason::ModerateCrowd
        );
        assert_eq!(
            run(CrowdLevel::High, 50, 50).alert_reason,
            AlertReason::OvercrowdingRisk
        );
    }

    #[test]
    fn overcapacity_wins_over_downgrade() {
        // 150% with every verdict
        for verdict in [CrowdLevel::Low, CrowdLevel::Medium, CrowdLevel::High] {
            let result = run(verdict, 3, 2);
            assert_eq!(result.raw_occupancy_pct, 150.0);
            assert_eq!(result.alert, Alert::Critical);
            assert_eq!(result.alert_reason, AlertReason::Overcapacity);
        }
    }

    #[test]
    fn downgrade_threshold_is_exclusive() {
        // exactly 20%
        let result = run(CrowdLevel::Medium, 10, 50);
        assert_eq!(result.crowd_level, CrowdLevel::Medium);
        assert!(!result.downgraded);
        assert_eq!(result.alert, Alert::Moderate);

        let result = run(CrowdLevel::Medium, 9, 50);
        assert_eq!(result.crowd_level, CrowdLevel::Low);
    }

    #[test]
    fn high_is_never_downgraded() {
        let result = run(CrowdLevel::High, 0, 50);
        assert_eq!(result.crowd_level, CrowdLevel::High);
        assert!(!result.downgraded);
        // not above 80%, so no overcrowding alert
        assert_eq!(result.alert, Alert::Normal);
    }

    #[test]
    fn overcrowding_threshold_is_exclusive() {
        assert_eq!(run(CrowdLevel::High, 40, 50).alert, Alert::Normal);
        assert_eq!(
            run(CrowdLevel::High, 41, 50).alert_reason,
            AlertReason::OvercrowdingRisk
        );
    }

    #[test]
    fn occupancy_is_rounded_and_capped() {
        let result = run(CrowdLevel::Low, 1, 3);
        assert_eq!(result.occupancy_pct, 33.33);
        assert!(result.raw_occupancy_pct > 33.333);

        for tickets in [0, 1, 49, 50, 51, 500] {
            let result = run(CrowdLevel::Low, tickets, 50);
            assert!((0.0..=100.0).contains(&result.occupancy_pct));
            assert!(result.raw_occupancy_pct >= 0.0);
        }
    }

    #[test]
    fn insight_passes_through_and_result_is_stable() {
        let first = assess(CrowdLevel::Medium, 30, capacity(50), JourneyInsight::Increasing);
        let second = assess(CrowdLevel::Medium, 30, capacity(50), JourneyInsight::Increasing);
        assert_eq!(first, second);
        assert_eq!(first.journey_insight, JourneyInsight::Increasing);
    }
}
