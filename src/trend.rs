use std::cmp::Ordering;

use serde::Serialize;

use crate::{
    data::{JourneyInsight, Route},
    registry::Registry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trend {
    /// Summed flow bias over the ridden stops, 0 when the insight is unknown.
    pub sum: i32,
    pub insight: JourneyInsight,
}

impl Trend {
    pub const UNKNOWN: Trend = Trend {
        sum: 0,
        insight: JourneyInsight::Unknown,
    };
}

/// Sums flow bias over the stops after `boarding_stop` up to and including
/// `dropping_stop`. Net alighting means the bus empties out on the way.
pub fn analyze_trend(
    registry: &Registry,
    route: Option<&Route>,
    boarding_stop: &str,
    dropping_stop: &str,
) -> Trend {
    let Some(route) = route else {
        return Trend::UNKNOWN;
    };
    let (Some(boarding), Some(dropping)) =
        (route.position(boarding_stop), route.position(dropping_stop))
    else {
        return Trend::UNKNOWN;
    };
    // Travel against the stored direction has no meaningful interval.
    if dropping <= boarding {
        return Trend::UNKNOWN;
    }

    let sum: i32 = route.stops[boarding + 1..=dropping]
        .iter()
        .map(|stop| registry.flow_bias(stop))
        .sum();
    let insight = match sum.cmp(&0) {
        Ordering::Greater => JourneyInsight::Decreasing,
        Ordering::Less => JourneyInsight::Increasing,
        Ordering::Equal => JourneyInsight::Stable,
    };
    Trend { sum, insight }
}
