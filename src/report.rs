use std::fmt;

use serde::Serialize;

use crate::{
    assessment::AssessmentResult,
    data::{Alert, ClassifierVerdict},
    error::UnknownRouteWarning,
    trip::RouteTag,
};

pub const CAPTION: &str =
    "Crowd level is based on historical patterns, not just current occupancy";

/// User-facing response for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub route_label: String,
    pub route_id: RouteTag,
    pub boarding_stop: String,
    pub boarding_stop_id: Option<u32>,
    pub dropping_stop: String,
    pub ticket_count: u32,
    pub capacity: u32,
    pub verdict: ClassifierVerdict,
    pub trend_sum: i32,
    #[serde(flatten)]
    pub assessment: AssessmentResult,
    pub warning: Option<UnknownRouteWarning>,
}

impl Prediction {
    pub fn alert_message(&self) -> &'static str {
        self.assessment.alert_reason.message()
    }

    pub fn journey_message(&self) -> String {
        self.assessment.journey_insight.message(&self.dropping_stop)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.assessment.alert {
            Alert::Critical => "[!!]",
            Alert::Moderate => "[!]",
            Alert::Normal => "[ok]",
        };
        writeln!(f, "{}", CAPTION)?;
        writeln!(f, "Route: {}  |  Route ID: {}", self.route_label, self.route_id)?;
        if let Some(id) = self.boarding_stop_id {
            writeln!(f, "Stop: {} (#{})", self.boarding_stop, id)?;
        }
        writeln!(f, "Boarding Stop: {}", self.boarding_stop)?;
        writeln!(f, "Dropping Stop: {}", self.dropping_stop)?;
        writeln!(f, "{} {}", marker, self.alert_message())?;
        writeln!(f, "Occupancy (%): {:.2}", self.assessment.occupancy_pct)?;
        writeln!(f, "Expected Crowd Pattern: {}", self.assessment.crowd_level)?;
        write!(f, "{}", self.journey_message())
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::{
        assessment::assess,
        data::{CrowdLevel, JourneyInsight},
    };

    fn prediction(insight: JourneyInsight) -> Prediction {
        Prediction {
            route_label: "Sitabuldi → MIHAN".to_owned(),
            route_id: RouteTag::from_label("Sitabuldi → MIHAN"),
            boarding_stop: "Sitabuldi".to_owned(),
            boarding_stop_id: Some(1),
            dropping_stop: "MIHAN".to_owned(),
            ticket_count: 60,
            capacity: 50,
            verdict: CrowdLevel::High,
            trend_sum: 2,
            assessment: assess(
                CrowdLevel::High,
                60,
                NonZeroU32::new(50).unwrap(),
                insight,
            ),
            warning: None,
        }
    }

    #[test]
    fn text_report_carries_messages() {
        let text = prediction(JourneyInsight::Decreasing).to_string();
        assert!(text.contains("Route: Sitabuldi → MIHAN"));
        assert!(text.contains("[!!] Overcapacity detected (immediate action required)"));
        assert!(text.contains("Occupancy (%): 100.00"));
        assert!(text.contains("Expected Crowd Pattern: HIGH"));
        assert!(text.ends_with("Crowd will reduce as you approach MIHAN"));
    }

    #[test]
    fn json_report_is_flat() {
        let json = serde_json::to_value(prediction(JourneyInsight::Unknown)).unwrap();
        assert_eq!(json["crowd_level"], "HIGH");
        assert_eq!(json["alert"], "CRITICAL");
        assert_eq!(json["alert_reason"], "overcapacity");
        assert_eq!(json["journey_insight"], "UNKNOWN");
        assert_eq!(json["raw_occupancy_pct"], 120.0);
        assert!(json["warning"].is_null());
    }
}
