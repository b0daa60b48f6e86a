use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Stop {
    /// Only the fixed display subset carries a numeric id. Transfer points
    /// such as "Zero Mile" are known by name alone.
    pub id: Option<u32>,
    pub name: String,
    /// Negative: passengers usually board here. Positive: they usually get down.
    pub flow_bias: i32,
}

/// Ordered stop names travelled between two named endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub origin: String,
    pub destination: String,
    pub stops: Vec<String>,
}

impl Route {
    pub fn label(&self) -> String {
        route_label(&self.origin, &self.destination)
    }

    pub fn position(&self, stop_name: &str) -> Option<usize> {
        self.stops.iter().position(|stop| stop == stop_name)
    }
}

pub fn route_label(origin: &str, destination: &str) -> String {
    format!("{} → {}", origin, destination)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrowdLevel {
    Low,
    Medium,
    High,
}

impl CrowdLevel {
    /// Class index used by the crowd model.
    pub fn from_class_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(CrowdLevel::Low),
            1 => Some(CrowdLevel::Medium),
            2 => Some(CrowdLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for CrowdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CrowdLevel::Low => "LOW",
            CrowdLevel::Medium => "MEDIUM",
            CrowdLevel::High => "HIGH",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for CrowdLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<u8>() {
            return CrowdLevel::from_class_index(index).ok_or_else(|| s.to_owned());
        }
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(CrowdLevel::Low),
            "MEDIUM" => Ok(CrowdLevel::Medium),
            "HIGH" => Ok(CrowdLevel::High),
            _ => Err(s.to_owned()),
        }
    }
}

/// Label produced by the external crowd model, before any post-processing.
pub type ClassifierVerdict = CrowdLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Alert {
    Normal,
    Moderate,
    Critical,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Alert::Normal => "NORMAL",
            Alert::Moderate => "MODERATE",
            Alert::Critical => "CRITICAL",
        };
        write!(f, "{}", label)
    }
}

/// Which alert rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    Overcapacity,
    FullButCalm,
    OvercrowdingRisk,
    ModerateCrowd,
    Normal,
}

impl AlertReason {
    pub fn severity(self) -> Alert {
        match self {
            AlertReason::Overcapacity | AlertReason::FullButCalm | AlertReason::OvercrowdingRisk => {
                Alert::Critical
            }
            AlertReason::ModerateCrowd => Alert::Moderate,
            AlertReason::Normal => Alert::Normal,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AlertReason::Overcapacity => "Overcapacity detected (immediate action required)",
            AlertReason::FullButCalm => "Bus is calm but fully occupied. Safety action required.",
            AlertReason::OvercrowdingRisk => "Overcrowding risk detected",
            AlertReason::ModerateCrowd => "Moderate crowd, monitor closely",
            AlertReason::Normal => "Crowd level normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JourneyInsight {
    Increasing,
    Decreasing,
    Stable,
    Unknown,
}

impl JourneyInsight {
    pub fn message(self, dropping_stop: &str) -> String {
        match self {
            JourneyInsight::Decreasing => {
                format!("Crowd will reduce as you approach {}", dropping_stop)
            }
            JourneyInsight::Increasing => {
                format!("Crowd will increase as you approach {}", dropping_stop)
            }
            JourneyInsight::Stable => "Crowd will remain stable during this journey".to_owned(),
            JourneyInsight::Unknown => "No crowd-flow data for this route".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    #[default]
    Weekday,
    Weekend,
}

impl DayType {
    /// Encoding expected by the crowd model.
    pub fn as_feature(self) -> u8 {
        match self {
            DayType::Weekday => 0,
            DayType::Weekend => 1,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayType::Weekday => write!(f, "weekday"),
            DayType::Weekend => write!(f, "weekend"),
        }
    }
}

impl FromStr for DayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekday" | "0" => Ok(DayType::Weekday),
            "weekend" | "1" => Ok(DayType::Weekend),
            _ => Err(format!(
                "Bad day type {:?}, expected \"weekday\" or \"weekend\"",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crowd_level_parses_indices_and_names() {
        assert_eq!("0".parse::<CrowdLevel>(), Ok(CrowdLevel::Low));
        assert_eq!(" 2\n".parse::<CrowdLevel>(), Ok(CrowdLevel::High));
        assert_eq!("medium".parse::<CrowdLevel>(), Ok(CrowdLevel::Medium));
        assert_eq!("3".parse::<CrowdLevel>(), Err("3".to_owned()));
        assert!("CROWDED".parse::<CrowdLevel>().is_err());
    }

    #[test]
    fn alert_reasons_map_to_severity() {
        assert_eq!(AlertReason::FullButCalm.severity(), Alert::Critical);
        assert_eq!(AlertReason::ModerateCrowd.severity(), Alert::Moderate);
        assert_eq!(AlertReason::Normal.severity(), Alert::Normal);
    }

    #[test]
    fn route_positions_are_by_name() {
        let route = Route {
            origin: "Civil Lines".to_owned(),
            destination: "Sadar".to_owned(),
            stops: vec![
                "Civil Lines".to_owned(),
                "Zero Mile".to_owned(),
                "Sadar".to_owned(),
            ],
        };
        assert_eq!(route.label(), "Civil Lines → Sadar");
        assert_eq!(route.position("Zero Mile"), Some(1));
        assert_eq!(route.position("Ajni"), None);
    }
}
