use std::{
    io::Write,
    process::{Command, Stdio},
};

use serde::Serialize;
use tracing::debug;

use crate::{
    data::ClassifierVerdict,
    error::ClassifierError,
    registry::Registry,
    trip::TripContext,
};

/// Stop id sent when the boarding stop has no numeric id.
pub const NO_STOP_ID: u32 = 0;

/// Input row of the crowd model. Field order is part of the model contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRecord {
    pub vehicle_id: u32,
    pub route_id: u16,
    pub stop_id: u32,
    pub ticket_count: u32,
    pub capacity: u32,
    pub day_type: u8,
    pub hour: u8,
    pub weekday: u8,
}

impl FeatureRecord {
    pub fn new(registry: &Registry, trip: &TripContext) -> Self {
        Self {
            vehicle_id: trip.vehicle_id,
            route_id: trip.route_id.0,
            stop_id: registry
                .stop(&trip.boarding_stop)
                .and_then(|stop| stop.id)
                .unwrap_or(NO_STOP_ID),
            ticket_count: trip.ticket_count,
            capacity: trip.capacity.get(),
            day_type: trip.day_type.as_feature(),
            hour: trip.hour,
            weekday: trip.weekday_index(),
        }
    }
}

/// A pre-trained crowd model. Returns the raw label it predicts.
pub trait CrowdModel {
    fn predict(&self, features: &FeatureRecord) -> Result<String, ClassifierError>;
}

impl<M: CrowdModel + ?Sized> CrowdModel for &M {
    fn predict(&self, features: &FeatureRecord) -> Result<String, ClassifierError> {
        (**self).predict(features)
    }
}

impl<M: CrowdModel + ?Sized> CrowdModel for Box<M> {
    fn predict(&self, features: &FeatureRecord) -> Result<String, ClassifierError> {
        (**self).predict(features)
    }
}

/// Runs an external program per prediction: the feature record goes to its
/// stdin as one JSON line, the label is read back from its stdout.
#[derive(Debug, Clone)]
pub struct CommandModel {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandModel {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl CrowdModel for CommandModel {
    fn predict(&self, features: &FeatureRecord) -> Result<String, ClassifierError> {
        let invocation = |reason: String| ClassifierError::Invocation { reason };

        let mut line = serde_json::to_string(features).map_err(|err| invocation(err.to_string()))?;
        line.push('\n');

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| invocation(format!("cannot start {:?}: {}", self.program, err)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(line.as_bytes())
                .map_err(|err| invocation(err.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|err| invocation(err.to_string()))?;
        if !output.status.success() {
            return Err(invocation(format!(
                "{:?} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}

/// Passthrough to the crowd model. Single shot: no caching, no retry.
pub struct ClassifierAdapter<M> {
    model: M,
}

impl<M: CrowdModel> ClassifierAdapter<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn classify(
        &self,
        registry: &Registry,
        trip: &TripContext,
    ) -> Result<ClassifierVerdict, ClassifierError> {
        let features = FeatureRecord::new(registry, trip);
        debug!("Crowd model features: {:?}", features);
        let label = self.model.predict(&features)?;
        label
            .parse::<ClassifierVerdict>()
            .map_err(|label| ClassifierError::UnrecognizedLabel { label })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::Weekday;

    use super::*;
    use crate::{
        data::{CrowdLevel, DayType},
        trip::{Tickets, TripInput},
    };

    struct Recording {
        label: &'static str,
        seen: RefCell<Vec<FeatureRecord>>,
    }

    impl CrowdModel for Recording {
        fn predict(&self, features: &FeatureRecord) -> Result<String, ClassifierError> {
            self.seen.borrow_mut().push(features.clone());
            Ok(self.label.to_owned())
        }
    }

    fn trip(registry: &Registry, boarding: &str, dropping: &str) -> TripContext {
        TripContext::new(
            registry,
            TripInput {
                vehicle_id: 102,
                boarding_stop: boarding.to_owned(),
                dropping_stop: dropping.to_owned(),
                tickets: Tickets::Manual(12),
                capacity: 50,
                day_type: DayType::Weekend,
                hour: 18,
                weekday: Weekday::Sat,
            },
        )
        .unwrap()
    }

    #[test]
    fn features_follow_the_trip() {
        let registry = Registry::builtin();
        let trip = trip(&registry, "Ajni", "MIHAN");
        let model = Recording {
            label: "2",
            seen: RefCell::new(Vec::new()),
        };
        let verdict = ClassifierAdapter::new(&model)
            .classify(&registry, &trip)
            .unwrap();
        assert_eq!(verdict, CrowdLevel::High);
        assert_eq!(
            model.seen.borrow()[0],
            FeatureRecord {
                vehicle_id: 102,
                route_id: trip.route_id.0,
                stop_id: 4,
                ticket_count: 12,
                capacity: 50,
                day_type: 1,
                hour: 18,
                weekday: 5,
            }
        );
    }

    #[test]
    fn id_less_boarding_stop_uses_sentinel() {
        let registry = Registry::builtin();
        let trip = trip(&registry, "Zero Mile", "Sadar");
        assert_eq!(FeatureRecord::new(&registry, &trip).stop_id, NO_STOP_ID);
    }

    #[test]
    fn unrecognized_label_is_an_error() {
        let registry = Registry::builtin();
        let trip = trip(&registry, "Ajni", "MIHAN");
        let model = Recording {
            label: "VERY HIGH",
            seen: RefCell::new(Vec::new()),
        };
        let err = ClassifierAdapter::new(&model)
            .classify(&registry, &trip)
            .unwrap_err();
        assert_eq!(
            err,
            ClassifierError::UnrecognizedLabel {
                label: "VERY HIGH".to_owned()
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn command_model_round_trips_through_a_process() {
        let registry = Registry::builtin();
        let trip = trip(&registry, "Ajni", "MIHAN");
        let model = CommandModel::new(
            "sh",
            vec!["-c".to_owned(), "cat > /dev/null; echo MEDIUM".to_owned()],
        );
        let verdict = ClassifierAdapter::new(model)
            .classify(&registry, &trip)
            .unwrap();
        assert_eq!(verdict, CrowdLevel::Medium);

        let failing = CommandModel::new("sh", vec!["-c".to_owned(), "exit 3".to_owned()]);
        assert!(matches!(
            ClassifierAdapter::new(failing).classify(&registry, &trip),
            Err(ClassifierError::Invocation { .. })
        ));
    }
}
