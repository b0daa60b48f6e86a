use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTripError {
    #[error("Boarding and dropping stop cannot be the same ({stop:?})")]
    SameStop { stop: String },

    #[error("Bus capacity must be greater than zero")]
    ZeroCapacity,

    #[error("No such Stop {name:?} in the registry")]
    UnknownStop { name: String },

    #[error("Hour {hour} is outside of 0..=23")]
    HourOutOfRange { hour: u8 },

    #[error("Manually entered ticket count {ticket_count} exceeds the bus capacity {capacity}")]
    ManualTicketsAboveCapacity { ticket_count: u32, capacity: u32 },

    #[error("Give either a ticket count or a ticket image, not both")]
    ConflictingTicketSources,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    #[error("Could not detect passenger number")]
    NoMatch,

    #[error("Text extraction from {image:?} failed: {reason}")]
    Extraction { image: String, reason: String },

    #[error("Invalid digit range {min}..={max}, expected single digits with min <= max")]
    InvalidDigitRange { min: u8, max: u8 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("Crowd model invocation failed: {reason}")]
    Invocation { reason: String },

    #[error("Crowd model returned an unrecognized label {label:?}")]
    UnrecognizedLabel { label: String },
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Could not read reference data")]
    Csv(#[from] csv::Error),

    #[error("Stop name {name:?} is registered twice")]
    DuplicateStopName { name: String },

    #[error("Stop id {id} is registered twice")]
    DuplicateStopId { id: u32 },

    #[error("Route {route:?} is registered twice")]
    DuplicateRoute { route: String },

    #[error("Both a stops file and a route stops file are needed, only {given:?} was given")]
    IncompleteReferenceData { given: String },

    #[error("Route {route:?} does not contain its own endpoint {stop:?}")]
    MissingEndpoint { route: String, stop: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error(transparent)]
    InvalidTrip(#[from] InvalidTripError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Non-fatal: the route has no stored topology, so the journey insight is unknown.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[error("No crowd-flow data for route {route:?}")]
pub struct UnknownRouteWarning {
    pub route: String,
}
