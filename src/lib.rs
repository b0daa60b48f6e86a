pub mod assessment;
pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod logger;
pub mod ocr;
pub mod predictor;
mod records;
pub mod registry;
pub mod report;
pub mod trend;
pub mod trip;

pub use assessment::{assess, AssessmentResult};
pub use predictor::CrowdPredictor;
pub use registry::Registry;
pub use report::Prediction;
pub use trend::{analyze_trend, Trend};
pub use trip::{Tickets, TripContext, TripInput};
