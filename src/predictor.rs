use tracing::{debug, info, warn};

use crate::{
    assessment::assess,
    classifier::{ClassifierAdapter, CrowdModel},
    error::{PredictionError, UnknownRouteWarning},
    registry::Registry,
    report::Prediction,
    trend::analyze_trend,
    trip::{TripContext, TripInput},
};

/// Runs one request top to bottom: validate, classify, trend, assess.
pub struct CrowdPredictor<'r, M> {
    registry: &'r Registry,
    classifier: ClassifierAdapter<M>,
}

impl<'r, M: CrowdModel> CrowdPredictor<'r, M> {
    pub fn new(registry: &'r Registry, model: M) -> Self {
        Self {
            registry,
            classifier: ClassifierAdapter::new(model),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn predict(&self, input: TripInput) -> Result<Prediction, PredictionError> {
        let trip = TripContext::new(self.registry, input)?;
        self.predict_trip(&trip)
    }

    pub fn predict_trip(&self, trip: &TripContext) -> Result<Prediction, PredictionError> {
        info!("Route: {} | Route ID: {}", trip.route_label, trip.route_id);

        let verdict = self.classifier.classify(self.registry, trip)?;
        debug!("Crowd model verdict: {}", verdict);

        let route = self
            .registry
            .lookup_route(&trip.boarding_stop, &trip.dropping_stop);
        let warning = match route {
            Some(_) => None,
            None => {
                let warning = UnknownRouteWarning {
                    route: trip.route_label.clone(),
                };
                warn!("{}", warning);
                Some(warning)
            }
        };
        let trend = analyze_trend(
            self.registry,
            route,
            &trip.boarding_stop,
            &trip.dropping_stop,
        );
        debug!("Trend sum {} -> {:?}", trend.sum, trend.insight);

        let assessment = assess(verdict, trip.ticket_count, trip.capacity, trend.insight);
        if assessment.downgraded {
            warn!(
                "Downgraded MEDIUM to LOW at {:.2}% occupancy",
                assessment.occupancy_pct
            );
        }
        info!(
            "Crowd level {} at {:.2}% occupancy, alert {}",
            assessment.crowd_level, assessment.occupancy_pct, assessment.alert
        );

        Ok(Prediction {
            route_label: trip.route_label.clone(),
            route_id: trip.route_id,
            boarding_stop: trip.boarding_stop.clone(),
            boarding_stop_id: self
                .registry
                .stop(&trip.boarding_stop)
                .and_then(|stop| stop.id),
            dropping_stop: trip.dropping_stop.clone(),
            ticket_count: trip.ticket_count,
            capacity: trip.capacity.get(),
            verdict,
            trend_sum: trend.sum,
            assessment,
            warning,
        })
    }
}
