use std::{
    collections::{HashMap, HashSet},
    io,
    path::Path,
    sync::Arc,
};

use itertools::Itertools;
use tracing::debug;

use crate::{
    data::{Route, Stop},
    error::RegistryError,
    records,
};

// Nagpur passenger flow profile.
const BUILTIN_STOPS: &[(Option<u32>, &str, i32)] = &[
    (Some(1), "Sitabuldi", -3),
    (Some(2), "Railway Station", 5),
    (Some(3), "Dharampeth", -1),
    (Some(4), "Ajni", -2),
    (Some(5), "MIHAN", 6),
    (Some(6), "Civil Lines", -1),
    (Some(7), "Manewada", 2),
    (Some(8), "Sadar", -1),
    (Some(9), "Medical Square", 3),
    (Some(10), "Wardhaman Nagar", 4),
    (None, "Zero Mile", -2),
];

const BUILTIN_ROUTES: &[&[&str]] = &[
    &["Sitabuldi", "Zero Mile", "Civil Lines", "Railway Station"],
    &["Sitabuldi", "Zero Mile", "Ajni", "MIHAN"],
    &["MIHAN", "Ajni", "Zero Mile", "Sitabuldi"],
    &["Civil Lines", "Zero Mile", "Sadar"],
    &["Manewada", "Medical Square", "Wardhaman Nagar"],
];

/// Static stop and route reference data. Built once, read-only afterwards.
#[derive(Debug)]
pub struct Registry {
    stops: Vec<Arc<Stop>>,
    stops_by_name: HashMap<String, Arc<Stop>>,
    routes: HashMap<String, HashMap<String, Route>>,
}

impl Registry {
    pub fn new(stops: Vec<Stop>, routes: Vec<Route>) -> Result<Self, RegistryError> {
        let mut stops_by_name = HashMap::new();
        let mut ids = HashSet::new();
        let stops: Vec<Arc<Stop>> = stops.into_iter().map(Arc::new).collect();
        for stop in &stops {
            if let Some(id) = stop.id {
                if !ids.insert(id) {
                    return Err(RegistryError::DuplicateStopId { id });
                }
            }
            if stops_by_name
                .insert(stop.name.clone(), Arc::clone(stop))
                .is_some()
            {
                return Err(RegistryError::DuplicateStopName {
                    name: stop.name.clone(),
                });
            }
        }

        let mut by_origin: HashMap<String, HashMap<String, Route>> = HashMap::new();
        for route in routes {
            for endpoint in [&route.origin, &route.destination] {
                if route.position(endpoint).is_none() {
                    return Err(RegistryError::MissingEndpoint {
                        route: route.label(),
                        stop: endpoint.clone(),
                    });
                }
            }
            let label = route.label();
            if by_origin
                .entry(route.origin.clone())
                .or_default()
                .insert(route.destination.clone(), route)
                .is_some()
            {
                return Err(RegistryError::DuplicateRoute { route: label });
            }
        }

        Ok(Self {
            stops,
            stops_by_name,
            routes: by_origin,
        })
    }

    pub fn builtin() -> Self {
        let stops = BUILTIN_STOPS
            .iter()
            .map(|&(id, name, flow_bias)| Stop {
                id,
                name: name.to_owned(),
                flow_bias,
            })
            .collect();
        let routes = BUILTIN_ROUTES
            .iter()
            .filter_map(|sequence| {
                Some(Route {
                    origin: sequence.first()?.to_string(),
                    destination: sequence.last()?.to_string(),
                    stops: sequence.iter().map(|stop| stop.to_string()).collect(),
                })
            })
            .collect();
        Self::new(stops, routes).unwrap_or_else(|err| {
            unreachable!("builtin reference data is consistent: {}", err)
        })
    }

    pub fn from_readers<S: io::Read, R: io::Read>(
        stops_reader: S,
        route_stops_reader: R,
    ) -> Result<Self, RegistryError> {
        let stops = csv::Reader::from_reader(stops_reader)
            .deserialize::<records::Stop>()
            .map_ok(|record| Stop {
                id: record.stop_id,
                name: record.stop_name,
                flow_bias: record.flow_bias,
            })
            .collect::<Result<Vec<_>, _>>()?;

        let route_stops = csv::Reader::from_reader(route_stops_reader)
            .deserialize::<records::RouteStop>()
            .collect::<Result<Vec<_>, _>>()?;

        let routes = route_stops
            .into_iter()
            .map(|record| ((record.origin.clone(), record.destination.clone()), record))
            .into_group_map()
            .into_iter()
            .map(|((origin, destination), records)| Route {
                origin,
                destination,
                stops: records
                    .into_iter()
                    .sorted_by_key(|record| record.stop_sequence)
                    .map(|record| record.stop_name)
                    .collect(),
            })
            .collect();

        let registry = Self::new(stops, routes)?;
        debug!(
            "Loaded {} stops and {} routes",
            registry.stops.len(),
            registry.routes().count()
        );
        Ok(registry)
    }

    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        stops_path: P,
        route_stops_path: Q,
    ) -> Result<Self, RegistryError> {
        let stops = std::fs::File::open(stops_path.as_ref()).map_err(csv::Error::from)?;
        let route_stops =
            std::fs::File::open(route_stops_path.as_ref()).map_err(csv::Error::from)?;
        Self::from_readers(stops, route_stops)
    }

    pub fn stop(&self, name: &str) -> Option<&Stop> {
        self.stops_by_name.get(name).map(|stop| stop.as_ref())
    }

    /// Unknown names contribute neutrally.
    pub fn flow_bias(&self, stop_name: &str) -> i32 {
        self.stop(stop_name).map_or(0, |stop| stop.flow_bias)
    }

    pub fn lookup_route(&self, origin: &str, destination: &str) -> Option<&Route> {
        self.routes.get(origin)?.get(destination)
    }

    /// Stops carrying a numeric id, in id order.
    pub fn display_stops(&self) -> Vec<&Stop> {
        self.stops
            .iter()
            .filter(|stop| stop.id.is_some())
            .map(|stop| stop.as_ref())
            .sorted_by_key(|stop| stop.id)
            .collect()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes
            .values()
            .flat_map(|by_destination| by_destination.values())
            .sorted_by_key(|route| route.label())
    }
}
