use std::{fmt, num::NonZeroU32};

use chrono::Weekday;
use serde::Serialize;

use crate::{
    data::{route_label, DayType},
    error::InvalidTripError,
    registry::Registry,
};

/// Display tag derived from a route label.
///
/// Tags are NOT unique: distinct routes may share one. Never use a tag as a
/// key, for persistence or for equality between routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteTag(pub u16);

impl RouteTag {
    const MODULUS: u32 = 1000;

    /// 32-bit FNV-1a over the label bytes, folded into 0..1000.
    pub fn from_label(label: &str) -> Self {
        let hash = label.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
            (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
        });
        RouteTag((hash % Self::MODULUS) as u16)
    }
}

impl fmt::Display for RouteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tickets {
    /// Entered by hand, bounded by the bus capacity.
    Manual(u32),
    /// Read off a ticket image. May exceed capacity.
    Scanned(u32),
}

impl Tickets {
    pub fn count(self) -> u32 {
        match self {
            Tickets::Manual(count) | Tickets::Scanned(count) => count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TripInput {
    pub vehicle_id: u32,
    pub boarding_stop: String,
    pub dropping_stop: String,
    pub tickets: Tickets,
    pub capacity: u32,
    pub day_type: DayType,
    pub hour: u8,
    pub weekday: Weekday,
}

/// One validated prediction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripContext {
    pub vehicle_id: u32,
    pub route_label: String,
    pub route_id: RouteTag,
    pub boarding_stop: String,
    pub dropping_stop: String,
    pub ticket_count: u32,
    pub capacity: NonZeroU32,
    pub day_type: DayType,
    pub hour: u8,
    pub weekday: Weekday,
}

/// Checks what can be known before the ticket count is: both stops exist and
/// differ, and the bus has room for someone.
pub fn check_stops_and_capacity(
    registry: &Registry,
    boarding_stop: &str,
    dropping_stop: &str,
    capacity: u32,
) -> Result<NonZeroU32, InvalidTripError> {
    if boarding_stop == dropping_stop {
        return Err(InvalidTripError::SameStop {
            stop: boarding_stop.to_owned(),
        });
    }
    for name in [boarding_stop, dropping_stop] {
        if registry.stop(name).is_none() {
            return Err(InvalidTripError::UnknownStop {
                name: name.to_owned(),
            });
        }
    }
    NonZeroU32::new(capacity).ok_or(InvalidTripError::ZeroCapacity)
}

impl TripContext {
    pub fn new(registry: &Registry, input: TripInput) -> Result<Self, InvalidTripError> {
        let capacity = check_stops_and_capacity(
            registry,
            &input.boarding_stop,
            &input.dropping_stop,
            input.capacity,
        )?;
        if input.hour > 23 {
            return Err(InvalidTripError::HourOutOfRange { hour: input.hour });
        }
        if let Tickets::Manual(ticket_count) = input.tickets {
            if ticket_count > capacity.get() {
                return Err(InvalidTripError::ManualTicketsAboveCapacity {
                    ticket_count,
                    capacity: capacity.get(),
                });
            }
        }

        let route_label = route_label(&input.boarding_stop, &input.dropping_stop);
        Ok(Self {
            vehicle_id: input.vehicle_id,
            route_id: RouteTag::from_label(&route_label),
            route_label,
            boarding_stop: input.boarding_stop,
            dropping_stop: input.dropping_stop,
            ticket_count: input.tickets.count(),
            capacity,
            day_type: input.day_type,
            hour: input.hour,
            weekday: input.weekday,
        })
    }

    /// Monday-first index, 0..=6.
    pub fn weekday_index(&self) -> u8 {
        self.weekday.num_days_from_monday() as u8
    }
}
