use std::path::PathBuf;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use tracing::info;

use crate::{
    classifier::CommandModel,
    data::DayType,
    error::{InvalidTripError, OcrError, PredictionError, RegistryError},
    ocr::{extract_ticket_count, TesseractExtractor, TextExtractor, TicketCountParser},
    registry::Registry,
    trip::{check_stops_and_capacity, Tickets, TripInput},
};

#[derive(Debug, Clone, Serialize, Deserialize, StructOpt)]
pub struct EngineConfig {
    /// Stops csv (stop_id,stop_name,flow_bias).
    /// The builtin Nagpur data is used when no reference data is given.
    #[structopt(long, parse(from_os_str), requires = "route-stops")]
    #[serde(default)]
    pub stops: Option<PathBuf>,

    /// Route sequences csv (origin,destination,stop_sequence,stop_name)
    #[structopt(long, parse(from_os_str), requires = "stops")]
    #[serde(default)]
    pub route_stops: Option<PathBuf>,

    /// Program running the pre-trained crowd model
    #[structopt(long, default_value = "crowd_model")]
    #[serde(default = "default_model_command")]
    pub model_command: String,

    /// Extra argument passed to the crowd model program, may be repeated
    #[structopt(long = "model-arg")]
    #[serde(default)]
    pub model_args: Vec<String>,

    /// Program used to read ticket images
    #[structopt(long, default_value = "tesseract")]
    #[serde(default = "default_ocr_command")]
    pub ocr_command: String,

    /// Page segmentation mode handed to the ocr program
    #[structopt(long, default_value = "6")]
    #[serde(default = "default_ocr_psm")]
    pub ocr_psm: u8,

    /// Smallest passenger count accepted from a ticket image
    #[structopt(long, default_value = "1")]
    #[serde(default = "default_ocr_min_count")]
    pub ocr_min_count: u8,

    /// Largest passenger count accepted from a ticket image
    #[structopt(long, default_value = "5")]
    #[serde(default = "default_ocr_max_count")]
    pub ocr_max_count: u8,
}

pub const DEFAULT_MODEL_COMMAND: &str = "crowd_model";
pub const DEFAULT_OCR_COMMAND: &str = "tesseract";

pub fn default_model_command() -> String {
    DEFAULT_MODEL_COMMAND.to_owned()
}

pub fn default_ocr_command() -> String {
    DEFAULT_OCR_COMMAND.to_owned()
}

pub fn default_ocr_psm() -> u8 {
    6
}

pub fn default_ocr_min_count() -> u8 {
    1
}

pub fn default_ocr_max_count() -> u8 {
    5
}

impl EngineConfig {
    pub fn registry(&self) -> Result<Registry, RegistryError> {
        match (&self.stops, &self.route_stops) {
            (Some(stops), Some(route_stops)) => {
                info!("Loading reference data from {:?} and {:?}", stops, route_stops);
                Registry::from_paths(stops, route_stops)
            }
            (None, None) => Ok(Registry::builtin()),
            (Some(_), None) => Err(RegistryError::IncompleteReferenceData {
                given: "stops".to_owned(),
            }),
            (None, Some(_)) => Err(RegistryError::IncompleteReferenceData {
                given: "route_stops".to_owned(),
            }),
        }
    }

    pub fn model(&self) -> CommandModel {
        CommandModel::new(self.model_command.clone(), self.model_args.clone())
    }

    pub fn extractor(&self) -> TesseractExtractor {
        TesseractExtractor {
            program: self.ocr_command.clone(),
            page_segmentation_mode: self.ocr_psm,
        }
    }

    pub fn ticket_parser(&self) -> Result<TicketCountParser, OcrError> {
        TicketCountParser::new(self.ocr_min_count, self.ocr_max_count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, StructOpt)]
pub struct TripRequest {
    #[structopt(long, default_value = "102")]
    #[serde(default = "default_vehicle_id")]
    pub vehicle_id: u32,

    /// Boarding stop name
    #[structopt(long = "from")]
    pub boarding_stop: String,

    /// Dropping stop name
    #[structopt(long = "to")]
    pub dropping_stop: String,

    #[structopt(long, default_value = "50")]
    #[serde(default = "default_capacity")]
    pub capacity: u32,

    /// Tickets scanned in the last 5 minutes.
    /// Defaults to 10, or the capacity if it is smaller.
    #[structopt(long, conflicts_with = "ticket-image")]
    #[serde(default)]
    pub tickets: Option<u32>,

    /// Read the ticket count from a photo of the ticket instead
    #[structopt(long, parse(from_os_str))]
    #[serde(default)]
    pub ticket_image: Option<PathBuf>,

    /// "weekday" or "weekend"
    #[structopt(long, default_value = "weekday")]
    #[serde(default)]
    pub day_type: DayType,

    /// Boarding hour, 0 to 23. Defaults to the current hour.
    #[structopt(long)]
    #[serde(default)]
    pub hour: Option<u8>,

    /// Day of week, as a name or a Monday-first index. Defaults to today.
    #[structopt(long, parse(try_from_str = parse_weekday))]
    #[serde(default)]
    pub weekday: Option<Weekday>,
}

pub fn default_vehicle_id() -> u32 {
    102
}

pub fn default_capacity() -> u32 {
    50
}

const DEFAULT_MANUAL_TICKETS: u32 = 10;

pub fn parse_weekday(value: &str) -> Result<Weekday, String> {
    if let Ok(index) = value.trim().parse::<u8>() {
        return match index {
            0 => Ok(Weekday::Mon),
            1 => Ok(Weekday::Tue),
            2 => Ok(Weekday::Wed),
            3 => Ok(Weekday::Thu),
            4 => Ok(Weekday::Fri),
            5 => Ok(Weekday::Sat),
            6 => Ok(Weekday::Sun),
            _ => Err(format!("Weekday index {} is outside of 0..=6", index)),
        };
    }
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| format!("Bad weekday {:?}", value))
}

impl TripRequest {
    /// Rejects what is wrong with the request before any ticket image is read.
    pub fn validate(&self, registry: &Registry) -> Result<(), InvalidTripError> {
        check_stops_and_capacity(
            registry,
            &self.boarding_stop,
            &self.dropping_stop,
            self.capacity,
        )?;
        if self.tickets.is_some() && self.ticket_image.is_some() {
            return Err(InvalidTripError::ConflictingTicketSources);
        }
        Ok(())
    }

    /// Reads the ticket image when one is given. Single shot.
    pub fn tickets<E: TextExtractor>(
        &self,
        extractor: &E,
        parser: &TicketCountParser,
    ) -> Result<Tickets, PredictionError> {
        match (&self.ticket_image, self.tickets) {
            (Some(_), Some(_)) => Err(InvalidTripError::ConflictingTicketSources.into()),
            (Some(image), None) => {
                let count = extract_ticket_count(extractor, parser, image)?;
                info!("Passenger count detected: {}", count);
                Ok(Tickets::Scanned(count))
            }
            (None, Some(count)) => Ok(Tickets::Manual(count)),
            (None, None) => Ok(Tickets::Manual(DEFAULT_MANUAL_TICKETS.min(self.capacity))),
        }
    }

    /// Validates, then resolves the ticket count and the time of day.
    pub fn trip_input<E: TextExtractor>(
        &self,
        registry: &Registry,
        extractor: &E,
        parser: &TicketCountParser,
        now: NaiveDateTime,
    ) -> Result<TripInput, PredictionError> {
        self.validate(registry)?;
        let tickets = self.tickets(extractor, parser)?;
        Ok(self.to_trip_input(tickets, now))
    }

    pub fn to_trip_input(&self, tickets: Tickets, now: NaiveDateTime) -> TripInput {
        TripInput {
            vehicle_id: self.vehicle_id,
            boarding_stop: self.boarding_stop.clone(),
            dropping_stop: self.dropping_stop.clone(),
            tickets,
            capacity: self.capacity,
            day_type: self.day_type,
            hour: self.hour.unwrap_or(now.hour() as u8),
            weekday: self.weekday.unwrap_or_else(|| now.weekday()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, StructOpt)]
pub struct Config {
    #[serde(flatten)]
    #[structopt(flatten)]
    pub engine: EngineConfig,

    #[serde(flatten)]
    #[structopt(flatten)]
    pub trip: TripRequest,
}
