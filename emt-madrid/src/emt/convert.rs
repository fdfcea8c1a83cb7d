//! Conversion from EMT DTOs to domain types.
//!
//! Each endpoint signals logical failures through its own response codes.
//! The functions here interpret those codes, turn them into [`EmtError`]s
//! and build [`Stop`] and [`Line`] values from the records that remain.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{Coordinates, DayType, EmtError, Line, Stop, StopId, parse_hhmm};

use super::endpoints::{ArrivalsCode, DetailCode, NearbyCode};
use super::types::{
    ArrivalsData, DetailData, DetailLine, DetailStop, Envelope, NearbyLine, NearbyStop, RawArrival,
    Scalar,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Response did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Failed to parse a time string
    #[error("invalid time for line {line}: {message}")]
    InvalidTime { line: String, message: String },

    /// Failed to parse a frequency
    #[error("invalid frequency for line {line}: {value:?}")]
    InvalidFrequency { line: String, value: String },

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl From<serde_json::Error> for ConversionError {
    fn from(err: serde_json::Error) -> Self {
        ConversionError::Malformed(err.to_string())
    }
}

/// Outcome of a stop-detail lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    /// The stop, with full schedule data.
    Found(Stop),
    /// The API does not publish detail for this stop; use the nearby-stops
    /// lookup instead.
    DetailNotAvailable,
}

/// Minute estimates per line number.
pub type ArrivalTable = HashMap<String, BTreeSet<u32>>;

/// Interpret a stop-detail response.
pub fn convert_stop_detail(stop_id: StopId, response: Value) -> Result<DetailOutcome, EmtError> {
    let envelope = Envelope::from_value(response).map_err(|e| {
        EmtError::stop_not_found(stop_id, ConversionError::from(e).to_string())
    })?;
    let code = envelope.code();

    match DetailCode::parse(code) {
        DetailCode::NotFound => {
            warn!(stop_id, code, "stop not found");
            return Err(EmtError::stop_not_found(
                stop_id,
                format!("not found (code {code})"),
            ));
        }
        DetailCode::DetailNotAvailable => {
            debug!(stop_id, code, "stop detail not available");
            return Ok(DetailOutcome::DetailNotAvailable);
        }
        DetailCode::ApiLimitExceeded => {
            warn!(stop_id, code, "daily API quota exceeded");
            return Err(EmtError::ApiLimitExceeded(format!(
                "stop detail for {stop_id} refused (code {code})"
            )));
        }
        DetailCode::InvalidToken if envelope.has_no_data() => {
            warn!(stop_id, code, "access token rejected");
            return Err(EmtError::ApiResponse(format!(
                "invalid or expired access token for stop {stop_id} (code {code})"
            )));
        }
        _ => {}
    }

    if envelope.has_no_data() {
        return Err(EmtError::ApiResponse(format!(
            "no information found for stop {stop_id} (code {code})"
        )));
    }

    build_detail_stop(stop_id, &envelope)
        .map(DetailOutcome::Found)
        .map_err(|e| EmtError::stop_not_found(stop_id, e.to_string()))
}

fn build_detail_stop(stop_id: StopId, envelope: &Envelope) -> Result<Stop, ConversionError> {
    let records: Vec<DetailData> = envelope.records()?;
    let stop: &DetailStop = records
        .first()
        .and_then(|r| r.stops.first())
        .ok_or(ConversionError::MissingField("data[0].stops[0]"))?;

    let lines = stop
        .data_line
        .iter()
        .map(convert_detail_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stop {
        id: stop_id,
        name: stop.name.clone().unwrap_or_else(|| "Unknown".to_string()),
        address: stop
            .postal_address
            .as_deref()
            .map(str::trim)
            .unwrap_or("Unknown")
            .to_string(),
        coordinates: stop
            .geometry
            .as_ref()
            .and_then(|g| Coordinates::from_lon_lat(&g.coordinates)),
        lines,
    })
}

/// Convert a line from the stop-detail endpoint.
///
/// Direction "B" means header A is the destination and header B the
/// origin. Any other direction reads the headers the other way round.
pub fn convert_detail_line(raw: &DetailLine) -> Result<Line, ConversionError> {
    let number = raw
        .label
        .as_text()
        .ok_or(ConversionError::MissingField("label"))?;

    let (origin, destination) = if raw.direction == "B" {
        (&raw.header_b, &raw.header_a)
    } else {
        (&raw.header_a, &raw.header_b)
    };

    let frequency = |value: &Scalar| {
        value
            .as_i64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| ConversionError::InvalidFrequency {
                line: number.clone(),
                value: value.as_text().unwrap_or_default(),
            })
    };
    let time = |s: &str| {
        parse_hhmm(s).map_err(|e| ConversionError::InvalidTime {
            line: number.clone(),
            message: e.to_string(),
        })
    };

    let mut line = Line::new(number.clone(), origin.clone(), destination.clone());
    line.max_frequency = Some(frequency(&raw.max_freq)?);
    line.min_frequency = Some(frequency(&raw.min_freq)?);
    line.start_time = Some(time(&raw.start_time)?);
    line.end_time = Some(time(&raw.stop_time)?);
    line.day_type = Some(DayType::from_code(&raw.day_type));
    Ok(line)
}

/// Interpret a nearby-stops response. The nearest stop is taken as the
/// requested one.
pub fn convert_nearby_stops(stop_id: StopId, response: Value) -> Result<Stop, EmtError> {
    let envelope = Envelope::from_value(response).map_err(|e| {
        EmtError::stop_not_found(stop_id, ConversionError::from(e).to_string())
    })?;
    let code = envelope.code();

    if NearbyCode::parse(code) == NearbyCode::NotFound {
        warn!(stop_id, code, "nearby stops lookup failed");
        return Err(EmtError::stop_not_found(
            stop_id,
            format!("failed to retrieve nearby stops (code {code})"),
        ));
    }

    let records: Vec<NearbyStop> = envelope
        .records()
        .map_err(|e| EmtError::stop_not_found(stop_id, ConversionError::from(e).to_string()))?;

    let nearest = records.first().ok_or_else(|| {
        EmtError::stop_not_found(stop_id, format!("no nearby stops found (code {code})"))
    })?;

    let id = nearest
        .stop_id
        .as_i64()
        .and_then(|n| StopId::try_from(n).ok())
        .ok_or_else(|| {
            EmtError::stop_not_found(stop_id, ConversionError::MissingField("stopId").to_string())
        })?;

    Ok(Stop {
        id,
        name: nearest.stop_name.clone(),
        address: nearest.address.trim().to_string(),
        coordinates: Coordinates::from_lon_lat(&nearest.geometry.coordinates),
        lines: nearest.lines.iter().map(convert_nearby_line).collect(),
    })
}

/// Convert a line from the nearby-stops endpoint.
///
/// `to == "B"` means the bus runs from name A to name B. This is the
/// inverse of the detail endpoint's `direction` field.
pub fn convert_nearby_line(raw: &NearbyLine) -> Line {
    let number = raw.line.as_text().unwrap_or_default();
    if raw.to == "B" {
        Line::new(number, raw.name_a.clone(), raw.name_b.clone())
    } else {
        Line::new(number, raw.name_b.clone(), raw.name_a.clone())
    }
}

/// Interpret an arrivals response into minute estimates per line.
pub fn convert_arrivals(stop_id: StopId, response: Value) -> Result<ArrivalTable, EmtError> {
    let envelope = Envelope::from_value(response).map_err(|e| {
        EmtError::arrivals_not_found(stop_id, ConversionError::from(e).to_string())
    })?;
    let code = envelope.code();

    if ArrivalsCode::parse(code) == ArrivalsCode::NotFound {
        warn!(stop_id, code, "arrivals lookup rejected");
        return Err(EmtError::stop_not_found(
            stop_id,
            format!("stop disabled or not found (code {code})"),
        ));
    }

    let records: Vec<ArrivalsData> = envelope
        .records()
        .map_err(|e| EmtError::arrivals_not_found(stop_id, ConversionError::from(e).to_string()))?;

    let arrivals = records.first().map(|r| r.arrive.as_slice()).unwrap_or(&[]);
    if arrivals.is_empty() {
        return Err(EmtError::arrivals_not_found(
            stop_id,
            "no arrival information found",
        ));
    }

    Ok(group_arrivals(arrivals))
}

/// Group raw arrivals by line, converting seconds to whole minutes.
///
/// Records without a line or a usable, non-negative estimate are dropped.
pub fn group_arrivals(arrivals: &[RawArrival]) -> ArrivalTable {
    let mut table = ArrivalTable::new();

    for arrival in arrivals {
        let line = arrival.line.as_ref().and_then(|l| l.as_text());
        let minutes = arrival
            .estimate_arrive
            .as_ref()
            .and_then(|s| s.as_i64())
            .filter(|secs| *secs >= 0)
            .and_then(|secs| u32::try_from(secs.div_euclid(60)).ok());

        match (line, minutes) {
            (Some(line), Some(minutes)) => {
                table.entry(line).or_default().insert(minutes);
            }
            _ => debug!(?arrival, "dropping unusable arrival record"),
        }
    }

    table
}

/// Write arrival estimates onto the stop's lines.
///
/// Every line is updated: lines without estimates in `table` are cleared,
/// and estimates for lines the stop does not have are ignored.
pub fn apply_arrivals(stop: &mut Stop, table: &ArrivalTable) {
    for line in &mut stop.lines {
        match table.get(&line.number) {
            Some(minutes) => line.set_arrivals(minutes),
            None => line.clear_arrivals(),
        }
    }
}
