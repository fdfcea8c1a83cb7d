//! Bus stops.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::Line;

/// Numeric identifier of an EMT bus stop.
pub type StopId = u32;

/// A WGS84 position as published by the API (`[lon, lat]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    /// Build coordinates from the API's `[lon, lat]` pair.
    ///
    /// Returns `None` unless exactly two values are given.
    pub fn from_lon_lat(values: &[f64]) -> Option<Self> {
        match values {
            [longitude, latitude] => Some(Self {
                longitude: *longitude,
                latitude: *latitude,
            }),
            _ => None,
        }
    }
}

/// A physical bus stop and the lines serving it.
///
/// Stops built from the nearby-stops fallback have the same shape as those
/// from the detail endpoint; their lines simply carry no schedule data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub lines: Vec<Line>,
}

impl Stop {
    /// Look up a line by its public number.
    pub fn line(&self, number: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.number == number)
    }

    /// The set of line numbers serving this stop.
    pub fn line_numbers(&self) -> HashSet<&str> {
        self.lines.iter().map(|l| l.number.as_str()).collect()
    }

    /// Keep only the lines whose number is in `numbers`.
    pub fn retain_lines(&mut self, numbers: &HashSet<&str>) {
        self.lines.retain(|l| numbers.contains(l.number.as_str()));
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stop {} - {} at {}", self.id, self.name, self.address)?;
        for line in &self.lines {
            write!(f, "\n  {line}")?;
        }
        Ok(())
    }
}
