//! EMT API response DTOs.
//!
//! These types map directly to the JSON returned by the API. Every
//! response shares the same envelope: a `code`, a `description` and a
//! `data` array. The envelope is read first so the code can be checked
//! before the records are deserialized into their endpoint-specific type.
//!
//! The API is loose about scalar types (line numbers and frequencies can
//! arrive as strings or numbers), hence [`Scalar`].

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The envelope common to every response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Endpoint-specific status code, e.g. "00" or "81".
    pub code: Option<String>,

    /// Human-readable description. A string on most endpoints, a list of
    /// per-language messages on others.
    pub description: Option<Value>,

    /// Result records. Missing or `null` on some failures.
    pub data: Option<Value>,
}

impl Envelope {
    /// Read the envelope out of a raw response body.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The status code, or "" if absent.
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }

    /// Whether `data` holds no records.
    pub fn has_no_data(&self) -> bool {
        match &self.data {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }

    /// Deserialize the `data` array into records of type `T`.
    ///
    /// A missing or `null` `data` field yields an empty list.
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        match &self.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => Vec::<T>::deserialize(data),
        }
    }
}

/// A JSON scalar the API sends as either a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Other(Value),
}

impl Scalar {
    /// The value as text, with integral numbers printed without a fraction.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Scalar::Int(n) => Some(n.to_string()),
            Scalar::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            Scalar::Float(f) => Some(f.to_string()),
            Scalar::Text(s) => Some(s.trim().to_string()),
            Scalar::Other(_) => None,
        }
    }

    /// The value as an integer. Fractions are truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            Scalar::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// A record from the login endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: String,
    pub token_dte_expiration: MongoDate,
    /// Seconds until the token expires, as reported by the API.
    pub token_sec_expiration: Option<i64>,
}

/// A `{"$date": <epoch millis>}` timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct MongoDate {
    #[serde(rename = "$date")]
    pub date: i64,
}

// ---------------------------------------------------------------------------
// Stop detail
// ---------------------------------------------------------------------------

/// A record from the stop-detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailData {
    #[serde(default)]
    pub stops: Vec<DetailStop>,
}

/// A stop inside a detail record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailStop {
    pub stop: Option<Scalar>,
    pub name: Option<String>,
    pub postal_address: Option<String>,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub data_line: Vec<DetailLine>,
}

/// A GeoJSON point.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// A line inside a detail record.
///
/// `direction` says which header is the destination; see the converter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailLine {
    /// Internal line code, e.g. "005".
    pub line: Option<Scalar>,
    /// Public line number, e.g. "5".
    pub label: Scalar,
    pub direction: String,
    pub max_freq: Scalar,
    pub min_freq: Scalar,
    #[serde(rename = "headerA")]
    pub header_a: String,
    #[serde(rename = "headerB")]
    pub header_b: String,
    pub start_time: String,
    pub stop_time: String,
    pub day_type: String,
}

// ---------------------------------------------------------------------------
// Nearby stops
// ---------------------------------------------------------------------------

/// A record from the nearby-stops endpoint. Records are ordered nearest first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyStop {
    pub stop_id: Scalar,
    pub stop_name: String,
    pub address: String,
    pub geometry: Geometry,
    pub meters_to_point: Option<f64>,
    #[serde(default)]
    pub lines: Vec<NearbyLine>,
}

/// A line inside a nearby-stops record.
///
/// `to` uses the opposite convention from the detail endpoint's `direction`.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyLine {
    pub line: Scalar,
    pub label: Option<Scalar>,
    pub to: String,
    #[serde(rename = "nameA")]
    pub name_a: String,
    #[serde(rename = "nameB")]
    pub name_b: String,
}

// ---------------------------------------------------------------------------
// Arrivals
// ---------------------------------------------------------------------------

/// A record from the arrivals endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrivalsData {
    #[serde(rename = "Arrive", default)]
    pub arrive: Vec<RawArrival>,
}

/// One estimated bus arrival.
///
/// Fields are optional so that a single malformed record can be skipped
/// without rejecting the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawArrival {
    pub line: Option<Scalar>,
    pub stop: Option<Scalar>,
    pub destination: Option<String>,
    pub bus: Option<Scalar>,
    /// Seconds until the bus reaches the stop.
    #[serde(rename = "estimateArrive")]
    pub estimate_arrive: Option<Scalar>,
    /// Metres between the bus and the stop.
    #[serde(rename = "DistanceBus")]
    pub distance_bus: Option<Scalar>,
}
