//! Time-of-day handling for line schedules.
//!
//! The EMT API publishes the first and last service of a line as "HH:MM"
//! strings. These are plain times of day with no date attached.

use chrono::NaiveTime;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse a time of day from "HH:MM" format.
///
/// # Examples
///
/// ```
/// use emt_madrid::domain::parse_hhmm;
///
/// let first_bus = parse_hhmm("06:30").unwrap();
/// assert_eq!(first_bus.format("%H:%M").to_string(), "06:30");
///
/// assert!(parse_hhmm("0630").is_err());
/// assert!(parse_hhmm("6:30").is_err());
/// assert!(parse_hhmm("25:00").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    // chrono accepts single-digit fields, so the shape is checked first
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(TimeError::new(s, "expected HH:MM format"));
    }
    if !bytes.iter().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit()) {
        return Err(TimeError::new(s, "expected digits"));
    }

    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| TimeError::new(s, "hour must be 0-23 and minute 0-59"))
}
