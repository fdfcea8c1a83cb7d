//! Bus lines serving a stop.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveTime;
use serde::Serialize;

use super::DayType;

/// A bus line serving a stop.
///
/// Schedule fields are only known when the line came from the stop-detail
/// endpoint; lines built from the nearby-stops endpoint leave them `None`.
/// `arrival` and `next_arrival` are minutes until the next two buses and are
/// only filled in by an arrivals lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub number: String,
    pub origin: String,
    pub destination: String,
    pub max_frequency: Option<u32>,
    pub min_frequency: Option<u32>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub day_type: Option<DayType>,
    pub arrival: Option<u32>,
    pub next_arrival: Option<u32>,
}

impl Line {
    /// Create a line with only its route known.
    pub fn new(
        number: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            origin: origin.into(),
            destination: destination.into(),
            max_frequency: None,
            min_frequency: None,
            start_time: None,
            end_time: None,
            day_type: None,
            arrival: None,
            next_arrival: None,
        }
    }

    /// Set the arrival estimates from a set of minute values.
    ///
    /// The smallest value becomes `arrival` and the second smallest
    /// `next_arrival`. An empty set clears both.
    pub fn set_arrivals(&mut self, minutes: &BTreeSet<u32>) {
        let mut iter = minutes.iter().copied();
        self.arrival = iter.next();
        self.next_arrival = iter.next();
    }

    /// Forget any previous arrival estimates.
    pub fn clear_arrivals(&mut self) {
        self.arrival = None;
        self.next_arrival = None;
    }

    /// Whether schedule data (frequencies, times, day type) is present.
    pub fn has_schedule(&self) -> bool {
        self.day_type.is_some()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}: {} → {}",
            self.number, self.origin, self.destination
        )?;
        match self.arrival {
            Some(mins) => write!(f, " - {mins} min")?,
            None => write!(f, " - no estimate")?,
        }
        if let Some(mins) = self.next_arrival {
            write!(f, " - {mins} min")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_line_has_no_schedule_or_arrivals() {
        let line = Line::new("27", "EMBAJADORES", "PLAZA CASTILLA");
        assert!(!line.has_schedule());
        assert_eq!(line.arrival, None);
        assert_eq!(line.next_arrival, None);
        assert_eq!(line.max_frequency, None);
    }

    #[test]
    fn set_arrivals_takes_two_smallest() {
        let mut line = Line::new("27", "A", "B");
        line.set_arrivals(&BTreeSet::from([9, 4, 1]));
        assert_eq!(line.arrival, Some(1));
        assert_eq!(line.next_arrival, Some(4));
    }

    #[test]
    fn set_arrivals_single_value() {
        let mut line = Line::new("14", "A", "B");
        line.next_arrival = Some(30);
        line.set_arrivals(&BTreeSet::from([2]));
        assert_eq!(line.arrival, Some(2));
        assert_eq!(line.next_arrival, None);
    }

    #[test]
    fn set_arrivals_empty_clears() {
        let mut line = Line::new("14", "A", "B");
        line.arrival = Some(3);
        line.next_arrival = Some(8);
        line.set_arrivals(&BTreeSet::new());
        assert_eq!(line.arrival, None);
        assert_eq!(line.next_arrival, None);
    }

    #[test]
    fn display() {
        let mut line = Line::new("27", "EMBAJADORES", "PLAZA CASTILLA");
        assert_eq!(
            line.to_string(),
            "Line 27: EMBAJADORES → PLAZA CASTILLA - no estimate"
        );

        line.arrival = Some(1);
        line.next_arrival = Some(4);
        assert_eq!(
            line.to_string(),
            "Line 27: EMBAJADORES → PLAZA CASTILLA - 1 min - 4 min"
        );
    }
}
