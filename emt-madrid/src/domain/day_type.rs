//! Service day types.

use std::fmt;

use serde::Serialize;

/// The kind of day a line schedule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    WorkingDay,
    Saturday,
    Festive,
}

impl DayType {
    /// Map the API's day-type code onto a `DayType`.
    ///
    /// "SA" is Saturday and "FE" is a festive day. Every other code,
    /// including the usual "LA", is a working day.
    ///
    /// ```
    /// use emt_madrid::domain::DayType;
    ///
    /// assert_eq!(DayType::from_code("SA"), DayType::Saturday);
    /// assert_eq!(DayType::from_code("FE"), DayType::Festive);
    /// assert_eq!(DayType::from_code("LA"), DayType::WorkingDay);
    /// ```
    pub fn from_code(code: &str) -> Self {
        match code {
            "SA" => DayType::Saturday,
            "FE" => DayType::Festive,
            _ => DayType::WorkingDay,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DayType::WorkingDay => "Working day",
            DayType::Saturday => "Saturday",
            DayType::Festive => "Festive",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_are_working_days() {
        assert_eq!(DayType::from_code(""), DayType::WorkingDay);
        assert_eq!(DayType::from_code("sa"), DayType::WorkingDay);
        assert_eq!(DayType::from_code("XX"), DayType::WorkingDay);
    }

    #[test]
    fn display() {
        assert_eq!(DayType::WorkingDay.to_string(), "Working day");
        assert_eq!(DayType::Saturday.to_string(), "Saturday");
        assert_eq!(DayType::Festive.to_string(), "Festive");
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&DayType::WorkingDay).unwrap();
        assert_eq!(json, "\"WORKING_DAY\"");
    }
}
