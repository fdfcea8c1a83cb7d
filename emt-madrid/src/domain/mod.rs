//! Domain types for the EMT Madrid client.
//!
//! Stops, the lines serving them, and the errors every operation can
//! report. Nothing in here performs I/O.

mod day_type;
mod error;
mod line;
mod repository;
mod stop;
mod time;

pub use day_type::DayType;
pub use error::EmtError;
pub use line::Line;
pub use repository::EmtRepository;
pub use stop::{Coordinates, Stop, StopId};
pub use time::{TimeError, parse_hhmm};
