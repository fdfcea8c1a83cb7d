//! Application operations built on an [`EmtRepository`](crate::domain::EmtRepository).

mod get_arrivals;
mod get_stop_info;

pub use get_arrivals::GetArrivals;
pub use get_stop_info::GetStopInfo;
