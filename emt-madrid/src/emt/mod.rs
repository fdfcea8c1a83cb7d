//! EMT Madrid MobilityLabs API client.
//!
//! Layered bottom-up: [`HttpTransport`] performs single HTTP exchanges,
//! [`AuthenticatedClient`] adds the access token, and [`EmtApiRepository`]
//! interprets the responses into domain types.

mod auth;
mod convert;
pub mod endpoints;
mod error;
mod mock;
mod repository;
mod transport;
pub mod types;

#[cfg(test)]
mod scripted;

pub use auth::{AuthenticatedClient, Credentials, Token, parse_login};
pub use convert::{
    ArrivalTable, ConversionError, DetailOutcome, apply_arrivals, convert_arrivals,
    convert_detail_line, convert_nearby_line, convert_nearby_stops, convert_stop_detail,
    group_arrivals,
};
pub use error::TransportError;
pub use mock::MockEmtRepository;
pub use repository::EmtApiRepository;
pub use transport::{ApiRequest, DEFAULT_BASE_URL, EmtConfig, HttpTransport, Transport};
