//! Client for the EMT Madrid bus API.
//!
//! Looks up bus stops and the lines serving them, and fetches real-time
//! arrival estimates. Access tokens are obtained and renewed transparently.

pub mod domain;
pub mod emt;
pub mod session;
pub mod use_cases;
