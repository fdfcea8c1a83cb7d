//! Repository capability used by the use cases.

use async_trait::async_trait;

use super::{EmtError, Stop, StopId};

/// Source of stop and arrival data.
///
/// The network-backed implementation is
/// [`EmtApiRepository`](crate::emt::EmtApiRepository); tests substitute
/// [`MockEmtRepository`](crate::emt::MockEmtRepository).
#[async_trait]
pub trait EmtRepository: Send + Sync {
    /// Fetch the full detail of a stop, falling back to the nearby-stops
    /// lookup when the detail is not published.
    async fn get_stop_info(&self, stop_id: StopId) -> Result<Stop, EmtError>;

    /// Resolve a stop through the nearby-stops lookup.
    ///
    /// The nearest entry is taken as the stop itself. Its lines carry no
    /// schedule data.
    async fn get_nearby_stops(&self, stop_id: StopId) -> Result<Stop, EmtError>;

    /// Fill in `arrival` and `next_arrival` on every line of `stop`.
    ///
    /// Lines without estimates have both fields cleared.
    async fn get_arrivals(&self, stop: &mut Stop) -> Result<(), EmtError>;
}
