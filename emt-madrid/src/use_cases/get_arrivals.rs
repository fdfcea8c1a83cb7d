//! Fill in arrival estimates on an already resolved stop.

use crate::domain::{EmtError, EmtRepository, Stop};

/// Update every line of a stop with its next two arrivals.
#[derive(Debug)]
pub struct GetArrivals<'a, R: ?Sized> {
    repository: &'a R,
    stop: Stop,
}

impl<'a, R: EmtRepository + ?Sized> GetArrivals<'a, R> {
    pub fn new(repository: &'a R, stop: Stop) -> Self {
        Self { repository, stop }
    }

    /// Returns the same stop with `arrival` and `next_arrival` updated.
    pub async fn execute(mut self) -> Result<Stop, EmtError> {
        self.repository.get_arrivals(&mut self.stop).await?;
        Ok(self.stop)
    }
}
