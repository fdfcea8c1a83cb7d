//! Per-stop client session.
//!
//! [`EmtClient`] tracks one stop through its lookup sequence:
//! `Uninitialized → StopLoaded → ArrivalsLoaded`. Asking for arrivals
//! before the stop is loaded loads it first.

use futures::future::join_all;
use tracing::{debug, info};

use crate::domain::{EmtError, EmtRepository, Line, Stop, StopId};
use crate::emt::{Credentials, EmtApiRepository, EmtConfig, HttpTransport};
use crate::use_cases::{GetArrivals, GetStopInfo};

/// Where a session is in its lookup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    StopLoaded,
    ArrivalsLoaded,
}

/// Client for a single stop, optionally restricted to some of its lines.
#[derive(Debug)]
pub struct EmtClient<R = EmtApiRepository<HttpTransport>> {
    repository: R,
    stop_id: StopId,
    lines: Vec<String>,
    stop: Option<Stop>,
    state: SessionState,
}

impl EmtClient {
    /// Build a session talking to the API over HTTP.
    pub fn connect(
        credentials: Credentials,
        stop_id: StopId,
        config: &EmtConfig,
    ) -> Result<Self, EmtError> {
        Ok(Self::new(
            EmtApiRepository::connect(credentials, config)?,
            stop_id,
        ))
    }
}

impl<R: EmtRepository> EmtClient<R> {
    pub fn new(repository: R, stop_id: StopId) -> Self {
        Self {
            repository,
            stop_id,
            lines: Vec::new(),
            stop: None,
            state: SessionState::Uninitialized,
        }
    }

    /// Only report these lines. An empty list means every line.
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Load the stop and its (filtered) lines.
    pub async fn get_stop_info(&mut self) -> Result<&Stop, EmtError> {
        let stop = GetStopInfo::new(&self.repository, self.stop_id)
            .with_lines(self.lines.iter().cloned())
            .execute()
            .await?;

        info!(stop_id = stop.id, name = %stop.name, "stop loaded");
        self.state = SessionState::StopLoaded;
        Ok(&*self.stop.insert(stop))
    }

    /// Refresh arrival estimates, loading the stop first if needed.
    ///
    /// On failure the loaded stop is kept with its arrivals cleared, and the
    /// session falls back to `StopLoaded`.
    pub async fn get_arrivals(&mut self) -> Result<&Stop, EmtError> {
        let stop = match self.stop.clone() {
            Some(stop) => stop,
            None => {
                debug!(stop_id = self.stop_id, "no stop loaded, loading it first");
                self.get_stop_info().await?.clone()
            }
        };

        match GetArrivals::new(&self.repository, stop).execute().await {
            Ok(stop) => {
                self.state = SessionState::ArrivalsLoaded;
                Ok(&*self.stop.insert(stop))
            }
            Err(e) => {
                if let Some(stop) = &mut self.stop {
                    stop.lines.iter_mut().for_each(Line::clear_arrivals);
                }
                self.state = SessionState::StopLoaded;
                Err(e)
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The loaded stop, if any.
    pub fn stop(&self) -> Option<&Stop> {
        self.stop.as_ref()
    }

    pub fn stop_id(&self) -> StopId {
        self.stop_id
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

/// Look up many stops, at most `concurrency` at a time.
///
/// Every id gets its own result; a failed lookup does not stop the others.
/// Results come back in the order the ids were given.
pub async fn fetch_stops<R, I>(
    repository: &R,
    ids: I,
    concurrency: usize,
) -> Vec<(StopId, Result<Stop, EmtError>)>
where
    R: EmtRepository + ?Sized,
    I: IntoIterator<Item = StopId>,
{
    let ids: Vec<StopId> = ids.into_iter().collect();
    let mut results = Vec::with_capacity(ids.len());

    for batch in ids.chunks(concurrency.max(1)) {
        let futures: Vec<_> = batch
            .iter()
            .map(|&stop_id| async move { (stop_id, repository.get_stop_info(stop_id).await) })
            .collect();

        for (stop_id, result) in join_all(futures).await {
            if let Err(e) = &result {
                debug!(stop_id, error = %e, "stop lookup failed");
            }
            results.push((stop_id, result));
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emt::MockEmtRepository;

    fn cibeles() -> Stop {
        Stop {
            id: 72,
            name: "Cibeles-Casa de América".into(),
            address: "Pº de Recoletos, 2 (Pza. de Cibeles)".into(),
            coordinates: None,
            lines: vec![
                Line::new("5", "SOL/SEVILLA", "CHAMARTIN"),
                Line::new("14", "CONDE DE CASAL", "PIO XII"),
                Line::new("15", "CONDE DE CASAL", "PIO XII"),
            ],
        }
    }

    async fn repository() -> MockEmtRepository {
        let repo = MockEmtRepository::new();
        repo.insert_stop(cibeles()).await;
        repo.insert_arrivals(72, &[("5", 1), ("5", 4), ("14", 2)]).await;
        repo
    }

    #[tokio::test]
    async fn state_machine() {
        let mut client = EmtClient::new(repository().await, 72);
        assert_eq!(client.state(), SessionState::Uninitialized);
        assert!(client.stop().is_none());

        client.get_stop_info().await.unwrap();
        assert_eq!(client.state(), SessionState::StopLoaded);
        assert_eq!(client.stop().unwrap().lines.len(), 3);

        client.get_arrivals().await.unwrap();
        assert_eq!(client.state(), SessionState::ArrivalsLoaded);
        assert_eq!(client.stop().unwrap().line("5").unwrap().arrival, Some(1));
    }

    #[tokio::test]
    async fn arrivals_from_uninitialized_load_stop_first() {
        let mut client = EmtClient::new(repository().await, 72).with_lines(["14"]);

        let stop = client.get_arrivals().await.unwrap();
        assert_eq!(stop.lines.len(), 1);
        assert_eq!(stop.lines[0].arrival, Some(2));

        assert_eq!(client.repository().stop_info_calls(), 1);
        assert_eq!(client.repository().arrivals_calls(), 1);
        assert_eq!(client.state(), SessionState::ArrivalsLoaded);
    }

    #[tokio::test]
    async fn loaded_stop_is_not_fetched_again() {
        let mut client = EmtClient::new(repository().await, 72);
        client.get_stop_info().await.unwrap();
        client.get_arrivals().await.unwrap();
        client.get_arrivals().await.unwrap();

        assert_eq!(client.repository().stop_info_calls(), 1);
        assert_eq!(client.repository().arrivals_calls(), 2);
    }

    #[tokio::test]
    async fn failed_arrivals_keep_loaded_stop() {
        let repo = MockEmtRepository::new();
        repo.insert_stop(cibeles()).await;
        let mut client = EmtClient::new(repo, 72);

        client.get_stop_info().await.unwrap();
        let err = client.get_arrivals().await.unwrap_err();

        assert!(matches!(err, EmtError::ArrivalsNotFound { .. }));
        assert_eq!(client.state(), SessionState::StopLoaded);
        assert!(client.stop().is_some());
    }

    #[tokio::test]
    async fn failed_refresh_clears_previous_arrivals() {
        let mut client = EmtClient::new(repository().await, 72);

        client.get_arrivals().await.unwrap();
        assert_eq!(client.stop().unwrap().line("5").unwrap().arrival, Some(1));

        client.repository().insert_arrivals(72, &[]).await;
        let err = client.get_arrivals().await.unwrap_err();

        assert!(matches!(err, EmtError::ArrivalsNotFound { .. }));
        assert_eq!(client.state(), SessionState::StopLoaded);
        let stop = client.stop().unwrap();
        assert_eq!(stop.lines.len(), 3);
        for line in &stop.lines {
            assert_eq!(line.arrival, None);
            assert_eq!(line.next_arrival, None);
        }
    }

    #[tokio::test]
    async fn failed_stop_lookup_stays_uninitialized() {
        let mut client = EmtClient::new(MockEmtRepository::new(), 72);
        assert!(client.get_arrivals().await.is_err());
        assert_eq!(client.state(), SessionState::Uninitialized);
        assert!(client.stop().is_none());
    }

    #[tokio::test]
    async fn fetch_stops_reports_each_id() {
        let repo = repository().await;

        let results = fetch_stops(&repo, 70..75, 2).await;

        let ids: Vec<_> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![70, 71, 72, 73, 74]);
        assert!(results[2].1.is_ok());
        assert_eq!(results.iter().filter(|(_, r)| r.is_err()).count(), 4);
        assert_eq!(repo.stop_info_calls(), 5);
    }

    #[tokio::test]
    async fn fetch_stops_zero_concurrency_still_runs() {
        let repo = repository().await;
        let results = fetch_stops(&repo, [72], 0).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].1.is_ok());
    }
}
