//! Look up a stop, optionally narrowed to some of its lines.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::domain::{EmtError, EmtRepository, Stop, StopId};

/// Fetch a stop and keep only the requested lines.
///
/// An empty line filter keeps every line. Asking for a line that does not
/// serve the stop fails with [`EmtError::UnavailableLines`].
#[derive(Debug)]
pub struct GetStopInfo<'a, R: ?Sized> {
    repository: &'a R,
    stop_id: StopId,
    lines: Vec<String>,
}

impl<'a, R: EmtRepository + ?Sized> GetStopInfo<'a, R> {
    pub fn new(repository: &'a R, stop_id: StopId) -> Self {
        Self {
            repository,
            stop_id,
            lines: Vec::new(),
        }
    }

    /// Restrict the result to these line numbers.
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }

    pub async fn execute(self) -> Result<Stop, EmtError> {
        let mut stop = self.repository.get_stop_info(self.stop_id).await?;

        if self.lines.is_empty() {
            return Ok(stop);
        }

        let wanted: HashSet<&str> = self.lines.iter().map(String::as_str).collect();
        let missing: Vec<String> = {
            let available = stop.line_numbers();
            let sorted: BTreeSet<&str> = wanted.difference(&available).copied().collect();
            sorted.into_iter().map(str::to_string).collect()
        };

        if !missing.is_empty() {
            return Err(EmtError::UnavailableLines(missing));
        }

        stop.retain_lines(&wanted);
        debug!(stop_id = stop.id, lines = stop.lines.len(), "stop lines filtered");
        Ok(stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Line;
    use crate::emt::MockEmtRepository;

    async fn repository() -> MockEmtRepository {
        let repo = MockEmtRepository::new();
        repo.insert_stop(Stop {
            id: 72,
            name: "Cibeles-Casa de América".into(),
            address: "Pº de Recoletos, 2 (Pza. de Cibeles)".into(),
            coordinates: None,
            lines: vec![
                Line::new("5", "SOL/SEVILLA", "CHAMARTIN"),
                Line::new("14", "CONDE DE CASAL", "PIO XII"),
                Line::new("15", "CONDE DE CASAL", "PIO XII"),
            ],
        })
        .await;
        repo
    }

    fn numbers(stop: &Stop) -> Vec<&str> {
        stop.lines.iter().map(|l| l.number.as_str()).collect()
    }

    #[tokio::test]
    async fn without_filter_returns_all_lines() {
        let repo = repository().await;
        let stop = GetStopInfo::new(&repo, 72).execute().await.unwrap();
        assert_eq!(numbers(&stop), vec!["5", "14", "15"]);
    }

    #[tokio::test]
    async fn empty_filter_returns_all_lines() {
        let repo = repository().await;
        let stop = GetStopInfo::new(&repo, 72)
            .with_lines(Vec::<String>::new())
            .execute()
            .await
            .unwrap();
        assert_eq!(stop.lines.len(), 3);
    }

    #[tokio::test]
    async fn filter_keeps_requested_lines() {
        let repo = repository().await;
        let stop = GetStopInfo::new(&repo, 72)
            .with_lines(["15", "5"])
            .execute()
            .await
            .unwrap();
        assert_eq!(numbers(&stop), vec!["5", "15"]);
    }

    #[tokio::test]
    async fn unavailable_lines_are_reported_sorted() {
        let repo = repository().await;
        let err = GetStopInfo::new(&repo, 72)
            .with_lines(["999", "5", "150"])
            .execute()
            .await
            .unwrap_err();

        assert!(err.is_api_response_error());
        assert_eq!(
            err.to_string(),
            "the following lines are not available at this stop: 150, 999"
        );
    }

    #[tokio::test]
    async fn repository_errors_pass_through() {
        let repo = repository().await;
        let err = GetStopInfo::new(&repo, 1).execute().await.unwrap_err();
        assert!(matches!(err, EmtError::StopNotFound { stop_id: Some(1), .. }));
    }
}
