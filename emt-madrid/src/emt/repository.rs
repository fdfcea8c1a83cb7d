//! Network-backed [`EmtRepository`].

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::{EmtError, EmtRepository, Stop, StopId};

use super::auth::{AuthenticatedClient, Credentials};
use super::convert::{
    DetailOutcome, apply_arrivals, convert_arrivals, convert_nearby_stops, convert_stop_detail,
};
use super::endpoints::{ARRIVALS, NEARBY_STOPS, STOP_DETAIL};
use super::transport::{ApiRequest, EmtConfig, HttpTransport, Transport};

/// Repository that talks to the EMT API through an [`AuthenticatedClient`].
#[derive(Debug)]
pub struct EmtApiRepository<T> {
    client: AuthenticatedClient<T>,
}

impl EmtApiRepository<HttpTransport> {
    /// Build a repository over HTTP with the given configuration.
    pub fn connect(credentials: Credentials, config: &EmtConfig) -> Result<Self, EmtError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(AuthenticatedClient::new(transport, credentials)))
    }
}

impl<T: Transport> EmtApiRepository<T> {
    pub fn new(client: AuthenticatedClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AuthenticatedClient<T> {
        &self.client
    }
}

/// Transport failures become `wrap(message)`. Authentication and API
/// errors pass through unchanged.
fn wrap_failure(err: EmtError, wrap: impl FnOnce(String) -> EmtError) -> EmtError {
    match err {
        EmtError::Transport(_) => wrap(err.to_string()),
        other => other,
    }
}

#[async_trait]
impl<T: Transport> EmtRepository for EmtApiRepository<T> {
    async fn get_stop_info(&self, stop_id: StopId) -> Result<Stop, EmtError> {
        let request = ApiRequest::new(STOP_DETAIL.method, STOP_DETAIL.path_for(stop_id));
        let response = self
            .client
            .exchange(request)
            .await
            .map_err(|e| wrap_failure(e, |msg| EmtError::stop_not_found(stop_id, msg)))?;

        match convert_stop_detail(stop_id, response)? {
            DetailOutcome::Found(stop) => {
                debug!(stop_id, lines = stop.lines.len(), "stop detail retrieved");
                Ok(stop)
            }
            DetailOutcome::DetailNotAvailable => {
                warn!(stop_id, "stop detail unavailable, using nearby stops lookup");
                self.get_nearby_stops(stop_id).await
            }
        }
    }

    async fn get_nearby_stops(&self, stop_id: StopId) -> Result<Stop, EmtError> {
        let request = ApiRequest::new(NEARBY_STOPS.method, NEARBY_STOPS.path_for(stop_id));
        let response = self
            .client
            .exchange(request)
            .await
            .map_err(|e| wrap_failure(e, |msg| EmtError::stop_not_found(stop_id, msg)))?;

        let stop = convert_nearby_stops(stop_id, response)?;
        debug!(stop_id, nearest = stop.id, lines = stop.lines.len(), "nearby stop resolved");
        Ok(stop)
    }

    async fn get_arrivals(&self, stop: &mut Stop) -> Result<(), EmtError> {
        let stop_id = stop.id;
        let request = ApiRequest::new(ARRIVALS.method, ARRIVALS.path_for(stop_id)).with_body(json!({
            "stopId": stop_id.to_string(),
            "Text_EstimationsRequired_YN": "Y"
        }));
        let response = self
            .client
            .exchange(request)
            .await
            .map_err(|e| wrap_failure(e, |msg| EmtError::arrivals_not_found(stop_id, msg)))?;

        let table = convert_arrivals(stop_id, response)?;
        apply_arrivals(stop, &table);
        debug!(stop_id, lines_with_estimates = table.len(), "arrivals applied");
        Ok(())
    }
}
