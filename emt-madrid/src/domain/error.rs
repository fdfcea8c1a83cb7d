//! Domain error types.
//!
//! Every public operation of the client fails with an [`EmtError`]. The
//! variants fall into two families: authentication failures and API
//! response failures. Use [`EmtError::is_authentication_error`] and
//! [`EmtError::is_api_response_error`] to test for a family.

use super::StopId;

/// Errors surfaced by the EMT client.
#[derive(Debug, thiserror::Error)]
pub enum EmtError {
    /// Email or password missing. Checked locally, before any request.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Login was rejected or could not be completed.
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<Box<EmtError>>,
    },

    /// The daily API quota has been used up.
    #[error("API limit exceeded: {0}")]
    ApiLimitExceeded(String),

    /// The API answered with a code the operation cannot use.
    #[error("API response error: {0}")]
    ApiResponse(String),

    /// The stop does not exist or could not be resolved.
    #[error("stop {}: {message}", display_stop_id(.stop_id))]
    StopNotFound {
        stop_id: Option<StopId>,
        message: String,
    },

    /// No arrival estimates could be obtained for the stop.
    #[error("arrivals for stop {}: {message}", display_stop_id(.stop_id))]
    ArrivalsNotFound {
        stop_id: Option<StopId>,
        message: String,
    },

    /// Some requested lines do not serve the stop.
    #[error("the following lines are not available at this stop: {}", join_lines(.0))]
    UnavailableLines(Vec<String>),

    /// The HTTP exchange itself failed.
    #[error("{0}")]
    Transport(String),
}

fn display_stop_id(stop_id: &Option<StopId>) -> String {
    stop_id.map_or_else(|| "<unknown>".to_string(), |id| id.to_string())
}

fn join_lines(lines: &[String]) -> String {
    lines.join(", ")
}

impl EmtError {
    /// Build an authentication error with no underlying cause.
    pub fn authentication(message: impl Into<String>) -> Self {
        EmtError::Authentication {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap another error as the cause of an authentication failure.
    ///
    /// Errors that already are authentication errors are returned as-is.
    pub fn authentication_caused_by(err: EmtError) -> Self {
        if err.is_authentication_error() {
            return err;
        }
        EmtError::Authentication {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Build a stop-not-found error.
    pub fn stop_not_found(stop_id: StopId, message: impl Into<String>) -> Self {
        EmtError::StopNotFound {
            stop_id: Some(stop_id),
            message: message.into(),
        }
    }

    /// Build an arrivals-not-found error.
    pub fn arrivals_not_found(stop_id: StopId, message: impl Into<String>) -> Self {
        EmtError::ArrivalsNotFound {
            stop_id: Some(stop_id),
            message: message.into(),
        }
    }

    /// True for credential and login failures.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            EmtError::InvalidCredentials(_) | EmtError::Authentication { .. }
        )
    }

    /// True for failures reported by the API through its response codes.
    pub fn is_api_response_error(&self) -> bool {
        matches!(
            self,
            EmtError::ApiLimitExceeded(_)
                | EmtError::ApiResponse(_)
                | EmtError::StopNotFound { .. }
                | EmtError::ArrivalsNotFound { .. }
                | EmtError::UnavailableLines(_)
        )
    }

    /// True if the quota was exceeded, either directly or during login.
    pub fn is_api_limit_exceeded(&self) -> bool {
        match self {
            EmtError::ApiLimitExceeded(_) => true,
            EmtError::Authentication {
                source: Some(inner),
                ..
            } => inner.is_api_limit_exceeded(),
            _ => false,
        }
    }

    /// The stop this error refers to, if known.
    pub fn stop_id(&self) -> Option<StopId> {
        match self {
            EmtError::StopNotFound { stop_id, .. } | EmtError::ArrivalsNotFound { stop_id, .. } => {
                *stop_id
            }
            _ => None,
        }
    }
}
