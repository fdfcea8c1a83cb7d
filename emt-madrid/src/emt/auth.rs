//! Credentials, access tokens and the authenticated client.
//!
//! [`AuthenticatedClient`] wraps a [`Transport`] and makes sure every data
//! request carries a valid access token. A missing or expired token causes
//! exactly one login before the request goes out. The token sits behind an
//! async mutex, so concurrent exchanges on one client never log in twice at
//! the same time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::EmtError;

use super::endpoints::{ACCESS_TOKEN_HEADER, LOGIN, LoginCode};
use super::transport::{ApiRequest, Transport};
use super::types::{Envelope, LoginData};

/// Login credentials for the EMT API.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Both values must contain something other than whitespace.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, EmtError> {
        let email = email.into();
        let password = password.into();

        if email.trim().is_empty() {
            return Err(EmtError::InvalidCredentials("email is empty".to_string()));
        }
        if password.trim().is_empty() {
            return Err(EmtError::InvalidCredentials("password is empty".to_string()));
        }

        Ok(Self { email, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An access token and the instant it stops being valid.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Token {
    pub value: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: Some(value.into()),
            expires_at: Some(expires_at),
        }
    }

    /// Whether the expiry has passed. A token without an expiry never expires.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    /// Whether a login is needed before the token can be used.
    pub fn needs_refresh(&self) -> bool {
        self.value.is_none() || self.is_expired()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A transport wrapper that logs in on demand and injects the access token.
pub struct AuthenticatedClient<T> {
    transport: T,
    credentials: Credentials,
    token: Mutex<Token>,
}

impl<T: Transport> AuthenticatedClient<T> {
    /// Create a client with no token. The first exchange will log in.
    pub fn new(transport: T, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
            token: Mutex::new(Token::default()),
        }
    }

    /// Start from an already known token.
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Mutex::new(token);
        self
    }

    /// Log in and store the new token, whatever the state of the current one.
    pub async fn authenticate(&self) -> Result<(), EmtError> {
        let mut token = self.token.lock().await;
        self.login(&mut token).await
    }

    /// Send a request with the access token attached.
    ///
    /// Logs in first if the token is missing or expired. Any `accessToken`
    /// header already on the request is replaced. The response body is
    /// returned unchanged; its code is not inspected here.
    pub async fn exchange(&self, mut request: ApiRequest) -> Result<Value, EmtError> {
        let access_token = {
            let mut token = self.token.lock().await;
            if token.needs_refresh() {
                debug!(path = %request.path, "access token missing or expired, logging in");
                self.login(&mut token).await?;
            }
            token
                .value
                .clone()
                .ok_or_else(|| EmtError::authentication("no access token after login"))?
        };

        request.set_header(ACCESS_TOKEN_HEADER, &access_token)?;
        Ok(self.transport.exchange(request).await?)
    }

    /// A copy of the current token.
    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn login(&self, token: &mut Token) -> Result<(), EmtError> {
        debug!("logging in to EMT API");

        let request = ApiRequest::new(LOGIN.method, LOGIN.path)
            .with_header("email", &self.credentials.email)
            .and_then(|r| r.with_header("password", &self.credentials.password))
            .map_err(|e| EmtError::authentication_caused_by(e.into()))?;

        let response = self
            .transport
            .exchange(request)
            .await
            .map_err(|e| EmtError::authentication_caused_by(e.into()))?;

        *token = parse_login(response)?;
        info!(expires_at = ?token.expires_at, "logged in to EMT API");
        Ok(())
    }
}

impl<T> fmt::Debug for AuthenticatedClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// Interpret a login response.
pub fn parse_login(response: Value) -> Result<Token, EmtError> {
    let envelope = Envelope::from_value(response)
        .map_err(|e| EmtError::authentication(format!("malformed login response: {e}")))?;
    let code = envelope.code();

    match LoginCode::parse(code) {
        LoginCode::Success => {}
        LoginCode::InvalidPassword => {
            warn!(code, "login rejected");
            return Err(EmtError::authentication("invalid password"));
        }
        LoginCode::UserNotFound => {
            warn!(code, "login rejected");
            return Err(EmtError::authentication("user not found"));
        }
        LoginCode::ApiLimitExceeded => {
            warn!(code, "daily API quota exceeded at login");
            return Err(EmtError::authentication_caused_by(
                EmtError::ApiLimitExceeded(format!("login refused (code {code})")),
            ));
        }
        LoginCode::Other => {
            warn!(code, "unexpected login response");
            return Err(EmtError::authentication(format!(
                "unexpected login response code {code:?}"
            )));
        }
    }

    let records: Vec<LoginData> = envelope
        .records()
        .map_err(|e| EmtError::authentication(format!("malformed login data: {e}")))?;
    let data = records
        .into_iter()
        .next()
        .ok_or_else(|| EmtError::authentication("login response carried no data"))?;

    if data.access_token.is_empty() {
        return Err(EmtError::authentication("login returned an empty access token"));
    }

    let millis = data.token_dte_expiration.date;
    let expires_at = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        EmtError::authentication(format!("invalid token expiration timestamp {millis}"))
    })?;

    Ok(Token::new(data.access_token, expires_at))
}
