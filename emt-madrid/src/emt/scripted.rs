//! Scripted transport for unit tests.
//!
//! Replies with canned results in order and records every request it sees.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use super::endpoints::LOGIN;
use super::error::TransportError;
use super::transport::{ApiRequest, Transport};

pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn login_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == LOGIN.path)
            .count()
    }

    /// Paths requested, login excluded.
    pub fn data_paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path != LOGIN.path)
            .map(|r| r.path.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn exchange(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply left for {path}"))
    }
}

/// A successful login response.
pub fn login_response(token: &str, expires_millis: i64) -> Value {
    json!({
        "code": "01",
        "description": "Token 12345678-abcd-1234-abcd-1234567890ab extend into control-cache",
        "datetime": "2026-10-19T10:00:00.000000",
        "data": [{
            "nameApp": "OPENAPI MobilityLabs",
            "userName": "user",
            "accessToken": token,
            "email": "user@example.com",
            "tokenSecExpiration": 86399,
            "apiCounter": { "current": 13, "dailyUse": 20000, "owner": 0 },
            "tokenDteExpiration": { "$date": expires_millis }
        }]
    })
}

/// A successful login whose token expires in a day.
pub fn login_ok(token: &str) -> Value {
    login_response(token, (Utc::now() + Duration::days(1)).timestamp_millis())
}
