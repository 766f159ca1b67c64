// Matchup backend client.
//
// Wraps every call in the same contract: fail fast when the base URL or a
// required admin key is missing, attach the admin header when asked, parse
// the body as JSON (falling back to `{}`), and turn non-2xx statuses into an
// `ApiError` carrying the backend's `error` message.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::transport::{HttpRequest, HttpTransport, Method};
use crate::credentials::AdminKeyStore;
use crate::protocol::{
    ActivateRequest, ActiveMatchupResponse, CreateMatchupRequest, HistoryItem, HistoryResponse,
    Side, VoteRequest,
};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API base URL not set")]
    NotConfigured,

    #[error("Admin key missing")]
    AdminKeyMissing,

    /// Non-2xx response. `message` is the backend's `error` field or
    /// `HTTP <status>`.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("unexpected response payload: {0}")]
    UnexpectedPayload(String),

    #[error("failed to encode request body: {0}")]
    Encode(String),

    #[error("local storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// Request options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            body: None,
        }
    }

    pub fn post_json<T: Serialize>(body: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(Self {
            method: Method::Post,
            body: Some(body),
        })
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    admin_keys: AdminKeyStore,
}

impl ApiClient {
    /// The base URL is trimmed and one trailing `/` is dropped. An empty
    /// base is accepted here; requests then fail with `NotConfigured`.
    pub fn new(base_url: &str, transport: Arc<dyn HttpTransport>, admin_keys: AdminKeyStore) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            transport,
            admin_keys,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// Issue one request against `base_url + path`.
    ///
    /// Neither `NotConfigured` nor `AdminKeyMissing` touches the network.
    /// Nothing is retried.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
        needs_admin: bool,
    ) -> Result<Value, ApiError> {
        if !self.is_configured() {
            return Err(ApiError::NotConfigured);
        }

        let mut headers = Vec::new();
        if needs_admin {
            let key = self
                .admin_keys
                .get()
                .map_err(|e| ApiError::Storage(format!("{e:#}")))?;
            if key.is_empty() {
                return Err(ApiError::AdminKeyMissing);
            }
            headers.push((ADMIN_KEY_HEADER.to_string(), key));
        }

        let body = match options.body {
            Some(value) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(value.to_string())
            }
            None => None,
        };

        let request = HttpRequest {
            method: options.method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        };
        debug!(method = request.method.as_str(), url = %request.url, needs_admin, "API request");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::Transport(e.0))?;

        let payload = parse_payload(&response.body);
        if !response.is_success() {
            let message = extract_error_message(&payload, response.status);
            warn!(status = response.status, %message, path, "API request failed");
            return Err(ApiError::Http {
                status: response.status,
                message,
            });
        }

        Ok(payload)
    }

    async fn request_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
        needs_admin: bool,
    ) -> Result<T, ApiError> {
        let payload = self.request(path, options, needs_admin).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::UnexpectedPayload(e.to_string()))
    }

    /// `GET /matchup`.
    pub async fn fetch_matchup(&self) -> Result<ActiveMatchupResponse, ApiError> {
        self.request_as("/matchup", RequestOptions::get(), false).await
    }

    /// `GET /history`. A payload without `history` is an empty list.
    pub async fn fetch_history(&self) -> Result<Vec<HistoryItem>, ApiError> {
        let resp: HistoryResponse = self
            .request_as("/history", RequestOptions::get(), false)
            .await?;
        Ok(resp.history.unwrap_or_default())
    }

    /// `POST /vote`. Only the status matters; the payload is discarded.
    pub async fn submit_vote(
        &self,
        matchup_id: &str,
        side: Side,
        fingerprint: &str,
    ) -> Result<(), ApiError> {
        let body = VoteRequest {
            matchup_id: matchup_id.to_string(),
            side,
            fingerprint: fingerprint.to_string(),
        };
        self.request("/vote", RequestOptions::post_json(&body)?, false)
            .await?;
        Ok(())
    }

    /// `POST /admin/activate`.
    pub async fn activate_matchup(&self, matchup_id: &str) -> Result<Value, ApiError> {
        let body = ActivateRequest {
            matchup_id: matchup_id.to_string(),
        };
        self.request("/admin/activate", RequestOptions::post_json(&body)?, true)
            .await
    }

    /// `POST /admin/matchup`.
    pub async fn create_matchup(&self, request: &CreateMatchupRequest) -> Result<Value, ApiError> {
        self.request("/admin/matchup", RequestOptions::post_json(request)?, true)
            .await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// Body as JSON, or an empty object when it does not parse.
pub(crate) fn parse_payload(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Default::default()))
}

pub(crate) fn extract_error_message(payload: &Value, status: u16) -> String {
    payload
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}
