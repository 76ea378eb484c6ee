//! Blocking HTTP implementation of the backend traits.
//!
//! `HttpBackend` speaks to the REST API with `reqwest::blocking`. Requests
//! on report endpoints carry `Authorization: Bearer <token>` with the token
//! read from the `TokenStore` at call time, so a login performed through
//! the same store takes effect on the next request.
//!
//! Error mapping:
//!
//! - transport failures (refused, timed out) → `DashError::Fetch`
//! - 401 from any endpoint, or 403 from an `/auth/*` endpoint →
//!   `DashError::Auth`
//! - any other non-2xx status → `DashError::Fetch` with status and body
//! - `{"success": false, "message": ...}` envelopes → same kind as the
//!   status mapping for that endpoint

use std::sync::Arc;
use std::time::Duration;

use reqwest::{
    blocking::{multipart, Client, RequestBuilder},
    StatusCode,
};
use serde_json::Value;
use tracing::{debug, warn};

use labdash_contracts::{
    api::{decode, open_envelope, AuthGrant, LoginRequest, SignupRequest},
    error::{DashError, DashResult},
    report::{Report, ReportDetail},
    user::User,
};
use labdash_core::{
    traits::{AuthBackend, ReportsBackend, TokenStore},
    upload::UploadFile,
};

use crate::config::ClientConfig;

/// Which family of endpoint a request hit; decides how failures map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Auth,
    Data,
}

/// Longest slice of a response body quoted in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Pull a human message out of an error body: FastAPI's `detail`, an
/// envelope's `message`, or the raw text.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["detail", "message", "error"]
            .iter()
            .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
    });
    match from_json {
        Some(message) => message,
        None => {
            let trimmed = body.trim();
            match trimmed.char_indices().nth(MAX_ERROR_BODY) {
                Some((cut, _)) => format!("{}...", &trimmed[..cut]),
                None => trimmed.to_string(),
            }
        }
    }
}

fn status_error(endpoint: Endpoint, status: StatusCode, body: &str) -> DashError {
    let message = error_message(body);
    let rejected = status == StatusCode::UNAUTHORIZED
        || (endpoint == Endpoint::Auth && status == StatusCode::FORBIDDEN);
    if rejected {
        DashError::auth(message)
    } else if message.is_empty() {
        DashError::fetch(format!("HTTP {}", status.as_u16()))
    } else {
        DashError::fetch(format!("HTTP {}: {}", status.as_u16(), message))
    }
}

fn envelope_error(endpoint: Endpoint, message: String) -> DashError {
    match endpoint {
        Endpoint::Auth => DashError::auth(message),
        Endpoint::Data => DashError::fetch(message),
    }
}

pub struct HttpBackend {
    base_url: String,
    client: Client,
    timeout_secs: u64,
    tokens: Arc<dyn TokenStore>,
}

impl HttpBackend {
    /// Build a client for `config`, reading bearer tokens from `tokens`.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> DashResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DashError::Config {
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: config.timeout_secs,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `"reports/abc"`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the persisted bearer token, if there is one.
    fn authorized(&self, request: RequestBuilder) -> DashResult<RequestBuilder> {
        Ok(match self.tokens.load()? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    /// Send `request` and return its unwrapped JSON payload. An empty body
    /// yields `Value::Null`.
    fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> DashResult<Value> {
        let response = request.send().map_err(|e| {
            if e.is_connect() {
                DashError::fetch(format!("could not reach backend at {}", self.base_url))
            } else if e.is_timeout() {
                DashError::fetch(format!("request timed out after {}s", self.timeout_secs))
            } else {
                DashError::fetch(e.to_string())
            }
        })?;

        let status = response.status();
        let url = response.url().to_string();
        let body = response
            .text()
            .map_err(|e| DashError::fetch(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "backend returned error status");
            return Err(status_error(endpoint, status, &body));
        }
        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "backend response");

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| DashError::fetch(format!("response from {} is not JSON: {}", url, e)))?;
        open_envelope(value).map_err(|message| envelope_error(endpoint, message))
    }
}

impl ReportsBackend for HttpBackend {
    fn list_reports(&self) -> DashResult<Vec<Report>> {
        let request = self.authorized(self.client.get(self.url("reports")))?;
        decode("report list", self.send(Endpoint::Data, request)?)
    }

    fn get_report(&self, id: &str) -> DashResult<ReportDetail> {
        let request = self.authorized(self.client.get(self.url(&format!("reports/{}", id))))?;
        let value = self.send(Endpoint::Data, request)?;
        if value.is_null() {
            return Err(DashError::NotFound {
                what: format!("report '{}'", id),
            });
        }
        decode("report detail", value)
    }

    fn upload_report(&self, file: &UploadFile) -> DashResult<Report> {
        let kind = file.validate()?;
        let mime = file.mime_type.as_deref().unwrap_or(kind.mime());
        let part = multipart::Part::bytes(file.content.clone())
            .file_name(file.file_name.clone())
            .mime_str(mime)
            .map_err(|e| DashError::validation(format!("invalid MIME type '{}': {}", mime, e)))?;
        let form = multipart::Form::new().part("file", part);

        let request = self.authorized(self.client.post(self.url("reports/upload")).multipart(form))?;
        decode("uploaded report", self.send(Endpoint::Data, request)?)
    }

    fn delete_report(&self, id: &str) -> DashResult<()> {
        let request = self.authorized(self.client.delete(self.url(&format!("reports/{}", id))))?;
        self.send(Endpoint::Data, request)?;
        Ok(())
    }
}

impl AuthBackend for HttpBackend {
    fn login(&self, email: &str, password: &str) -> DashResult<AuthGrant> {
        let request = self
            .client
            .post(self.url("auth/login"))
            .json(&LoginRequest { email, password });
        decode_grant(self.send(Endpoint::Auth, request)?)
    }

    fn signup(&self, name: &str, email: &str, password: &str) -> DashResult<AuthGrant> {
        let request = self
            .client
            .post(self.url("auth/signup"))
            .json(&SignupRequest { name, email, password });
        decode_grant(self.send(Endpoint::Auth, request)?)
    }

    fn current_user(&self, token: &str) -> DashResult<User> {
        let request = self.client.get(self.url("auth/me")).bearer_auth(token);
        decode("user", self.send(Endpoint::Auth, request)?)
    }
}

/// A grant with no token is an auth failure, not a decode failure.
fn decode_grant(value: Value) -> DashResult<AuthGrant> {
    serde_json::from_value(value).map_err(|e| DashError::auth(format!("invalid auth response: {}", e)))
}
