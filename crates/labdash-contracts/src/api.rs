//! Wire-level request and response shapes for the REST backend.
//!
//! Most endpoints wrap their payload as `{ "success", "message", "data" }`,
//! some return the payload bare. `open_envelope` normalizes both.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{DashError, DashResult},
    user::User,
};

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// What a successful login or signup yields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireAuthGrant")]
pub struct AuthGrant {
    pub access_token: String,
    pub user: User,
    pub refresh_token: Option<String>,
    /// Seconds until `access_token` expires.
    pub expires_in: Option<u64>,
}

impl AuthGrant {
    pub fn new(access_token: impl Into<String>, user: User) -> Self {
        Self {
            access_token: access_token.into(),
            user,
            refresh_token: None,
            expires_in: None,
        }
    }
}

#[derive(Deserialize)]
struct WireToken {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// The token arrives either flat (`access_token`) or nested (`token.access_token`).
#[derive(Deserialize)]
struct WireAuthGrant {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token: Option<WireToken>,
    user: User,
}

impl TryFrom<WireAuthGrant> for AuthGrant {
    type Error = DashError;

    fn try_from(wire: WireAuthGrant) -> Result<Self, Self::Error> {
        match (wire.access_token, wire.token) {
            (Some(access_token), nested) => Ok(Self {
                access_token,
                user: wire.user,
                refresh_token: nested.as_ref().and_then(|t| t.refresh_token.clone()),
                expires_in: nested.and_then(|t| t.expires_in),
            }),
            (None, Some(token)) => Ok(Self {
                access_token: token.access_token,
                user: wire.user,
                refresh_token: token.refresh_token,
                expires_in: token.expires_in,
            }),
            (None, None) => Err(DashError::auth("response carried no access token")),
        }
    }
}

/// Strip the `{success, message, data}` wrapper if present.
///
/// Returns `Err(message)` when the envelope reports `success = false`; the
/// caller decides which error kind that maps to. Bare payloads pass through.
pub fn open_envelope(body: Value) -> Result<Value, String> {
    match body {
        Value::Object(mut map) if matches!(map.get("success"), Some(Value::Bool(_))) => {
            let success = map.get("success").and_then(Value::as_bool).unwrap_or(false);
            if !success {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .unwrap_or("request was not successful")
                    .to_string();
                return Err(message);
            }
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

/// Decode an (already unwrapped) payload, mapping failures to `DashError::Fetch`.
pub fn decode<T: DeserializeOwned>(what: &str, value: Value) -> DashResult<T> {
    serde_json::from_value(value)
        .map_err(|e| DashError::fetch(format!("invalid {} payload: {}", what, e)))
}
